//! Student admission intake, acceptance/rejection decisions, and guardian notifications.
//!
//! Applications enter through `IntakeGuard`, wait in the application store, and leave
//! through `DecisionEngine` either as new Student/Guardian records or as a rejection.
//! Notifications are a second, best-effort step reported on the decision outcome.

pub mod decision;
pub mod directory;
pub mod domain;
pub mod intake;
pub mod notification;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use decision::{Admission, DecisionEngine, DecisionError};
pub use directory::{BloodTypeOption, Directory, DirectoryEntry, SchoolDirectories};
pub use domain::{
    ApplicationId, ApplicationSummary, BloodType, Grade, GradeId, Guardian, GuardianId,
    GuardianType, GuardianTypeId, Student, StudentApplication, StudentApplicationRequest,
    StudentId,
};
pub use intake::{IntakeGuard, IntakeViolation};
pub use notification::{
    DeliveryError, DispatchReceipt, Notice, NotificationDispatcher, NotificationError,
    NotificationRequest, NotificationStatus, NotificationTransport, OutboundMessage,
    ACCEPTED_SUBJECT, ALL_GUARDIANS, REJECTED_SUBJECT,
};
pub use repository::{
    InMemoryRepository, InMemorySchoolRecords, Record, Repository, RepositoryError,
    SchoolRecords,
};
pub use router::admission_router;
pub use service::{
    AcceptanceOutcome, AdmissionService, AdmissionServiceError, AdmissionSettings,
    RejectionOutcome,
};
