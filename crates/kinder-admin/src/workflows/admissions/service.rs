use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use super::decision::{DecisionEngine, DecisionError};
use super::directory::SchoolDirectories;
use super::domain::{
    ApplicationId, ApplicationSummary, Guardian, Student, StudentApplication,
    StudentApplicationRequest,
};
use super::intake::{IntakeGuard, IntakeViolation};
use super::notification::{
    DispatchReceipt, Notice, NotificationDispatcher, NotificationError, NotificationRequest,
    NotificationStatus, NotificationTransport,
};
use super::repository::{Repository, RepositoryError, SchoolRecords};

/// School-level settings that shape intake validation and outgoing notices.
#[derive(Debug, Clone)]
pub struct AdmissionSettings {
    pub school_name: String,
    pub sender: String,
    pub directories: SchoolDirectories,
}

impl Default for AdmissionSettings {
    fn default() -> Self {
        Self {
            school_name: "KinderAdminPro".to_string(),
            sender: "admisiones@kinderadminpro.local".to_string(),
            directories: SchoolDirectories::standard(),
        }
    }
}

/// Result of accepting an application. The notification step is reported, never undone.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptanceOutcome {
    pub decision: &'static str,
    pub application_id: ApplicationId,
    pub student: Student,
    pub guardian: Guardian,
    pub notification: NotificationStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectionOutcome {
    pub decision: &'static str,
    pub application_id: ApplicationId,
    pub student_name: String,
    pub email: String,
    pub notification: NotificationStatus,
}

/// Service composing intake validation, the decision engine, and the dispatcher.
pub struct AdmissionService<R, N> {
    records: Arc<R>,
    guard: IntakeGuard,
    engine: DecisionEngine,
    dispatcher: NotificationDispatcher<N>,
    school_name: String,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

impl<R, N> AdmissionService<R, N>
where
    R: SchoolRecords + 'static,
    N: NotificationTransport + 'static,
{
    pub fn new(records: Arc<R>, transport: Arc<N>, settings: AdmissionSettings) -> Self {
        let AdmissionSettings {
            school_name,
            sender,
            directories,
        } = settings;

        let guard = IntakeGuard::new(directories);
        let engine = DecisionEngine::new(guard.clone());

        Self {
            records,
            guard,
            engine,
            dispatcher: NotificationDispatcher::new(transport, sender),
            school_name,
        }
    }

    pub fn directories(&self) -> &SchoolDirectories {
        self.guard.directories()
    }

    /// Validate an intake form and store it as a pending application.
    pub fn submit(
        &self,
        request: StudentApplicationRequest,
    ) -> Result<StudentApplication, AdmissionServiceError> {
        let application =
            self.guard
                .application_from_request(request, next_application_id(), Utc::now())?;

        let stored = self.records.applications().add(application)?;
        info!(application_id = %stored.id.0, grade = %stored.grade_id.0, "application submitted");
        Ok(stored)
    }

    /// Pending applications, oldest first.
    pub fn pending(&self) -> Result<Vec<ApplicationSummary>, AdmissionServiceError> {
        let mut applications = self.records.applications().list()?;
        applications.sort_by(|left, right| left.submitted_at.cmp(&right.submitted_at));
        Ok(applications.iter().map(StudentApplication::summary).collect())
    }

    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<StudentApplication, AdmissionServiceError> {
        let application = self
            .records
            .applications()
            .get(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(application)
    }

    /// Accept an application, then notify the guardian as a separate best-effort step.
    pub fn accept(
        &self,
        application_id: &ApplicationId,
    ) -> Result<AcceptanceOutcome, AdmissionServiceError> {
        let admission = self
            .engine
            .accept(self.records.as_ref(), application_id, Utc::now())?;

        let grade_name = admission
            .student
            .grade_id
            .as_ref()
            .and_then(|grade| self.directories().grades.name_of(grade))
            .unwrap_or("el grado solicitado");
        let notice = Notice::accepted(&admission.student.full_name, grade_name, &self.school_name);
        let notification = self.notify_guardian(notice, admission.email());

        Ok(AcceptanceOutcome {
            decision: "accepted",
            application_id: admission.application_id,
            student: admission.student,
            guardian: admission.guardian,
            notification,
        })
    }

    /// Reject an application, then notify the guardian as a separate best-effort step.
    pub fn reject(
        &self,
        application_id: &ApplicationId,
    ) -> Result<RejectionOutcome, AdmissionServiceError> {
        let removed = self.engine.reject(self.records.as_ref(), application_id)?;

        let notice = Notice::rejected(&removed.student_name, &self.school_name);
        let notification = self.notify_guardian(notice, &removed.email);

        Ok(RejectionOutcome {
            decision: "rejected",
            application_id: removed.id,
            student_name: removed.student_name,
            email: removed.email,
            notification,
        })
    }

    /// Send an ad-hoc notification; `All` expands to every guardian on file.
    pub fn notify(
        &self,
        request: NotificationRequest,
    ) -> Result<DispatchReceipt, AdmissionServiceError> {
        let receipt = self.dispatcher.send(self.records.guardians(), request)?;
        Ok(receipt)
    }

    pub fn students(&self) -> Result<Vec<Student>, AdmissionServiceError> {
        Ok(self.records.students().list()?)
    }

    pub fn guardians(&self) -> Result<Vec<Guardian>, AdmissionServiceError> {
        Ok(self.records.guardians().list()?)
    }

    fn notify_guardian(&self, notice: Notice, email: &str) -> NotificationStatus {
        self.dispatcher
            .send(self.records.guardians(), notice.addressed_to(email))
            .into()
    }
}

/// Error raised by the admission service.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionServiceError {
    #[error(transparent)]
    Validation(#[from] IntakeViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
}

impl From<DecisionError> for AdmissionServiceError {
    fn from(value: DecisionError) -> Self {
        match value {
            DecisionError::NotFound => Self::Repository(RepositoryError::NotFound),
            DecisionError::Validation(violation) => Self::Validation(violation),
            DecisionError::Repository(error) => Self::Repository(error),
        }
    }
}
