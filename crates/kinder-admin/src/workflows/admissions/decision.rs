use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{ApplicationId, Guardian, GuardianId, Student, StudentApplication, StudentId};
use super::intake::{IntakeGuard, IntakeViolation};
use super::repository::{Repository, RepositoryError, SchoolRecords};

static STUDENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static GUARDIAN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_student_id() -> StudentId {
    let id = STUDENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    StudentId(format!("stu-{id:06}"))
}

fn next_guardian_id() -> GuardianId {
    let id = GUARDIAN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    GuardianId(format!("grd-{id:06}"))
}

/// Failure raised while deciding an application.
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    #[error("application not found")]
    NotFound,
    #[error(transparent)]
    Validation(#[from] IntakeViolation),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for DecisionError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

/// Records produced by accepting an application.
#[derive(Debug, Clone, Serialize)]
pub struct Admission {
    pub application_id: ApplicationId,
    pub student: Student,
    pub guardian: Guardian,
}

impl Admission {
    pub fn email(&self) -> &str {
        &self.guardian.email
    }
}

/// Converts or discards pending applications.
///
/// Each call runs lookup, record creation and removal in that order. The three
/// store mutations are independent; nothing is rolled back on a later failure.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    guard: IntakeGuard,
}

impl DecisionEngine {
    pub fn new(guard: IntakeGuard) -> Self {
        Self { guard }
    }

    pub fn accept<R>(
        &self,
        records: &R,
        application_id: &ApplicationId,
        enrolled_at: DateTime<Utc>,
    ) -> Result<Admission, DecisionError>
    where
        R: SchoolRecords + ?Sized,
    {
        let application = records
            .applications()
            .get(application_id)?
            .ok_or(DecisionError::NotFound)?;

        self.guard.check_references(&application)?;

        let (student, guardian) = enroll(application, enrolled_at);
        let student = records.students().add(student)?;
        let guardian = records.guardians().add(guardian)?;

        if records.applications().remove(application_id)?.is_none() {
            warn!(application_id = %application_id.0, "application vanished before removal");
        }

        info!(
            application_id = %application_id.0,
            student_id = %student.id.0,
            guardian_id = %guardian.id.0,
            "application accepted"
        );

        Ok(Admission {
            application_id: application_id.clone(),
            student,
            guardian,
        })
    }

    /// Drop the application, returning it so the caller can notify the guardian.
    pub fn reject<R>(
        &self,
        records: &R,
        application_id: &ApplicationId,
    ) -> Result<StudentApplication, DecisionError>
    where
        R: SchoolRecords + ?Sized,
    {
        let removed = records
            .applications()
            .remove(application_id)?
            .ok_or(DecisionError::NotFound)?;

        info!(application_id = %application_id.0, "application rejected");
        Ok(removed)
    }
}

fn enroll(application: StudentApplication, enrolled_at: DateTime<Utc>) -> (Student, Guardian) {
    let student_id = next_student_id();
    let guardian_id = next_guardian_id();

    let guardian = Guardian {
        id: guardian_id.clone(),
        full_name: application.guardian_name,
        document: application.guardian_document,
        phone: application.phone,
        profession: application.profession,
        company: application.company,
        email: application.email,
        address: application.address,
        type_id: application.type_id,
        students: vec![student_id.clone()],
    };

    let student = Student {
        id: student_id,
        full_name: application.student_name,
        birth_date: application.birth_date,
        birth_place: application.birth_place,
        department: application.department,
        document: application.student_document,
        weight: application.weight,
        height: application.height,
        blood_type: application.blood_type,
        social_security: application.social_security,
        allergies: application.allergies,
        grade_id: Some(application.grade_id),
        guardians: vec![guardian_id],
        enrolled_at,
    };

    (student, guardian)
}
