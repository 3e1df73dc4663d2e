use chrono::{DateTime, NaiveDate, Utc};

use super::directory::SchoolDirectories;
use super::domain::{
    ApplicationId, BloodType, GradeId, GuardianTypeId, StudentApplication,
    StudentApplicationRequest,
};

/// Field-level validation errors raised while admitting an intake form.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("{field} must be a positive number (found {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} is not a valid date: '{value}'")]
    InvalidDate { field: &'static str, value: String },
    #[error("unknown blood type '{0}'")]
    UnknownBloodType(String),
    #[error("grade '{0}' does not exist")]
    UnknownGrade(String),
    #[error("guardian type '{0}' does not exist")]
    UnknownGuardianType(String),
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
}

impl IntakeViolation {
    /// Form field the violation should be reported against.
    pub fn field(&self) -> &'static str {
        match self {
            IntakeViolation::EmptyField { field }
            | IntakeViolation::NonPositive { field, .. }
            | IntakeViolation::InvalidDate { field, .. } => field,
            IntakeViolation::UnknownBloodType(_) => "blood_type",
            IntakeViolation::UnknownGrade(_) => "grade_id",
            IntakeViolation::UnknownGuardianType(_) => "type_id",
            IntakeViolation::InvalidEmail(_) => "email",
        }
    }
}

/// Guard responsible for turning intake payloads into `StudentApplication` records.
#[derive(Debug, Clone)]
pub struct IntakeGuard {
    directories: SchoolDirectories,
}

impl IntakeGuard {
    pub fn new(directories: SchoolDirectories) -> Self {
        Self { directories }
    }

    pub fn directories(&self) -> &SchoolDirectories {
        &self.directories
    }

    /// Validate every field of `request`, failing on the first violation found.
    pub fn application_from_request(
        &self,
        request: StudentApplicationRequest,
        id: ApplicationId,
        submitted_at: DateTime<Utc>,
    ) -> Result<StudentApplication, IntakeViolation> {
        let student_name = required("student_name", request.student_name)?;
        let birth_date = parse_birth_date(&request.birth_date)?;
        let birth_place = required("birth_place", request.birth_place)?;
        let department = required("department", request.department)?;
        let student_document = required("student_document", request.student_document)?;
        let weight = positive("weight", request.weight)?;
        let height = positive("height", request.height)?;
        let blood_type = BloodType::parse(&request.blood_type)
            .ok_or_else(|| IntakeViolation::UnknownBloodType(request.blood_type.clone()))?;
        let social_security = required("social_security", request.social_security)?;
        let grade_id = GradeId(required("grade_id", request.grade_id)?);
        let guardian_name = required("guardian_name", request.guardian_name)?;
        let guardian_document = required("guardian_document", request.guardian_document)?;
        let phone = required("phone", request.phone)?;
        let profession = required("profession", request.profession)?;
        let company = required("company", request.company)?;
        let email = required("email", request.email)?;
        if !looks_like_email(&email) {
            return Err(IntakeViolation::InvalidEmail(email));
        }
        let address = required("address", request.address)?;
        let type_id = GuardianTypeId(required("type_id", request.type_id)?);

        let allergies = request
            .allergies
            .into_iter()
            .map(|allergy| allergy.trim().to_string())
            .filter(|allergy| !allergy.is_empty())
            .collect();

        let application = StudentApplication {
            id,
            student_name,
            birth_date,
            birth_place,
            department,
            student_document,
            weight,
            height,
            blood_type,
            social_security,
            allergies,
            grade_id,
            guardian_name,
            guardian_document,
            phone,
            profession,
            company,
            email,
            address,
            type_id,
            submitted_at,
        };

        self.check_references(&application)?;
        Ok(application)
    }

    /// Confirm the grade and guardian type still resolve against the directories.
    pub fn check_references(
        &self,
        application: &StudentApplication,
    ) -> Result<(), IntakeViolation> {
        if !self.directories.grades.contains(&application.grade_id) {
            return Err(IntakeViolation::UnknownGrade(application.grade_id.0.clone()));
        }
        if !self.directories.guardian_types.contains(&application.type_id) {
            return Err(IntakeViolation::UnknownGuardianType(
                application.type_id.0.clone(),
            ));
        }
        Ok(())
    }
}

impl Default for IntakeGuard {
    fn default() -> Self {
        Self::new(SchoolDirectories::standard())
    }
}

fn required(field: &'static str, value: String) -> Result<String, IntakeViolation> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(IntakeViolation::EmptyField { field });
    }
    Ok(trimmed.to_string())
}

fn positive(field: &'static str, value: f32) -> Result<f32, IntakeViolation> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(IntakeViolation::NonPositive { field, value })
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp, keeping only the date.
pub(crate) fn parse_birth_date(raw: &str) -> Result<NaiveDate, IntakeViolation> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IntakeViolation::EmptyField {
            field: "birth_date",
        });
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|stamp| stamp.date_naive()))
        .map_err(|_| IntakeViolation::InvalidDate {
            field: "birth_date",
            value: raw.to_string(),
        })
}

pub(crate) fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
