use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for pending applications.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuardianId(pub String);

/// Reference into the grade directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradeId(pub String);

/// Reference into the guardian relationship directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuardianTypeId(pub String);

/// ABO/Rh groups accepted on enrollment forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
}

impl BloodType {
    pub const ALL: [BloodType; 8] = [
        BloodType::OPositive,
        BloodType::ONegative,
        BloodType::APositive,
        BloodType::ANegative,
        BloodType::BPositive,
        BloodType::BNegative,
        BloodType::AbPositive,
        BloodType::AbNegative,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|blood_type| blood_type.label() == normalized)
    }
}

/// Raw intake payload as submitted by the admission form.
///
/// Every field arrives unchecked; `IntakeGuard` turns it into a `StudentApplication`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentApplicationRequest {
    pub student_name: String,
    pub birth_date: String,
    pub birth_place: String,
    pub department: String,
    pub student_document: String,
    pub weight: f32,
    pub height: f32,
    pub blood_type: String,
    pub social_security: String,
    #[serde(default)]
    pub allergies: Vec<String>,
    pub grade_id: String,
    pub guardian_name: String,
    pub guardian_document: String,
    pub phone: String,
    pub profession: String,
    pub company: String,
    pub email: String,
    pub address: String,
    pub type_id: String,
}

/// A validated admission request waiting for an administrator's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentApplication {
    pub id: ApplicationId,
    pub student_name: String,
    pub birth_date: NaiveDate,
    pub birth_place: String,
    pub department: String,
    pub student_document: String,
    pub weight: f32,
    pub height: f32,
    pub blood_type: BloodType,
    pub social_security: String,
    pub allergies: Vec<String>,
    pub grade_id: GradeId,
    pub guardian_name: String,
    pub guardian_document: String,
    pub phone: String,
    pub profession: String,
    pub company: String,
    pub email: String,
    pub address: String,
    pub type_id: GuardianTypeId,
    pub submitted_at: DateTime<Utc>,
}

/// Enrolled student, only ever created by accepting an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub full_name: String,
    pub birth_date: NaiveDate,
    pub birth_place: String,
    pub department: String,
    pub document: String,
    pub weight: f32,
    pub height: f32,
    pub blood_type: BloodType,
    pub social_security: String,
    pub allergies: Vec<String>,
    pub grade_id: Option<GradeId>,
    pub guardians: Vec<GuardianId>,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guardian {
    pub id: GuardianId,
    pub full_name: String,
    pub document: String,
    pub phone: String,
    pub profession: String,
    pub company: String,
    pub email: String,
    pub address: String,
    pub type_id: GuardianTypeId,
    pub students: Vec<StudentId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub id: GradeId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianType {
    pub id: GuardianTypeId,
    pub name: String,
}

/// Public listing row for a pending application.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationSummary {
    pub id: ApplicationId,
    pub student_name: String,
    pub guardian_name: String,
    pub email: String,
    pub grade_id: GradeId,
    pub submitted_at: DateTime<Utc>,
}

impl StudentApplication {
    pub fn summary(&self) -> ApplicationSummary {
        ApplicationSummary {
            id: self.id.clone(),
            student_name: self.student_name.clone(),
            guardian_name: self.guardian_name.clone(),
            email: self.email.clone(),
            grade_id: self.grade_id.clone(),
            submitted_at: self.submitted_at,
        }
    }
}
