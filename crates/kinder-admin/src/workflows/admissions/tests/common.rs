use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::admissions::domain::{
    ApplicationId, BloodType, GradeId, Guardian, GuardianId, GuardianTypeId, StudentApplication,
    StudentApplicationRequest,
};
use crate::workflows::admissions::notification::{
    DeliveryError, NotificationTransport, OutboundMessage,
};
use crate::workflows::admissions::repository::{
    InMemorySchoolRecords, Record, Repository, RepositoryError, SchoolRecords,
};
use crate::workflows::admissions::{admission_router, AdmissionService, AdmissionSettings};

pub(super) fn request() -> StudentApplicationRequest {
    StudentApplicationRequest {
        student_name: "Ana Ruiz".to_string(),
        birth_date: "2020-03-14".to_string(),
        birth_place: "Medellín".to_string(),
        department: "Antioquia".to_string(),
        student_document: "1020304050".to_string(),
        weight: 17.5,
        height: 104.0,
        blood_type: "O+".to_string(),
        social_security: "SURA".to_string(),
        allergies: vec!["Maní".to_string(), "  ".to_string()],
        grade_id: "grade-kg1".to_string(),
        guardian_name: "Gloria Ruiz".to_string(),
        guardian_document: "43123456".to_string(),
        phone: "+57 300 555 0101".to_string(),
        profession: "Ingeniera".to_string(),
        company: "Acme".to_string(),
        email: "ana.g@test.com".to_string(),
        address: "Calle 10 # 20-30".to_string(),
        type_id: "2".to_string(),
    }
}

pub(super) fn application(id: &str) -> StudentApplication {
    StudentApplication {
        id: ApplicationId(id.to_string()),
        student_name: "Ana Ruiz".to_string(),
        birth_date: NaiveDate::from_ymd_opt(2020, 3, 14).expect("valid date"),
        birth_place: "Medellín".to_string(),
        department: "Antioquia".to_string(),
        student_document: "1020304050".to_string(),
        weight: 17.5,
        height: 104.0,
        blood_type: BloodType::OPositive,
        social_security: "SURA".to_string(),
        allergies: vec!["Maní".to_string()],
        grade_id: GradeId("grade-kg1".to_string()),
        guardian_name: "Gloria Ruiz".to_string(),
        guardian_document: "43123456".to_string(),
        phone: "+57 300 555 0101".to_string(),
        profession: "Ingeniera".to_string(),
        company: "Acme".to_string(),
        email: "ana.g@test.com".to_string(),
        address: "Calle 10 # 20-30".to_string(),
        type_id: GuardianTypeId("2".to_string()),
        submitted_at: Utc
            .with_ymd_and_hms(2025, 1, 10, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
    }
}

pub(super) fn guardian(id: &str, email: &str) -> Guardian {
    Guardian {
        id: GuardianId(id.to_string()),
        full_name: format!("Guardian {id}"),
        document: format!("doc-{id}"),
        phone: "+57 300 000 0000".to_string(),
        profession: "Docente".to_string(),
        company: "Colegio".to_string(),
        email: email.to_string(),
        address: "Carrera 1".to_string(),
        type_id: GuardianTypeId("1".to_string()),
        students: Vec::new(),
    }
}

pub(super) type TestService = AdmissionService<InMemorySchoolRecords, MemoryTransport>;

pub(super) fn build_service() -> (TestService, Arc<InMemorySchoolRecords>, Arc<MemoryTransport>) {
    let records = Arc::new(InMemorySchoolRecords::default());
    let transport = Arc::new(MemoryTransport::default());
    let service =
        AdmissionService::new(records.clone(), transport.clone(), AdmissionSettings::default());
    (service, records, transport)
}

pub(super) fn build_failing_service() -> (
    AdmissionService<InMemorySchoolRecords, FailingTransport>,
    Arc<InMemorySchoolRecords>,
) {
    let records = Arc::new(InMemorySchoolRecords::default());
    let service = AdmissionService::new(
        records.clone(),
        Arc::new(FailingTransport),
        AdmissionSettings::default(),
    );
    (service, records)
}

pub(super) fn seed_application(records: &InMemorySchoolRecords, id: &str) -> ApplicationId {
    records
        .applications
        .add(application(id))
        .expect("seed application")
        .id
}

#[derive(Default)]
pub(super) struct MemoryTransport {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl MemoryTransport {
    pub(super) fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().expect("transport mutex poisoned").clone()
    }
}

impl NotificationTransport for MemoryTransport {
    fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .expect("transport mutex poisoned")
            .push(message.clone());
        Ok(())
    }
}

pub(super) struct FailingTransport;

impl NotificationTransport for FailingTransport {
    fn deliver(&self, _message: &OutboundMessage) -> Result<(), DeliveryError> {
        Err(DeliveryError::Rejected("mailbox quota exceeded".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl<T: Record> Repository<T> for UnavailableRepository {
    fn get(&self, _id: &T::Id) -> Result<Option<T>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<T>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn add(&self, _record: T) -> Result<T, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn remove(&self, _id: &T::Id) -> Result<Option<T>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct UnavailableRecords;

impl SchoolRecords for UnavailableRecords {
    type Applications = UnavailableRepository;
    type Students = UnavailableRepository;
    type Guardians = UnavailableRepository;

    fn applications(&self) -> &UnavailableRepository {
        &UnavailableRepository
    }

    fn students(&self) -> &UnavailableRepository {
        &UnavailableRepository
    }

    fn guardians(&self) -> &UnavailableRepository {
        &UnavailableRepository
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    admission_router(Arc::new(service))
}
