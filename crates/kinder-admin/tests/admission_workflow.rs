//! Integration scenarios for the admission intake and decision workflow.
//!
//! Scenarios drive the public service facade and HTTP router so acceptance, rejection, and
//! guardian notifications are validated without reaching into private modules.

mod common {
    use std::sync::{Arc, Mutex};

    use chrono::{NaiveDate, TimeZone, Utc};

    use kinder_admin::workflows::admissions::{
        AdmissionService, AdmissionSettings, ApplicationId, BloodType, DeliveryError, GradeId,
        GuardianTypeId, InMemorySchoolRecords, NotificationTransport, OutboundMessage,
        Repository, StudentApplication, StudentApplicationRequest,
    };

    pub(super) fn application(id: &str, student_name: &str, email: &str) -> StudentApplication {
        StudentApplication {
            id: ApplicationId(id.to_string()),
            student_name: student_name.to_string(),
            birth_date: NaiveDate::from_ymd_opt(2020, 6, 1).expect("valid date"),
            birth_place: "Bogotá".to_string(),
            department: "Cundinamarca".to_string(),
            student_document: "1099887766".to_string(),
            weight: 16.2,
            height: 101.0,
            blood_type: BloodType::APositive,
            social_security: "Sanitas".to_string(),
            allergies: Vec::new(),
            grade_id: GradeId("grade-kg1".to_string()),
            guardian_name: "Gloria Ruiz".to_string(),
            guardian_document: "52111222".to_string(),
            phone: "+57 310 000 1111".to_string(),
            profession: "Abogada".to_string(),
            company: "Bufete".to_string(),
            email: email.to_string(),
            address: "Calle 80 # 12-34".to_string(),
            type_id: GuardianTypeId("2".to_string()),
            submitted_at: Utc
                .with_ymd_and_hms(2025, 2, 3, 8, 30, 0)
                .single()
                .expect("valid timestamp"),
        }
    }

    pub(super) fn request() -> StudentApplicationRequest {
        StudentApplicationRequest {
            student_name: "Mateo Gómez".to_string(),
            birth_date: "2021-01-20".to_string(),
            birth_place: "Cali".to_string(),
            department: "Valle del Cauca".to_string(),
            student_document: "1122334455".to_string(),
            weight: 14.0,
            height: 95.5,
            blood_type: "B-".to_string(),
            social_security: "Nueva EPS".to_string(),
            allergies: vec!["Lactosa".to_string()],
            grade_id: "grade-pk".to_string(),
            guardian_name: "Carlos Gómez".to_string(),
            guardian_document: "16777888".to_string(),
            phone: "+57 315 222 3333".to_string(),
            profession: "Contador".to_string(),
            company: "Finanzas SAS".to_string(),
            email: "carlos.g@test.com".to_string(),
            address: "Avenida 6 # 25-10".to_string(),
            type_id: "1".to_string(),
        }
    }

    #[derive(Default)]
    pub(super) struct Outbox {
        messages: Mutex<Vec<OutboundMessage>>,
    }

    impl Outbox {
        pub(super) fn messages(&self) -> Vec<OutboundMessage> {
            self.messages.lock().expect("lock").clone()
        }
    }

    impl NotificationTransport for Outbox {
        fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
            self.messages.lock().expect("lock").push(message.clone());
            Ok(())
        }
    }

    pub(super) fn build_service() -> (
        AdmissionService<InMemorySchoolRecords, Outbox>,
        Arc<InMemorySchoolRecords>,
        Arc<Outbox>,
    ) {
        let records = Arc::new(InMemorySchoolRecords::default());
        let outbox = Arc::new(Outbox::default());
        let service =
            AdmissionService::new(records.clone(), outbox.clone(), AdmissionSettings::default());
        (service, records, outbox)
    }

    pub(super) fn seed(records: &InMemorySchoolRecords, application: StudentApplication) {
        records.applications.add(application).expect("seed application");
    }
}

mod decisions {
    use super::common::*;
    use kinder_admin::workflows::admissions::{
        AdmissionServiceError, ApplicationId, GradeId, NotificationRequest, Repository,
        RepositoryError, ACCEPTED_SUBJECT,
    };

    #[test]
    fn accepted_application_becomes_enrolled_student() {
        let (service, records, outbox) = build_service();
        seed(
            &records,
            application("app-42", "Ana Ruiz", "ana.g@test.com"),
        );

        let outcome = service
            .accept(&ApplicationId("app-42".to_string()))
            .expect("acceptance succeeds");

        let students = records.students.list().expect("list students");
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].full_name, "Ana Ruiz");
        assert_eq!(students[0].grade_id, Some(GradeId("grade-kg1".to_string())));
        assert!(records.applications.list().expect("list").is_empty());
        assert!(outcome.notification.is_delivered());

        let messages = outbox.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].to, vec!["ana.g@test.com".to_string()]);
        assert_eq!(messages[0].subject, ACCEPTED_SUBJECT);
        assert!(messages[0].body.contains("Ana Ruiz"));

        let receipt = service
            .notify(NotificationRequest::new(
                vec!["ana.g@test.com".to_string()],
                "Estudiante Aceptado",
                format!("Bienvenida {}", outcome.student.full_name),
            ))
            .expect("follow-up notification succeeds");
        assert_eq!(receipt.status, "OK");
    }

    #[test]
    fn second_acceptance_reports_not_found() {
        let (service, records, _) = build_service();
        seed(&records, application("app-1", "X", "x@test.com"));
        let id = ApplicationId("app-1".to_string());

        service.accept(&id).expect("first acceptance");
        match service.accept(&id) {
            Err(AdmissionServiceError::Repository(RepositoryError::NotFound)) => {}
            other => panic!("expected not found, got {other:?}"),
        }
        assert_eq!(records.students.len().expect("count"), 1);
        assert_eq!(records.guardians.len().expect("count"), 1);
    }

    #[test]
    fn rejection_leaves_enrollment_untouched() {
        let (service, records, _) = build_service();
        seed(&records, application("app-1", "X", "x@test.com"));

        let outcome = service
            .reject(&ApplicationId("app-1".to_string()))
            .expect("rejection succeeds");

        assert_eq!(outcome.student_name, "X");
        assert_eq!(outcome.email, "x@test.com");
        assert!(records.students.is_empty().expect("count"));
        assert!(records.guardians.is_empty().expect("count"));
        assert!(records.applications.is_empty().expect("count"));
    }

    #[test]
    fn submitted_application_can_be_accepted() {
        let (service, records, _) = build_service();

        let application = service.submit(request()).expect("submission succeeds");
        let outcome = service.accept(&application.id).expect("acceptance succeeds");

        assert_eq!(outcome.student.full_name, "Mateo Gómez");
        assert_eq!(outcome.student.allergies, vec!["Lactosa".to_string()]);
        assert_eq!(outcome.guardian.full_name, "Carlos Gómez");
        assert_eq!(records.guardians.len().expect("count"), 1);
    }
}

mod notifications {
    use super::common::*;
    use kinder_admin::workflows::admissions::{ApplicationId, NotificationRequest, ALL_GUARDIANS};

    #[test]
    fn broadcast_to_all_uses_guardian_directory() {
        let (service, records, outbox) = build_service();
        seed(&records, application("app-a", "Ana", "ana@test.com"));
        seed(&records, application("app-b", "Beto", "beto@test.com"));
        service
            .accept(&ApplicationId("app-a".to_string()))
            .expect("accept a");
        service
            .accept(&ApplicationId("app-b".to_string()))
            .expect("accept b");

        let receipt = service
            .notify(NotificationRequest::new(
                vec![ALL_GUARDIANS.to_string()],
                "Subject",
                "Body",
            ))
            .expect("broadcast succeeds");

        assert_eq!(
            receipt.recipients,
            vec!["ana@test.com".to_string(), "beto@test.com".to_string()]
        );
        let broadcast = outbox.messages().pop().expect("broadcast recorded");
        assert!(!broadcast.to.contains(&"All".to_string()));
    }
}

mod routing {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use kinder_admin::workflows::admissions::admission_router;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn intake_then_reject_over_http() {
        let (service, records, _) = build_service();
        let router = admission_router(Arc::new(service));

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/admissions/applications")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::to_vec(&request()).expect("serialize request"),
                    ))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        let id = payload
            .get("id")
            .and_then(Value::as_str)
            .expect("application id")
            .to_string();

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/v1/admissions/applications/{id}/reject"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(
            payload.get("student_name").and_then(Value::as_str),
            Some("Mateo Gómez")
        );
        assert!(records.applications.is_empty().expect("count"));
        assert!(records.students.is_empty().expect("count"));
    }

    #[tokio::test]
    async fn malformed_intake_is_unprocessable() {
        let (service, records, _) = build_service();
        let router = admission_router(Arc::new(service));
        let mut request = request();
        request.weight = -1.0;

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/admissions/applications")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::to_vec(&request).expect("serialize request"),
                    ))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload.get("failed"), Some(&Value::Bool(true)));
        assert_eq!(payload.get("field").and_then(Value::as_str), Some("weight"));
        assert!(records.applications.is_empty().expect("count"));
    }

    #[tokio::test]
    async fn string_weight_is_a_structured_failure() {
        let (service, records, _) = build_service();
        let router = admission_router(Arc::new(service));
        let mut payload = serde_json::to_value(request()).expect("serialize request");
        payload["weight"] = Value::String("17.5".to_string());

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/admissions/applications")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::to_vec(&payload).expect("serialize payload"),
                    ))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload.get("failed"), Some(&Value::Bool(true)));
        assert_eq!(payload.get("field").and_then(Value::as_str), Some("weight"));
        assert!(records.applications.is_empty().expect("count"));
    }
}
