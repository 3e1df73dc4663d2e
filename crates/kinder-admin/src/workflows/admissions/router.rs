use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{ApplicationId, StudentApplicationRequest};
use super::notification::{NotificationError, NotificationRequest, NotificationTransport};
use super::repository::{RepositoryError, SchoolRecords};
use super::service::{AdmissionService, AdmissionServiceError};

/// Router builder exposing intake, decision, notification and directory endpoints.
pub fn admission_router<R, N>(service: Arc<AdmissionService<R, N>>) -> Router
where
    R: SchoolRecords + 'static,
    N: NotificationTransport + 'static,
{
    Router::new()
        .route(
            "/api/v1/admissions/applications",
            post(submit_handler::<R, N>).get(pending_handler::<R, N>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id",
            get(application_handler::<R, N>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id/accept",
            post(accept_handler::<R, N>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id/reject",
            post(reject_handler::<R, N>),
        )
        .route("/api/v1/notifications", post(notify_handler::<R, N>))
        .route("/api/v1/students", get(students_handler::<R, N>))
        .route("/api/v1/guardians", get(guardians_handler::<R, N>))
        .route("/api/v1/directories/grades", get(grades_handler::<R, N>))
        .route(
            "/api/v1/directories/guardian-types",
            get(guardian_types_handler::<R, N>),
        )
        .route(
            "/api/v1/directories/blood-types",
            get(blood_types_handler::<R, N>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<AdmissionService<R, N>>>,
    payload: Result<axum::Json<StudentApplicationRequest>, JsonRejection>,
) -> Response
where
    R: SchoolRecords + 'static,
    N: NotificationTransport + 'static,
{
    let axum::Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    match service.submit(request) {
        Ok(application) => (StatusCode::CREATED, axum::Json(application)).into_response(),
        Err(error) => failure_response(error, None),
    }
}

pub(crate) async fn pending_handler<R, N>(
    State(service): State<Arc<AdmissionService<R, N>>>,
) -> Response
where
    R: SchoolRecords + 'static,
    N: NotificationTransport + 'static,
{
    match service.pending() {
        Ok(applications) => (StatusCode::OK, axum::Json(applications)).into_response(),
        Err(error) => failure_response(error, None),
    }
}

pub(crate) async fn application_handler<R, N>(
    State(service): State<Arc<AdmissionService<R, N>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: SchoolRecords + 'static,
    N: NotificationTransport + 'static,
{
    let id = ApplicationId(application_id);
    match service.get(&id) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => failure_response(error, Some(&id)),
    }
}

pub(crate) async fn accept_handler<R, N>(
    State(service): State<Arc<AdmissionService<R, N>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: SchoolRecords + 'static,
    N: NotificationTransport + 'static,
{
    let id = ApplicationId(application_id);
    match service.accept(&id) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => failure_response(error, Some(&id)),
    }
}

pub(crate) async fn reject_handler<R, N>(
    State(service): State<Arc<AdmissionService<R, N>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: SchoolRecords + 'static,
    N: NotificationTransport + 'static,
{
    let id = ApplicationId(application_id);
    match service.reject(&id) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => failure_response(error, Some(&id)),
    }
}

pub(crate) async fn notify_handler<R, N>(
    State(service): State<Arc<AdmissionService<R, N>>>,
    payload: Result<axum::Json<NotificationRequest>, JsonRejection>,
) -> Response
where
    R: SchoolRecords + 'static,
    N: NotificationTransport + 'static,
{
    let axum::Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    match service.notify(request) {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt)).into_response(),
        Err(error) => failure_response(error, None),
    }
}

async fn students_handler<R, N>(State(service): State<Arc<AdmissionService<R, N>>>) -> Response
where
    R: SchoolRecords + 'static,
    N: NotificationTransport + 'static,
{
    match service.students() {
        Ok(students) => (StatusCode::OK, axum::Json(students)).into_response(),
        Err(error) => failure_response(error, None),
    }
}

async fn guardians_handler<R, N>(State(service): State<Arc<AdmissionService<R, N>>>) -> Response
where
    R: SchoolRecords + 'static,
    N: NotificationTransport + 'static,
{
    match service.guardians() {
        Ok(guardians) => (StatusCode::OK, axum::Json(guardians)).into_response(),
        Err(error) => failure_response(error, None),
    }
}

async fn grades_handler<R, N>(State(service): State<Arc<AdmissionService<R, N>>>) -> Response
where
    R: SchoolRecords + 'static,
    N: NotificationTransport + 'static,
{
    axum::Json(service.directories().grades.list()).into_response()
}

async fn guardian_types_handler<R, N>(
    State(service): State<Arc<AdmissionService<R, N>>>,
) -> Response
where
    R: SchoolRecords + 'static,
    N: NotificationTransport + 'static,
{
    axum::Json(service.directories().guardian_types.list()).into_response()
}

async fn blood_types_handler<R, N>(State(service): State<Arc<AdmissionService<R, N>>>) -> Response
where
    R: SchoolRecords + 'static,
    N: NotificationTransport + 'static,
{
    axum::Json(service.directories().blood_types()).into_response()
}

/// Map a service error onto the `{failed: true, message}` payload and a status code.
pub(crate) fn failure_response(
    error: AdmissionServiceError,
    application_id: Option<&ApplicationId>,
) -> Response {
    let (status, payload) = match &error {
        AdmissionServiceError::Validation(violation) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({
                "failed": true,
                "message": violation.to_string(),
                "field": violation.field(),
            }),
        ),
        AdmissionServiceError::Repository(RepositoryError::NotFound) => {
            let message = match application_id {
                Some(id) => format!("application {} not found", id.0),
                None => error.to_string(),
            };
            (
                StatusCode::NOT_FOUND,
                json!({ "failed": true, "message": message }),
            )
        }
        AdmissionServiceError::Repository(RepositoryError::Conflict) => (
            StatusCode::CONFLICT,
            json!({ "failed": true, "message": error.to_string() }),
        ),
        AdmissionServiceError::Notification(NotificationError::Delivery(_)) => (
            StatusCode::BAD_GATEWAY,
            json!({ "failed": true, "message": error.to_string() }),
        ),
        AdmissionServiceError::Notification(NotificationError::Directory(_))
        | AdmissionServiceError::Repository(RepositoryError::Unavailable(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "failed": true, "message": error.to_string() }),
        ),
        AdmissionServiceError::Notification(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "failed": true, "message": error.to_string() }),
        ),
    };

    (status, axum::Json(payload)).into_response()
}

/// Body that never reached the service: unreadable JSON or fields of the wrong type.
pub(crate) fn rejection_response(rejection: JsonRejection) -> Response {
    let status = match &rejection {
        JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    let message = rejection.body_text();

    let payload = match rejected_field(&message) {
        Some(field) => json!({ "failed": true, "message": message, "field": field }),
        None => json!({ "failed": true, "message": message }),
    };
    (status, axum::Json(payload)).into_response()
}

fn rejected_field(message: &str) -> Option<String> {
    let (_, detail) = message.split_once("target type: ")?;
    if let Some(rest) = detail.strip_prefix("missing field `") {
        return rest.split_once('`').map(|(field, _)| field.to_string());
    }
    let (path, _) = detail.split_once(": ")?;
    if path.is_empty() || path.contains(char::is_whitespace) {
        return None;
    }
    Some(path.to_string())
}
