use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::Guardian;
use super::intake::looks_like_email;
use super::repository::{Repository, RepositoryError};

/// Recipient sentinel that expands to every guardian on file.
pub const ALL_GUARDIANS: &str = "All";

pub const ACCEPTED_SUBJECT: &str = "Estudiante Aceptado";
pub const REJECTED_SUBJECT: &str = "Solicitud Rechazada";

/// Caller supplied notification request; `to` may contain `ALL_GUARDIANS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl NotificationRequest {
    pub fn new(to: Vec<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to,
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Fully resolved message handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub sender: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Outbound delivery hook (e-mail or SMS provider adapters).
pub trait NotificationTransport: Send + Sync {
    fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError>;
}

/// Non-success reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("notification rejected by provider: {0}")]
    Rejected(String),
    #[error("notification transport unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification needs at least one recipient")]
    NoRecipients,
    #[error("'{0}' is not a valid recipient address")]
    InvalidRecipient(String),
    #[error("notification subject must not be empty")]
    EmptySubject,
    #[error("notification body must not be empty")]
    EmptyBody,
    #[error("guardian directory lookup failed: {0}")]
    Directory(#[from] RepositoryError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Confirmation returned once the transport accepted the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReceipt {
    pub status: &'static str,
    pub recipients: Vec<String>,
}

/// Delivery state attached to an admission decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NotificationStatus {
    Delivered { recipients: Vec<String> },
    Failed { message: String },
}

impl NotificationStatus {
    pub fn is_delivered(&self) -> bool {
        matches!(self, NotificationStatus::Delivered { .. })
    }
}

impl From<Result<DispatchReceipt, NotificationError>> for NotificationStatus {
    fn from(result: Result<DispatchReceipt, NotificationError>) -> Self {
        match result {
            Ok(receipt) => NotificationStatus::Delivered {
                recipients: receipt.recipients,
            },
            Err(error) => NotificationStatus::Failed {
                message: error.to_string(),
            },
        }
    }
}

/// Subject and body pair produced by the decision templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub subject: String,
    pub body: String,
}

impl Notice {
    pub fn accepted(student_name: &str, grade_name: &str, school_name: &str) -> Self {
        Self {
            subject: ACCEPTED_SUBJECT.to_string(),
            body: format!(
                "Nos complace informarle que {student_name} ha sido aceptado(a) en {grade_name} \
                 de {school_name}. Pronto nos pondremos en contacto para completar la matrícula."
            ),
        }
    }

    pub fn rejected(student_name: &str, school_name: &str) -> Self {
        Self {
            subject: REJECTED_SUBJECT.to_string(),
            body: format!(
                "Lamentamos informarle que la solicitud de admisión de {student_name} en \
                 {school_name} no fue aprobada en esta ocasión."
            ),
        }
    }

    pub fn addressed_to(self, email: &str) -> NotificationRequest {
        NotificationRequest::new(vec![email.to_string()], self.subject, self.body)
    }
}

/// Resolves recipients and hands messages to the transport.
///
/// This is the only place `ALL_GUARDIANS` is expanded; callers pass the sentinel through.
pub struct NotificationDispatcher<N> {
    transport: Arc<N>,
    sender: String,
}

impl<N> NotificationDispatcher<N>
where
    N: NotificationTransport + 'static,
{
    pub fn new(transport: Arc<N>, sender: impl Into<String>) -> Self {
        Self {
            transport,
            sender: sender.into(),
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Validate, expand and deliver. Delivery is attempted once; no retry.
    pub fn send<G>(
        &self,
        guardians: &G,
        request: NotificationRequest,
    ) -> Result<DispatchReceipt, NotificationError>
    where
        G: Repository<Guardian> + ?Sized,
    {
        let subject = request.subject.trim();
        if subject.is_empty() {
            return Err(NotificationError::EmptySubject);
        }
        if request.body.trim().is_empty() {
            return Err(NotificationError::EmptyBody);
        }

        let recipients = resolve_recipients(guardians, &request.to)?;
        let message = OutboundMessage {
            sender: self.sender.clone(),
            to: recipients,
            subject: subject.to_string(),
            body: request.body,
        };

        match self.transport.deliver(&message) {
            Ok(()) => {
                info!(
                    recipients = message.to.len(),
                    subject = %message.subject,
                    "notification delivered"
                );
                Ok(DispatchReceipt {
                    status: "OK",
                    recipients: message.to,
                })
            }
            Err(error) => {
                warn!(%error, subject = %message.subject, "notification delivery failed");
                Err(error.into())
            }
        }
    }
}

fn resolve_recipients<G>(
    guardians: &G,
    requested: &[String],
) -> Result<Vec<String>, NotificationError>
where
    G: Repository<Guardian> + ?Sized,
{
    let mut resolved: Vec<String> = Vec::new();
    let mut push_unique = |address: String| {
        if !resolved.iter().any(|known| known.eq_ignore_ascii_case(&address)) {
            resolved.push(address);
        }
    };

    let mut expanded = false;
    for entry in requested {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        if entry.eq_ignore_ascii_case(ALL_GUARDIANS) {
            if expanded {
                continue;
            }
            expanded = true;
            for guardian in guardians.list()? {
                let email = guardian.email.trim();
                if looks_like_email(email) {
                    push_unique(email.to_string());
                }
            }
        } else if looks_like_email(entry) {
            push_unique(entry.to_string());
        } else {
            return Err(NotificationError::InvalidRecipient(entry.to_string()));
        }
    }

    if resolved.is_empty() {
        return Err(NotificationError::NoRecipients);
    }
    Ok(resolved)
}
