use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::admissions::AdmissionServiceError;

/// Failures that stop the process: startup, serving, or a scripted admission run.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("admission error: {0}")]
    Admission(#[from] AdmissionServiceError),
}
