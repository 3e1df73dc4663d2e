use kinder_admin::workflows::admissions::{
    DeliveryError, NotificationTransport, OutboundMessage,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Stand-in for the e-mail provider: logs each message and keeps an outbox.
#[derive(Default, Clone)]
pub(crate) struct TracingTransport {
    outbox: Arc<Mutex<Vec<OutboundMessage>>>,
}

impl NotificationTransport for TracingTransport {
    fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
        info!(
            from = %message.sender,
            to = ?message.to,
            subject = %message.subject,
            "outbound notification"
        );
        let mut guard = self
            .outbox
            .lock()
            .map_err(|_| DeliveryError::Unavailable("outbox mutex poisoned".to_string()))?;
        guard.push(message.clone());
        Ok(())
    }
}

impl TracingTransport {
    pub(crate) fn outbox(&self) -> Vec<OutboundMessage> {
        self.outbox
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}
