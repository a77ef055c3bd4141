//! High-tier alert notification.

use crate::error::AlertError;
use crate::repositories::VitalsRecord;

/// Receives every record classified as high tier, after it has been persisted.
///
/// Failures are reported back to the service, which logs them. They never undo the append.
pub trait AlertSink: Send + Sync {
    fn notify(&self, record: &VitalsRecord) -> Result<(), AlertError>;
}

/// Emits a `warn` level tracing event per high-tier record.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn notify(&self, record: &VitalsRecord) -> Result<(), AlertError> {
        tracing::warn!(
            patient_id = %record.patient_id,
            record_id = %record.id,
            composite_score = record.evaluation.composite_score,
            critical = record.evaluation.critical,
            "{}",
            record.evaluation.alert_tier.label()
        );
        Ok(())
    }
}
