//! Evaluation service.
//!
//! Orchestrates a vitals submission end to end: registry check, validation, scoring,
//! classification and persistence. It also runs the two optional side steps, high-tier alert
//! notification and interpretation, and answers history queries.
//!
//! Persistence always happens before the interpretation call, and no store lock is held while
//! that call is in flight.

use crate::alert::{AlertTier, Evaluation};
use crate::config::{CoreConfig, InterpretationMode};
use crate::error::{EvaluationError, EvaluationResult, InterpretationError, StoreResult};
use crate::ids::{PatientId, RecordId, RecordedBy};
use crate::interpretation::{Interpreter, RuleBasedInterpreter};
use crate::measurement::{MeasurementSet, RawMeasurement};
use crate::news2;
use crate::notify::{AlertSink, TracingAlertSink};
use crate::registry::{FilePatientRegistry, InMemoryPatientRegistry, PatientRegistry};
use crate::repositories::{
    FileVitalsStore, HistoryQuery, InMemoryVitalsStore, NewVitalsRecord, VitalsRecord,
    VitalsStore,
};
use crate::validation;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// The outcome of an accepted submission.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    /// The record as persisted.
    pub record: VitalsRecord,
    /// Advisory text. `None` when no interpreter is configured or it failed or timed out.
    pub interpretation: Option<String>,
}

/// A patient's current status, derived from their latest record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientStatus {
    /// No vitals recorded yet.
    Unassessed,
    Stable,
    Medium,
    High,
}

impl PatientStatus {
    pub fn from_tier(tier: AlertTier) -> Self {
        match tier {
            AlertTier::Low => PatientStatus::Stable,
            AlertTier::Medium => PatientStatus::Medium,
            AlertTier::High => PatientStatus::High,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PatientStatus::Unassessed => "unassessed",
            PatientStatus::Stable => "stable",
            PatientStatus::Medium => "medium",
            PatientStatus::High => "high",
        }
    }
}

/// Scores a validated measurement set and classifies it. Pure.
pub fn evaluate(measurement: &MeasurementSet) -> Evaluation {
    Evaluation::from_score(news2::score(measurement))
}

#[derive(Clone)]
pub struct EvaluationService {
    store: Arc<dyn VitalsStore>,
    registry: Arc<dyn PatientRegistry>,
    alert_sink: Arc<dyn AlertSink>,
    interpreter: Option<Arc<dyn Interpreter>>,
    interpretation_timeout: Duration,
}

impl EvaluationService {
    /// Creates a service with the tracing alert sink and no interpreter.
    pub fn new(store: Arc<dyn VitalsStore>, registry: Arc<dyn PatientRegistry>) -> Self {
        Self {
            store,
            registry,
            alert_sink: Arc::new(TracingAlertSink),
            interpreter: None,
            interpretation_timeout: Duration::from_millis(
                crate::constants::DEFAULT_INTERPRETATION_TIMEOUT_MS,
            ),
        }
    }

    /// Builds the service described by `cfg`.
    ///
    /// Opens the file store when a data directory is configured, otherwise an in-memory store.
    /// With a data directory the patient registry is persisted beside the store. The registry is
    /// seeded with the configured patients plus every patient that already has history in the
    /// store.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::StoreError`] if the file store or patient registry cannot be
    /// opened.
    pub fn from_config(cfg: &CoreConfig) -> StoreResult<Self> {
        let (store, registry): (Arc<dyn VitalsStore>, Arc<dyn PatientRegistry>) =
            match cfg.data_dir() {
                Some(dir) => (
                    Arc::new(FileVitalsStore::open(dir)?),
                    Arc::new(FilePatientRegistry::open(dir)?),
                ),
                None => (
                    Arc::new(InMemoryVitalsStore::new()),
                    Arc::new(InMemoryPatientRegistry::new()),
                ),
            };

        for patient_id in cfg.patients().iter().cloned().chain(store.patients()?) {
            registry.register(patient_id)?;
        }

        let service = Self::new(store, registry);
        Ok(match cfg.interpretation() {
            InterpretationMode::Rules => service.with_interpreter(
                Arc::new(RuleBasedInterpreter::new()),
                cfg.interpretation_timeout(),
            ),
            InterpretationMode::Off => service,
        })
    }

    pub fn with_alert_sink(mut self, alert_sink: Arc<dyn AlertSink>) -> Self {
        self.alert_sink = alert_sink;
        self
    }

    /// Enables interpretation, bounded by `timeout` per submission.
    pub fn with_interpreter(mut self, interpreter: Arc<dyn Interpreter>, timeout: Duration) -> Self {
        self.interpreter = Some(interpreter);
        self.interpretation_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &Arc<dyn PatientRegistry> {
        &self.registry
    }

    fn ensure_known(&self, patient_id: &PatientId) -> EvaluationResult<()> {
        if self.registry.contains(patient_id) {
            Ok(())
        } else {
            Err(EvaluationError::UnknownPatient(patient_id.clone()))
        }
    }

    /// Validates, scores, classifies and persists one submission.
    ///
    /// # Errors
    ///
    /// - [`EvaluationError::UnknownPatient`] if the registry does not know the patient.
    /// - [`EvaluationError::Validation`] listing every offending field. Nothing is persisted.
    /// - [`EvaluationError::Store`] if the append fails.
    ///
    /// Alert sink and interpreter failures are logged and never surface here.
    pub async fn submit(
        &self,
        patient_id: &PatientId,
        raw: &RawMeasurement,
        recorded_by: RecordedBy,
    ) -> EvaluationResult<Submission> {
        self.ensure_known(patient_id)?;

        let measurement = validation::validate(raw)?;
        let evaluation = evaluate(&measurement);

        let record = self.store.append(
            patient_id,
            NewVitalsRecord {
                recorded_by,
                recorded_at: Utc::now(),
                measurement,
                evaluation,
            },
        )?;

        tracing::info!(
            patient_id = %patient_id,
            record_id = %record.id,
            composite_score = record.evaluation.composite_score,
            alert_tier = %record.evaluation.alert_tier,
            "evaluated vitals"
        );

        if record.evaluation.alert_tier == AlertTier::High {
            if let Err(e) = self.alert_sink.notify(&record) {
                tracing::warn!(record_id = %record.id, "alert notification failed: {e}");
            }
        }

        let interpretation = self.interpret(&record).await;

        Ok(Submission {
            record,
            interpretation,
        })
    }

    async fn interpret(&self, record: &VitalsRecord) -> Option<String> {
        let interpreter = self.interpreter.as_ref()?;

        match self.run_interpreter(interpreter.as_ref(), record).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(record_id = %record.id, "interpretation skipped: {e}");
                None
            }
        }
    }

    async fn run_interpreter(
        &self,
        interpreter: &dyn Interpreter,
        record: &VitalsRecord,
    ) -> Result<String, InterpretationError> {
        let call = interpreter.interpret(&record.measurement, &record.evaluation);
        tokio::time::timeout(self.interpretation_timeout, call)
            .await
            .map_err(|_| InterpretationError::Timeout(self.interpretation_timeout))?
    }

    /// The patient's history, newest first.
    pub fn history(
        &self,
        patient_id: &PatientId,
        query: HistoryQuery,
    ) -> EvaluationResult<Vec<VitalsRecord>> {
        self.ensure_known(patient_id)?;
        Ok(self.store.history(patient_id, query)?)
    }

    /// The most recent record, or `None` if the patient has none yet.
    pub fn latest(&self, patient_id: &PatientId) -> EvaluationResult<Option<VitalsRecord>> {
        self.ensure_known(patient_id)?;
        Ok(self.store.latest(patient_id)?)
    }

    pub fn record(&self, record_id: &RecordId) -> EvaluationResult<VitalsRecord> {
        self.store
            .get(record_id)?
            .ok_or(EvaluationError::UnknownRecord(*record_id))
    }

    pub fn patient_status(&self, patient_id: &PatientId) -> EvaluationResult<PatientStatus> {
        Ok(self
            .latest(patient_id)?
            .map(|r| PatientStatus::from_tier(r.evaluation.alert_tier))
            .unwrap_or(PatientStatus::Unassessed))
    }

    /// Scores and classifies without persisting anything.
    pub fn evaluate(&self, measurement: &MeasurementSet) -> Evaluation {
        evaluate(measurement)
    }
}
