//! # Vitals Core
//!
//! Core business logic for the NEWS2 vitals scoring and alerting engine.
//!
//! This crate contains the clinical logic and storage:
//! - Validation of raw vitals submissions ([`validation`])
//! - NEWS2 scoring over data-driven band tables ([`news2`])
//! - Alert tier classification ([`alert`])
//! - Append-only per-patient vitals history ([`repositories`])
//! - Orchestration of a submission end to end ([`service`])
//!
//! **No API concerns**: HTTP servers and command-line parsing belong in `api-rest` and
//! `vitals-cli`.

pub mod alert;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod interpretation;
pub mod measurement;
pub mod news2;
pub mod notify;
pub mod registry;
pub mod repositories;
pub mod service;
pub mod validation;

pub use alert::{classify, AlertTier, Evaluation};
pub use config::{CoreConfig, InterpretationMode};
pub use error::{
    AlertError, ConfigError, EvaluationError, EvaluationResult, FieldError, InterpretationError,
    StoreError, StoreResult, ValidationErrors,
};
pub use ids::{PatientId, RecordId, RecordedBy};
pub use interpretation::{Interpreter, RuleBasedInterpreter};
pub use measurement::{ConsciousnessLevel, MeasurementSet, RawMeasurement, RawValue, Temperature};
pub use news2::{News2Score, Parameter, SubScore};
pub use notify::{AlertSink, TracingAlertSink};
pub use registry::{FilePatientRegistry, InMemoryPatientRegistry, PatientRegistry};
pub use repositories::{
    FileVitalsStore, HistoryQuery, InMemoryVitalsStore, NewVitalsRecord, VitalsRecord,
    VitalsStore,
};
pub use service::{evaluate, EvaluationService, PatientStatus, Submission};
pub use validation::validate;
