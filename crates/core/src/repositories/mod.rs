//! Vitals record storage.
//!
//! The store exclusively owns each patient's history and is its only writer. Histories are
//! append-only: a record, once persisted, is never edited or removed; corrections are new
//! records.
//!
//! ## Ordering
//!
//! Appends for one patient are serialised behind a per-patient lock. Inside that lock the store
//! assigns the next sequence number (starting at 1) and raises the candidate `recorded_at` to
//! the previous record's value if the clock went backwards, so sequence order and timestamp
//! order always agree. No ordering is promised across patients.
//!
//! ## Implementations
//!
//! - [`memory::InMemoryVitalsStore`]: key-partitioned lock table, for tests and ephemeral runs.
//! - [`file::FileVitalsStore`]: one JSON file per record under `<data_dir>/vitals/<patient>/`.

pub mod file;
pub mod memory;
pub(crate) mod shared;

use crate::alert::Evaluation;
use crate::error::StoreResult;
use crate::ids::{PatientId, RecordId, RecordedBy};
use crate::measurement::MeasurementSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use file::FileVitalsStore;
pub use memory::InMemoryVitalsStore;

/// A record as handed to the store, before it has an id or a position.
#[derive(Clone, Debug, PartialEq)]
pub struct NewVitalsRecord {
    pub recorded_by: RecordedBy,
    /// Candidate timestamp; may be raised by the store to keep history non-decreasing.
    pub recorded_at: DateTime<Utc>,
    pub measurement: MeasurementSet,
    pub evaluation: Evaluation,
}

/// A persisted, immutable vitals record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VitalsRecord {
    pub id: RecordId,
    pub patient_id: PatientId,
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub recorded_by: RecordedBy,
    pub measurement: MeasurementSet,
    pub evaluation: Evaluation,
}

/// Page request for a patient's history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Maximum number of records to return.
    pub limit: Option<usize>,
    /// Only return records with a sequence strictly below this cursor.
    pub before: Option<u64>,
}

impl HistoryQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn latest(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            before: None,
        }
    }
}

/// Append-only per-patient vitals log.
pub trait VitalsStore: Send + Sync {
    /// Appends a record to the patient's history and returns it as persisted.
    ///
    /// Atomic per patient: concurrent appends never interleave partially and each one gets a
    /// distinct, strictly increasing sequence number.
    fn append(&self, patient_id: &PatientId, record: NewVitalsRecord)
        -> StoreResult<VitalsRecord>;

    /// Returns the patient's records, newest first. Unknown patients have an empty history.
    fn history(&self, patient_id: &PatientId, query: HistoryQuery)
        -> StoreResult<Vec<VitalsRecord>>;

    /// Returns the most recent record, or `None` if the patient has no history.
    fn latest(&self, patient_id: &PatientId) -> StoreResult<Option<VitalsRecord>> {
        Ok(self
            .history(patient_id, HistoryQuery::latest(1))?
            .into_iter()
            .next())
    }

    /// Looks up a single record by id.
    fn get(&self, id: &RecordId) -> StoreResult<Option<VitalsRecord>>;

    /// Patients with at least one record.
    fn patients(&self) -> StoreResult<Vec<PatientId>>;
}
