//! Helpers shared by the store implementations.

use super::{HistoryQuery, NewVitalsRecord, VitalsRecord};
use crate::ids::{PatientId, RecordId};
use chrono::{DateTime, Utc};

/// Last persisted position of one patient's history.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Tail {
    pub(crate) sequence: u64,
    pub(crate) recorded_at: Option<DateTime<Utc>>,
}

impl Tail {
    /// Builds the next record and advances the tail. Must be called under the patient's lock.
    pub(crate) fn next_record(
        &mut self,
        patient_id: &PatientId,
        record: NewVitalsRecord,
    ) -> VitalsRecord {
        let recorded_at = match self.recorded_at {
            Some(prev) if record.recorded_at < prev => prev,
            _ => record.recorded_at,
        };
        let sequence = self.sequence + 1;

        self.sequence = sequence;
        self.recorded_at = Some(recorded_at);

        VitalsRecord {
            id: RecordId::generate(),
            patient_id: patient_id.clone(),
            sequence,
            recorded_at,
            recorded_by: record.recorded_by,
            measurement: record.measurement,
            evaluation: record.evaluation,
        }
    }

    pub(crate) fn observe(&mut self, record: &VitalsRecord) {
        if record.sequence > self.sequence {
            self.sequence = record.sequence;
        }
        self.recorded_at = match self.recorded_at {
            Some(prev) if prev >= record.recorded_at => Some(prev),
            _ => Some(record.recorded_at),
        };
    }
}

/// Sequence numbers selected by `query`, newest first, from an ascending list.
pub(crate) fn select_page(ascending: &[u64], query: HistoryQuery) -> Vec<u64> {
    let limit = query.limit.unwrap_or(usize::MAX);
    ascending
        .iter()
        .rev()
        .copied()
        .filter(|seq| query.before.map_or(true, |before| *seq < before))
        .take(limit)
        .collect()
}
