//! In-memory vitals store.
//!
//! A key-partitioned lock table: the outer map is locked only long enough to find or create a
//! patient's log, then appends hold that patient's write lock and reads take its read lock and
//! clone a snapshot. Nothing survives a restart.

use super::shared::{select_page, Tail};
use super::{HistoryQuery, NewVitalsRecord, VitalsRecord, VitalsStore};
use crate::error::{StoreError, StoreResult};
use crate::ids::{PatientId, RecordId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Default)]
struct PatientLog {
    tail: Tail,
    records: Vec<VitalsRecord>,
}

#[derive(Default)]
pub struct InMemoryVitalsStore {
    logs: RwLock<HashMap<PatientId, Arc<RwLock<PatientLog>>>>,
    index: RwLock<HashMap<RecordId, (PatientId, u64)>>,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("vitals store lock poisoned".into())
}

impl InMemoryVitalsStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self, patient_id: &PatientId) -> StoreResult<Option<Arc<RwLock<PatientLog>>>> {
        let logs = self.logs.read().map_err(poisoned)?;
        Ok(logs.get(patient_id).cloned())
    }

    fn log_or_create(&self, patient_id: &PatientId) -> StoreResult<Arc<RwLock<PatientLog>>> {
        if let Some(log) = self.log(patient_id)? {
            return Ok(log);
        }
        let mut logs = self.logs.write().map_err(poisoned)?;
        Ok(logs.entry(patient_id.clone()).or_default().clone())
    }
}

impl VitalsStore for InMemoryVitalsStore {
    fn append(
        &self,
        patient_id: &PatientId,
        record: NewVitalsRecord,
    ) -> StoreResult<VitalsRecord> {
        let log = self.log_or_create(patient_id)?;
        let mut log = log.write().map_err(poisoned)?;

        let persisted = log.tail.next_record(patient_id, record);
        self.index
            .write()
            .map_err(poisoned)?
            .insert(persisted.id, (patient_id.clone(), persisted.sequence));
        log.records.push(persisted.clone());

        tracing::info!(
            patient_id = %patient_id,
            record_id = %persisted.id,
            sequence = persisted.sequence,
            "appended vitals record"
        );

        Ok(persisted)
    }

    fn history(
        &self,
        patient_id: &PatientId,
        query: HistoryQuery,
    ) -> StoreResult<Vec<VitalsRecord>> {
        let Some(log) = self.log(patient_id)? else {
            return Ok(Vec::new());
        };
        let log = log.read().map_err(poisoned)?;

        // Sequence n lives at index n - 1.
        let ascending: Vec<u64> = log.records.iter().map(|r| r.sequence).collect();
        Ok(select_page(&ascending, query)
            .into_iter()
            .filter_map(|seq| log.records.get((seq - 1) as usize).cloned())
            .collect())
    }

    fn get(&self, id: &RecordId) -> StoreResult<Option<VitalsRecord>> {
        let located = self.index.read().map_err(poisoned)?.get(id).cloned();
        let Some((patient_id, sequence)) = located else {
            return Ok(None);
        };
        let Some(log) = self.log(&patient_id)? else {
            return Ok(None);
        };
        let log = log.read().map_err(poisoned)?;
        Ok(log.records.get((sequence - 1) as usize).cloned())
    }

    fn patients(&self) -> StoreResult<Vec<PatientId>> {
        let logs = self.logs.read().map_err(poisoned)?;
        let mut patients = Vec::new();
        for (patient_id, log) in logs.iter() {
            if !log.read().map_err(poisoned)?.records.is_empty() {
                patients.push(patient_id.clone());
            }
        }
        Ok(patients)
    }
}
