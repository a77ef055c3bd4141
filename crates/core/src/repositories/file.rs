//! File-backed vitals store.
//!
//! ## Layout
//!
//! ```text
//! <data_dir>/vitals/<patient_id>/000000000001.json
//! <data_dir>/vitals/<patient_id>/000000000002.json
//! ```
//!
//! One pretty-printed JSON document per record, named by its zero-padded sequence number so
//! that lexical order is history order.
//!
//! ## Atomicity
//!
//! Under the patient's lock a record is written to `<name>.json.tmp`, flushed, and renamed into
//! place. Readers only consider `.json` files, so they never observe a partially written record.
//! An existing record file is never overwritten.
//!
//! On [`FileVitalsStore::open`] every patient directory is scanned once to rebuild the
//! per-patient tail and the record-id index.

use super::shared::{select_page, Tail};
use super::{HistoryQuery, NewVitalsRecord, VitalsRecord, VitalsStore};
use crate::constants::{
    RECORD_FILE_EXTENSION, SEQUENCE_FILENAME_WIDTH, TEMP_FILE_EXTENSION, VITALS_DIR_NAME,
};
use crate::error::{StoreError, StoreResult};
use crate::ids::{PatientId, RecordId};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

pub struct FileVitalsStore {
    root: PathBuf,
    tails: Mutex<HashMap<PatientId, Arc<Mutex<Tail>>>>,
    index: RwLock<HashMap<RecordId, PathBuf>>,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("vitals store lock poisoned".into())
}

fn record_filename(sequence: u64) -> String {
    format!(
        "{:0width$}.{}",
        sequence,
        RECORD_FILE_EXTENSION,
        width = SEQUENCE_FILENAME_WIDTH
    )
}

/// Parses `<sequence>.json`, ignoring temp files and anything else.
fn sequence_from_filename(name: &str) -> Option<u64> {
    let stem = name.strip_suffix(&format!(".{RECORD_FILE_EXTENSION}"))?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

fn read_record(path: &Path) -> StoreResult<VitalsRecord> {
    let contents = fs::read(path).map_err(StoreError::Read)?;
    serde_json::from_slice(&contents).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Record sequences present in a patient directory, ascending.
fn list_sequences(patient_dir: &Path) -> StoreResult<Vec<u64>> {
    let entries = match fs::read_dir(patient_dir) {
        Ok(it) => it,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::Read(e)),
    };

    let mut sequences = Vec::new();
    for entry in entries {
        let entry = entry.map_err(StoreError::Read)?;
        if let Some(seq) = entry.file_name().to_str().and_then(sequence_from_filename) {
            sequences.push(seq);
        }
    }
    sequences.sort_unstable();
    Ok(sequences)
}

impl FileVitalsStore {
    /// Opens (creating if needed) the store under `data_dir` and rebuilds its indexes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the vitals directory cannot be created, and
    /// [`StoreError::Read`] / [`StoreError::Corrupt`] if existing records cannot be loaded.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let root = data_dir.join(VITALS_DIR_NAME);
        fs::create_dir_all(&root).map_err(StoreError::Write)?;

        let mut tails = HashMap::new();
        let mut index = HashMap::new();
        let mut loaded = 0usize;

        for entry in fs::read_dir(&root).map_err(StoreError::Read)? {
            let entry = entry.map_err(StoreError::Read)?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(patient_id) = entry
                .file_name()
                .to_str()
                .and_then(|name| PatientId::parse(name).ok())
            else {
                tracing::warn!("skipping unrecognised directory: {}", path.display());
                continue;
            };

            let mut tail = Tail::default();
            for seq in list_sequences(&path)? {
                let record_path = path.join(record_filename(seq));
                let record = read_record(&record_path)?;
                tail.observe(&record);
                index.insert(record.id, record_path);
                loaded += 1;
            }
            tails.insert(patient_id, Arc::new(Mutex::new(tail)));
        }

        tracing::info!(
            root = %root.display(),
            patients = tails.len(),
            records = loaded,
            "opened vitals store"
        );

        Ok(Self {
            root,
            tails: Mutex::new(tails),
            index: RwLock::new(index),
        })
    }

    fn patient_dir(&self, patient_id: &PatientId) -> PathBuf {
        self.root.join(patient_id.as_str())
    }

    fn tail(&self, patient_id: &PatientId) -> StoreResult<Arc<Mutex<Tail>>> {
        let mut tails = self.tails.lock().map_err(poisoned)?;
        Ok(tails.entry(patient_id.clone()).or_default().clone())
    }

    fn write_record(&self, patient_dir: &Path, record: &VitalsRecord) -> StoreResult<PathBuf> {
        let final_path = patient_dir.join(record_filename(record.sequence));
        if final_path.exists() {
            return Err(StoreError::AlreadyExists(final_path.display().to_string()));
        }
        let temp_path = final_path.with_extension(format!(
            "{}.{}",
            RECORD_FILE_EXTENSION, TEMP_FILE_EXTENSION
        ));

        let bytes = serde_json::to_vec_pretty(record).map_err(StoreError::Serialization)?;
        let mut file = fs::File::create(&temp_path).map_err(StoreError::Write)?;
        file.write_all(&bytes).map_err(StoreError::Write)?;
        file.sync_all().map_err(StoreError::Write)?;
        drop(file);

        fs::rename(&temp_path, &final_path).map_err(StoreError::Write)?;
        Ok(final_path)
    }
}

impl VitalsStore for FileVitalsStore {
    fn append(
        &self,
        patient_id: &PatientId,
        record: NewVitalsRecord,
    ) -> StoreResult<VitalsRecord> {
        let tail = self.tail(patient_id)?;
        let mut tail = tail.lock().map_err(poisoned)?;

        let patient_dir = self.patient_dir(patient_id);
        fs::create_dir_all(&patient_dir).map_err(StoreError::Write)?;

        // Advance a copy so a failed write leaves the tail where it was.
        let mut next_tail = *tail;
        let persisted = next_tail.next_record(patient_id, record);
        let path = self.write_record(&patient_dir, &persisted)?;
        *tail = next_tail;

        self.index
            .write()
            .map_err(poisoned)?
            .insert(persisted.id, path);

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
        let patient_dir = self.patient_dir(patient_id);
        let ascending = list_sequences(&patient_dir)?;

        select_page(&ascending, query)
            .into_iter()
            .map(|seq| read_record(&patient_dir.join(record_filename(seq))))
            .collect()
    }

    fn get(&self, id: &RecordId) -> StoreResult<Option<VitalsRecord>> {
        let path = self.index.read().map_err(poisoned)?.get(id).cloned();
        path.map(|p| read_record(&p)).transpose()
    }

    fn patients(&self) -> StoreResult<Vec<PatientId>> {
        let tails = self.tails.lock().map_err(poisoned)?;
        let mut patients = Vec::new();
        for (patient_id, tail) in tails.iter() {
            if tail.lock().map_err(poisoned)?.sequence > 0 {
                patients.push(patient_id.clone());
            }
        }
        Ok(patients)
    }
}
