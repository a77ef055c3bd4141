//! Patient registry.
//!
//! The vitals engine does not own patient demographics. It only needs to know whether a patient
//! identifier refers to someone the wider system has admitted, so that vitals are never recorded
//! against a typo.

use crate::constants::PATIENTS_FILE_NAME;
use crate::error::{StoreError, StoreResult};
use crate::ids::PatientId;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

/// Lookup of known patients.
pub trait PatientRegistry: Send + Sync {
    /// Returns true if the patient is known.
    fn contains(&self, patient_id: &PatientId) -> bool;

    /// Registers a patient. Returns false if it was already known.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if a durable registry cannot record the patient.
    fn register(&self, patient_id: PatientId) -> StoreResult<bool>;
}

/// Registry held in process memory. Registrations are lost when the process exits; use
/// [`FilePatientRegistry`] when they must survive a restart.
#[derive(Debug, Default)]
pub struct InMemoryPatientRegistry {
    patients: RwLock<HashSet<PatientId>>,
}

impl InMemoryPatientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry pre-populated with `patients`.
    pub fn with_patients(patients: impl IntoIterator<Item = PatientId>) -> Self {
        Self {
            patients: RwLock::new(patients.into_iter().collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.patients.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PatientRegistry for InMemoryPatientRegistry {
    fn contains(&self, patient_id: &PatientId) -> bool {
        match self.patients.read() {
            Ok(patients) => patients.contains(patient_id),
            Err(poisoned) => poisoned.into_inner().contains(patient_id),
        }
    }

    fn register(&self, patient_id: PatientId) -> StoreResult<bool> {
        let inserted = match self.patients.write() {
            Ok(mut patients) => patients.insert(patient_id.clone()),
            Err(poisoned) => poisoned.into_inner().insert(patient_id.clone()),
        };
        if inserted {
            tracing::info!(patient_id = %patient_id, "registered patient");
        }
        Ok(inserted)
    }
}

/// Registry persisted as `<data_dir>/patients.txt`, one patient id per line.
///
/// New ids are appended and synced before they become visible, so a registration acknowledged
/// to a caller survives a restart.
pub struct FilePatientRegistry {
    path: PathBuf,
    patients: InMemoryPatientRegistry,
    writer: Mutex<()>,
}

impl FilePatientRegistry {
    /// Opens the registry under `data_dir`, loading any ids already recorded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the file exists but cannot be read, and
    /// [`StoreError::Unavailable`] if it holds a line that is not a valid patient id.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(data_dir).map_err(StoreError::Write)?;
        let path = data_dir.join(PATIENTS_FILE_NAME);

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(StoreError::Read(e)),
        };

        let mut patients = HashSet::new();
        for (n, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let patient_id = PatientId::parse(line).map_err(|e| {
                StoreError::Unavailable(format!("{} line {}: {e}", path.display(), n + 1))
            })?;
            patients.insert(patient_id);
        }

        tracing::info!(
            path = %path.display(),
            patients = patients.len(),
            "opened patient registry"
        );

        Ok(Self {
            path,
            patients: InMemoryPatientRegistry::with_patients(patients),
            writer: Mutex::new(()),
        })
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }
}

impl PatientRegistry for FilePatientRegistry {
    fn contains(&self, patient_id: &PatientId) -> bool {
        self.patients.contains(patient_id)
    }

    fn register(&self, patient_id: PatientId) -> StoreResult<bool> {
        let _guard = self
            .writer
            .lock()
            .map_err(|_| StoreError::Unavailable("patient registry lock poisoned".into()))?;

        if self.patients.contains(&patient_id) {
            return Ok(false);
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(StoreError::Write)?;
        writeln!(file, "{patient_id}").map_err(StoreError::Write)?;
        file.sync_all().map_err(StoreError::Write)?;

        self.patients.register(patient_id)
    }
}
