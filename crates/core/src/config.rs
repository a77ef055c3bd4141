//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Environment variables are read by the binaries only; request
//! handling never consults process-wide state.
//!
//! The `*_from_env_value` helpers take the raw `Option<String>` from the environment so they can
//! be tested without touching it.

use crate::constants::DEFAULT_INTERPRETATION_TIMEOUT_MS;
use crate::error::{ConfigError, ConfigResult};
use crate::ids::PatientId;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which interpreter, if any, runs after each submission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InterpretationMode {
    #[default]
    Rules,
    Off,
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: Option<PathBuf>,
    interpretation: InterpretationMode,
    interpretation_timeout: Duration,
    patients: Vec<PatientId>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `data_dir` of `None` selects the in-memory store.
    pub fn new(
        data_dir: Option<PathBuf>,
        interpretation: InterpretationMode,
        interpretation_timeout: Duration,
        patients: Vec<PatientId>,
    ) -> ConfigResult<Self> {
        if interpretation_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: crate::constants::ENV_INTERPRETATION_TIMEOUT_MS,
                reason: "must be greater than zero".into(),
            });
        }

        if let Some(dir) = &data_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(ConfigError::DataDirNotDirectory(dir.clone()));
            }
        }

        Ok(Self {
            data_dir,
            interpretation,
            interpretation_timeout,
            patients,
        })
    }

    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    pub fn interpretation(&self) -> InterpretationMode {
        self.interpretation
    }

    pub fn interpretation_timeout(&self) -> Duration {
        self.interpretation_timeout
    }

    /// Patients to register at startup.
    pub fn patients(&self) -> &[PatientId] {
        &self.patients
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            interpretation: InterpretationMode::default(),
            interpretation_timeout: Duration::from_millis(DEFAULT_INTERPRETATION_TIMEOUT_MS),
            patients: Vec::new(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the data directory. Empty or unset means "no data directory".
pub fn data_dir_from_env_value(value: Option<String>) -> Option<PathBuf> {
    non_empty(value).map(PathBuf::from)
}

/// Parse the interpretation mode. Empty or unset selects [`InterpretationMode::Rules`].
pub fn interpretation_mode_from_env_value(
    value: Option<String>,
) -> ConfigResult<InterpretationMode> {
    match non_empty(value).map(|v| v.to_ascii_lowercase()).as_deref() {
        None | Some("rules") => Ok(InterpretationMode::Rules),
        Some("off") | Some("none") => Ok(InterpretationMode::Off),
        Some(other) => Err(ConfigError::InvalidValue {
            name: crate::constants::ENV_INTERPRETATION,
            reason: format!("expected 'rules' or 'off', got '{other}'"),
        }),
    }
}

/// Parse the interpretation timeout in milliseconds. Empty or unset selects the default.
pub fn interpretation_timeout_from_env_value(value: Option<String>) -> ConfigResult<Duration> {
    let Some(raw) = non_empty(value) else {
        return Ok(Duration::from_millis(DEFAULT_INTERPRETATION_TIMEOUT_MS));
    };
    let millis: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
        name: crate::constants::ENV_INTERPRETATION_TIMEOUT_MS,
        reason: format!("'{raw}' is not a whole number of milliseconds"),
    })?;
    if millis == 0 {
        return Err(ConfigError::InvalidValue {
            name: crate::constants::ENV_INTERPRETATION_TIMEOUT_MS,
            reason: "must be greater than zero".into(),
        });
    }
    Ok(Duration::from_millis(millis))
}

/// Parse a comma-separated list of patient ids. Blank entries are skipped.
pub fn patients_from_env_value(value: Option<String>) -> ConfigResult<Vec<PatientId>> {
    let Some(raw) = non_empty(value) else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            PatientId::parse(s).map_err(|e| ConfigError::InvalidValue {
                name: crate::constants::ENV_PATIENTS,
                reason: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn data_dir_blank_is_none() {
        assert_eq!(data_dir_from_env_value(None), None);
        assert_eq!(data_dir_from_env_value(some("  ")), None);
        assert_eq!(
            data_dir_from_env_value(some("/var/lib/vitals")),
            Some(PathBuf::from("/var/lib/vitals"))
        );
    }

    #[test]
    fn interpretation_mode_values() {
        assert_eq!(
            interpretation_mode_from_env_value(None).unwrap(),
            InterpretationMode::Rules
        );
        assert_eq!(
            interpretation_mode_from_env_value(some("OFF")).unwrap(),
            InterpretationMode::Off
        );
        assert!(interpretation_mode_from_env_value(some("llm")).is_err());
    }

    #[test]
    fn interpretation_timeout_values() {
        assert_eq!(
            interpretation_timeout_from_env_value(None).unwrap(),
            Duration::from_millis(DEFAULT_INTERPRETATION_TIMEOUT_MS)
        );
        assert_eq!(
            interpretation_timeout_from_env_value(some("250")).unwrap(),
            Duration::from_millis(250)
        );
        assert!(interpretation_timeout_from_env_value(some("0")).is_err());
        assert!(interpretation_timeout_from_env_value(some("-5")).is_err());
        assert!(interpretation_timeout_from_env_value(some("soon")).is_err());
    }

    #[test]
    fn patient_list_values() {
        let patients = patients_from_env_value(some("P001, P002,,P003 ")).unwrap();
        let ids: Vec<&str> = patients.iter().map(|p| p.as_str()).collect();
        assert_eq!(ids, vec!["P001", "P002", "P003"]);

        assert!(patients_from_env_value(None).unwrap().is_empty());
        assert!(patients_from_env_value(some("P001,../etc")).is_err());
    }

    #[test]
    fn new_rejects_zero_timeout() {
        let err = CoreConfig::new(None, InterpretationMode::Rules, Duration::ZERO, Vec::new());
        assert!(matches!(err, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn new_rejects_file_as_data_dir() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();

        let err = CoreConfig::new(
            Some(file),
            InterpretationMode::Off,
            Duration::from_secs(1),
            Vec::new(),
        );
        assert!(matches!(err, Err(ConfigError::DataDirNotDirectory(_))));
    }

    #[test]
    fn accessors() {
        let tmp = TempDir::new().unwrap();
        let cfg = CoreConfig::new(
            Some(tmp.path().to_path_buf()),
            InterpretationMode::Off,
            Duration::from_millis(500),
            vec![PatientId::parse("P001").unwrap()],
        )
        .unwrap();
        assert_eq!(cfg.data_dir(), Some(tmp.path()));
        assert_eq!(cfg.interpretation(), InterpretationMode::Off);
        assert_eq!(cfg.interpretation_timeout(), Duration::from_millis(500));
        assert_eq!(cfg.patients().len(), 1);

        assert_eq!(CoreConfig::default().interpretation(), InterpretationMode::Rules);
    }
}
