//! Constants used throughout the vitals core crate.
//!
//! Storage names, environment variable names and physiological bounds live here so the
//! binaries and the core agree on them.

/// Directory name for vitals records under the data directory.
pub const VITALS_DIR_NAME: &str = "vitals";

/// File under the data directory listing registered patient ids, one per line.
pub const PATIENTS_FILE_NAME: &str = "patients.txt";

/// Extension for persisted vitals record files.
pub const RECORD_FILE_EXTENSION: &str = "json";

/// Extension for in-flight record writes. Readers ignore these.
pub const TEMP_FILE_EXTENSION: &str = "tmp";

/// Width of the zero-padded sequence number in record filenames.
pub const SEQUENCE_FILENAME_WIDTH: usize = 12;

/// Maximum length of a patient identifier, in bytes.
pub const MAX_PATIENT_ID_LEN: usize = 64;

/// Default REST listen address.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Default bound on the interpretation step.
pub const DEFAULT_INTERPRETATION_TIMEOUT_MS: u64 = 2_000;

pub const ENV_REST_ADDR: &str = "VITALS_REST_ADDR";
pub const ENV_DATA_DIR: &str = "VITALS_DATA_DIR";
pub const ENV_INTERPRETATION: &str = "VITALS_INTERPRETATION";
pub const ENV_INTERPRETATION_TIMEOUT_MS: &str = "VITALS_INTERPRETATION_TIMEOUT_MS";
pub const ENV_PATIENTS: &str = "VITALS_PATIENTS";

// Physiological plausibility bounds (inclusive). Values outside are rejected, never clamped.

pub const RESPIRATORY_RATE_RANGE: (u16, u16) = (0, 60);
pub const OXYGEN_SATURATION_RANGE: (u16, u16) = (0, 100);
pub const SYSTOLIC_BP_RANGE: (u16, u16) = (0, 300);
pub const DIASTOLIC_BP_RANGE: (u16, u16) = (0, 200);
pub const HEART_RATE_RANGE: (u16, u16) = (0, 300);

/// Temperature bounds in tenths of a degree Celsius (25.0 to 45.0).
pub const TEMPERATURE_TENTHS_RANGE: (i16, i16) = (250, 450);
