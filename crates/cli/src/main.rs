use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use vitals_core::{
    constants::{DEFAULT_INTERPRETATION_TIMEOUT_MS, ENV_DATA_DIR},
    evaluate, validate, CoreConfig, EvaluationError, EvaluationService, HistoryQuery,
    InterpretationMode, PatientId, RawMeasurement, RawValue, RecordedBy, VitalsRecord,
};

#[derive(Parser)]
#[command(name = "vitals")]
#[command(about = "NEWS2 vitals scoring and history CLI")]
struct Cli {
    /// Directory holding the vitals store
    #[arg(long, global = true, env = ENV_DATA_DIR)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a set of vitals without recording them
    Score {
        #[command(flatten)]
        vitals: VitalsArgs,
    },
    /// Record a set of vitals for a patient
    Submit {
        /// Patient identifier
        patient_id: String,
        /// Who took the observations
        recorded_by: String,
        #[command(flatten)]
        vitals: VitalsArgs,
        /// Skip the rule-based interpretation
        #[arg(long)]
        no_interpretation: bool,
    },
    /// Show a patient's vitals history, newest first
    History {
        /// Patient identifier
        patient_id: String,
        /// Maximum number of records
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        limit: Option<u64>,
        /// Only records with a sequence below this one
        #[arg(long)]
        before: Option<u64>,
    },
    /// Show a patient's most recent vitals
    Latest {
        /// Patient identifier
        patient_id: String,
    },
}

#[derive(Args)]
struct VitalsArgs {
    /// Respiratory rate (breaths/min)
    #[arg(long = "rr")]
    respiratory_rate: Option<f64>,
    /// Oxygen saturation (%)
    #[arg(long = "spo2")]
    oxygen_saturation: Option<f64>,
    /// Patient is on supplemental oxygen
    #[arg(long = "o2")]
    supplemental_oxygen: bool,
    /// Systolic blood pressure (mmHg)
    #[arg(long = "sbp")]
    systolic_bp: Option<f64>,
    /// Diastolic blood pressure (mmHg)
    #[arg(long = "dbp")]
    diastolic_bp: Option<f64>,
    /// Heart rate (bpm)
    #[arg(long = "hr")]
    heart_rate: Option<f64>,
    /// Level of consciousness: alert, confused, voice, pain, unresponsive
    #[arg(long, default_value = "alert")]
    consciousness: String,
    /// Temperature (°C)
    #[arg(long = "temp")]
    temperature: Option<f64>,
    /// Weight (kg)
    #[arg(long)]
    weight: Option<f64>,
    /// Free-text notes
    #[arg(long)]
    notes: Option<String>,
}

impl VitalsArgs {
    fn into_raw(self) -> RawMeasurement {
        RawMeasurement {
            respiratory_rate: self.respiratory_rate.map(RawValue::from),
            oxygen_saturation: self.oxygen_saturation.map(RawValue::from),
            supplemental_oxygen: Some(self.supplemental_oxygen),
            systolic_bp: self.systolic_bp.map(RawValue::from),
            diastolic_bp: self.diastolic_bp.map(RawValue::from),
            heart_rate: self.heart_rate.map(RawValue::from),
            consciousness: Some(self.consciousness),
            temperature: self.temperature.map(RawValue::from),
            weight: self.weight.map(RawValue::from),
            notes: self.notes,
        }
    }
}

fn print_record(record: &VitalsRecord) {
    let m = &record.measurement;
    let e = &record.evaluation;
    println!(
        "#{} {} by {} [{}]",
        record.sequence,
        record.recorded_at.to_rfc3339(),
        record.recorded_by,
        record.id
    );
    println!(
        "  RR {} SpO2 {}%{} BP {}{} HR {} {} {}°C",
        m.respiratory_rate,
        m.oxygen_saturation,
        if m.supplemental_oxygen { " (O2)" } else { "" },
        m.systolic_bp,
        m.diastolic_bp.map(|d| format!("/{d}")).unwrap_or_default(),
        m.heart_rate,
        m.consciousness,
        m.temperature
    );
    println!(
        "  NEWS2 {} - {}{}",
        e.composite_score,
        e.alert_tier.label(),
        if e.critical { " (critical parameter)" } else { "" }
    );
}

fn open_service(
    data_dir: Option<PathBuf>,
    interpretation: InterpretationMode,
    patients: Vec<PatientId>,
) -> Result<EvaluationService, Box<dyn std::error::Error>> {
    let Some(data_dir) = data_dir else {
        return Err(format!("--data-dir or {ENV_DATA_DIR} is required").into());
    };
    let cfg = CoreConfig::new(
        Some(data_dir),
        interpretation,
        Duration::from_millis(DEFAULT_INTERPRETATION_TIMEOUT_MS),
        patients,
    )?;
    Ok(EvaluationService::from_config(&cfg)?)
}

fn report_validation(err: EvaluationError) -> Box<dyn std::error::Error> {
    if let EvaluationError::Validation(errors) = &err {
        for e in &errors.errors {
            eprintln!("  {}: {}", e.field, e.message);
        }
    }
    err.into()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Score { vitals }) => {
            let measurement = match validate(&vitals.into_raw()) {
                Ok(m) => m,
                Err(errors) => return Err(report_validation(errors.into())),
            };
            let evaluation = evaluate(&measurement);
            for sub in &evaluation.sub_scores {
                println!(
                    "{:<20} {}{}",
                    sub.parameter.as_str(),
                    sub.points(),
                    if sub.critical { " !" } else { "" }
                );
            }
            println!("NEWS2 score: {}", evaluation.composite_score);
            println!(
                "Alert: {} ({})",
                evaluation.alert_tier.label(),
                evaluation.alert_tier.colour()
            );
        }
        Some(Commands::Submit {
            patient_id,
            recorded_by,
            vitals,
            no_interpretation,
        }) => {
            let patient_id = PatientId::parse(&patient_id)?;
            let recorded_by = RecordedBy::new(recorded_by)?;
            let mode = if no_interpretation {
                InterpretationMode::Off
            } else {
                InterpretationMode::Rules
            };
            let service = open_service(cli.data_dir, mode, vec![patient_id.clone()])?;

            let submission = service
                .submit(&patient_id, &vitals.into_raw(), recorded_by)
                .await
                .map_err(report_validation)?;
            print_record(&submission.record);
            if let Some(text) = submission.interpretation {
                println!();
                println!("{text}");
            }
        }
        Some(Commands::History {
            patient_id,
            limit,
            before,
        }) => {
            let patient_id = PatientId::parse(&patient_id)?;
            let service = open_service(
                cli.data_dir,
                InterpretationMode::Off,
                vec![patient_id.clone()],
            )?;
            let limit = limit.map(|l| usize::try_from(l).unwrap_or(usize::MAX));
            let records = service.history(&patient_id, HistoryQuery { limit, before })?;
            if records.is_empty() {
                println!("No vitals recorded for {patient_id}.");
            }
            for record in &records {
                print_record(record);
            }
        }
        Some(Commands::Latest { patient_id }) => {
            let patient_id = PatientId::parse(&patient_id)?;
            let service = open_service(
                cli.data_dir,
                InterpretationMode::Off,
                vec![patient_id.clone()],
            )?;
            match service.latest(&patient_id)? {
                Some(record) => print_record(&record),
                None => println!("No vitals recorded for {patient_id}."),
            }
        }
        None => {
            println!("Use 'vitals --help' for commands");
        }
    }

    Ok(())
}
