use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use heartcare_core::{
    load_context, resolve_artifact_dir, CoreConfig, ExerciseAngina, FastingBloodSugar,
    InferenceContext, PredictionService, RawClinicalInput, Sex,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod report;

#[derive(Parser)]
#[command(name = "heartcare")]
#[command(about = "Heart disease risk prediction from clinical measurements")]
struct Cli {
    /// Directory holding columns, scaler and model artifacts
    #[arg(long, global = true, env = "HEARTCARE_ARTIFACT_DIR")]
    artifacts: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict heart disease risk for one patient
    Predict {
        #[command(flatten)]
        patient: PatientArgs,
        /// Read the patient record from a JSON or YAML file; flags override its values
        #[arg(long)]
        input: Option<PathBuf>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the feature order the model was trained on
    Schema,
    /// Load the artifact bundle and report whether it is usable
    Check,
}

#[derive(Args, Default)]
struct PatientArgs {
    /// Age in years
    #[arg(long)]
    age: Option<u32>,
    /// Resting blood pressure
    #[arg(long)]
    resting_bp: Option<f64>,
    /// Serum cholesterol (mg/dl)
    #[arg(long)]
    cholesterol: Option<f64>,
    /// Maximum heart rate achieved
    #[arg(long)]
    max_hr: Option<f64>,
    /// ST depression induced by exercise
    #[arg(long, allow_hyphen_values = true)]
    oldpeak: Option<f64>,
    /// Sex (M or F)
    #[arg(long)]
    sex: Option<Sex>,
    /// Fasting blood sugar > 120 mg/dl (0 or 1)
    #[arg(long)]
    fasting_bs: Option<FastingBloodSugar>,
    /// Exercise-induced angina (Y or N)
    #[arg(long)]
    exercise_angina: Option<ExerciseAngina>,
}

impl PatientArgs {
    /// Overlay values given on the command line onto `base`.
    fn apply(self, mut base: RawClinicalInput) -> RawClinicalInput {
        base.age = self.age.or(base.age);
        base.resting_bp = self.resting_bp.or(base.resting_bp);
        base.cholesterol = self.cholesterol.or(base.cholesterol);
        base.max_heart_rate = self.max_hr.or(base.max_heart_rate);
        base.oldpeak = self.oldpeak.or(base.oldpeak);
        base.sex = self.sex.or(base.sex);
        base.fasting_blood_sugar = self.fasting_bs.or(base.fasting_blood_sugar);
        base.exercise_angina = self.exercise_angina.or(base.exercise_angina);
        base
    }
}

fn read_input_file(path: &Path) -> anyhow::Result<RawClinicalInput> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input file {}", path.display()))?;
    let parsed = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => RawClinicalInput::from_json(&text),
        _ => RawClinicalInput::from_yaml(&text),
    };
    parsed.with_context(|| format!("failed to parse input file {}", path.display()))
}

fn load(artifacts: Option<PathBuf>) -> anyhow::Result<InferenceContext> {
    let dir = resolve_artifact_dir(artifacts)?;
    tracing::debug!(dir = %dir.display(), "resolved artifact directory");
    let config = CoreConfig::new(dir)?;
    let context = load_context(&config).with_context(|| {
        format!(
            "failed to load artifacts from {}",
            config.artifact_dir().display()
        )
    })?;
    Ok(context)
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("heartcare_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let context = load(cli.artifacts)?;

    match cli.command {
        Commands::Predict {
            patient,
            input,
            json,
        } => {
            let base = match input {
                Some(path) => read_input_file(&path)?,
                None => RawClinicalInput::default(),
            };
            let raw = patient.apply(base);

            let service = PredictionService::new(context);
            let result = service.run(&raw)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", report::render(&result));
            }
        }
        Commands::Schema => {
            for (i, name) in context.schema().names().enumerate() {
                println!("{i:>2}  {name}");
            }
        }
        Commands::Check => {
            println!(
                "OK: {} features, {} normaliser, {} model",
                context.schema().len(),
                context.normalizer().kind(),
                context.model().kind()
            );
        }
    }

    Ok(())
}
