use crate::infra::load_model_scorer;
use crate::server;
use cardio_risk::assessment::{
    AssessmentService, BatchReport, RiskScorer, RuleBasedScorer, ScorerKind,
};
use cardio_risk::config::{AppConfig, ConfigError};
use cardio_risk::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "CardioPredict",
    about = "Serve or run cardiovascular risk assessments from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score every patient in a CSV file and print a summary table
    Assess(AssessArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// CSV file with one patient per row
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Scorer to use (rules or model). Defaults to CARDIO_SCORER.
    #[arg(long, value_parser = parse_scorer)]
    pub(crate) scorer: Option<ScorerKind>,
    /// Model artifact for the model scorer. Defaults to CARDIO_MODEL_PATH.
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

fn parse_scorer(raw: &str) -> Result<ScorerKind, String> {
    ScorerKind::parse(raw).ok_or_else(|| format!("unknown scorer '{raw}' (expected rules or model)"))
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assess(args),
    }
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let kind = args.scorer.unwrap_or(config.scoring.scorer);

    // Unlike the server, a broken artifact here is a hard failure.
    let scorer: Arc<dyn RiskScorer> = match kind {
        ScorerKind::Rules => Arc::new(RuleBasedScorer::new()),
        ScorerKind::Model => {
            let path = args
                .model
                .or(config.scoring.model_path)
                .ok_or(ConfigError::MissingModelPath)?;
            Arc::new(load_model_scorer(&path)?)
        }
    };

    let service = AssessmentService::new(scorer);
    let reader = BufReader::new(File::open(&args.csv)?);
    let report = service.assess_csv(reader)?;

    println!("{}", render_report(&report, kind));
    Ok(())
}

pub(crate) fn render_report(report: &BatchReport, scorer: ScorerKind) -> String {
    let mut lines = vec![
        format!("Batch assessment ({} scorer)", scorer.label()),
        format!(
            "Patients: {}  Processed: {}  Errors: {}",
            report.total_patients, report.processed, report.errors
        ),
    ];

    if !report.results.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "{:<8} {:>4} {:<7} {:<7} {:>11}",
            "PATIENT", "AGE", "GENDER", "RISK", "PROBABILITY"
        ));
        for result in &report.results {
            lines.push(format!(
                "{:<8} {:>4} {:<7} {:<7} {:>11.3}",
                result.patient_id,
                result.age,
                result.gender.label(),
                result.risk_level.label(),
                result.probability
            ));
        }
    }

    if !report.validation_errors.is_empty() {
        lines.push(String::new());
        lines.push("Rejected rows".to_string());
        for error in &report.validation_errors {
            lines.push(format!("  row {}: {}", error.row, error.error));
        }
    }

    lines.join("\n")
}
