//! Vitalrec: hybrid health recommendation pipeline.
//!
//! CLI entry point: reads a patient record as JSON (file path or stdin),
//! runs the recommendation pipeline, and prints the audience-specific
//! payload as JSON on stdout.
//!
//! Usage: `vitalrec [--mode patient|doctor] [RECORD.json | -]`

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vitalrec::adapters::sanitize::RedactingMakeWriter;
use vitalrec::adapters::{ChatClient, LlmConfig, ModelClassifier};
use vitalrec::application::NarrativeService;
use vitalrec::{Mode, PatientRecord, RecommendationService, VitalrecError};

const DEFAULT_MODEL_PATH: &str = "models/recommender.json";

struct Args {
    record_path: Option<PathBuf>,
    mode: Mode,
}

fn parse_args() -> Result<Args> {
    let mut record_path = None;
    let mut mode = Mode::Patient;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mode" => {
                let selector = args
                    .next()
                    .context("--mode requires a value (patient or doctor)")?;
                mode = Mode::parse(&selector);
            }
            "-" => record_path = None,
            other if other.starts_with('-') => {
                anyhow::bail!("unknown argument: {other}");
            }
            path => record_path = Some(PathBuf::from(path)),
        }
    }

    Ok(Args { record_path, mode })
}

fn load_record(path: Option<&PathBuf>) -> vitalrec::Result<PatientRecord> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    if raw.trim().is_empty() {
        return Err(VitalrecError::Validation(
            "empty patient record input".to_string(),
        ));
    }

    let record = serde_json::from_str(&raw)?;
    Ok(record)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Log lines can echo upstream failures and payload fragments; route
    // everything through the redacting writer.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(RedactingMakeWriter::new(std::io::stderr)),
        )
        .init();

    let args = parse_args()?;

    let model_path = std::env::var("VITALREC_MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string());
    let classifier = Arc::new(ModelClassifier::load(model_path.as_ref()));

    let generator = match LlmConfig::from_env() {
        Some(config) => Some(ChatClient::new(config)?),
        None => {
            tracing::info!("No text-generation endpoint configured, narratives use fallback text");
            None
        }
    };

    let service = RecommendationService::new(classifier, NarrativeService::new(generator));

    let record = load_record(args.record_path.as_ref())
        .context("failed to load patient record")?;

    let payload = service.recommend(&record, args.mode).await;
    println!("{}", serde_json::to_string_pretty(&payload)?);

    Ok(())
}
