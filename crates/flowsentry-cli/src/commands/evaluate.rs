//! Evaluate command - score the classifier against labeled samples.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use flowsentry_core::{
    EvaluationReport, FlowClassifier, FlowDataset, InferenceBackend, OrtBackend,
};

use super::{load_config, resolve_model_path, validate_model_path};

/// Arguments for the evaluate command.
#[derive(Args)]
pub struct EvaluateArgs {
    /// CSV file with labeled flow samples (78 features + label per row)
    #[arg(required = true)]
    data: PathBuf,

    /// Model file (overrides config)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Samples per inference call (overrides config; 0 = whole dataset)
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Write a JSON evaluation report
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: EvaluateArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let model_path = resolve_model_path(args.model, &config);
    validate_model_path(&model_path)?;

    let backend = OrtBackend::from_file(&model_path)?;
    let classifier = FlowClassifier::new(backend)?;
    println!(
        "{} Model loaded from {}",
        style("✓").green(),
        model_path.display()
    );

    let dataset = FlowDataset::from_csv(&args.data)?;
    if dataset.skipped() > 0 {
        println!(
            "{} Skipped {} malformed rows",
            style("!").yellow(),
            dataset.skipped()
        );
    }
    if dataset.is_empty() {
        anyhow::bail!("No usable samples in {}", args.data.display());
    }
    println!(
        "{} Loaded {} labeled samples",
        style("ℹ").blue(),
        dataset.len()
    );

    let batch_size = args.batch_size.unwrap_or(config.eval.batch_size);
    let predictions = predict_all(&classifier, dataset.features(), batch_size)?;

    let report = EvaluationReport::from_labels(&predictions, dataset.labels())?;

    println!();
    println!(
        "{} Scored {} samples in {:?}",
        style("✓").green(),
        report.total,
        start.elapsed()
    );
    println!(
        "   {} correct, {} wrong",
        style(report.correct).green(),
        style(report.total - report.correct).red()
    );
    println!("   Accuracy: {:.4}", report.accuracy);

    if let Some(output) = args.output {
        fs::write(&output, serde_json::to_string_pretty(&report)?)?;
        println!(
            "{} Report written to {}",
            style("✓").green(),
            output.display()
        );
    }

    Ok(())
}

fn predict_all<B: InferenceBackend>(
    classifier: &FlowClassifier<B>,
    features: &[Vec<f32>],
    batch_size: usize,
) -> anyhow::Result<Vec<i64>> {
    if batch_size == 0 || batch_size >= features.len() {
        debug!("Predicting {} samples in one call", features.len());
        return Ok(classifier.predict_batch(features)?);
    }

    let pb = ProgressBar::new(features.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} samples")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut predictions = Vec::with_capacity(features.len());
    for chunk in features.chunks(batch_size) {
        predictions.extend(classifier.predict_batch(chunk)?);
        pb.inc(chunk.len() as u64);
    }
    pb.finish_with_message("Complete");

    Ok(predictions)
}
