//! Predict command - classify unlabeled flow samples.

use std::path::PathBuf;

use clap::Args;
use console::style;

use flowsentry_core::{label_distribution, read_feature_rows, FlowClassifier, OrtBackend};

use super::{load_config, resolve_model_path, validate_model_path};

/// Arguments for the predict command.
#[derive(Args)]
pub struct PredictArgs {
    /// CSV file with unlabeled flow samples (78 fields per row)
    #[arg(required = true)]
    data: PathBuf,

    /// Model file (overrides config)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Write labels as CSV instead of printing them
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: PredictArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let model_path = resolve_model_path(args.model, &config);
    validate_model_path(&model_path)?;

    let backend = OrtBackend::from_file(&model_path)?;
    let classifier = FlowClassifier::new(backend)?;

    let rows = read_feature_rows(&args.data)?;
    if rows.is_empty() {
        anyhow::bail!("No usable samples in {}", args.data.display());
    }

    let labels = classifier.predict_batch(&rows)?;

    match args.output {
        Some(path) => {
            let mut wtr = csv::Writer::from_path(&path)?;
            wtr.write_record(["sample", "label"])?;
            for (index, label) in labels.iter().enumerate() {
                wtr.write_record([index.to_string(), label.to_string()])?;
            }
            wtr.flush()?;
            println!(
                "{} Labels written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => {
            for label in &labels {
                println!("{}", label);
            }
        }
    }

    println!();
    println!("{} Classified {} samples", style("✓").green(), labels.len());
    for (label, count) in label_distribution(&labels) {
        println!("   label {}: {}", label, count);
    }

    Ok(())
}
