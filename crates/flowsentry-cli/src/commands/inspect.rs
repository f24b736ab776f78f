//! Inspect command - show a model's declared tensor slots.

use std::path::PathBuf;

use clap::Args;
use console::style;

use flowsentry_core::{InferenceBackend, OrtBackend};

use super::{load_config, resolve_model_path, validate_model_path};

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Model file (overrides config)
    #[arg(short, long)]
    model: Option<PathBuf>,
}

pub fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let model_path = resolve_model_path(args.model, &config);
    validate_model_path(&model_path)?;

    let backend = OrtBackend::from_file(&model_path)?;

    println!("{} {}", style("Model:").bold(), model_path.display());
    println!();
    println!("{}", style("Inputs:").bold());
    for slot in backend.inputs() {
        println!("  {}", slot);
    }
    println!();
    println!("{}", style("Outputs:").bold());
    for slot in backend.outputs() {
        println!("  {}", slot);
    }

    Ok(())
}
