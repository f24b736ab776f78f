//! CLI subcommands.

pub mod config;
pub mod evaluate;
pub mod inspect;
pub mod predict;

use std::path::{Path, PathBuf};

use flowsentry_core::FlowsConfig;

/// Load configuration from an explicit path, falling back to defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<FlowsConfig> {
    match config_path {
        Some(path) => Ok(FlowsConfig::from_file(Path::new(path))?),
        None => Ok(FlowsConfig::default()),
    }
}

/// Pick the model path from the CLI override or the configuration.
pub fn resolve_model_path(explicit: Option<PathBuf>, config: &FlowsConfig) -> PathBuf {
    explicit.unwrap_or_else(|| config.model_path())
}

/// Reject model paths the runtime cannot open reliably.
///
/// Non-ASCII path characters fail inside the engine on some platforms
/// with an unhelpful diagnostic, so fail early with a clear one.
pub fn validate_model_path(path: &Path) -> anyhow::Result<()> {
    let text = path.to_string_lossy();
    if !text.is_ascii() {
        anyhow::bail!(
            "Model path contains non-ASCII characters: {}. Move the model to an ASCII-only path.",
            text
        );
    }
    Ok(())
}
