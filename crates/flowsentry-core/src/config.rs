//! Configuration structures for flowsentry.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the flowsentry pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowsConfig {
    /// Model configuration.
    pub model: ModelConfig,

    /// Evaluation configuration.
    pub eval: EvalConfig,
}

impl Default for FlowsConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            eval: EvalConfig::default(),
        }
    }
}

/// Model file location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Classifier model file name.
    pub model_file: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            model_file: "DecisionTree_CICIDS2017_NetworkAttackDetector_v1.onnx".to_string(),
        }
    }
}

/// Evaluation behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Samples per inference call; 0 runs the whole dataset in one call.
    pub batch_size: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self { batch_size: 0 }
    }
}

impl FlowsConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Full path to the configured model file.
    pub fn model_path(&self) -> PathBuf {
        self.model.model_dir.join(&self.model.model_file)
    }
}
