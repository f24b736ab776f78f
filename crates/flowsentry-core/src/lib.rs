//! Core library for network-flow attack detection.
//!
//! This crate provides:
//! - A classifier adapter binding flow feature vectors to a loaded ONNX model
//! - CSV dataset loading for labeled and unlabeled flow samples
//! - Evaluation metrics (accuracy against ground-truth labels)
//! - Configuration for model location and evaluation batching

pub mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod metrics;

pub use classifier::{FlowClassifier, FLOW_FEATURE_COUNT};
pub use config::{EvalConfig, FlowsConfig, ModelConfig};
pub use dataset::{read_feature_rows, FlowDataset};
pub use error::{ClassifierError, DatasetError, FlowsError, MetricsError, Result};
pub use metrics::{label_distribution, EvaluationReport};

/// Re-export inference types.
pub use flowsentry_inference::{
    InferenceBackend, InputTensor, OrtBackend, OutputTensor, TensorSlot,
};
