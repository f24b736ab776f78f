//! Error types for the flowsentry-core library.

use flowsentry_inference::TensorType;
use thiserror::Error;

/// Main error type for the flowsentry library.
#[derive(Error, Debug)]
pub enum FlowsError {
    /// Classification error.
    #[error("classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Dataset loading error.
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Metrics computation error.
    #[error("metrics error: {0}")]
    Metrics(#[from] MetricsError),

    /// Inference error from the inference layer.
    #[error("inference error: {0}")]
    Inference(#[from] flowsentry_inference::InferenceError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while classifying flow samples.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The model declares no input slots.
    #[error("model declares no input tensors")]
    NoInputs,

    /// The model declares no output slots.
    #[error("model declares no output tensors")]
    NoOutputs,

    /// Input element count disagrees with the resolved input shape.
    #[error("input has {actual} values but the model expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// The first batch sample does not have the required feature count.
    #[error("expected {expected} features, got {got}")]
    FeatureCount { expected: usize, got: usize },

    /// A batch sample diverges from the first sample's feature count.
    #[error("sample {index} has {got} features, batch started with {expected}")]
    RaggedBatch {
        index: usize,
        expected: usize,
        got: usize,
    },

    /// More than one dynamic dimension in the declared input shape.
    #[error("input shape {shape:?} leaves a dynamic dimension unresolved after the batch axis")]
    UnresolvedDim { shape: Vec<i64> },

    /// The engine returned no output tensors.
    #[error("model produced no outputs")]
    MissingOutput,

    /// The first output tensor is not integer-typed.
    #[error("output '{output}' is {dtype:?}, expected integer labels")]
    LabelType { output: String, dtype: TensorType },

    /// Inference error from the inference layer.
    #[error("inference error: {0}")]
    Inference(#[from] flowsentry_inference::InferenceError),
}

/// Errors raised while loading flow samples from disk.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Failed to open or read the CSV file.
    #[error("failed to read dataset: {0}")]
    Read(#[from] csv::Error),

    /// A field could not be parsed as a number.
    #[error("line {line}: cannot parse '{value}' as a number")]
    Parse { line: usize, value: String },
}

/// Errors raised while scoring predictions.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Predictions and labels differ in length.
    #[error("prediction count {predicted} does not match label count {actual}")]
    LengthMismatch { predicted: usize, actual: usize },

    /// No samples to score.
    #[error("no samples to score")]
    Empty,
}

/// Result type for the flowsentry library.
pub type Result<T> = std::result::Result<T, FlowsError>;
