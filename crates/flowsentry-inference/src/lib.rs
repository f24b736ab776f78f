//! ONNX inference abstraction layer for flowsentry.
//!
//! This crate wraps ONNX Runtime (via `ort`) behind a small trait so the
//! classification layer can run against a synthetic backend in tests. A
//! loaded model exposes its input and output tensor slots as ordered
//! (name, shape) records; dynamic dimensions are reported as `-1` and
//! resolved by the caller per inference call.

mod backend;
mod error;
mod slot;
mod tensor;

pub use backend::ort::OrtBackend;
pub use backend::InferenceBackend;
pub use error::InferenceError;
pub use slot::TensorSlot;
pub use tensor::{InputTensor, OutputTensor, TensorType};

/// Result type for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
