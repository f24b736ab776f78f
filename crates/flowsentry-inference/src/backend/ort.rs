//! ONNX Runtime (ort) backend with XNNPACK.

use std::path::Path;
use std::sync::{Mutex, OnceLock};

use ndarray::ArrayD;
use ort::ep::XNNPACK;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, ValueType};
use tracing::{debug, info};

use crate::error::InferenceError;
use crate::slot::TensorSlot;
use crate::tensor::{InputTensor, OutputTensor};
use crate::{InferenceBackend, Result};

/// Label identifying this subsystem in ONNX Runtime logs.
const ENVIRONMENT_NAME: &str = "flowsentry";

/// Backend executing a serialized model through ONNX Runtime.
///
/// Owns the session and the slot metadata enumerated at load time; both
/// are released when the backend is dropped. `run` serializes access to
/// the session internally, so shared references are safe to use.
pub struct OrtBackend {
    session: Mutex<Session>,
    inputs: Vec<TensorSlot>,
    outputs: Vec<TensorSlot>,
}

impl OrtBackend {
    /// Load a model from a file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading ONNX model from: {}", path.display());

        let bytes = std::fs::read(path).map_err(InferenceError::Io)?;

        Self::from_bytes_internal(&bytes)
    }

    /// Load a model from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_internal(bytes)
    }

    fn from_bytes_internal(bytes: &[u8]) -> Result<Self> {
        init_environment()?;

        debug!("Loading ONNX model from {} bytes", bytes.len());

        let session = Session::builder()
            .map_err(|e| InferenceError::SessionCreate(e.to_string()))?
            .with_execution_providers([XNNPACK::default().build()])
            .map_err(|e| InferenceError::SessionCreate(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::SessionCreate(e.to_string()))?
            .with_intra_threads(4)
            .map_err(|e| InferenceError::SessionCreate(e.to_string()))?
            .commit_from_memory(bytes)
            .map_err(|e| InferenceError::ModelLoad(e.to_string()))?;

        let inputs: Vec<TensorSlot> = session
            .inputs()
            .iter()
            .map(|input| {
                let name = input.name().to_string();
                match input.dtype() {
                    ValueType::Tensor { shape, .. } => {
                        Ok(TensorSlot::new(name, shape.iter().copied().collect()))
                    }
                    other => Err(InferenceError::Metadata(format!(
                        "input '{name}' is not a tensor: {other:?}"
                    ))),
                }
            })
            .collect::<Result<_>>()?;

        let outputs: Vec<TensorSlot> = session
            .outputs()
            .iter()
            .map(|output| {
                let name = output.name().to_string();
                match output.dtype() {
                    ValueType::Tensor { shape, .. } => {
                        Ok(TensorSlot::new(name, shape.iter().copied().collect()))
                    }
                    other => Err(InferenceError::Metadata(format!(
                        "output '{name}' is not a tensor: {other:?}"
                    ))),
                }
            })
            .collect::<Result<_>>()?;

        debug!("Model inputs: {:?}", inputs);
        debug!("Model outputs: {:?}", outputs);
        info!(
            "Model loaded: {} inputs, {} outputs",
            inputs.len(),
            outputs.len()
        );

        Ok(Self {
            session: Mutex::new(session),
            inputs,
            outputs,
        })
    }

    fn convert_input(&self, tensor: &InputTensor) -> Result<ort::session::SessionInputValue<'static>> {
        match tensor {
            InputTensor::Float32(arr) => {
                let shape: Vec<i64> = arr.shape().iter().map(|&s| s as i64).collect();
                let data: Vec<f32> = arr.iter().cloned().collect();
                Tensor::from_array((shape, data))
                    .map(Into::into)
                    .map_err(|e| InferenceError::InvalidInput(e.to_string()))
            }
            InputTensor::Int32(arr) => {
                let shape: Vec<i64> = arr.shape().iter().map(|&s| s as i64).collect();
                let data: Vec<i32> = arr.iter().cloned().collect();
                Tensor::from_array((shape, data))
                    .map(Into::into)
                    .map_err(|e| InferenceError::InvalidInput(e.to_string()))
            }
            InputTensor::Int64(arr) => {
                let shape: Vec<i64> = arr.shape().iter().map(|&s| s as i64).collect();
                let data: Vec<i64> = arr.iter().cloned().collect();
                Tensor::from_array((shape, data))
                    .map(Into::into)
                    .map_err(|e| InferenceError::InvalidInput(e.to_string()))
            }
        }
    }
}

impl InferenceBackend for OrtBackend {
    fn run(&self, inputs: &[(&str, InputTensor)]) -> Result<Vec<(String, OutputTensor)>> {
        let ort_inputs: Vec<(&str, ort::session::SessionInputValue<'static>)> = inputs
            .iter()
            .map(|(name, tensor)| {
                let value = self.convert_input(tensor)?;
                Ok((*name, value))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| InferenceError::InferenceFailed(format!("Failed to lock session: {}", e)))?;

        let outputs = session
            .run(ort_inputs)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let mut results = Vec::with_capacity(outputs.len());

        for (name, value) in outputs.iter() {
            let tensor = if let Ok(tensor_ref) = value.try_extract_tensor::<i64>() {
                let (shape_ref, data) = tensor_ref;
                let shape: Vec<usize> = shape_ref.iter().map(|&s| s as usize).collect();
                let arr = ArrayD::from_shape_vec(ndarray::IxDyn(&shape), data.to_vec())
                    .map_err(|e| InferenceError::OutputExtraction(e.to_string()))?;
                OutputTensor::Int64(arr)
            } else if let Ok(tensor_ref) = value.try_extract_tensor::<i32>() {
                let (shape_ref, data) = tensor_ref;
                let shape: Vec<usize> = shape_ref.iter().map(|&s| s as usize).collect();
                let arr = ArrayD::from_shape_vec(ndarray::IxDyn(&shape), data.to_vec())
                    .map_err(|e| InferenceError::OutputExtraction(e.to_string()))?;
                OutputTensor::Int32(arr)
            } else if let Ok(tensor_ref) = value.try_extract_tensor::<f32>() {
                let (shape_ref, data) = tensor_ref;
                let shape: Vec<usize> = shape_ref.iter().map(|&s| s as usize).collect();
                let arr = ArrayD::from_shape_vec(ndarray::IxDyn(&shape), data.to_vec())
                    .map_err(|e| InferenceError::OutputExtraction(e.to_string()))?;
                OutputTensor::Float32(arr)
            } else {
                return Err(InferenceError::OutputExtraction(format!(
                    "unsupported output type for '{}'",
                    name
                )));
            };

            results.push((name.to_string(), tensor));
        }

        Ok(results)
    }

    fn inputs(&self) -> &[TensorSlot] {
        &self.inputs
    }

    fn outputs(&self) -> &[TensorSlot] {
        &self.outputs
    }
}

/// Initialize the process-wide ONNX Runtime environment once.
///
/// Engine log records are forwarded through `tracing`; the subscriber's
/// level filter decides what is emitted (the CLI defaults to WARN).
fn init_environment() -> Result<()> {
    static INIT: OnceLock<std::result::Result<(), String>> = OnceLock::new();

    INIT.get_or_init(|| {
        ort::init().with_name(ENVIRONMENT_NAME).commit();
        Ok(())
    })
    .clone()
    .map_err(InferenceError::Environment)
}
