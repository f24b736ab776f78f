//! Flow classification through a loaded model.

use tracing::debug;

use flowsentry_inference::{InferenceBackend, InputTensor, OutputTensor};

use crate::error::ClassifierError;

/// Number of features in one network-flow sample (CICIDS2017 layout).
pub const FLOW_FEATURE_COUNT: usize = 78;

/// Classifier adapter over a loaded model.
///
/// Every predict call binds the model's first declared input slot and
/// reads the first output tensor as integer labels. Construction checks
/// that the model declares at least one input and one output, so a
/// classifier in hand is always usable; the backend itself can only be
/// obtained through a successful load.
#[derive(Debug)]
pub struct FlowClassifier<B: InferenceBackend> {
    backend: B,
}

impl<B: InferenceBackend> FlowClassifier<B> {
    /// Wrap a loaded backend, checking its slot declarations.
    pub fn new(backend: B) -> Result<Self, ClassifierError> {
        if backend.inputs().is_empty() {
            return Err(ClassifierError::NoInputs);
        }
        if backend.outputs().is_empty() {
            return Err(ClassifierError::NoOutputs);
        }
        Ok(Self { backend })
    }

    /// Classify a single flow sample.
    ///
    /// The vector length must equal the element count of the input shape
    /// with every dynamic dimension resolved to 1. Returns the labels the
    /// model produced, normally one.
    pub fn predict(&self, features: &[f32]) -> Result<Vec<i64>, ClassifierError> {
        let slot = self
            .backend
            .inputs()
            .first()
            .ok_or(ClassifierError::NoInputs)?;

        let resolved = resolve_single(slot.shape());
        let expected: usize = resolved.iter().product();
        if features.len() != expected {
            return Err(ClassifierError::ShapeMismatch {
                expected,
                actual: features.len(),
            });
        }

        debug!("Single-sample inference on slot '{}'", slot.name());

        let tensor = InputTensor::from_f32(features.to_vec(), resolved)?;
        let outputs = self.backend.run(&[(slot.name(), tensor)])?;

        labels_from_outputs(outputs)
    }

    /// Classify a batch of flow samples in one inference call.
    ///
    /// Every sample must have exactly [`FLOW_FEATURE_COUNT`] features.
    /// Labels come back in batch order; an empty batch yields an empty
    /// result without touching the engine.
    pub fn predict_batch(&self, batch: &[Vec<f32>]) -> Result<Vec<i64>, ClassifierError> {
        let Some(first) = batch.first() else {
            return Ok(Vec::new());
        };

        let slot = self
            .backend
            .inputs()
            .first()
            .ok_or(ClassifierError::NoInputs)?;

        let resolved = resolve_batch(slot.shape(), batch.len())?;

        let width = first.len();
        if width != FLOW_FEATURE_COUNT {
            return Err(ClassifierError::FeatureCount {
                expected: FLOW_FEATURE_COUNT,
                got: width,
            });
        }
        for (index, sample) in batch.iter().enumerate().skip(1) {
            if sample.len() != width {
                return Err(ClassifierError::RaggedBatch {
                    index,
                    expected: width,
                    got: sample.len(),
                });
            }
        }

        // Row-major: sample 0's features, then sample 1's, and so on.
        let mut flat = Vec::with_capacity(batch.len() * width);
        for sample in batch {
            flat.extend_from_slice(sample);
        }

        let expected: usize = resolved.iter().product();
        if flat.len() != expected {
            return Err(ClassifierError::ShapeMismatch {
                expected,
                actual: flat.len(),
            });
        }

        debug!(
            "Batched inference: {} samples on slot '{}'",
            batch.len(),
            slot.name()
        );

        let tensor = InputTensor::from_f32(flat, resolved)?;
        let outputs = self.backend.run(&[(slot.name(), tensor)])?;

        labels_from_outputs(outputs)
    }
}

/// Resolve a declared shape for one sample: every dynamic dimension
/// becomes 1.
fn resolve_single(shape: &[i64]) -> Vec<usize> {
    shape
        .iter()
        .map(|&dim| if dim < 0 { 1 } else { dim as usize })
        .collect()
}

/// Resolve a declared shape for a batch: the first dynamic dimension in
/// declaration order becomes the batch size. A second dynamic dimension
/// is an error; this layer only understands a single batch axis.
fn resolve_batch(shape: &[i64], batch_size: usize) -> Result<Vec<usize>, ClassifierError> {
    let mut resolved = Vec::with_capacity(shape.len());
    let mut substituted = false;

    for &dim in shape {
        if dim < 0 {
            if substituted {
                return Err(ClassifierError::UnresolvedDim {
                    shape: shape.to_vec(),
                });
            }
            resolved.push(batch_size);
            substituted = true;
        } else {
            resolved.push(dim as usize);
        }
    }

    Ok(resolved)
}

/// Read the first output tensor as integer labels.
///
/// i64 is the native label type; i32 is widened. Anything else means the
/// model was exported with a non-label first output.
fn labels_from_outputs(
    outputs: Vec<(String, OutputTensor)>,
) -> Result<Vec<i64>, ClassifierError> {
    let (name, tensor) = outputs
        .into_iter()
        .next()
        .ok_or(ClassifierError::MissingOutput)?;

    match tensor {
        OutputTensor::Int64(arr) => Ok(arr.iter().copied().collect()),
        OutputTensor::Int32(arr) => Ok(arr.iter().map(|&v| i64::from(v)).collect()),
        other => Err(ClassifierError::LabelType {
            output: name,
            dtype: other.dtype(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use flowsentry_inference::{InferenceError, TensorSlot};
    use ndarray::{ArrayD, IxDyn};
    use pretty_assertions::assert_eq;

    /// Label type the stub emits for each batch row.
    #[derive(Clone, Copy, Debug)]
    enum StubLabels {
        Int64,
        Int32,
        Float32,
    }

    /// Backend double that records received input shapes and labels each
    /// sample with its batch index.
    #[derive(Debug)]
    struct StubBackend {
        inputs: Vec<TensorSlot>,
        outputs: Vec<TensorSlot>,
        calls: Mutex<Vec<Vec<usize>>>,
        labels: StubLabels,
        fail: bool,
    }

    impl StubBackend {
        fn with_input_shape(shape: Vec<i64>) -> Self {
            Self {
                inputs: vec![TensorSlot::new("float_input", shape)],
                outputs: vec![TensorSlot::new("label", vec![-1])],
                calls: Mutex::new(Vec::new()),
                labels: StubLabels::Int64,
                fail: false,
            }
        }

        fn classifier_like() -> Self {
            Self::with_input_shape(vec![-1, 78])
        }

        fn emitting(labels: StubLabels) -> Self {
            Self {
                labels,
                ..Self::classifier_like()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::classifier_like()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn last_shape(&self) -> Vec<usize> {
            self.calls.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl InferenceBackend for StubBackend {
        fn run(
            &self,
            inputs: &[(&str, InputTensor)],
        ) -> flowsentry_inference::Result<Vec<(String, OutputTensor)>> {
            if self.fail {
                return Err(InferenceError::InferenceFailed("synthetic failure".into()));
            }

            let (_, tensor) = &inputs[0];
            let shape = tensor.shape().to_vec();
            self.calls.lock().unwrap().push(shape.clone());

            let rows = shape.first().copied().unwrap_or(1);
            let output = match self.labels {
                StubLabels::Int64 => OutputTensor::Int64(
                    ArrayD::from_shape_vec(IxDyn(&[rows]), (0..rows as i64).collect()).unwrap(),
                ),
                StubLabels::Int32 => OutputTensor::Int32(
                    ArrayD::from_shape_vec(IxDyn(&[rows]), (0..rows as i32).collect()).unwrap(),
                ),
                StubLabels::Float32 => OutputTensor::Float32(
                    ArrayD::from_shape_vec(IxDyn(&[rows]), vec![0.5; rows]).unwrap(),
                ),
            };

            Ok(vec![("label".to_string(), output)])
        }

        fn inputs(&self) -> &[TensorSlot] {
            &self.inputs
        }

        fn outputs(&self) -> &[TensorSlot] {
            &self.outputs
        }
    }

    #[test]
    fn test_single_predict_resolves_to_batch_one() {
        let classifier = FlowClassifier::new(StubBackend::classifier_like()).unwrap();

        let labels = classifier.predict(&vec![0.0; 78]).unwrap();

        assert_eq!(labels, vec![0]);
        assert_eq!(classifier.backend.last_shape(), vec![1, 78]);
    }

    #[test]
    fn test_single_predict_wrong_length_never_runs_engine() {
        let classifier = FlowClassifier::new(StubBackend::classifier_like()).unwrap();

        let err = classifier.predict(&vec![0.0; 77]).unwrap_err();

        assert!(matches!(
            err,
            ClassifierError::ShapeMismatch {
                expected: 78,
                actual: 77
            }
        ));
        assert_eq!(classifier.backend.call_count(), 0);
    }

    #[test]
    fn test_batch_predict_preserves_order() {
        let classifier = FlowClassifier::new(StubBackend::classifier_like()).unwrap();
        let batch = vec![vec![0.0; 78]; 4];

        let labels = classifier.predict_batch(&batch).unwrap();

        assert_eq!(labels, vec![0, 1, 2, 3]);
        assert_eq!(classifier.backend.last_shape(), vec![4, 78]);
    }

    #[test]
    fn test_batch_feature_count_error() {
        let classifier = FlowClassifier::new(StubBackend::classifier_like()).unwrap();
        let batch = vec![vec![0.0; 77]];

        let err = classifier.predict_batch(&batch).unwrap_err();

        assert_eq!(err.to_string(), "expected 78 features, got 77");
        assert_eq!(classifier.backend.call_count(), 0);
    }

    #[test]
    fn test_batch_ragged_error() {
        let classifier = FlowClassifier::new(StubBackend::classifier_like()).unwrap();
        let batch = vec![vec![0.0; 78], vec![0.0; 80]];

        let err = classifier.predict_batch(&batch).unwrap_err();

        assert!(matches!(
            err,
            ClassifierError::RaggedBatch {
                index: 1,
                expected: 78,
                got: 80
            }
        ));
        assert_eq!(classifier.backend.call_count(), 0);
    }

    #[test]
    fn test_empty_batch_short_circuits() {
        let classifier = FlowClassifier::new(StubBackend::classifier_like()).unwrap();

        let labels = classifier.predict_batch(&[]).unwrap();

        assert!(labels.is_empty());
        assert_eq!(classifier.backend.call_count(), 0);
    }

    #[test]
    fn test_repeated_predict_is_idempotent() {
        let classifier = FlowClassifier::new(StubBackend::classifier_like()).unwrap();
        let batch = vec![vec![1.5; 78]; 3];

        let first = classifier.predict_batch(&batch).unwrap();
        let second = classifier.predict_batch(&batch).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_fixed_batch_model_rejects_larger_batch() {
        let classifier =
            FlowClassifier::new(StubBackend::with_input_shape(vec![1, 78])).unwrap();
        let batch = vec![vec![0.0; 78]; 4];

        let err = classifier.predict_batch(&batch).unwrap_err();

        assert!(matches!(
            err,
            ClassifierError::ShapeMismatch {
                expected: 78,
                actual: 312
            }
        ));
        assert_eq!(classifier.backend.call_count(), 0);
    }

    #[test]
    fn test_second_dynamic_dimension_is_rejected() {
        let classifier =
            FlowClassifier::new(StubBackend::with_input_shape(vec![-1, -1, 78])).unwrap();
        let batch = vec![vec![0.0; 78]; 2];

        let err = classifier.predict_batch(&batch).unwrap_err();

        assert!(matches!(err, ClassifierError::UnresolvedDim { .. }));
    }

    #[test]
    fn test_engine_failure_propagates() {
        let classifier = FlowClassifier::new(StubBackend::failing()).unwrap();

        let err = classifier.predict(&vec![0.0; 78]).unwrap_err();

        assert!(matches!(err, ClassifierError::Inference(_)));
        assert!(err.to_string().contains("synthetic failure"));
    }

    #[test]
    fn test_int32_labels_are_widened() {
        let classifier =
            FlowClassifier::new(StubBackend::emitting(StubLabels::Int32)).unwrap();
        let batch = vec![vec![0.0; 78]; 2];

        let labels = classifier.predict_batch(&batch).unwrap();

        assert_eq!(labels, vec![0i64, 1]);
    }

    #[test]
    fn test_float_labels_are_rejected() {
        let classifier =
            FlowClassifier::new(StubBackend::emitting(StubLabels::Float32)).unwrap();

        let err = classifier.predict(&vec![0.0; 78]).unwrap_err();

        assert!(matches!(err, ClassifierError::LabelType { .. }));
    }

    #[test]
    fn test_new_requires_declared_slots() {
        let mut backend = StubBackend::classifier_like();
        backend.inputs.clear();
        assert!(matches!(
            FlowClassifier::new(backend).unwrap_err(),
            ClassifierError::NoInputs
        ));

        let mut backend = StubBackend::classifier_like();
        backend.outputs.clear();
        assert!(matches!(
            FlowClassifier::new(backend).unwrap_err(),
            ClassifierError::NoOutputs
        ));
    }

    #[test]
    fn test_resolve_single_replaces_all_dynamic_dims() {
        assert_eq!(resolve_single(&[-1, 78]), vec![1, 78]);
        assert_eq!(resolve_single(&[-1, -1, 3]), vec![1, 1, 3]);
        assert_eq!(resolve_single(&[2, 5]), vec![2, 5]);
    }

    #[test]
    fn test_resolve_batch_replaces_first_dynamic_dim() {
        assert_eq!(resolve_batch(&[-1, 78], 4).unwrap(), vec![4, 78]);
        assert_eq!(resolve_batch(&[1, 78], 4).unwrap(), vec![1, 78]);
        assert!(resolve_batch(&[-1, -1], 4).is_err());
    }
}
