//! Named tensor slots captured from a loaded model.

/// One declared model input or output: its name and tensor shape.
///
/// Shapes are recorded in declaration order as `i64` dimensions, with `-1`
/// marking a dimension left dynamic by the model (typically the batch
/// axis). Slots are captured once at load time and never mutated; callers
/// copy the shape and specialize the dynamic dimensions per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorSlot {
    name: String,
    shape: Vec<i64>,
}

impl TensorSlot {
    /// Create a slot from a name and declared shape.
    pub fn new(name: impl Into<String>, shape: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }

    /// The slot's name as declared by the model.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared shape, `-1` for dynamic dimensions.
    pub fn shape(&self) -> &[i64] {
        &self.shape
    }

    /// Whether any dimension is dynamic.
    pub fn is_dynamic(&self) -> bool {
        self.shape.iter().any(|&d| d < 0)
    }
}

impl std::fmt::Display for TensorSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:?}", self.name, self.shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_detection() {
        let slot = TensorSlot::new("float_input", vec![-1, 78]);
        assert!(slot.is_dynamic());

        let fixed = TensorSlot::new("float_input", vec![1, 78]);
        assert!(!fixed.is_dynamic());
    }

    #[test]
    fn test_display() {
        let slot = TensorSlot::new("label", vec![-1]);
        assert_eq!(slot.to_string(), "label: [-1]");
    }
}
