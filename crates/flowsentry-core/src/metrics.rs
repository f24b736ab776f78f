//! Evaluation metrics for predicted labels.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::MetricsError;

/// Aggregate result of scoring predictions against ground truth.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    /// Number of samples scored.
    pub total: usize,

    /// Predictions matching the ground-truth label.
    pub correct: usize,

    /// Fraction of correct predictions.
    pub accuracy: f32,
}

impl EvaluationReport {
    /// Score predictions against ground-truth labels positionally.
    ///
    /// Alignment is by position, so both sequences must have the same
    /// length and at least one sample.
    pub fn from_labels(predicted: &[i64], actual: &[i64]) -> Result<Self, MetricsError> {
        if predicted.len() != actual.len() {
            return Err(MetricsError::LengthMismatch {
                predicted: predicted.len(),
                actual: actual.len(),
            });
        }
        if predicted.is_empty() {
            return Err(MetricsError::Empty);
        }

        let total = predicted.len();
        let correct = predicted
            .iter()
            .zip(actual)
            .filter(|(p, a)| p == a)
            .count();

        Ok(Self {
            total,
            correct,
            accuracy: correct as f32 / total as f32,
        })
    }
}

/// Count occurrences of each label, in ascending label order.
pub fn label_distribution(labels: &[i64]) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for &label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_accuracy() {
        let report = EvaluationReport::from_labels(&[0, 1, 1, 0], &[0, 1, 0, 0]).unwrap();

        assert_eq!(report.total, 4);
        assert_eq!(report.correct, 3);
        assert_eq!(report.accuracy, 0.75);
    }

    #[test]
    fn test_length_mismatch() {
        let err = EvaluationReport::from_labels(&[0, 1], &[0]).unwrap_err();

        assert!(matches!(
            err,
            MetricsError::LengthMismatch {
                predicted: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_empty_sets_are_rejected() {
        let err = EvaluationReport::from_labels(&[], &[]).unwrap_err();

        assert!(matches!(err, MetricsError::Empty));
    }

    #[test]
    fn test_label_distribution_is_ordered() {
        let counts = label_distribution(&[2, 0, 0, 1, 0]);

        let entries: Vec<(i64, usize)> = counts.into_iter().collect();
        assert_eq!(entries, vec![(0, 3), (1, 1), (2, 1)]);
    }
}
