//! CSV loading for labeled and unlabeled flow samples.

use std::path::Path;

use csv::ReaderBuilder;
use tracing::warn;

use crate::classifier::FLOW_FEATURE_COUNT;
use crate::error::DatasetError;

/// Labeled flow samples loaded from disk.
#[derive(Debug, Clone, Default)]
pub struct FlowDataset {
    features: Vec<Vec<f32>>,
    labels: Vec<i64>,
    skipped: usize,
}

impl FlowDataset {
    /// Load labeled samples from a CSV file.
    ///
    /// A usable row holds 78 feature values followed by one numeric label.
    /// Rows with any other field count are skipped with a diagnostic; a
    /// field that fails to parse as a number is fatal. The label may be
    /// written as a float (training exports often do) and is truncated to
    /// an integer.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path.as_ref())?;

        let mut features = Vec::new();
        let mut labels = Vec::new();
        let mut skipped = 0usize;

        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let line = index + 1;

            if record.len() != FLOW_FEATURE_COUNT + 1 {
                warn!(
                    "line {}: expected {} fields, got {} - skipping",
                    line,
                    FLOW_FEATURE_COUNT + 1,
                    record.len()
                );
                skipped += 1;
                continue;
            }

            let mut values = Vec::with_capacity(record.len());
            for field in record.iter() {
                values.push(parse_field(field, line)?);
            }

            // The trailing value is the ground-truth label.
            if let Some(label) = values.pop() {
                features.push(values);
                labels.push(label as i64);
            }
        }

        Ok(Self {
            features,
            labels,
            skipped,
        })
    }

    /// The feature vectors, one per usable row.
    pub fn features(&self) -> &[Vec<f32>] {
        &self.features
    }

    /// The ground-truth labels, aligned with [`features`](Self::features).
    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    /// Number of usable samples.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether no usable samples were loaded.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Number of rows skipped for a wrong field count.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Read unlabeled feature rows from a CSV file.
///
/// Rows must hold exactly 78 feature values; others are skipped with a
/// diagnostic, mirroring [`FlowDataset::from_csv`].
pub fn read_feature_rows<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<f32>>, DatasetError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path.as_ref())?;

    let mut rows = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let line = index + 1;

        if record.len() != FLOW_FEATURE_COUNT {
            warn!(
                "line {}: expected {} fields, got {} - skipping",
                line,
                FLOW_FEATURE_COUNT,
                record.len()
            );
            continue;
        }

        let mut values = Vec::with_capacity(record.len());
        for field in record.iter() {
            values.push(parse_field(field, line)?);
        }
        rows.push(values);
    }

    Ok(rows)
}

fn parse_field(value: &str, line: usize) -> Result<f32, DatasetError> {
    value.trim().parse::<f32>().map_err(|_| DatasetError::Parse {
        line,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    fn labeled_row(feature: f32, label: &str) -> String {
        let mut fields: Vec<String> = vec![feature.to_string(); FLOW_FEATURE_COUNT];
        fields.push(label.to_string());
        fields.join(",")
    }

    fn write_csv(lines: &[String]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_from_csv_loads_labeled_rows() {
        let file = write_csv(&[labeled_row(0.5, "0"), labeled_row(1.5, "1")]);

        let dataset = FlowDataset::from_csv(file.path()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.labels(), &[0, 1]);
        assert_eq!(dataset.features()[0].len(), FLOW_FEATURE_COUNT);
        assert_eq!(dataset.skipped(), 0);
    }

    #[test]
    fn test_from_csv_skips_wrong_field_count() {
        let file = write_csv(&[
            labeled_row(0.0, "0"),
            "1.0,2.0,3.0".to_string(),
            labeled_row(0.0, "1"),
        ]);

        let dataset = FlowDataset::from_csv(file.path()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.skipped(), 1);
    }

    #[test]
    fn test_from_csv_truncates_float_labels() {
        let file = write_csv(&[labeled_row(0.0, "1.0")]);

        let dataset = FlowDataset::from_csv(file.path()).unwrap();

        assert_eq!(dataset.labels(), &[1]);
    }

    #[test]
    fn test_from_csv_rejects_non_numeric_field() {
        let file = write_csv(&[labeled_row(0.0, "bogus")]);

        let err = FlowDataset::from_csv(file.path()).unwrap_err();

        assert!(matches!(err, DatasetError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_read_feature_rows_unlabeled() {
        let row = vec!["2.5".to_string(); FLOW_FEATURE_COUNT].join(",");
        let file = write_csv(&[row, "1,2,3".to_string()]);

        let rows = read_feature_rows(file.path()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), FLOW_FEATURE_COUNT);
    }
}
