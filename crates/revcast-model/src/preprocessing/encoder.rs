//! One-hot encoding for the region column.

use super::PreprocessError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Fixed-vocabulary one-hot encoder.
///
/// The vocabulary is the set of labels seen at fit time, kept in sorted
/// order. Labels are matched exactly; a label outside the vocabulary is an
/// error rather than an all-zero row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: Vec<String>,
}

impl OneHotEncoder {
    /// Learn the vocabulary from the given labels.
    pub fn fit<I, S>(labels: I) -> Result<Self, PreprocessError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let categories: BTreeSet<String> = labels
            .into_iter()
            .map(|label| label.as_ref().to_string())
            .collect();
        if categories.is_empty() {
            return Err(PreprocessError::Empty);
        }

        Ok(Self {
            categories: categories.into_iter().collect(),
        })
    }

    /// Vocabulary in encoding order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Width of the encoded vector.
    pub fn n_features(&self) -> usize {
        self.categories.len()
    }

    /// Position of `label` in the vocabulary.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(label))
            .ok()
    }

    /// Encode one label as an indicator vector.
    pub fn transform(&self, label: &str) -> Result<Vec<f64>, PreprocessError> {
        let index = self
            .index_of(label)
            .ok_or_else(|| PreprocessError::UnknownCategory {
                value: label.to_string(),
                known: self.categories.clone(),
            })?;

        let mut encoded = vec![0.0; self.categories.len()];
        encoded[index] = 1.0;
        Ok(encoded)
    }
}
