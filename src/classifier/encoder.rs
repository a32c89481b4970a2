use std::collections::HashMap;

use ndarray::Array1;
use serde::Deserialize;

use crate::record::{CompanyRecord, FieldValue};

use super::error::InferenceError;

/// Feature-encoding half of the classifier artifact.
///
/// Carries the trained feature schema plus, for every categorical column,
/// the category-to-ordinal mapping fitted by the external training run.
/// Numeric columns have no mapping and pass through unchanged, which is
/// exactly how the training pipeline treated them.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureEncoder {
    /// Feature names in trained column order.
    schema: Vec<String>,
    /// Category codes per categorical column, keyed by column name.
    categories: HashMap<String, HashMap<String, f64>>,
}

impl FeatureEncoder {
    /// Number of features the model expects per record.
    pub fn feature_count(&self) -> usize {
        self.schema.len()
    }

    /// Feature names in trained column order.
    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    /// Encodes one record into the feature vector the trees split on.
    ///
    /// Walks the trained schema in order, so the output layout always
    /// matches training no matter how the record was assembled.
    ///
    /// # Errors
    /// - `SchemaMismatch` if the schema names a field the record lacks
    /// - `UnencodableField` if a text field has no category mapping
    /// - `UnknownCategory` if a value was never seen in training
    pub fn encode(&self, record: &CompanyRecord) -> Result<Array1<f64>, InferenceError> {
        let mut features = Vec::with_capacity(self.schema.len());
        for name in &self.schema {
            let value = record
                .value_of(name)
                .ok_or_else(|| InferenceError::SchemaMismatch(name.clone()))?;
            let encoded = match value {
                FieldValue::Number(number) => number,
                FieldValue::Integer(integer) => integer as f64,
                FieldValue::Text(text) => {
                    let mapping = self
                        .categories
                        .get(name)
                        .ok_or_else(|| InferenceError::UnencodableField(name.clone()))?;
                    *mapping
                        .get(text)
                        .ok_or_else(|| InferenceError::UnknownCategory {
                            field: name.clone(),
                            value: text.to_string(),
                        })?
                }
            };
            features.push(encoded);
        }
        Ok(Array1::from_vec(features))
    }

    /// Checks the deserialized encoder for internal consistency.
    ///
    /// # Errors
    /// Returns `MalformedModel` when the schema is empty or a category
    /// mapping names a column outside the schema.
    pub(crate) fn validate(&self) -> Result<(), InferenceError> {
        if self.schema.is_empty() {
            return Err(InferenceError::MalformedModel(
                "feature schema is empty".to_string(),
            ));
        }
        for column in self.categories.keys() {
            if !self.schema.iter().any(|name| name == column) {
                return Err(InferenceError::MalformedModel(format!(
                    "category mapping for '{}' has no matching schema column",
                    column
                )));
            }
        }
        Ok(())
    }
}
