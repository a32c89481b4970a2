use serde::Deserialize;

use crate::classifier::InferenceError;

/// Decoding interface over a loaded label-decoder artifact.
///
/// Like the classifier side, a decoder artifact may or may not carry each
/// capability; callers probe once after load and fall back gracefully
/// instead of failing a session over a missing method.
pub trait LabelDecode {
    /// Returns the ordered labels the decoder knows, if it carries them.
    fn classes(&self) -> Option<&[String]> {
        None
    }

    /// Returns the inverse-mapping capability, if the artifact supports
    /// turning class identifiers back into labels.
    fn inverse(&self) -> Option<&dyn InverseMap> {
        None
    }
}

/// Inverse mapping from numeric class identifiers to labels.
pub trait InverseMap {
    /// Decodes one raw class identifier into its human-readable label.
    fn label_of(&self, class_id: usize) -> Result<String, InferenceError>;
}

/// The label-decoder artifact: an ordered label list whose positions are
/// the class identifiers the classifier emits.
///
/// Holding the list in class-id order gives both directions of the
/// mapping at once; the forward direction is only used by tests and
/// tooling, but it falls out for free.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelMap {
    classes: Vec<String>,
}

impl LabelMap {
    /// Builds a label map from an ordered label list.
    ///
    /// # Errors
    /// Returns `MalformedModel` when the list is empty or repeats a label.
    pub fn new<S: Into<String>>(classes: Vec<S>) -> Result<Self, InferenceError> {
        let map = Self {
            classes: classes.into_iter().map(Into::into).collect(),
        };
        map.validate()?;
        Ok(map)
    }

    /// Checks a deserialized artifact for internal consistency. Call this
    /// after parsing a `label_encoder.json` by hand; [`LabelMap::new`] and
    /// the asset store already do.
    ///
    /// # Errors
    /// Returns `MalformedModel` when the list is empty or repeats a label.
    pub fn validate(&self) -> Result<(), InferenceError> {
        if self.classes.is_empty() {
            return Err(InferenceError::MalformedModel(
                "label decoder carries no classes".to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for label in &self.classes {
            if !seen.insert(label.as_str()) {
                return Err(InferenceError::MalformedModel(format!(
                    "label decoder repeats label '{}'",
                    label
                )));
            }
        }
        Ok(())
    }

    /// Number of labels the decoder knows.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Forward direction: position of a label in class-id order.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|known| known == label)
    }
}

impl LabelDecode for LabelMap {
    fn classes(&self) -> Option<&[String]> {
        Some(&self.classes)
    }

    fn inverse(&self) -> Option<&dyn InverseMap> {
        Some(self)
    }
}

impl InverseMap for LabelMap {
    fn label_of(&self, class_id: usize) -> Result<String, InferenceError> {
        self.classes
            .get(class_id)
            .cloned()
            .ok_or(InferenceError::UnknownClassId {
                class_id,
                known: self.classes.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale_labels() -> LabelMap {
        LabelMap::new(vec!["Large", "Medium", "Small"]).expect("labels should build")
    }

    #[test]
    fn test_label_of_decodes_in_order() {
        let labels = scale_labels();
        assert_eq!(labels.label_of(0).unwrap(), "Large");
        assert_eq!(labels.label_of(1).unwrap(), "Medium");
        assert_eq!(labels.label_of(2).unwrap(), "Small");
    }

    #[test]
    fn test_label_of_out_of_range() {
        let labels = scale_labels();
        let err = labels.label_of(3).unwrap_err();
        assert_eq!(
            err,
            InferenceError::UnknownClassId {
                class_id: 3,
                known: 3
            }
        );
    }

    #[test]
    fn test_index_of_is_the_inverse() {
        let labels = scale_labels();
        for class_id in 0..labels.class_count() {
            let label = labels.label_of(class_id).unwrap();
            assert_eq!(labels.index_of(&label), Some(class_id));
        }
        assert_eq!(labels.index_of("Tiny"), None);
    }

    #[test]
    fn test_capabilities_are_present() {
        let labels = scale_labels();
        assert!(labels.inverse().is_some());
        assert_eq!(
            LabelDecode::classes(&labels).map(|classes| classes.len()),
            Some(3)
        );
    }

    #[test]
    fn test_rejects_empty_label_list() {
        let result = LabelMap::new(Vec::<String>::new());
        assert!(matches!(result, Err(InferenceError::MalformedModel(_))));
    }

    #[test]
    fn test_rejects_duplicate_labels() {
        let result = LabelMap::new(vec!["Medium", "Medium"]);
        assert!(matches!(result, Err(InferenceError::MalformedModel(_))));
    }

    #[test]
    fn test_deserializes_from_artifact_layout() {
        let labels: LabelMap =
            serde_json::from_str(r#"{"classes": ["Large", "Medium", "Small"]}"#)
                .expect("artifact should deserialize");
        labels.validate().expect("artifact should validate");
        assert_eq!(labels.label_of(1).unwrap(), "Medium");
    }
}
