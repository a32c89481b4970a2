use std::fmt;

/// Represents the different faults that can occur while encoding a record
/// or running the loaded model artifacts.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// A categorical field held a value the artifact never saw in training
    UnknownCategory { field: String, value: String },
    /// A text field has no category mapping in the artifact at all
    UnencodableField(String),
    /// The trained schema names a field the record does not carry
    SchemaMismatch(String),
    /// A probability vector did not line up with the known class labels
    ShapeMismatch { expected: usize, actual: usize },
    /// A raw class identifier fell outside the decoder's label range
    UnknownClassId { class_id: usize, known: usize },
    /// The artifact's internal structure is unusable for inference
    MalformedModel(String),
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCategory { field, value } => write!(
                f,
                "Unknown category: value '{}' for field '{}' was never seen in training",
                value, field
            ),
            Self::UnencodableField(field) => write!(
                f,
                "Unencodable field: '{}' is text but the model carries no category mapping for it",
                field
            ),
            Self::SchemaMismatch(field) => write!(
                f,
                "Schema mismatch: trained schema names unknown field '{}'",
                field
            ),
            Self::ShapeMismatch { expected, actual } => write!(
                f,
                "Shape mismatch: probability vector has {} entries but {} class labels are known",
                actual, expected
            ),
            Self::UnknownClassId { class_id, known } => write!(
                f,
                "Unknown class id: {} is outside the decoder's {} known labels",
                class_id, known
            ),
            Self::MalformedModel(msg) => write!(f, "Malformed model: {}", msg),
        }
    }
}

impl std::error::Error for InferenceError {}
