use crate::record::CompanyRecord;

use super::error::InferenceError;

/// Raw output of a classifier artifact for a single record.
///
/// Artifacts exported from different training runs do not agree on what a
/// prediction looks like: most emit a numeric class identifier that still
/// needs decoding, but some carry their label set inline and emit the
/// final string directly. Downstream code has to handle both.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPrediction {
    /// A numeric class identifier that still needs decoding.
    ClassId(usize),
    /// An already human-readable label, no decode step required.
    Label(String),
}

/// Inference interface over a loaded classifier artifact.
///
/// Only [`predict`](Classify::predict) is guaranteed; everything else is
/// an optional capability the artifact may or may not carry. Callers are
/// expected to probe the accessors once after load and adapt, rather than
/// assume a fully equipped artifact and fail mid-session.
pub trait Classify {
    /// Runs the artifact's prediction on one assembled record.
    fn predict(&self, record: &CompanyRecord) -> Result<RawPrediction, InferenceError>;

    /// Returns the ordered class list the artifact was trained on, if it
    /// carries one.
    fn classes(&self) -> Option<&[String]> {
        None
    }

    /// Returns the probability-estimation capability, if the artifact
    /// supports it.
    fn proba(&self) -> Option<&dyn ProbaEstimate> {
        None
    }
}

/// Probability estimation over a loaded classifier artifact.
pub trait ProbaEstimate {
    /// Returns one probability per class, aligned to the artifact's class
    /// order. Entries are non-negative and sum to 1.0.
    fn predict_proba(&self, record: &CompanyRecord) -> Result<Vec<f64>, InferenceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Minimal;

    impl Classify for Minimal {
        fn predict(&self, _record: &CompanyRecord) -> Result<RawPrediction, InferenceError> {
            Ok(RawPrediction::ClassId(0))
        }
    }

    #[test]
    fn test_capabilities_default_to_absent() {
        let classifier = Minimal;
        assert!(classifier.classes().is_none());
        assert!(classifier.proba().is_none());
    }

    #[test]
    fn test_predict_without_capabilities_still_works() {
        let classifier = Minimal;
        let raw = classifier.predict(&CompanyRecord::default());
        assert_eq!(raw, Ok(RawPrediction::ClassId(0)));
    }
}
