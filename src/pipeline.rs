use std::sync::Arc;

use log::{info, warn};

use crate::assets::AssetStore;
use crate::classifier::{Classify, InferenceError, RawPrediction};
use crate::decoder::LabelDecode;
use crate::record::CompanyRecord;

/// A decoded prediction, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Human-readable predicted category.
    pub label: String,
    /// Per-class confidence, present when the classifier estimates
    /// probabilities. Pairs follow class-id order and sum to 1.0.
    pub confidence: Option<Vec<(String, f64)>>,
}

/// Faults surfaced to the user for a single submission.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Model assets are not loaded; prediction is disabled")]
    AssetsUnavailable {
        /// The load report kept by the store, rendered as the cause line.
        report: Option<String>,
    },
    #[error("Prediction failed: {0}")]
    Inference(#[from] InferenceError),
}

impl PipelineError {
    /// The degraded-mode answer to a submission, carrying the store's
    /// load report when one was kept.
    pub fn unavailable(report: Option<&str>) -> Self {
        Self::AssetsUnavailable {
            report: report.map(str::to_string),
        }
    }

    /// A hint about the likely root cause, shown under the error report.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::AssetsUnavailable { .. } => Some(
                "Place rf_model.json and label_encoder.json next to the binary, \
                 or point PINKSLIP_ASSETS at the directory holding them.",
            ),
            Self::Inference(InferenceError::UnknownCategory { .. })
            | Self::Inference(InferenceError::UnencodableField(_)) => Some(
                "The model artifact is missing the category encodings it was trained \
                 with. Re-export it with the preprocessing step included.",
            ),
            Self::Inference(_) => None,
        }
    }
}

/// Runs assemble, infer and decode for one submission.
///
/// Both artifacts are probed for their optional capabilities at
/// construction so the log records what the loaded pair supports. A
/// missing capability downgrades the output instead of failing the
/// session: no probability estimate means no confidence section, and no
/// inverse mapping means the raw class identifier is reported as-is.
pub struct Pipeline {
    classifier: Arc<dyn Classify + Send + Sync>,
    decoder: Arc<dyn LabelDecode + Send + Sync>,
}

impl Pipeline {
    /// Builds a pipeline over an already loaded artifact pair.
    pub fn new(
        classifier: Arc<dyn Classify + Send + Sync>,
        decoder: Arc<dyn LabelDecode + Send + Sync>,
    ) -> Self {
        info!(
            "Pipeline ready (probability estimation: {}, inverse label mapping: {})",
            if classifier.proba().is_some() { "yes" } else { "no" },
            if decoder.inverse().is_some() { "yes" } else { "no" },
        );
        Self {
            classifier,
            decoder,
        }
    }

    /// Builds the pipeline from the asset store, or reports the degraded
    /// state if the artifacts never loaded.
    pub fn from_store(store: &AssetStore) -> Result<Self, PipelineError> {
        match (store.classifier(), store.decoder()) {
            (Some(classifier), Some(decoder)) => Ok(Self::new(classifier, decoder)),
            _ => Err(PipelineError::unavailable(store.failure())),
        }
    }

    /// Scores one assembled record and decodes the result.
    ///
    /// # Errors
    /// Forwards every [`InferenceError`] the artifacts raise; the caller
    /// reports it for that submission and keeps the session alive.
    pub fn predict(&self, record: &CompanyRecord) -> Result<Prediction, PipelineError> {
        let raw = self.classifier.predict(record)?;
        let label = self.decode(raw)?;
        let confidence = self.confidence(record)?;
        Ok(Prediction { label, confidence })
    }

    fn decode(&self, raw: RawPrediction) -> Result<String, PipelineError> {
        match raw {
            RawPrediction::Label(label) => {
                warn!("Classifier emitted a label directly; skipping the decode step");
                Ok(label)
            }
            RawPrediction::ClassId(class_id) => match self.decoder.inverse() {
                Some(inverse) => Ok(inverse.label_of(class_id)?),
                None => {
                    warn!(
                        "Decoder has no inverse mapping; reporting raw class id {}",
                        class_id
                    );
                    Ok(class_id.to_string())
                }
            },
        }
    }

    fn confidence(
        &self,
        record: &CompanyRecord,
    ) -> Result<Option<Vec<(String, f64)>>, PipelineError> {
        let Some(estimator) = self.classifier.proba() else {
            return Ok(None);
        };
        let probabilities = estimator.predict_proba(record)?;

        // The decoder's labels are authoritative; the classifier's own
        // class list is the fallback when the decoder carries none.
        let labels: Vec<String> = match self
            .decoder
            .classes()
            .or_else(|| self.classifier.classes())
        {
            Some(labels) => {
                if labels.len() != probabilities.len() {
                    return Err(InferenceError::ShapeMismatch {
                        expected: labels.len(),
                        actual: probabilities.len(),
                    }
                    .into());
                }
                labels.to_vec()
            }
            None => {
                warn!("Neither artifact names its classes; numbering them instead");
                (0..probabilities.len())
                    .map(|class_id| format!("class {}", class_id))
                    .collect()
            }
        };

        Ok(Some(labels.into_iter().zip(probabilities).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetPaths;
    use std::path::PathBuf;

    #[test]
    fn test_from_store_reports_degraded_assets() {
        let paths = AssetPaths {
            dir: Some(PathBuf::from("/nonexistent/pinkslip")),
            ..AssetPaths::default()
        };
        let store = AssetStore::load(&paths);
        let err = Pipeline::from_store(&store).err().unwrap();
        assert!(err.to_string().contains("not loaded"));
        assert!(err.hint().unwrap().contains("PINKSLIP_ASSETS"));
        match &err {
            PipelineError::AssetsUnavailable { report } => {
                assert_eq!(report.as_deref(), store.failure());
            }
            other => panic!("expected a degraded-mode error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_category_hint_names_preprocessing() {
        let err = PipelineError::Inference(InferenceError::UnknownCategory {
            field: "industry".to_string(),
            value: "Crypto".to_string(),
        });
        assert!(err.hint().unwrap().contains("preprocessing"));
    }

    #[test]
    fn test_shape_mismatch_has_no_hint() {
        let err = PipelineError::Inference(InferenceError::ShapeMismatch {
            expected: 3,
            actual: 2,
        });
        assert!(err.hint().is_none());
    }
}
