//! Layoff-scale prediction over pre-trained model artifacts.
//!
//! A submission flows through three stages: a [`CompanyRecord`] is
//! assembled from the form, the classifier artifact scores it, and the
//! decoder artifact turns the raw class into a label. Both artifacts are
//! JSON exports of an external training run, loaded once per process by
//! the [`AssetStore`].
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use pinkslip::{CompanyRecord, ForestModel, LabelMap, Pipeline};
//!
//! let model = ForestModel::from_json(r#"{
//!     "schema": ["industry", "country", "stage", "location", "source", "funds_raised", "year"],
//!     "categories": {
//!         "industry": {"Retail": 0.0},
//!         "country": {"United States": 0.0},
//!         "stage": {"Series A": 0.0},
//!         "location": {"SF Bay Area": 0.0},
//!         "source": {"TechCrunch": 0.0}
//!     },
//!     "classes": ["Large", "Medium", "Small"],
//!     "trees": [{"nodes": [{"leaf": [0.2, 0.5, 0.3]}]}]
//! }"#)?;
//! let labels = LabelMap::new(vec!["Large", "Medium", "Small"])?;
//!
//! let pipeline = Pipeline::new(Arc::new(model), Arc::new(labels));
//! let prediction = pipeline.predict(&CompanyRecord::default())?;
//! assert_eq!(prediction.label, "Medium");
//! # Ok(())
//! # }
//! ```
//!
//! # Degraded Mode
//!
//! Artifacts loaded through the [`AssetStore`] degrade as a pair: if
//! either file is missing, corrupt or fails its checksum, both accessors
//! return `None` and [`Pipeline::from_store`] reports
//! [`PipelineError::AssetsUnavailable`] for every submission instead of
//! predicting. The error carries the store's load report so the result
//! screen can show what went wrong. The interactive form stays usable
//! throughout.

pub mod assets;
pub mod classifier;
pub mod cli;
pub mod decoder;
pub mod pipeline;
pub mod record;

pub use assets::{AssetError, AssetPaths, AssetStore, ASSETS_ENV, ENCODER_FILE, MODEL_FILE};
pub use classifier::{
    Classify, FeatureEncoder, ForestModel, InferenceError, ModelSummary, ProbaEstimate,
    RawPrediction,
};
pub use decoder::{InverseMap, LabelDecode, LabelMap};
pub use pipeline::{Pipeline, PipelineError, Prediction};
pub use record::{CompanyRecord, FieldValue, FIELD_NAMES, STAGE_OPTIONS, YEAR_MAX, YEAR_MIN};

pub fn init_logger() {
    env_logger::init();
}
