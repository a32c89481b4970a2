mod capability;
mod encoder;
mod error;
mod forest;

pub use capability::{Classify, ProbaEstimate, RawPrediction};
pub use encoder::FeatureEncoder;
pub use error::InferenceError;
pub use forest::{ForestModel, ModelSummary};
