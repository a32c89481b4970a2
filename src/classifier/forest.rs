use std::fmt;

use ndarray::{aview1, Array1};
use serde::Deserialize;

use crate::record::CompanyRecord;

use super::capability::{Classify, ProbaEstimate, RawPrediction};
use super::encoder::FeatureEncoder;
use super::error::InferenceError;

/// One node of a decision tree, as exported by the training run.
///
/// Split nodes carry a feature index, a threshold and two child indices;
/// leaves carry per-class weights. The exporter writes whichever fields
/// the node has, so deserialization is untagged.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        leaf: Vec<f64>,
    },
}

/// A single decision tree with nodes in one flat array, root at index 0.
///
/// Child indices are required to be strictly greater than the parent's
/// index, so a walk from the root always moves forward and terminates.
#[derive(Debug, Clone, Deserialize)]
struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Checks node wiring and normalizes leaf weights into distributions.
    ///
    /// The first leaf seen fixes the class count when the artifact does
    /// not declare one; every later leaf has to match it.
    fn prepare(
        &mut self,
        tree_index: usize,
        feature_count: usize,
        class_count: &mut Option<usize>,
    ) -> Result<(), InferenceError> {
        if self.nodes.is_empty() {
            return Err(InferenceError::MalformedModel(format!(
                "tree {} has no nodes",
                tree_index
            )));
        }
        let node_count = self.nodes.len();
        for (index, node) in self.nodes.iter_mut().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= feature_count {
                        return Err(InferenceError::MalformedModel(format!(
                            "tree {} splits on feature {} but only {} features are encoded",
                            tree_index, feature, feature_count
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= index || child >= node_count {
                            return Err(InferenceError::MalformedModel(format!(
                                "tree {} node {} points at child {} outside the forward range",
                                tree_index, index, child
                            )));
                        }
                    }
                }
                TreeNode::Leaf { leaf } => {
                    match *class_count {
                        Some(count) if leaf.len() != count => {
                            return Err(InferenceError::MalformedModel(format!(
                                "tree {} has a leaf of width {} but {} classes are expected",
                                tree_index,
                                leaf.len(),
                                count
                            )));
                        }
                        Some(_) => {}
                        None => *class_count = Some(leaf.len()),
                    }
                    if leaf.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(InferenceError::MalformedModel(format!(
                            "tree {} has a leaf with negative or non-finite weights",
                            tree_index
                        )));
                    }
                    let total: f64 = leaf.iter().sum();
                    if total <= 0.0 {
                        return Err(InferenceError::MalformedModel(format!(
                            "tree {} has a leaf whose weights sum to zero",
                            tree_index
                        )));
                    }
                    // Training runs export raw sample counts; turn them
                    // into a distribution once here instead of per predict.
                    for weight in leaf.iter_mut() {
                        *weight /= total;
                    }
                }
            }
        }
        Ok(())
    }

    /// Walks from the root to the leaf distribution for one feature vector.
    fn leaf_for(&self, features: &Array1<f64>) -> Result<&[f64], InferenceError> {
        let mut index = 0;
        loop {
            let node = self.nodes.get(index).ok_or_else(|| {
                InferenceError::MalformedModel(format!("node index {} out of bounds", index))
            })?;
            match node {
                TreeNode::Leaf { leaf } => return Ok(leaf),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).copied().ok_or_else(|| {
                        InferenceError::MalformedModel(format!(
                            "split references feature {} beyond the encoded vector",
                            feature
                        ))
                    })?;
                    index = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Shape of a loaded classifier artifact, reported once after load.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub tree_count: usize,
    pub class_count: usize,
    pub feature_count: usize,
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} trees, {} classes, {} features",
            self.tree_count, self.class_count, self.feature_count
        )
    }
}

/// A random-forest classifier restored from its JSON artifact.
///
/// The artifact bundles the feature schema, the fitted category mappings
/// and the trees of the ensemble. Prediction averages the per-tree leaf
/// distributions and picks the most probable class, so this type carries
/// both the base prediction interface and the probability capability.
///
/// # Thread Safety
///
/// This type is automatically `Send + Sync` because all of its fields own
/// plain data; a loaded model can be shared across threads behind an
/// `Arc` without locking.
#[derive(Debug, Clone, Deserialize)]
pub struct ForestModel {
    #[serde(flatten)]
    encoder: FeatureEncoder,
    /// Ordered class labels, when the export carries them inline.
    #[serde(default)]
    classes: Option<Vec<String>>,
    trees: Vec<DecisionTree>,
    #[serde(skip)]
    n_classes: usize,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<ForestModel>();
    }
};

impl ForestModel {
    /// Restores a model from its JSON artifact text.
    ///
    /// Parsing and structural validation happen together, so a returned
    /// model is always ready to predict.
    ///
    /// # Example
    /// ```rust
    /// use pinkslip::{Classify, CompanyRecord, ForestModel, RawPrediction};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let model = ForestModel::from_json(r#"{
    ///     "schema": ["industry", "country", "stage", "location", "source", "funds_raised", "year"],
    ///     "categories": {
    ///         "industry": {"Retail": 0.0},
    ///         "country": {"United States": 0.0},
    ///         "stage": {"Series A": 0.0},
    ///         "location": {"SF Bay Area": 0.0},
    ///         "source": {"TechCrunch": 0.0}
    ///     },
    ///     "classes": ["Large", "Medium", "Small"],
    ///     "trees": [{"nodes": [{"leaf": [0.2, 0.5, 0.3]}]}]
    /// }"#)?;
    ///
    /// let raw = model.predict(&CompanyRecord::default())?;
    /// assert_eq!(raw, RawPrediction::ClassId(1));
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_json(json: &str) -> Result<Self, InferenceError> {
        let mut model: Self = serde_json::from_str(json)
            .map_err(|e| InferenceError::MalformedModel(format!("artifact does not parse: {}", e)))?;
        model.prepare()?;
        Ok(model)
    }

    /// Validates the deserialized artifact and normalizes its leaves.
    ///
    /// Must run once before the first prediction; [`from_json`] and the
    /// asset loader both call it.
    ///
    /// [`from_json`]: ForestModel::from_json
    pub(crate) fn prepare(&mut self) -> Result<(), InferenceError> {
        self.encoder.validate()?;
        if self.trees.is_empty() {
            return Err(InferenceError::MalformedModel(
                "artifact carries no trees".to_string(),
            ));
        }
        let feature_count = self.encoder.feature_count();
        let mut class_count = self.classes.as_ref().map(|classes| classes.len());
        for (tree_index, tree) in self.trees.iter_mut().enumerate() {
            tree.prepare(tree_index, feature_count, &mut class_count)?;
        }
        self.n_classes = match class_count {
            Some(count) if count >= 2 => count,
            Some(count) => {
                return Err(InferenceError::MalformedModel(format!(
                    "{} classes, a classifier needs at least 2",
                    count
                )))
            }
            None => {
                return Err(InferenceError::MalformedModel(
                    "no leaf defines the class count".to_string(),
                ))
            }
        };
        Ok(())
    }

    /// Returns the shape of the loaded artifact.
    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            tree_count: self.trees.len(),
            class_count: self.n_classes,
            feature_count: self.encoder.feature_count(),
        }
    }

    /// Averages the leaf distributions of every tree for one record.
    fn raw_proba(&self, record: &CompanyRecord) -> Result<Array1<f64>, InferenceError> {
        let features = self.encoder.encode(record)?;
        let mut total = Array1::<f64>::zeros(self.n_classes);
        for tree in &self.trees {
            let leaf = tree.leaf_for(&features)?;
            if leaf.len() != self.n_classes {
                return Err(InferenceError::ShapeMismatch {
                    expected: self.n_classes,
                    actual: leaf.len(),
                });
            }
            total += &aview1(leaf);
        }
        Ok(total / self.trees.len() as f64)
    }
}

impl Classify for ForestModel {
    fn predict(&self, record: &CompanyRecord) -> Result<RawPrediction, InferenceError> {
        let probabilities = self.raw_proba(record)?;
        // First maximum wins on ties, so equal-probability records decode
        // to the same class every time.
        let mut best_class = 0;
        for (class_id, probability) in probabilities.iter().enumerate() {
            if *probability > probabilities[best_class] {
                best_class = class_id;
            }
        }
        Ok(RawPrediction::ClassId(best_class))
    }

    fn classes(&self) -> Option<&[String]> {
        self.classes.as_deref()
    }

    fn proba(&self) -> Option<&dyn ProbaEstimate> {
        Some(self)
    }
}

impl ProbaEstimate for ForestModel {
    fn predict_proba(&self, record: &CompanyRecord) -> Result<Vec<f64>, InferenceError> {
        Ok(self.raw_proba(record)?.to_vec())
    }
}
