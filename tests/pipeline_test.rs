use pinkslip::{
    Classify, CompanyRecord, ForestModel, InferenceError, LabelDecode, LabelMap, Pipeline,
    PipelineError, ProbaEstimate, RawPrediction,
};
use std::sync::Arc;
use std::thread;

/// Classifier stub that always answers with the same class id.
struct FixedClassifier {
    class_id: usize,
    proba: Option<Vec<f64>>,
    classes: Option<Vec<String>>,
}

impl FixedClassifier {
    fn new(class_id: usize) -> Self {
        Self {
            class_id,
            proba: None,
            classes: None,
        }
    }

    fn with_proba(mut self, proba: Vec<f64>) -> Self {
        self.proba = Some(proba);
        self
    }

    fn with_classes(mut self, classes: &[&str]) -> Self {
        self.classes = Some(classes.iter().map(|label| label.to_string()).collect());
        self
    }
}

impl Classify for FixedClassifier {
    fn predict(&self, _record: &CompanyRecord) -> Result<RawPrediction, InferenceError> {
        Ok(RawPrediction::ClassId(self.class_id))
    }

    fn classes(&self) -> Option<&[String]> {
        self.classes.as_deref()
    }

    fn proba(&self) -> Option<&dyn ProbaEstimate> {
        if self.proba.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl ProbaEstimate for FixedClassifier {
    fn predict_proba(&self, _record: &CompanyRecord) -> Result<Vec<f64>, InferenceError> {
        self.proba
            .clone()
            .ok_or_else(|| InferenceError::MalformedModel("no probabilities".to_string()))
    }
}

/// Classifier stub that emits already decoded labels.
struct LabelingClassifier(&'static str);

impl Classify for LabelingClassifier {
    fn predict(&self, _record: &CompanyRecord) -> Result<RawPrediction, InferenceError> {
        Ok(RawPrediction::Label(self.0.to_string()))
    }
}

/// Classifier stub that rejects every record.
struct FaultyClassifier;

impl Classify for FaultyClassifier {
    fn predict(&self, _record: &CompanyRecord) -> Result<RawPrediction, InferenceError> {
        Err(InferenceError::UnknownCategory {
            field: "industry".to_string(),
            value: "Crypto".to_string(),
        })
    }
}

/// Decoder stub without the inverse-mapping capability.
struct BareDecoder {
    classes: Option<Vec<String>>,
}

impl LabelDecode for BareDecoder {
    fn classes(&self) -> Option<&[String]> {
        self.classes.as_deref()
    }
}

fn scale_labels() -> LabelMap {
    LabelMap::new(vec!["Large", "Medium", "Small"]).expect("labels should build")
}

#[test]
fn test_class_id_decodes_through_the_label_map() -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(
        Arc::new(FixedClassifier::new(1)),
        Arc::new(scale_labels()),
    );
    let prediction = pipeline.predict(&CompanyRecord::default())?;
    assert_eq!(prediction.label, "Medium");
    assert!(prediction.confidence.is_none());
    Ok(())
}

#[test]
fn test_confidence_follows_class_order() -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(
        Arc::new(FixedClassifier::new(1).with_proba(vec![0.1, 0.7, 0.2])),
        Arc::new(scale_labels()),
    );
    let prediction = pipeline.predict(&CompanyRecord::default())?;
    let confidence = prediction.confidence.expect("estimator is present");

    let names: Vec<&str> = confidence.iter().map(|(label, _)| label.as_str()).collect();
    assert_eq!(names, ["Large", "Medium", "Small"]);
    assert_eq!(confidence[1], ("Medium".to_string(), 0.7));

    for (_, probability) in &confidence {
        assert!((0.0..=1.0).contains(probability));
    }
    let total: f64 = confidence.iter().map(|(_, probability)| probability).sum();
    assert!((total - 1.0).abs() < 1e-6);
    Ok(())
}

#[test]
fn test_prediction_is_repeatable() -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(
        Arc::new(FixedClassifier::new(2).with_proba(vec![0.2, 0.2, 0.6])),
        Arc::new(scale_labels()),
    );
    let record = CompanyRecord::default();
    assert_eq!(pipeline.predict(&record)?, pipeline.predict(&record)?);
    Ok(())
}

#[test]
fn test_decoded_label_is_always_known() -> Result<(), Box<dyn std::error::Error>> {
    let labels = scale_labels();
    for class_id in 0..labels.class_count() {
        let pipeline = Pipeline::new(
            Arc::new(FixedClassifier::new(class_id)),
            Arc::new(scale_labels()),
        );
        let prediction = pipeline.predict(&CompanyRecord::default())?;
        assert!(labels.index_of(&prediction.label).is_some());
    }
    Ok(())
}

#[test]
fn test_out_of_range_class_id_is_reported() {
    let pipeline = Pipeline::new(
        Arc::new(FixedClassifier::new(9)),
        Arc::new(scale_labels()),
    );
    let err = pipeline.predict(&CompanyRecord::default()).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Inference(InferenceError::UnknownClassId { class_id: 9, .. })
    ));
}

#[test]
fn test_label_output_skips_the_decode_step() -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(
        Arc::new(LabelingClassifier("Medium")),
        Arc::new(scale_labels()),
    );
    let prediction = pipeline.predict(&CompanyRecord::default())?;
    assert_eq!(prediction.label, "Medium");
    Ok(())
}

#[test]
fn test_missing_inverse_reports_the_raw_id() -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(
        Arc::new(FixedClassifier::new(1)),
        Arc::new(BareDecoder { classes: None }),
    );
    let prediction = pipeline.predict(&CompanyRecord::default())?;
    assert_eq!(prediction.label, "1");
    Ok(())
}

#[test]
fn test_decoder_classes_win_over_classifier_classes() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = FixedClassifier::new(0)
        .with_proba(vec![0.5, 0.3, 0.2])
        .with_classes(&["a", "b", "c"]);
    let pipeline = Pipeline::new(Arc::new(classifier), Arc::new(scale_labels()));
    let prediction = pipeline.predict(&CompanyRecord::default())?;
    let confidence = prediction.confidence.expect("estimator is present");
    let names: Vec<&str> = confidence.iter().map(|(label, _)| label.as_str()).collect();
    assert_eq!(names, ["Large", "Medium", "Small"]);
    Ok(())
}

#[test]
fn test_classifier_classes_back_fill_a_bare_decoder() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = FixedClassifier::new(0)
        .with_proba(vec![0.5, 0.3, 0.2])
        .with_classes(&["Large", "Medium", "Small"]);
    let pipeline = Pipeline::new(
        Arc::new(classifier),
        Arc::new(BareDecoder { classes: None }),
    );
    let prediction = pipeline.predict(&CompanyRecord::default())?;
    let confidence = prediction.confidence.expect("estimator is present");
    assert_eq!(confidence[0], ("Large".to_string(), 0.5));
    Ok(())
}

#[test]
fn test_unlabeled_distribution_is_numbered() -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(
        Arc::new(FixedClassifier::new(0).with_proba(vec![0.6, 0.4])),
        Arc::new(BareDecoder { classes: None }),
    );
    let prediction = pipeline.predict(&CompanyRecord::default())?;
    let confidence = prediction.confidence.expect("estimator is present");
    let names: Vec<&str> = confidence.iter().map(|(label, _)| label.as_str()).collect();
    assert_eq!(names, ["class 0", "class 1"]);
    Ok(())
}

#[test]
fn test_shape_mismatch_is_caught() {
    let pipeline = Pipeline::new(
        Arc::new(FixedClassifier::new(0).with_proba(vec![0.5, 0.5])),
        Arc::new(scale_labels()),
    );
    let err = pipeline.predict(&CompanyRecord::default()).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Inference(InferenceError::ShapeMismatch {
            expected: 3,
            actual: 2
        })
    ));
}

#[test]
fn test_classifier_fault_reaches_the_caller_with_a_hint() {
    let pipeline = Pipeline::new(Arc::new(FaultyClassifier), Arc::new(scale_labels()));
    let err = pipeline.predict(&CompanyRecord::default()).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Inference(InferenceError::UnknownCategory { .. })
    ));
    assert!(err.hint().is_some());
}

#[test]
fn test_forest_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let model = ForestModel::from_json(
        r#"{
            "schema": ["industry", "country", "stage", "location", "source", "funds_raised", "year"],
            "categories": {
                "industry": {"Retail": 0.0, "Transportation": 1.0},
                "country": {"United States": 0.0},
                "stage": {"Series A": 0.0, "Seed": 5.0},
                "location": {"SF Bay Area": 0.0},
                "source": {"TechCrunch": 0.0}
            },
            "classes": ["Large", "Medium", "Small"],
            "trees": [
                {"nodes": [
                    {"feature": 5, "threshold": 100.0, "left": 1, "right": 2},
                    {"leaf": [0.1, 0.7, 0.2]},
                    {"leaf": [0.6, 0.3, 0.1]}
                ]}
            ]
        }"#,
    )?;
    let pipeline = Pipeline::new(Arc::new(model), Arc::new(scale_labels()));

    let prediction = pipeline.predict(&CompanyRecord::default())?;
    assert_eq!(prediction.label, "Medium");
    let confidence = prediction.confidence.expect("forest estimates probabilities");
    let total: f64 = confidence.iter().map(|(_, probability)| probability).sum();
    assert!((total - 1.0).abs() < 1e-6);

    let unknown = CompanyRecord {
        industry: "Crypto".to_string(),
        ..CompanyRecord::default()
    };
    let err = pipeline.predict(&unknown).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Inference(InferenceError::UnknownCategory { .. })
    ));
    Ok(())
}

#[test]
fn test_thread_safety() {
    let pipeline = Arc::new(Pipeline::new(
        Arc::new(FixedClassifier::new(1).with_proba(vec![0.1, 0.7, 0.2])),
        Arc::new(scale_labels()),
    ));
    let mut handles = vec![];

    for _ in 0..3 {
        let pipeline = Arc::clone(&pipeline);
        let handle = thread::spawn(move || {
            let prediction = pipeline.predict(&CompanyRecord::default());
            assert!(prediction.is_ok());
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }
}
