use textmill::annotate::{self, Annotator};
use textmill::error::TextmillError;
use textmill::features::pipeline::{resolve_plan, Pipeline, PipelineOptions};
use textmill::features::FeatureName;

#[test]
fn entlist_runs_strictly_before_entverbs() {
    let plan = resolve_plan(&[FeatureName::EntVerbs, FeatureName::WordList]).unwrap();
    let entlist = plan.iter().position(|f| *f == FeatureName::EntList).unwrap();
    let entverbs = plan.iter().position(|f| *f == FeatureName::EntVerbs).unwrap();
    assert!(entlist < entverbs);
}

#[test]
fn unknown_feature_fails_before_any_document_is_processed() {
    let options = PipelineOptions {
        enable: Some(vec!["entlist".to_string(), "typo".to_string()]),
        ..Default::default()
    };
    let err = Pipeline::new(&options).unwrap_err();
    assert!(matches!(err, TextmillError::UnknownFeature(name) if name == "typo"));
}

#[test]
fn pipeline_registration_is_scoped_to_the_run() {
    let annotator = annotate::load();
    let options = PipelineOptions {
        enable: Some(vec!["wordlist".to_string()]),
        ..Default::default()
    };
    let mut pipeline = Pipeline::new(&options).unwrap();

    assert!(!annotator.has_component("textmill-features"));
    pipeline.run(annotator.as_ref(), ["one doc."]).unwrap();
    assert!(!annotator.has_component("textmill-features"));
}

#[test]
fn pre_registered_pipeline_is_left_in_place() {
    let annotator = annotate::load();
    annotator.attach("textmill-features");

    let options = PipelineOptions {
        enable: Some(vec!["wordlist".to_string()]),
        ..Default::default()
    };
    let mut pipeline = Pipeline::new(&options).unwrap();
    pipeline.run(annotator.as_ref(), ["one doc."]).unwrap();

    // the run did not own the registration, so it must not remove it
    assert!(annotator.has_component("textmill-features"));
}

#[test]
fn bags_come_back_in_corpus_order() {
    let annotator = annotate::load();
    let options = PipelineOptions {
        enable: Some(vec!["wordlist".to_string()]),
        ..Default::default()
    };
    let mut pipeline = Pipeline::new(&options).unwrap();
    let bags = pipeline
        .run(annotator.as_ref(), ["apple orchard.", "banana grove."])
        .unwrap();
    assert_eq!(bags.len(), 2);
    assert_eq!(bags[0].wordlist.as_ref().unwrap()[0], "apple");
    assert_eq!(bags[1].wordlist.as_ref().unwrap()[0], "banana");
}

#[test]
fn disabled_features_leave_their_bag_slots_empty() {
    let annotator = annotate::load();
    let options = PipelineOptions {
        disable: Some(vec!["entlist".to_string(), "entverbs".to_string()]),
        ..Default::default()
    };
    let mut pipeline = Pipeline::new(&options).unwrap();
    let bags = pipeline
        .run(annotator.as_ref(), ["The United States said so."])
        .unwrap();
    assert!(bags[0].entlist.is_none());
    assert!(bags[0].entverbs.is_none());
    assert!(bags[0].wordlist.is_some());
}
