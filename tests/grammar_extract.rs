use textmill::annotate;
use textmill::features::pipeline::{Pipeline, PipelineOptions};

fn run_features(enable: &[&str], text: &str) -> textmill::features::FeatureBag {
    let annotator = annotate::load();
    let options = PipelineOptions {
        enable: Some(enable.iter().map(|s| s.to_string()).collect()),
        ..Default::default()
    };
    let mut pipeline = Pipeline::new(&options).unwrap();
    pipeline.run(annotator.as_ref(), [text]).unwrap().remove(0)
}

#[test]
fn preposition_phrases_reconstruct_nested_subtrees() {
    let bag = run_features(
        &["prepphrases"],
        "I ran over the log with my car in the United States of America.",
    );
    let phrases = bag.prepphrases.unwrap();
    assert_eq!(
        phrases,
        vec![
            "over the log with my car in the United States of America.",
            "with my car in the United States of America.",
            "in the United States of America.",
            "of America.",
        ]
    );
    let counts = bag.prepphrasecounts.unwrap();
    assert_eq!(counts.len(), 4);
    assert!(counts.values().all(|&c| c == 1));
}

#[test]
fn noun_verb_pairs_link_subjects_to_their_verbs() {
    let bag = run_features(&["nounverbs"], "The dog ran. The cat ate the fish.");
    let pairs = bag.nounverbs.unwrap();
    let as_tuples: Vec<(&str, &str)> = pairs
        .iter()
        .map(|p| (p.subject.as_str(), p.verb.as_str()))
        .collect();
    assert_eq!(as_tuples, vec![("dog", "ran"), ("cat", "ate")]);
}

#[test]
fn wordlist_lowercases_and_keeps_duplicates_in_order() {
    let bag = run_features(&["wordlist"], "The cat saw the cat.");
    assert_eq!(
        bag.wordlist.unwrap(),
        vec!["the", "cat", "saw", "the", "cat"]
    );
}

#[test]
fn wordlist_drops_contraction_particles_but_keeps_stems() {
    let bag = run_features(&["wordlist"], "They wouldn't say.");
    assert_eq!(bag.wordlist.unwrap(), vec!["they", "would", "say"]);
}

#[test]
fn sentence_lists_follow_annotator_boundaries() {
    let bag = run_features(&["sentlist"], "The dog ran. The cat slept.");
    let sents = bag.sentlist.unwrap();
    assert_eq!(sents.len(), 2);
    assert_eq!(sents[0], vec!["The", "dog", "ran", "."]);
}

#[test]
fn noun_phrases_cover_determined_noun_runs() {
    let bag = run_features(&["nounphrases"], "The big dog chased the cat.");
    let phrases = bag.nounphrases.unwrap();
    assert!(phrases.iter().any(|p| p == "The big dog"));
    assert!(phrases.iter().any(|p| p == "the cat"));
}

#[test]
fn extractors_are_idempotent_on_an_unchanged_document() {
    let annotator = annotate::load();
    let doc = annotator.annotate("The United States said they would leave the city.");
    let options = PipelineOptions::default();
    let mut pipeline = Pipeline::new(&options).unwrap();
    let first = pipeline.process_document(&doc).unwrap();
    let second = pipeline.process_document(&doc).unwrap();
    assert_eq!(first, second);
}
