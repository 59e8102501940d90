//! Rule-based English annotator. Swap with a model-backed parser when one
//! is available; the extractors only see the [`Doc`] contract.

use std::collections::BTreeSet;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Annotator, Dep, Doc, EntitySpan, Pos, Token};

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        (?:[A-Za-z]\.){2,}              # dotted abbreviations: U.S., U.S.A.
      | [A-Za-z]+(?:['’][A-Za-z]+)*    # words, including internal clitics
      | [0-9]+(?:[.,][0-9]+)*%?        # numbers, optionally a percentage
      | \S                             # anything else, one symbol at a time
    ",
    )
    .expect("valid token pattern")
});

const DETERMINERS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "my", "your", "his", "her", "its", "our",
    "their", "some", "any", "no", "every", "each", "either", "neither", "both", "all", "another",
];

const PREPOSITIONS: &[&str] = &[
    "of", "in", "on", "at", "by", "for", "with", "about", "against", "between", "into", "through",
    "during", "before", "after", "above", "below", "from", "up", "down", "over", "under", "across",
    "near", "without", "within", "upon", "toward", "towards", "onto", "off", "around", "along",
    "behind", "beyond", "despite", "except", "inside", "outside", "until", "via", "per", "among",
    "amid", "beneath", "beside", "besides", "underneath", "unlike", "versus", "to",
];

const PRONOUNS: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "us", "them", "who", "whom",
    "someone", "anyone", "everyone", "nobody", "something", "anything", "everything", "nothing",
    "myself", "yourself", "himself", "herself", "itself", "ourselves", "themselves",
];

const CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "nor", "so", "yet", "because", "although", "though", "while", "if",
    "unless", "whereas", "when", "whenever", "where", "wherever",
];

const AUXILIARIES: &[&str] = &[
    "is", "am", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does",
    "did", "will", "would", "shall", "should", "can", "could", "may", "might", "must",
];

// Frequent verb forms the suffix heuristics cannot reach.
const COMMON_VERBS: &[&str] = &[
    "go", "goes", "went", "gone", "say", "says", "said", "get", "gets", "got", "gotten", "make",
    "makes", "made", "take", "takes", "took", "taken", "come", "comes", "came", "see", "sees",
    "saw", "seen", "know", "knows", "knew", "known", "give", "gives", "gave", "given", "find",
    "finds", "found", "tell", "tells", "told", "think", "thinks", "thought", "become", "became",
    "run", "runs", "ran", "bring", "brings", "brought", "begin", "begins", "began", "keep",
    "keeps", "kept", "hold", "holds", "held", "write", "writes", "wrote", "written", "stand",
    "stands", "stood", "hear", "hears", "heard", "let", "lets", "mean", "means", "meant", "set",
    "sets", "meet", "meets", "met", "pay", "pays", "paid", "sit", "sits", "sat", "speak",
    "speaks", "spoke", "spoken", "lead", "leads", "led", "read", "reads", "grow", "grows", "grew",
    "grown", "lose", "loses", "lost", "fall", "falls", "fell", "fallen", "send", "sends", "sent",
    "build", "builds", "built", "understand", "understands", "understood", "draw", "draws",
    "drew", "drawn", "break", "breaks", "broke", "broken", "spend", "spends", "spent", "rise",
    "rose", "risen", "drive", "drives", "drove", "driven", "buy", "buys", "bought", "wear",
    "wears", "wore", "worn", "choose", "chooses", "chose", "chosen", "eat", "eats", "ate",
    "eaten", "feel", "feels", "felt", "leave", "leaves", "left", "put", "puts", "seem", "seems",
    "want", "wants", "look", "looks", "use", "uses", "work", "works", "call", "calls", "try",
    "tries", "ask", "asks", "need", "needs", "like", "likes", "help", "helps", "talk", "talks",
    "turn", "turns", "start", "starts", "show", "shows", "showed", "shown", "play", "plays",
    "move", "moves", "live", "lives", "believe", "believes", "happen", "happens", "include",
    "includes", "continue", "continues", "change", "changes", "watch", "watches", "follow",
    "follows", "stop", "stops", "create", "creates", "open", "opens", "walk", "walks", "offer",
    "offers", "remember", "remembers", "love", "loves", "consider", "considers", "appear",
    "appears", "wait", "waits", "serve", "serves", "die", "dies", "expect", "expects", "stay",
    "stays", "reach", "reaches",
];

const GEO_TERMS: &[&str] = &[
    "united states", "u.s.", "u.s.a.", "usa", "america", "canada", "mexico", "china", "japan",
    "india", "russia", "germany", "france", "italy", "spain", "britain", "england", "london",
    "paris", "berlin", "beijing", "tokyo", "moscow", "washington", "new york", "california",
    "texas", "europe", "asia", "africa", "australia", "brazil",
];

const ORG_SUFFIXES: &[&str] = &[
    "inc", "corp", "ltd", "co", "company", "university", "institute", "committee", "department",
    "council", "agency", "bank", "group", "association", "ministry", "commission",
];

const GIVEN_NAMES: &[&str] = &[
    "john", "mary", "james", "robert", "michael", "william", "david", "richard", "joseph",
    "thomas", "sarah", "emily", "anna", "peter", "paul", "george", "susan", "karen", "linda",
    "barbara", "maria", "elizabeth",
];

const MONTHS: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december", "monday", "tuesday", "wednesday", "thursday", "friday",
    "saturday", "sunday",
];

/// Heuristic tokenizer + tagger + projective head assigner + NER.
pub struct EnglishAnnotator {
    components: Mutex<BTreeSet<String>>,
}

impl EnglishAnnotator {
    pub fn new() -> Self {
        Self {
            components: Mutex::new(BTreeSet::new()),
        }
    }
}

impl Default for EnglishAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

impl Annotator for EnglishAnnotator {
    fn annotate(&self, text: &str) -> Doc {
        let mut doc = Doc::default();
        tokenize(text, &mut doc);
        segment_sentences(&mut doc);
        tag_pos(&mut doc);
        mark_entities(&mut doc);
        for (start, end) in doc.sentences.clone() {
            assign_heads(&mut doc, start, end);
        }
        mark_chunks(&mut doc);
        doc
    }

    fn attach(&self, component: &str) -> bool {
        self.components
            .lock()
            .expect("annotator component registry poisoned")
            .insert(component.to_string())
    }

    fn detach(&self, component: &str) {
        self.components
            .lock()
            .expect("annotator component registry poisoned")
            .remove(component);
    }

    fn has_component(&self, component: &str) -> bool {
        self.components
            .lock()
            .expect("annotator component registry poisoned")
            .contains(component)
    }
}

fn tokenize(text: &str, doc: &mut Doc) {
    for mat in TOKEN_PATTERN.find_iter(text) {
        let trailing = text[mat.end()..]
            .chars()
            .next()
            .map(char::is_whitespace)
            .unwrap_or(false);
        let pieces = split_clitics(mat.as_str());
        let last = pieces.len() - 1;
        for (i, piece) in pieces.into_iter().enumerate() {
            doc.tokens.push(Token {
                lower: piece.to_lowercase(),
                text: piece,
                pos: Pos::Other,
                dep: Dep::Dep,
                head: 0,
                whitespace: if i == last { trailing } else { false },
                ent: None,
            });
        }
    }
}

/// Split trailing clitics the way a treebank tokenizer would:
/// `wouldn't` -> `would` + `n't`, `John's` -> `John` + `'s`.
fn split_clitics(word: &str) -> Vec<String> {
    const CLITICS: &[&str] = &["n't", "'s", "'re", "'ve", "'ll", "'d", "'m"];
    for clitic in CLITICS {
        if word.len() > clitic.len() && word.is_char_boundary(word.len() - clitic.len()) {
            let (stem, tail) = word.split_at(word.len() - clitic.len());
            if tail.eq_ignore_ascii_case(clitic) {
                return vec![stem.to_string(), tail.to_string()];
            }
        }
    }
    vec![word.to_string()]
}

fn segment_sentences(doc: &mut Doc) {
    let mut start = 0;
    for idx in 0..doc.tokens.len() {
        let text = doc.tokens[idx].text.as_str();
        if matches!(text, "." | "!" | "?") {
            doc.sentences.push((start, idx + 1));
            start = idx + 1;
        }
    }
    if start < doc.tokens.len() {
        doc.sentences.push((start, doc.tokens.len()));
    }
}

fn is_word(text: &str) -> bool {
    text.chars().next().map(char::is_alphabetic).unwrap_or(false)
}

fn tag_pos(doc: &mut Doc) {
    for (start, end) in doc.sentences.clone() {
        for idx in start..end {
            let (text, lower) = {
                let tok = &doc.tokens[idx];
                (tok.text.clone(), tok.lower.clone())
            };
            doc.tokens[idx].pos = classify(&text, &lower, idx == start);
        }
    }
}

fn classify(text: &str, lower: &str, sentence_initial: bool) -> Pos {
    if !is_word(text) {
        if text.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return Pos::Number;
        }
        if lower == "n't" {
            return Pos::Particle;
        }
        if matches!(lower, "'re" | "'ve" | "'ll" | "'d" | "'m") {
            return Pos::Verb;
        }
        if lower == "'s" {
            return Pos::Particle;
        }
        return Pos::Punct;
    }

    if DETERMINERS.contains(&lower) {
        return Pos::Determiner;
    }
    if PRONOUNS.contains(&lower) {
        return Pos::Pronoun;
    }
    if PREPOSITIONS.contains(&lower) {
        return Pos::Adposition;
    }
    if CONJUNCTIONS.contains(&lower) {
        return Pos::Conjunction;
    }
    if lower == "not" {
        return Pos::Particle;
    }
    if AUXILIARIES.contains(&lower) || COMMON_VERBS.contains(&lower) {
        return Pos::Verb;
    }

    // Mid-sentence capitalization outranks suffix guesses ("United" is a
    // proper noun, not a participle).
    let capitalized = text.chars().next().map(char::is_uppercase).unwrap_or(false);
    if capitalized && !sentence_initial {
        return Pos::ProperNoun;
    }
    if capitalized && sentence_initial && looks_dotted(text) {
        return Pos::ProperNoun;
    }

    if lower.ends_with("ly") && lower.len() > 3 {
        return Pos::Adverb;
    }
    if (lower.ends_with("ing") || lower.ends_with("ed")) && lower.len() > 4 {
        return Pos::Verb;
    }
    if lower.len() > 5
        && ["ous", "ful", "ive", "able", "ible", "ical"]
            .iter()
            .any(|s| lower.ends_with(s))
    {
        return Pos::Adjective;
    }
    Pos::Noun
}

fn looks_dotted(text: &str) -> bool {
    text.contains('.') && text.chars().filter(|c| *c == '.').count() >= 2
}

fn mark_entities(doc: &mut Doc) {
    let n = doc.tokens.len();
    let mut idx = 0;
    while idx < n {
        match doc.tokens[idx].pos {
            Pos::ProperNoun => {
                let start = idx;
                while idx < n && doc.tokens[idx].pos == Pos::ProperNoun {
                    idx += 1;
                }
                let label = entity_label(doc, start, idx);
                push_span(doc, start, idx, label);
            }
            Pos::Number => {
                let label = number_label(&doc.tokens[idx].text);
                push_span(doc, idx, idx + 1, label);
                idx += 1;
            }
            _ => idx += 1,
        }
    }
}

fn push_span(doc: &mut Doc, start: usize, end: usize, label: String) {
    let span_id = doc.entities.len();
    doc.entities.push(EntitySpan { start, end, label });
    for tok in &mut doc.tokens[start..end] {
        tok.ent = Some(span_id);
    }
}

fn entity_label(doc: &Doc, start: usize, end: usize) -> String {
    let lower = doc.span_text(start, end).to_lowercase();
    if GEO_TERMS.contains(&lower.as_str()) {
        return "GPE".to_string();
    }
    let last = doc.tokens[end - 1].lower.trim_end_matches('.');
    if ORG_SUFFIXES.contains(&last) {
        return "ORG".to_string();
    }
    if MONTHS.contains(&doc.tokens[start].lower.as_str()) {
        return "DATE".to_string();
    }
    if GIVEN_NAMES.contains(&doc.tokens[start].lower.as_str()) {
        return "PERSON".to_string();
    }
    "ORG".to_string()
}

fn number_label(text: &str) -> String {
    if text.ends_with('%') {
        return "PERCENT".to_string();
    }
    if let Ok(year) = text.parse::<u32>() {
        if (1500..=2100).contains(&year) {
            return "DATE".to_string();
        }
    }
    "CARDINAL".to_string()
}

/// Projective head assignment for one sentence.
///
/// The grammar is intentionally small: one root verb per sentence, noun
/// runs headed by their final token, subjects left of the root, adpositions
/// chaining onto the most recent object. It produces contiguous subtrees,
/// which is what the phrase reconstruction downstream relies on.
fn assign_heads(doc: &mut Doc, start: usize, end: usize) {
    if start >= end {
        return;
    }
    let root = (start..end)
        .find(|&i| doc.tokens[i].pos == Pos::Verb)
        .unwrap_or(start);

    let run_head = |doc: &Doc, mut i: usize| -> usize {
        while i + 1 < end && doc.tokens[i + 1].pos.is_nominal() {
            i += 1;
        }
        i
    };
    let next_nominal_head = |doc: &Doc, from: usize| -> Option<usize> {
        (from..end)
            .find(|&j| doc.tokens[j].pos.is_nominal())
            .map(|j| run_head(doc, j))
    };

    let mut pending_adp: Option<usize> = None;
    let mut last_object: Option<usize> = None;

    for i in start..end {
        if i == root {
            doc.tokens[i].dep = Dep::Root;
            doc.tokens[i].head = i;
            pending_adp = None;
            continue;
        }
        let pos = doc.tokens[i].pos;
        let (dep, head) = match pos {
            Pos::Punct => (Dep::Punct, if i > start { i - 1 } else { root }),
            Pos::Determiner => (Dep::Det, next_nominal_head(doc, i + 1).unwrap_or(root)),
            Pos::Adjective => (Dep::Amod, next_nominal_head(doc, i + 1).unwrap_or(root)),
            Pos::Adposition => {
                let head = last_object.unwrap_or(root);
                pending_adp = Some(i);
                (Dep::Dep, head)
            }
            Pos::Noun | Pos::ProperNoun | Pos::Pronoun | Pos::Number => {
                let head_of_run = if pos == Pos::Pronoun || pos == Pos::Number {
                    i
                } else {
                    run_head(doc, i)
                };
                if head_of_run != i {
                    (Dep::Compound, head_of_run)
                } else if let Some(adp) = pending_adp.take() {
                    last_object = Some(i);
                    (Dep::Pobj, adp)
                } else if i < root {
                    (Dep::Nsubj, root)
                } else {
                    last_object = Some(i);
                    (Dep::Dobj, root)
                }
            }
            Pos::Verb => {
                pending_adp = None;
                (Dep::Aux, root)
            }
            Pos::Adverb | Pos::Particle => (Dep::Advmod, root),
            Pos::Conjunction | Pos::Other => (Dep::Dep, root),
        };
        doc.tokens[i].dep = dep;
        doc.tokens[i].head = head;
    }
}

fn mark_chunks(doc: &mut Doc) {
    let n = doc.tokens.len();
    let mut idx = 0;
    while idx < n {
        if doc.tokens[idx].pos.is_nominal() {
            let mut start = idx;
            while idx < n && doc.tokens[idx].pos.is_nominal() {
                idx += 1;
            }
            // absorb leading determiners and adjectives
            while start > 0
                && matches!(
                    doc.tokens[start - 1].pos,
                    Pos::Determiner | Pos::Adjective | Pos::Number
                )
            {
                start -= 1;
            }
            doc.chunks.push((start, idx));
        } else {
            idx += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotate(text: &str) -> Doc {
        EnglishAnnotator::new().annotate(text)
    }

    #[test]
    fn splits_contractions() {
        let doc = annotate("They wouldn't say.");
        let texts: Vec<&str> = doc.tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["They", "would", "n't", "say", "."]);
    }

    #[test]
    fn keeps_dotted_abbreviations_whole() {
        let doc = annotate("The U.S. went to the store.");
        assert!(doc.tokens.iter().any(|t| t.text == "U.S."));
    }

    #[test]
    fn finds_subject_of_root_verb() {
        let doc = annotate("The United States said they would leave.");
        let states = doc.tokens.iter().position(|t| t.text == "States").unwrap();
        let said = doc.tokens.iter().position(|t| t.text == "said").unwrap();
        assert_eq!(doc.tokens[states].dep, Dep::Nsubj);
        assert_eq!(doc.tokens[states].head, said);
        assert_eq!(doc.tokens[said].dep, Dep::Root);
    }

    #[test]
    fn multiword_entity_span_is_contiguous() {
        let doc = annotate("The United States said so.");
        assert_eq!(doc.entities.len(), 1);
        let span = &doc.entities[0];
        assert_eq!(doc.span_text(span.start, span.end), "United States");
        assert_eq!(span.label, "GPE");
    }

    #[test]
    fn sentences_split_on_terminators() {
        let doc = annotate("One ran. Two ran! Three ran?");
        assert_eq!(doc.sentences.len(), 3);
    }

    #[test]
    fn adposition_subtrees_nest_to_sentence_end() {
        let doc = annotate("I ran over the log with my car.");
        let over = doc.tokens.iter().position(|t| t.text == "over").unwrap();
        let subtree = doc.subtree(over);
        let text: String = subtree
            .iter()
            .map(|&i| {
                let t = &doc.tokens[i];
                format!("{}{}", t.text, if t.whitespace { " " } else { "" })
            })
            .collect();
        assert_eq!(text, "over the log with my car.");
    }
}
