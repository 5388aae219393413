use agora_core::tokenizer::{tokenize, Tokenizer};

#[test]
fn it_normalizes_and_stems() {
    let words = tokenize("Running Runners RUN! The café's menu.");
    // Stemming to "run" should appear
    assert!(words.contains(&"run".to_string()));
    // Unicode normalization keeps the accented letter as one token
    assert!(words.iter().any(|w| w.starts_with("caf")));
}

#[test]
fn it_filters_stopwords() {
    let words = tokenize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
}

#[test]
fn options_can_keep_raw_words() {
    let t = Tokenizer { stem: false, remove_stopwords: false, ..Default::default() };
    assert_eq!(t.terms("How does a Citizen Assembly work?"), vec!["how", "does", "citizen", "assembly", "work"]);
}

#[test]
fn fullwidth_forms_fold_under_nfkc() {
    let t = Tokenizer { stem: false, remove_stopwords: false, ..Default::default() };
    assert_eq!(t.terms("ＰＢ budget"), vec!["pb", "budget"]);
}
