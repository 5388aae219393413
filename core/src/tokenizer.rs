use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*|\p{N}+").expect("valid regex");
    static ref VECTORIZER_WORD: Regex = Regex::new(r"(?u)\b\w\w+\b").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "tell","than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// How raw text is split into tokens before stopwords and stemming apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPattern {
    /// NFKC-normalized words starting with a letter, or digit runs.
    Words,
    /// Runs of two or more `\w` characters on plain lowercased text, the
    /// classic TF-IDF vectorizer pattern.
    Vectorizer,
}

/// Term extraction shared by index build and query vectorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tokenizer {
    pub stem: bool,
    pub remove_stopwords: bool,
    pub pattern: TokenPattern,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self { stem: true, remove_stopwords: true, pattern: TokenPattern::Words }
    }
}

impl Tokenizer {
    /// Lowercased tokens with no stopword removal and no stemming.
    pub fn vectorizer() -> Self {
        Self { stem: false, remove_stopwords: false, pattern: TokenPattern::Vectorizer }
    }

    /// Lowercase, split into tokens, drop stopwords and single-character
    /// tokens, then stem. Order of appearance is preserved.
    pub fn terms(&self, text: &str) -> Vec<String> {
        let (normalized, word) = match self.pattern {
            TokenPattern::Words => (text.nfkc().collect::<String>().to_lowercase(), &*WORD),
            TokenPattern::Vectorizer => (text.to_lowercase(), &*VECTORIZER_WORD),
        };
        let mut out = Vec::new();
        for mat in word.find_iter(&normalized) {
            let token = mat.as_str();
            if token.chars().count() < 2 { continue; }
            if self.remove_stopwords && STOPWORDS.contains(token) { continue; }
            let term = if self.stem { STEMMER.stem(token).into_owned() } else { token.to_string() };
            out.push(term);
        }
        out
    }
}

/// Terms under the default tokenizer.
pub fn tokenize(text: &str) -> Vec<String> {
    Tokenizer::default().terms(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Running, runner's run!");
        assert!(t.iter().any(|w| w == "run"));
    }

    #[test]
    fn single_chars_dropped() {
        let t = Tokenizer { stem: false, remove_stopwords: false, ..Default::default() }.terms("a b deliberation x 2 42");
        assert_eq!(t, vec!["deliberation", "42"]);
    }

    #[test]
    fn vectorizer_pattern_keeps_word_runs() {
        let t = Tokenizer::vectorizer().terms("Citizens' Assembly on 3d_maps, a 42 x");
        assert_eq!(t, vec!["citizens", "assembly", "on", "3d_maps", "42"]);
    }

    #[test]
    fn question_words_removed() {
        let t = tokenize("What is participatory budgeting?");
        assert_eq!(t.len(), 2);
        assert_eq!(t[1], "budget");
    }
}
