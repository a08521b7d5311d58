// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Cleans one line of corpus text and splits it into tokens.
//
// Cleaning steps (applied in order):
//   1. Replace Unicode whitespace variants and control chars with a space
//   2. Collapse runs of spaces into one
//   3. Trim leading/trailing whitespace
//
// Tokenisation is either per character (transliteration, letter
// sorting) or per whitespace-separated word (short translation).

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How a cleaned line is split into vocabulary tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Tokenization {
    /// Every character (including inner spaces) is a token
    #[default]
    Chars,
    /// Whitespace-separated words are tokens
    Words,
}

pub struct Preprocessor {
    tokenization: Tokenization,
}

impl Preprocessor {
    pub fn new(tokenization: Tokenization) -> Self {
        Self { tokenization }
    }

    pub fn tokenization(&self) -> Tokenization {
        self.tokenization
    }

    /// Normalise a single line of text.
    pub fn clean(&self, text: &str) -> String {
        let mut out        = String::with_capacity(text.len());
        let mut last_space = true; // swallows leading spaces

        for c in text.chars() {
            let c = match c {
                '\t' | '\u{00A0}' | '\u{200B}' | '\u{FEFF}' => ' ',
                c if c.is_control() => ' ',
                c => c,
            };
            if c == ' ' {
                if !last_space {
                    out.push(' ');
                }
                last_space = true;
            } else {
                out.push(c);
                last_space = false;
            }
        }

        out.trim_end().to_string()
    }

    /// Clean `text` and split it into tokens.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let cleaned = self.clean(text);
        match self.tokenization {
            Tokenization::Chars => cleaned.chars().map(|c| c.to_string()).collect(),
            Tokenization::Words => cleaned.split(' ').filter(|w| !w.is_empty()).map(str::to_string).collect(),
        }
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(Tokenization::default())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_multiple_spaces() {
        let p = Preprocessor::default();
        assert_eq!(p.clean("hello   world"), "hello world");
    }

    #[test]
    fn test_trims_edges() {
        let p = Preprocessor::default();
        assert_eq!(p.clean("  hello world \r"), "hello world");
    }

    #[test]
    fn test_removes_control_chars() {
        let p = Preprocessor::default();
        assert_eq!(p.clean("hello\x01world"), "hello world");
    }

    #[test]
    fn test_char_tokens_keep_inner_spaces() {
        let p = Preprocessor::new(Tokenization::Chars);
        assert_eq!(p.tokenize(" a b"), vec!["a", " ", "b"]);
    }

    #[test]
    fn test_word_tokens() {
        let p = Preprocessor::new(Tokenization::Words);
        assert_eq!(p.tokenize("the  cat\tsat "), vec!["the", "cat", "sat"]);
    }

    #[test]
    fn test_empty_string() {
        let p = Preprocessor::default();
        assert!(p.tokenize("").is_empty());
        assert!(p.tokenize("   ").is_empty());
    }
}
