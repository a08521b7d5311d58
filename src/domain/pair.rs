// ============================================================
// Layer 3 — Sequence Pair Domain Types
// ============================================================
// A transduction example is a (source, target) pair.
// TextPair is the raw form read from disk; SequencePair is
// the same example after tokenisation and id lookup.
//
// Example (letter sorting, character level):
//   TextPair     { source: "common", target: "cmmnoo" }
//   SequencePair { source: [6, 14, 12, 12, 14, 13],
//                  target: [6, 12, 12, 13, 14, 14, 1] }   ← <EOS> = 1

use serde::{Deserialize, Serialize};

/// One line-aligned example before tokenisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPair {
    pub source: String,
    pub target: String,
}

impl TextPair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// One example as vocabulary ids. Lengths vary between pairs;
/// padding happens only when pairs are grouped into a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencePair {
    pub source: Vec<usize>,
    pub target: Vec<usize>,
}

impl SequencePair {
    pub fn new(source: Vec<usize>, target: Vec<usize>) -> Self {
        Self { source, target }
    }
}
