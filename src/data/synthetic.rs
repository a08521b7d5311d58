// ============================================================
// Layer 4 — Synthetic Letter-Sorting Corpus
// ============================================================
// The classic toy task for this model: the source is a random
// lowercase word, the target is the same letters in sorted order.
//
//   "common" → "cmmnoo"
//   "hello"  → "ehllo"
//
// It needs no external data, exercises variable-length padding
// (word lengths vary), and a working model reaches near-zero loss,
// which makes it a good smoke test for the whole pipeline.

use anyhow::{ensure, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::domain::pair::TextPair;
use crate::domain::traits::CorpusSource;

pub struct SyntheticCorpus {
    count:   usize,
    min_len: usize,
    max_len: usize,
    seed:    u64,
}

impl SyntheticCorpus {
    pub fn new(count: usize, min_len: usize, max_len: usize, seed: u64) -> Self {
        Self { count, min_len, max_len, seed }
    }
}

impl CorpusSource for SyntheticCorpus {
    fn load_pairs(&self) -> Result<Vec<TextPair>> {
        ensure!(
            self.min_len >= 1 && self.min_len <= self.max_len,
            "word length range {}..={} is empty",
            self.min_len,
            self.max_len
        );

        let mut rng = StdRng::seed_from_u64(self.seed);
        let pairs = (0..self.count)
            .map(|_| {
                let len = rng.gen_range(self.min_len..=self.max_len);
                let word: String = (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect();
                TextPair::new(word.clone(), sorted_letters(&word))
            })
            .collect();
        Ok(pairs)
    }
}

pub fn sorted_letters(word: &str) -> String {
    let mut letters: Vec<char> = word.chars().collect();
    letters.sort_unstable();
    letters.into_iter().collect()
}
