// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer loads training text through CorpusSource
// so it never depends on where the pairs come from.
//
// Implementations:
//   - ParallelTextLoader → two line-aligned text files
//   - SyntheticCorpus    → generated letter-sorting examples

use anyhow::Result;
use crate::domain::pair::TextPair;

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Any component that can supply raw (source, target) text pairs.
pub trait CorpusSource {
    /// Load every available pair, in corpus order.
    fn load_pairs(&self) -> Result<Vec<TextPair>>;
}
