// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Greedy decoding of a single source sequence.
//
// The network runs at the batch size it was built with, so the
// input is replicated into every row and row 0 is read back.
// Decoding stops at the first <EOS> or after 2 * source length steps.

use std::fmt;

use anyhow::{ensure, Result};
use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::vocab::{Symbols, Vocabulary};
use crate::ml::model::Seq2SeqModel;

/// Source ids/tokens and the predicted target ids/tokens (EOS included when emitted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub source_ids:    Vec<usize>,
    pub source_tokens: Vec<String>,
    pub target_ids:    Vec<usize>,
    pub target_tokens: Vec<String>,
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "Source")?;
        writeln!(f, "Word: {:?}", self.source_ids)?;
        writeln!(f, "IN: {}", self.source_tokens.join(" "))?;
        writeln!(f)?;
        writeln!(f, "Target")?;
        writeln!(f, "Word: {:?}", self.target_ids)?;
        write!(f, "OUT: {}", self.target_tokens.join(" "))
    }
}

/// Decode `tokens` with `model`, replicated across `batch_size` rows.
pub fn translate<B: Backend, S: AsRef<str>>(
    model:        &Seq2SeqModel<B>,
    source_vocab: &Vocabulary,
    target_vocab: &Vocabulary,
    symbols:      &Symbols,
    batch_size:   usize,
    tokens:       &[S],
    device:       &B::Device,
) -> Result<Translation> {
    ensure!(!tokens.is_empty(), "cannot translate an empty sequence");
    ensure!(batch_size > 0, "batch_size must be at least 1");

    let source_ids = source_vocab.encode(tokens, symbols.source.unk);
    let len        = source_ids.len();

    let row: Vec<i32> = source_ids.iter().map(|&id| id as i32).collect();
    let flat          = row.repeat(batch_size);
    let source = Tensor::<B, 1, Int>::from_ints(flat.as_slice(), device).reshape([batch_size, len]);

    let decoded = model.greedy_decode(
        source,
        &vec![len; batch_size],
        symbols.target.go,
        symbols.target.eos,
        2 * len,
    );
    let target_ids = decoded.into_iter().next().unwrap_or_default();
    tracing::debug!("Decoded {} tokens from a {}-token source", target_ids.len(), len);

    Ok(Translation {
        source_tokens: source_vocab.decode(&source_ids),
        target_tokens: target_vocab.decode(&target_ids),
        source_ids,
        target_ids,
    })
}
