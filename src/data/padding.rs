// ============================================================
// Layer 4 — Batch Padding
// ============================================================
// Recurrent layers consume a rectangular [batch, time] tensor, but
// every sequence in a batch has its own length. We right-pad each
// sequence with the padding id up to the longest one and keep the
// true lengths alongside so the encoder and the loss can ignore
// the padded positions.
//
// Example (pad id = 0):
//   [7 8 9]        →  [7 8 9 0 0]   len 3
//   [1 2 3 4 5]    →  [1 2 3 4 5]   len 5
//   [6 6]          →  [6 6 0 0 0]   len 2

/// A right-padded block of sequences with their true lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedSequences {
    /// One row per sequence, every row `max_len` long
    pub ids: Vec<Vec<usize>>,
    /// Unpadded length of each row
    pub lengths: Vec<usize>,
    /// Length of every row after padding (0 for an empty or all-empty batch)
    pub max_len: usize,
}

impl PaddedSequences {
    pub fn batch_size(&self) -> usize {
        self.ids.len()
    }

    /// Row-major ids as i32, the element type Burn expects for Int tensors.
    pub fn flat_ids(&self) -> Vec<i32> {
        self.ids
            .iter()
            .flat_map(|row| row.iter().map(|&id| id as i32))
            .collect()
    }

    /// Row-major 1.0 / 0.0 mask marking positions inside each true length.
    pub fn flat_mask(&self) -> Vec<f32> {
        self.lengths
            .iter()
            .flat_map(|&len| (0..self.max_len).map(move |t| if t < len { 1.0 } else { 0.0 }))
            .collect()
    }
}

/// Right-pad `sequences` with `pad_id` to the longest sequence in the batch.
pub fn pad_sequence_batch<S: AsRef<[usize]>>(sequences: &[S], pad_id: usize) -> PaddedSequences {
    let lengths: Vec<usize> = sequences.iter().map(|s| s.as_ref().len()).collect();
    let max_len = lengths.iter().copied().max().unwrap_or(0);

    let ids = sequences
        .iter()
        .map(|s| {
            let s = s.as_ref();
            let mut row = Vec::with_capacity(max_len);
            row.extend_from_slice(s);
            row.resize(max_len, pad_id);
            row
        })
        .collect();

    PaddedSequences { ids, lengths, max_len }
}
