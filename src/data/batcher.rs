// ============================================================
// Layer 4 — Seq2Seq Batchers
// ============================================================
// Implements Burn's Batcher trait twice:
//
//   PairPadder      Vec<SequencePair> → PairBatch       (host-side)
//   Seq2SeqBatcher  Vec<SequencePair> → Seq2SeqBatch<B> (tensors)
//
// PairBatch is the padded (source, target, source_lengths,
// target_lengths) tuple. Seq2SeqBatch adds what the training
// step needs on the device:
//
//   source        [batch, src_len]  right-padded with the source <PAD>
//   target        [batch, tgt_len]  right-padded with the target <PAD>
//   decoder_input [batch, tgt_len]  <GO> followed by target minus its last column
//   target_mask   [batch, tgt_len]  1.0 inside each true length, 0.0 on padding
//
// Example (tgt_len = 4, <GO> = 0, <PAD> = 2):
//   target        [5 6 1 2]
//   decoder_input [0 5 6 1]
//   target_mask   [1 1 1 0]

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::padding::{pad_sequence_batch, PaddedSequences};
use crate::domain::pair::SequencePair;
use crate::domain::vocab::Symbols;

// ─── PairBatch ────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairBatch {
    pub source: PaddedSequences,
    pub target: PaddedSequences,
}

impl PairBatch {
    /// Pad sources with the source <PAD> id and targets with the target <PAD> id.
    pub fn from_pairs(pairs: &[SequencePair], symbols: &Symbols) -> Self {
        let sources: Vec<&[usize]> = pairs.iter().map(|p| p.source.as_slice()).collect();
        let targets: Vec<&[usize]> = pairs.iter().map(|p| p.target.as_slice()).collect();
        Self {
            source: pad_sequence_batch(&sources, symbols.source.pad),
            target: pad_sequence_batch(&targets, symbols.target.pad),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.source.batch_size()
    }

    /// Teacher-forcing input: <GO> then every target row minus its last position.
    pub fn decoder_input(&self, go_id: usize) -> Vec<i32> {
        let width = self.target.max_len;
        self.target
            .ids
            .iter()
            .flat_map(|row| {
                std::iter::once(go_id as i32)
                    .chain(row.iter().take(width.saturating_sub(1)).map(|&id| id as i32))
                    .take(width)
            })
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct PairPadder {
    symbols: Symbols,
}

impl PairPadder {
    pub fn new(symbols: Symbols) -> Self {
        Self { symbols }
    }
}

impl<B: Backend> Batcher<B, SequencePair, PairBatch> for PairPadder {
    fn batch(&self, items: Vec<SequencePair>, _device: &B::Device) -> PairBatch {
        PairBatch::from_pairs(&items, &self.symbols)
    }
}

// ─── Seq2SeqBatch ─────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct Seq2SeqBatch<B: Backend> {
    pub source:         Tensor<B, 2, Int>,
    pub source_lengths: Vec<usize>,
    pub target:         Tensor<B, 2, Int>,
    pub decoder_input:  Tensor<B, 2, Int>,
    pub target_mask:    Tensor<B, 2>,
    pub target_lengths: Vec<usize>,
}

impl<B: Backend> Seq2SeqBatch<B> {
    pub fn target_max_len(&self) -> usize {
        self.target_lengths.iter().copied().max().unwrap_or(0)
    }
}

#[derive(Clone, Debug)]
pub struct Seq2SeqBatcher {
    symbols: Symbols,
}

impl Seq2SeqBatcher {
    pub fn new(symbols: Symbols) -> Self {
        Self { symbols }
    }

    /// Move a padded host batch onto `device`.
    pub fn to_tensors<B: Backend>(&self, batch: &PairBatch, device: &B::Device) -> Seq2SeqBatch<B> {
        let batch_size = batch.batch_size();
        let src_len    = batch.source.max_len;
        let tgt_len    = batch.target.max_len;

        let source = Tensor::<B, 1, Int>::from_ints(batch.source.flat_ids().as_slice(), device)
            .reshape([batch_size, src_len]);
        let target = Tensor::<B, 1, Int>::from_ints(batch.target.flat_ids().as_slice(), device)
            .reshape([batch_size, tgt_len]);
        let decoder_input = Tensor::<B, 1, Int>::from_ints(
            batch.decoder_input(self.symbols.target.go).as_slice(), device,
        ).reshape([batch_size, tgt_len]);
        let target_mask = Tensor::<B, 1>::from_floats(batch.target.flat_mask().as_slice(), device)
            .reshape([batch_size, tgt_len]);

        Seq2SeqBatch {
            source,
            source_lengths: batch.source.lengths.clone(),
            target,
            decoder_input,
            target_mask,
            target_lengths: batch.target.lengths.clone(),
        }
    }
}

impl<B: Backend> Batcher<B, SequencePair, Seq2SeqBatch<B>> for Seq2SeqBatcher {
    fn batch(&self, items: Vec<SequencePair>, device: &B::Device) -> Seq2SeqBatch<B> {
        let host = PairBatch::from_pairs(&items, &self.symbols);
        self.to_tensors(&host, device)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vocab::ReservedIds;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn symbols() -> Symbols {
        let ids = ReservedIds { go: 0, eos: 1, pad: 2, unk: 3 };
        Symbols { source: ids, target: ids }
    }

    fn pairs() -> Vec<SequencePair> {
        vec![
            SequencePair::new(vec![7, 8, 9], vec![5, 6, 1]),
            SequencePair::new(vec![4], vec![1]),
        ]
    }

    #[test]
    fn test_decoder_input_shifts_right_behind_go() {
        let batch = PairBatch::from_pairs(&pairs(), &symbols());
        assert_eq!(batch.decoder_input(0), vec![0, 5, 6, 0, 1, 2]);
    }

    #[test]
    fn test_decoder_input_of_empty_targets_is_empty() {
        let empty = vec![SequencePair::new(vec![4], vec![]); 2];
        let batch = PairBatch::from_pairs(&empty, &symbols());
        assert!(batch.decoder_input(0).is_empty());
    }

    #[test]
    fn test_tensor_shapes_and_mask() {
        let device  = <TestBackend as Backend>::Device::default();
        let batcher = Seq2SeqBatcher::new(symbols());
        let batch   = Batcher::<TestBackend, _, Seq2SeqBatch<TestBackend>>::batch(&batcher, pairs(), &device);

        assert_eq!(batch.source.dims(), [2, 3]);
        assert_eq!(batch.target.dims(), [2, 3]);
        assert_eq!(batch.decoder_input.dims(), [2, 3]);
        assert_eq!(batch.source_lengths, vec![3, 1]);
        assert_eq!(batch.target_lengths, vec![3, 1]);
        assert_eq!(batch.target_max_len(), 3);

        let mask: Vec<f32> = batch.target_mask.into_data().iter::<f32>().collect();
        assert_eq!(mask, vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0]);

        let source: Vec<i64> = batch.source.into_data().iter::<i64>().collect();
        assert_eq!(source, vec![7, 8, 9, 4, 2, 2]);
    }

    #[test]
    fn test_padder_uses_each_sides_pad_id() {
        let symbols = Symbols {
            source: ReservedIds { go: 0, eos: 1, pad: 2, unk: 3 },
            target: ReservedIds { go: 0, eos: 1, pad: 9, unk: 3 },
        };
        let padder = PairPadder::new(symbols);
        let device = <TestBackend as Backend>::Device::default();
        let batch  = Batcher::<TestBackend, _, PairBatch>::batch(&padder, pairs(), &device);

        assert_eq!(batch.source.ids[1], vec![4, 2, 2]);
        assert_eq!(batch.target.ids[1], vec![1, 9, 9]);
    }
}
