use burn::data::dataset::Dataset;

use crate::data::preprocessor::Preprocessor;
use crate::domain::pair::{SequencePair, TextPair};
use crate::domain::vocab::{Symbols, Vocabulary};

/// Encoded (source, target) pairs in corpus order.
#[derive(Debug, Clone, Default)]
pub struct PairDataset {
    pairs: Vec<SequencePair>,
}

impl PairDataset {
    pub fn new(pairs: Vec<SequencePair>) -> Self {
        Self { pairs }
    }

    /// Tokenise and encode raw text pairs. Unknown tokens become `<UNK>`
    /// and every target gets `<EOS>` appended so the decoder learns to stop.
    pub fn encode(
        pairs:        &[TextPair],
        preprocessor: &Preprocessor,
        source_vocab: &Vocabulary,
        target_vocab: &Vocabulary,
        symbols:      &Symbols,
    ) -> Self {
        let pairs = pairs
            .iter()
            .map(|p| {
                let source = source_vocab.encode(&preprocessor.tokenize(&p.source), symbols.source.unk);
                let mut target = target_vocab.encode(&preprocessor.tokenize(&p.target), symbols.target.unk);
                target.push(symbols.target.eos);
                SequencePair::new(source, target)
            })
            .collect();
        Self { pairs }
    }

    pub fn pairs(&self) -> &[SequencePair] {
        &self.pairs
    }

    pub fn into_pairs(self) -> Vec<SequencePair> {
        self.pairs
    }
}

impl Dataset<SequencePair> for PairDataset {
    fn get(&self, index: usize) -> Option<SequencePair> {
        self.pairs.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.pairs.len()
    }
}
