// ============================================================
// Layer 5 — Seq2Seq Façade
// ============================================================
// Owns everything a trained network needs:
//
//   config        network hyperparameters (batch size included)
//   vocabularies  source and target token <-> id mappings
//   symbols       reserved ids, resolved once here
//   model         parameters on the autodiff backend B
//
// Construction fails if either vocabulary lacks a reserved token.

use anyhow::{ensure, Result};
use burn::{module::AutodiffModule, prelude::*, tensor::backend::AutodiffBackend};

use crate::data::dataset::PairDataset;
use crate::domain::vocab::{Symbols, Vocabulary};
use crate::infra::metrics::MetricsLogger;
use crate::ml::{
    inferencer::{translate, Translation},
    model::{Seq2SeqConfig, Seq2SeqModel},
    trainer::{fit, FitOptions, LossReport},
};

pub struct Seq2Seq<B: AutodiffBackend> {
    config:       Seq2SeqConfig,
    source_vocab: Vocabulary,
    target_vocab: Vocabulary,
    symbols:      Symbols,
    model:        Seq2SeqModel<B>,
    device:       B::Device,
}

impl<B: AutodiffBackend> Seq2Seq<B> {
    /// Resolve the reserved ids and initialise fresh parameters.
    pub fn new(
        config:       Seq2SeqConfig,
        source_vocab: Vocabulary,
        target_vocab: Vocabulary,
        device:       B::Device,
    ) -> Result<Self> {
        ensure!(config.batch_size > 0, "batch_size must be at least 1");
        ensure!(config.n_layers > 0, "n_layers must be at least 1");
        let symbols = Symbols::register(&source_vocab, &target_vocab)?;
        let model   = config.init(source_vocab.len(), target_vocab.len(), &device);
        tracing::info!(
            "Model ready: {} bidirectional layers, rnn_size={}, vocab {} -> {}",
            config.n_layers, config.rnn_size, source_vocab.len(), target_vocab.len(),
        );
        Ok(Self { config, source_vocab, target_vocab, symbols, model, device })
    }

    pub fn source_vocab(&self) -> &Vocabulary {
        &self.source_vocab
    }

    pub fn target_vocab(&self) -> &Vocabulary {
        &self.target_vocab
    }

    pub fn symbols(&self) -> &Symbols {
        &self.symbols
    }

    pub fn model(&self) -> &Seq2SeqModel<B> {
        &self.model
    }

    /// Swap in parameters restored from disk.
    pub fn with_model(mut self, model: Seq2SeqModel<B>) -> Self {
        self.model = model;
        self
    }

    pub fn fit(
        &mut self,
        train:      &PairDataset,
        validation: &PairDataset,
        options:    &FitOptions,
        metrics:    Option<&MetricsLogger>,
    ) -> Result<Vec<LossReport>> {
        let (model, reports) = fit(
            self.model.clone(),
            &self.config,
            &self.symbols,
            train,
            validation,
            options,
            &self.device,
            metrics,
        )?;
        self.model = model;
        Ok(reports)
    }

    /// Greedy-decode one token sequence on the inner backend.
    pub fn infer<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Translation> {
        translate(
            &self.model.valid(),
            &self.source_vocab,
            &self.target_vocab,
            &self.symbols,
            self.config.batch_size,
            tokens,
            &self.device,
        )
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use burn::backend::{Autodiff, NdArray};

    use crate::data::preprocessor::{Preprocessor, Tokenization};
    use crate::domain::pair::TextPair;
    use crate::domain::vocab::{VocabError, GO_TOKEN, EOS_TOKEN, UNK_TOKEN};

    type TestBackend = Autodiff<NdArray>;

    fn words() -> Vec<TextPair> {
        ["dcba", "bad", "cab", "abc", "dab", "cd", "ba", "db"]
            .iter()
            .map(|w| {
                let mut sorted: Vec<char> = w.chars().collect();
                sorted.sort_unstable();
                TextPair::new(*w, sorted.into_iter().collect::<String>())
            })
            .collect()
    }

    #[test]
    fn test_fit_then_infer() {
        let pre   = Preprocessor::new(Tokenization::Chars);
        let pairs = words();
        let tokens: Vec<Vec<String>> = pairs.iter().map(|p| pre.tokenize(&p.source)).collect();
        let vocab = Vocabulary::build(&tokens);

        let config = Seq2SeqConfig::new(8, 1, 4, 4, 4);
        let mut s2s: Seq2Seq<TestBackend> =
            Seq2Seq::new(config, vocab.clone(), vocab, Default::default()).unwrap();

        let data = PairDataset::encode(&pairs, &pre, s2s.source_vocab(), s2s.target_vocab(), s2s.symbols());
        let options = FitOptions { epochs: 2, display_step: 1, ..FitOptions::default() };
        let reports = s2s.fit(&data, &data, &options, None).unwrap();
        // 8 pairs / 4 → 2 batches, each reported, over 2 epochs
        assert_eq!(reports.len(), 4);

        let t = s2s.infer(&pre.tokenize("cab")).unwrap();
        assert_eq!(t.source_tokens, vec!["c", "a", "b"]);
        assert!(t.target_ids.len() <= 6);
        assert!(s2s.infer::<&str>(&[]).is_err());
    }

    #[test]
    fn test_new_rejects_vocab_without_pad() {
        let source = Vocabulary::build(&[vec!["a".to_string()]]);
        let map: HashMap<String, usize> = [GO_TOKEN, EOS_TOKEN, UNK_TOKEN]
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect();
        let target = Vocabulary::from_token_ids(map).unwrap();

        let err = Seq2Seq::<TestBackend>::new(Seq2SeqConfig::new(4, 1, 2, 2, 2), source, target, Default::default())
            .err()
            .unwrap();
        assert!(matches!(err.downcast_ref::<VocabError>(), Some(VocabError::MissingReserved { .. })));
    }

    #[test]
    fn test_new_rejects_zero_batch_size() {
        let vocab = Vocabulary::build(&[vec!["a".to_string()]]);
        let err = Seq2Seq::<TestBackend>::new(Seq2SeqConfig::new(4, 1, 2, 2, 0), vocab.clone(), vocab, Default::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn test_new_rejects_zero_layers() {
        let vocab = Vocabulary::build(&[vec!["a".to_string()]]);
        assert!(Seq2Seq::<TestBackend>::new(Seq2SeqConfig::new(4, 0, 2, 2, 2), vocab.clone(), vocab, Default::default()).is_err());
    }
}
