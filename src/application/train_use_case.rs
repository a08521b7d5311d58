// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the training pipeline in order:
//
//   Step 1: Load text pairs              (Layer 4 - data)
//   Step 2: Tokenise, build vocabularies (Layer 3/4)
//   Step 3: Build the network            (Layer 5 - ml)
//   Step 4: Encode and split             (Layer 4 - data)
//   Step 5: Train                        (Layer 5 - ml)
//   Step 6: Translate the sample inputs  (Layer 5 - ml)
//   Step 7: Save artifacts, if asked     (Layer 6 - infra)

use anyhow::{bail, ensure, Result};
use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};

use crate::application::backend::{BackendKind, CpuBackend, WgpuBackend};
use crate::data::{
    dataset::PairDataset,
    loader::ParallelTextLoader,
    preprocessor::{Preprocessor, Tokenization},
    splitter::{split_leading, split_train_val},
    synthetic::SyntheticCorpus,
};
use crate::domain::{
    pair::TextPair,
    traits::CorpusSource,
    vocab::{Side, Vocabulary},
};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::{
    inferencer::Translation,
    model::Seq2SeqConfig,
    seq2seq::Seq2Seq,
    trainer::{FitOptions, LossReport, ValidationMode},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Everything a run needs. Saved as train_config.json so `infer`
// can rebuild the same network and tokenisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Line-aligned corpus files; both unset means a generated corpus
    pub source_path:           Option<String>,
    pub target_path:           Option<String>,
    pub synthetic_pairs:       usize,
    pub tokenization:          Tokenization,
    pub rnn_size:              usize,
    pub n_layers:              usize,
    pub encoder_embedding_dim: usize,
    pub decoder_embedding_dim: usize,
    pub batch_size:            usize,
    pub grad_clip:             f64,
    pub epochs:                usize,
    pub display_step:          usize,
    pub learning_rate:         f64,
    pub validation:            ValidationMode,
    pub shuffle_seed:          Option<u64>,
    /// Fraction kept for training; unset holds out the first batch
    pub train_fraction:        Option<f64>,
    pub seed:                  u64,
    pub artifact_dir:          Option<String>,
    /// Inputs translated once training finishes
    pub samples:               Vec<String>,
    pub backend:               BackendKind,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            source_path:           None,
            target_path:           None,
            synthetic_pairs:       10_000,
            tokenization:          Tokenization::Chars,
            rnn_size:              50,
            n_layers:              2,
            encoder_embedding_dim: 15,
            decoder_embedding_dim: 15,
            batch_size:            128,
            grad_clip:             5.0,
            epochs:                60,
            display_step:          50,
            learning_rate:         1e-3,
            validation:            ValidationMode::FirstBatch,
            shuffle_seed:          None,
            train_fraction:        None,
            seed:                  42,
            artifact_dir:          None,
            samples:               vec!["common".to_string(), "apple".to_string(), "zhedong".to_string()],
            backend:               BackendKind::Wgpu,
        }
    }
}

impl TrainConfig {
    pub fn model_config(&self) -> Seq2SeqConfig {
        Seq2SeqConfig::new(
            self.rnn_size,
            self.n_layers,
            self.encoder_embedding_dim,
            self.decoder_embedding_dim,
            self.batch_size,
        )
        .with_grad_clip(self.grad_clip)
    }

    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            epochs:        self.epochs,
            display_step:  self.display_step,
            learning_rate: self.learning_rate,
            validation:    self.validation,
            shuffle_seed:  self.shuffle_seed,
        }
    }

    fn corpus(&self) -> Result<Box<dyn CorpusSource>> {
        match (&self.source_path, &self.target_path) {
            (Some(src), Some(tgt)) => Ok(Box::new(ParallelTextLoader::new(src, tgt))),
            (None, None) => Ok(Box::new(SyntheticCorpus::new(self.synthetic_pairs, 3, 8, self.seed))),
            _ => bail!("--source and --target must be given together"),
        }
    }
}

/// What a finished run hands back to the CLI.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub reports:      Vec<LossReport>,
    pub translations: Vec<Translation>,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainOutcome> {
        match self.config.backend {
            BackendKind::Wgpu => {
                let device = burn::backend::wgpu::WgpuDevice::default();
                tracing::info!("Using WGPU device: {:?}", device);
                self.run::<WgpuBackend>(device)
            }
            BackendKind::Cpu => self.run::<CpuBackend>(Default::default()),
        }
    }

    fn run<B: AutodiffBackend>(&self, device: B::Device) -> Result<TrainOutcome> {
        let cfg = &self.config;
        ensure!(cfg.batch_size > 0, "batch_size must be at least 1");

        // ── Step 1: Load raw pairs ───────────────────────────────────────────
        let pairs = cfg.corpus()?.load_pairs()?;
        tracing::info!("Loaded {} text pairs", pairs.len());

        // ── Step 2: Vocabularies, one per side ───────────────────────────────
        let preprocessor = Preprocessor::new(cfg.tokenization);
        let (source_vocab, target_vocab) = build_vocabularies(&pairs, &preprocessor);
        tracing::info!(
            "Vocabulary sizes ({:?} tokens): source {}, target {}",
            preprocessor.tokenization(), source_vocab.len(), target_vocab.len(),
        );

        // ── Step 3: Network ──────────────────────────────────────────────────
        let mut model: Seq2Seq<B> =
            Seq2Seq::new(cfg.model_config(), source_vocab, target_vocab, device)?;

        // ── Step 4: Encode, hold out validation pairs ────────────────────────
        let encoded = PairDataset::encode(
            &pairs, &preprocessor, model.source_vocab(), model.target_vocab(), model.symbols(),
        ).into_pairs();
        let (train, validation) = match cfg.train_fraction {
            Some(fraction) => split_train_val(encoded, fraction, cfg.seed),
            None           => split_leading(encoded, cfg.batch_size),
        };
        tracing::info!("Split: {} train, {} validation", train.len(), validation.len());
        let train      = PairDataset::new(train);
        let validation = PairDataset::new(validation);

        let store = cfg.artifact_dir.as_deref().map(CheckpointManager::new).transpose()?;
        let metrics = store.as_ref().map(|s| MetricsLogger::new(s.dir())).transpose()?;
        if let Some(logger) = &metrics {
            tracing::info!("Appending loss reports to '{}'", logger.csv_path().display());
        }

        // ── Step 5: Train ────────────────────────────────────────────────────
        let reports = model.fit(&train, &validation, &cfg.fit_options(), metrics.as_ref())?;

        // ── Step 6: Sample translations ──────────────────────────────────────
        let translations = cfg
            .samples
            .iter()
            .map(|s| model.infer(&preprocessor.tokenize(s)))
            .collect::<Result<Vec<_>>>()?;

        // ── Step 7: Artifacts ────────────────────────────────────────────────
        if let Some(store) = &store {
            store.save_model(model.model())?;
            store.save_config(cfg)?;
            store.save_vocab(Side::Source, model.source_vocab())?;
            store.save_vocab(Side::Target, model.target_vocab())?;
            tracing::info!("Artifacts written to '{}'", store.dir().display());
        }

        Ok(TrainOutcome { reports, translations })
    }
}

fn build_vocabularies(pairs: &[TextPair], preprocessor: &Preprocessor) -> (Vocabulary, Vocabulary) {
    let sources: Vec<Vec<String>> = pairs.iter().map(|p| preprocessor.tokenize(&p.source)).collect();
    let targets: Vec<Vec<String>> = pairs.iter().map(|p| preprocessor.tokenize(&p.target)).collect();
    (Vocabulary::build(&sources), Vocabulary::build(&targets))
}
