// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands: `generate`, `train` and `infer`.
//
// Network defaults follow the classic letter-sorting setup:
// rnn_size 50, 2 layers, 15-dim embeddings, batch 128,
// 60 epochs, a report every 50 batches, lr 1e-3, clip 5.0.

use clap::{Args, Subcommand};

use crate::application::{
    backend::BackendKind,
    generate_use_case::GenerateConfig,
    train_use_case::TrainConfig,
};
use crate::data::preprocessor::Tokenization;
use crate::ml::trainer::ValidationMode;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a synthetic letter-sorting corpus
    Generate(GenerateArgs),

    /// Train a model on a parallel corpus
    Train(TrainArgs),

    /// Translate inputs with a trained model
    Infer(InferArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[arg(long, default_value = "data/letters.src")]
    pub source: String,

    #[arg(long, default_value = "data/letters.tgt")]
    pub target: String,

    /// Number of pairs to write
    #[arg(long, default_value_t = 10_000)]
    pub count: usize,

    #[arg(long, default_value_t = 3)]
    pub min_len: usize,

    #[arg(long, default_value_t = 8)]
    pub max_len: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<GenerateArgs> for GenerateConfig {
    fn from(a: GenerateArgs) -> Self {
        GenerateConfig {
            source_path: a.source,
            target_path: a.target,
            count:       a.count,
            min_len:     a.min_len,
            max_len:     a.max_len,
            seed:        a.seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Source side of the corpus, one sequence per line.
    /// Without --source/--target a letter-sorting corpus is generated in memory.
    #[arg(long, requires = "target")]
    pub source: Option<String>,

    /// Target side, line-aligned with --source
    #[arg(long, requires = "source")]
    pub target: Option<String>,

    /// Pairs to generate when no corpus files are given
    #[arg(long, default_value_t = 10_000)]
    pub synthetic_pairs: usize,

    #[arg(long, value_enum, default_value_t = Tokenization::Chars)]
    pub tokenization: Tokenization,

    /// Hidden size of every LSTM cell
    #[arg(long, default_value_t = 50)]
    pub rnn_size: usize,

    /// Stacked bidirectional encoder layers (the decoder gets twice as many cells)
    #[arg(long, default_value_t = 2)]
    pub n_layers: usize,

    #[arg(long, default_value_t = 15)]
    pub encoder_embedding_dim: usize,

    #[arg(long, default_value_t = 15)]
    pub decoder_embedding_dim: usize,

    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// Gradient norm clipping threshold
    #[arg(long, default_value_t = 5.0)]
    pub grad_clip: f64,

    #[arg(long, default_value_t = 60)]
    pub epochs: usize,

    /// Report losses every N batches
    #[arg(long, default_value_t = 50)]
    pub display_step: usize,

    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Held-out batches the test loss is computed on
    #[arg(long, value_enum, default_value_t = ValidationMode::FirstBatch)]
    pub validation: ValidationMode,

    /// Reshuffle training batches every epoch with this seed
    #[arg(long)]
    pub shuffle_seed: Option<u64>,

    /// Fraction of pairs used for training after a seeded shuffle.
    /// By default the first batch_size pairs are held out instead.
    #[arg(long)]
    pub train_fraction: Option<f64>,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Write weights, config, vocabularies and metrics.csv here
    #[arg(long)]
    pub artifact_dir: Option<String>,

    /// Inputs translated after training
    #[arg(long = "sample", default_values_t = ["common".to_string(), "apple".to_string(), "zhedong".to_string()])]
    pub samples: Vec<String>,

    #[arg(long, value_enum, default_value_t = BackendKind::Wgpu)]
    pub backend: BackendKind,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            source_path:           a.source,
            target_path:           a.target,
            synthetic_pairs:       a.synthetic_pairs,
            tokenization:          a.tokenization,
            rnn_size:              a.rnn_size,
            n_layers:              a.n_layers,
            encoder_embedding_dim: a.encoder_embedding_dim,
            decoder_embedding_dim: a.decoder_embedding_dim,
            batch_size:            a.batch_size,
            grad_clip:             a.grad_clip,
            epochs:                a.epochs,
            display_step:          a.display_step,
            learning_rate:         a.lr,
            validation:            a.validation,
            shuffle_seed:          a.shuffle_seed,
            train_fraction:        a.train_fraction,
            seed:                  a.seed,
            artifact_dir:          a.artifact_dir,
            samples:               a.samples,
            backend:               a.backend,
        }
    }
}

#[derive(Args, Debug)]
pub struct InferArgs {
    /// Directory written by `train --artifact-dir`
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: String,

    /// Override the backend recorded at training time
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Sequences to translate
    #[arg(required = true)]
    pub inputs: Vec<String>,
}
