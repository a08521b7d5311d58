// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands off to Layer 2.
//
//   generate  write a synthetic letter-sorting corpus
//   train     fit a model, print progress and sample translations
//   infer     load saved artifacts and translate inputs

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, GenerateArgs, InferArgs, TrainArgs};

use crate::application::{
    generate_use_case::GenerateUseCase,
    infer_use_case::InferUseCase,
    train_use_case::TrainUseCase,
};

#[derive(Parser, Debug)]
#[command(
    name = "seq2seq-birnn",
    version,
    about = "Bidirectional LSTM encoder / LSTM decoder for sequence transduction."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Generate(args) => run_generate(args),
            Commands::Train(args)    => run_train(args),
            Commands::Infer(args)    => run_infer(args),
        }
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let written = GenerateUseCase::new(args.into()).execute()?;
    println!("Wrote {written} pairs.");
    Ok(())
}

fn run_train(args: TrainArgs) -> Result<()> {
    match (&args.source, &args.target) {
        (Some(src), Some(tgt)) => tracing::info!("Starting training on '{}' -> '{}'", src, tgt),
        _ => tracing::info!("Starting training on {} generated pairs", args.synthetic_pairs),
    }

    let outcome = TrainUseCase::new(args.into()).execute()?;
    for translation in &outcome.translations {
        println!("{translation}");
    }
    Ok(())
}

fn run_infer(args: InferArgs) -> Result<()> {
    let use_case = InferUseCase::new(&args.artifact_dir, args.backend)?;
    for translation in use_case.execute(&args.inputs)? {
        println!("{translation}");
    }
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{backend::BackendKind, train_use_case::TrainConfig};
    use crate::ml::trainer::ValidationMode;

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["seq2seq-birnn", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };

        let cfg: TrainConfig = args.into();
        let def = TrainConfig::default();
        assert_eq!(cfg.rnn_size, def.rnn_size);
        assert_eq!(cfg.batch_size, def.batch_size);
        assert_eq!(cfg.epochs, def.epochs);
        assert_eq!(cfg.display_step, def.display_step);
        assert_eq!(cfg.learning_rate, def.learning_rate);
        assert_eq!(cfg.samples, def.samples);
        assert_eq!(cfg.validation, ValidationMode::FirstBatch);
    }

    #[test]
    fn test_train_flags() {
        let cli = Cli::try_parse_from([
            "seq2seq-birnn", "train",
            "--source", "a.txt", "--target", "b.txt",
            "--validation", "full", "--backend", "cpu",
            "--sample", "xyz",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };

        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.source_path.as_deref(), Some("a.txt"));
        assert_eq!(cfg.validation, ValidationMode::Full);
        assert_eq!(cfg.backend, BackendKind::Cpu);
        assert_eq!(cfg.samples, vec!["xyz"]);
    }

    #[test]
    fn test_source_without_target_is_rejected() {
        assert!(Cli::try_parse_from(["seq2seq-birnn", "train", "--source", "a.txt"]).is_err());
    }

    #[test]
    fn test_infer_needs_inputs() {
        assert!(Cli::try_parse_from(["seq2seq-birnn", "infer"]).is_err());
        assert!(Cli::try_parse_from(["seq2seq-birnn", "infer", "hello"]).is_ok());
    }
}
