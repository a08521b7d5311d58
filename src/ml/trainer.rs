// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Teacher-forced training with Adam and global gradient norm clipping.
//
// Per epoch:
//   for (local_step, batch) in train batches:
//       loss  = masked cross-entropy(model(batch))
//       model = adam.step(lr, model, clip_global_norm(grad(loss)))
//       if local_step % display_step == 0:
//           report train loss + validation loss
//
// Notes on Burn 0.20:
//   - Training runs on B (an AutodiffBackend)
//   - model.valid() returns the model on B::InnerBackend, so
//     validation batches are built for the inner backend
//   - validation batches are padded once before the first epoch
//
// The "Batch" column of a report is the 0-based local step.

use std::fmt;

use anyhow::{ensure, Result};
use burn::{
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use clap::ValueEnum;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::{
    batcher::{PairBatch, PairPadder, Seq2SeqBatch, Seq2SeqBatcher},
    dataset::PairDataset,
    iterator::Batches,
};
use crate::domain::vocab::Symbols;
use crate::infra::metrics::MetricsLogger;
use crate::ml::grad_clip::clip_global_norm;
use crate::ml::model::{Seq2SeqConfig, Seq2SeqModel};

/// Which held-out batches a report's test loss is computed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationMode {
    /// The first full batch of the validation set, every time
    #[default]
    FirstBatch,
    /// Mean over every full validation batch
    Full,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitOptions {
    pub epochs:        usize,
    pub display_step:  usize,
    pub learning_rate: f64,
    pub validation:    ValidationMode,
    /// Reshuffle the training order every epoch when set
    pub shuffle_seed:  Option<u64>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            epochs:        60,
            display_step:  50,
            learning_rate: 1e-3,
            validation:    ValidationMode::FirstBatch,
            shuffle_seed:  None,
        }
    }
}

/// One progress report, printed as
/// `Epoch 1/60 | Batch 0/78 | train_loss: 3.412 | test_loss: 3.398`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossReport {
    pub epoch:         usize,
    pub total_epochs:  usize,
    pub batch:         usize,
    pub total_batches: usize,
    pub train_loss:    f64,
    pub test_loss:     f64,
}

impl fmt::Display for LossReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Epoch {}/{} | Batch {}/{} | train_loss: {:.3} | test_loss: {:.3}",
            self.epoch, self.total_epochs, self.batch, self.total_batches,
            self.train_loss, self.test_loss,
        )
    }
}

/// Train `model` and hand it back together with every loss report.
#[allow(clippy::too_many_arguments)]
pub fn fit<B: AutodiffBackend>(
    mut model:  Seq2SeqModel<B>,
    config:     &Seq2SeqConfig,
    symbols:    &Symbols,
    train:      &PairDataset,
    validation: &PairDataset,
    options:    &FitOptions,
    device:     &B::Device,
    metrics:    Option<&MetricsLogger>,
) -> Result<(Seq2SeqModel<B>, Vec<LossReport>)> {
    let batch_size = config.batch_size;
    ensure!(options.display_step > 0, "display_step must be at least 1");
    ensure!(
        train.pairs().len() >= batch_size,
        "training set has {} pairs, fewer than one batch of {}",
        train.pairs().len(), batch_size,
    );

    // ── Held-out batches (InnerBackend — no autodiff overhead) ───────────────
    let val_batches = validation_batches::<B::InnerBackend>(validation, symbols, batch_size, options.validation, device)?;

    // ── Adam optimiser; clipping happens on the whole gradient before each step
    let mut optim = AdamConfig::new().init();

    let batcher       = Seq2SeqBatcher::new(*symbols);
    let layout        = Batches::new(train, batch_size);
    let total_batches = layout.num_batches();
    let mut reports   = Vec::new();

    tracing::info!(
        "Training on {} pairs: {} batches of {} per epoch, {} dropped",
        train.pairs().len(), total_batches, batch_size, layout.dropped(),
    );

    // ── Epoch loop ───────────────────────────────────────────────────────────
    for epoch in 1..=options.epochs {
        let batches = match options.shuffle_seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(epoch as u64));
                Batches::shuffled(train, batch_size, &mut rng)
            }
            None => Batches::new(train, batch_size),
        };

        for (local_step, batch) in batches.iter::<B, _, Seq2SeqBatch<B>>(&batcher, device).enumerate() {
            if batch.target_max_len() == 0 {
                tracing::warn!("Skipping batch {} of epoch {}: every target is empty", local_step, epoch);
                continue;
            }

            let loss = model.forward_loss(&batch);
            let train_loss: f64 = loss.clone().into_scalar().elem::<f64>();

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            let grads = clip_global_norm::<B, _>(&model, grads, config.grad_clip);
            model = optim.step(options.learning_rate, model, grads);

            if local_step % options.display_step == 0 {
                let report = LossReport {
                    epoch,
                    total_epochs: options.epochs,
                    batch: local_step,
                    total_batches,
                    train_loss,
                    test_loss: validation_loss(&model.valid(), &val_batches),
                };
                println!("{report}");
                if let Some(logger) = metrics {
                    logger.log(&report)?;
                }
                reports.push(report);
            }
        }
        tracing::debug!("Epoch {} finished", epoch);
    }

    tracing::info!("Training complete!");
    Ok((model, reports))
}

/// Pad the validation pairs into full batches on the inner backend.
fn validation_batches<B: Backend>(
    validation: &PairDataset,
    symbols:    &Symbols,
    batch_size: usize,
    mode:       ValidationMode,
    device:     &B::Device,
) -> Result<Vec<Seq2SeqBatch<B>>> {
    ensure!(
        validation.pairs().len() >= batch_size,
        "validation set has {} pairs, fewer than one batch of {}",
        validation.pairs().len(), batch_size,
    );

    let padder  = PairPadder::new(*symbols);
    let batcher = Seq2SeqBatcher::new(*symbols);
    let batches = Batches::new(validation, batch_size);
    let padded  = batches.iter::<B, _, PairBatch>(&padder, device);

    let keep = match mode {
        ValidationMode::FirstBatch => 1,
        ValidationMode::Full       => batches.num_batches(),
    };
    Ok(padded
        .take(keep)
        .filter(|b| b.target.max_len > 0)
        .map(|b| batcher.to_tensors::<B>(&b, device))
        .collect())
}

/// Mean loss over `batches`; NaN when there is nothing to score.
fn validation_loss<B: Backend>(model: &Seq2SeqModel<B>, batches: &[Seq2SeqBatch<B>]) -> f64 {
    if batches.is_empty() {
        return f64::NAN;
    }
    let sum: f64 = batches
        .iter()
        .map(|b| model.forward_loss(b).into_scalar().elem::<f64>())
        .sum();
    sum / batches.len() as f64
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    use crate::domain::pair::SequencePair;
    use crate::domain::vocab::ReservedIds;

    type TestBackend = Autodiff<NdArray>;

    const RESERVED: ReservedIds = ReservedIds { go: 0, eos: 1, pad: 2, unk: 3 };

    fn symbols() -> Symbols {
        Symbols { source: RESERVED, target: RESERVED }
    }

    fn dataset(n: usize) -> PairDataset {
        PairDataset::new(
            (0..n)
                .map(|i| {
                    let len = 1 + i % 3;
                    let source: Vec<usize> = (0..len).map(|t| 4 + (i + t) % 4).collect();
                    let mut target: Vec<usize> = source.iter().rev().copied().collect();
                    target.push(1);
                    SequencePair::new(source, target)
                })
                .collect(),
        )
    }

    fn config() -> Seq2SeqConfig {
        Seq2SeqConfig::new(6, 1, 4, 4, 4)
    }

    #[test]
    fn test_report_line_format() {
        let report = LossReport {
            epoch: 3, total_epochs: 60, batch: 50, total_batches: 78,
            train_loss: 1.23456, test_loss: 0.5,
        };
        assert_eq!(
            report.to_string(),
            "Epoch 3/60 | Batch 50/78 | train_loss: 1.235 | test_loss: 0.500",
        );
    }

    #[test]
    fn test_fit_option_defaults() {
        let opts = FitOptions::default();
        assert_eq!(opts.epochs, 60);
        assert_eq!(opts.display_step, 50);
        assert_eq!(opts.learning_rate, 1e-3);
        assert_eq!(opts.validation, ValidationMode::FirstBatch);
        assert!(opts.shuffle_seed.is_none());
    }

    #[test]
    fn test_fit_reports_every_display_step() {
        let device = Default::default();
        let cfg    = config();
        let model: Seq2SeqModel<TestBackend> = cfg.init(8, 8, &device);

        // 18 pairs / batch 4 → 4 batches per epoch, 2 dropped
        let options = FitOptions { epochs: 2, display_step: 2, ..FitOptions::default() };
        let (_, reports) = fit(model, &cfg, &symbols(), &dataset(18), &dataset(8), &options, &device, None).unwrap();

        // steps 0 and 2 in each of 2 epochs
        assert_eq!(reports.len(), 4);
        assert_eq!(reports[1].batch, 2);
        assert_eq!(reports[2].epoch, 2);
        assert!(reports.iter().all(|r| r.total_batches == 4 && r.total_epochs == 2));
        assert!(reports.iter().all(|r| r.train_loss.is_finite() && r.test_loss.is_finite()));
    }

    #[test]
    fn test_fit_full_validation_and_shuffle() {
        let device = Default::default();
        let cfg    = config();
        let model: Seq2SeqModel<TestBackend> = cfg.init(8, 8, &device);

        let options = FitOptions {
            epochs: 1,
            display_step: 1,
            validation: ValidationMode::Full,
            shuffle_seed: Some(7),
            ..FitOptions::default()
        };
        let (_, reports) = fit(model, &cfg, &symbols(), &dataset(8), &dataset(12), &options, &device, None).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.test_loss.is_finite()));
    }

    #[test]
    fn test_fit_rejects_short_validation_set() {
        let device = Default::default();
        let cfg    = config();
        let model: Seq2SeqModel<TestBackend> = cfg.init(8, 8, &device);

        let err = fit(model, &cfg, &symbols(), &dataset(8), &dataset(3), &FitOptions::default(), &device, None)
            .unwrap_err();
        assert!(err.to_string().contains("validation set"));
    }

    #[test]
    fn test_fit_rejects_zero_display_step() {
        let device = Default::default();
        let cfg    = config();
        let model: Seq2SeqModel<TestBackend> = cfg.init(8, 8, &device);

        let options = FitOptions { display_step: 0, ..FitOptions::default() };
        assert!(fit(model, &cfg, &symbols(), &dataset(8), &dataset(8), &options, &device, None).is_err());
    }

    #[test]
    fn test_training_lowers_the_loss() {
        let device = Default::default();
        let cfg    = Seq2SeqConfig::new(16, 1, 8, 8, 4);
        let model: Seq2SeqModel<TestBackend> = cfg.init(8, 8, &device);

        let options = FitOptions { epochs: 40, display_step: 1, learning_rate: 1e-2, ..FitOptions::default() };
        let (_, reports) = fit(model, &cfg, &symbols(), &dataset(16), &dataset(4), &options, &device, None).unwrap();
        assert_eq!(reports.len(), 160);

        let mean = |epoch: usize| {
            let losses: Vec<f64> = reports.iter().filter(|r| r.epoch == epoch).map(|r| r.train_loss).collect();
            losses.iter().sum::<f64>() / losses.len() as f64
        };
        assert!(mean(40) < 0.5 * mean(1), "train loss {} → {}", mean(1), mean(40));
        assert!(reports[159].test_loss < reports[0].test_loss);
    }

    #[test]
    fn test_first_batch_validation_ignores_later_pairs() {
        let device = Default::default();
        let model: Seq2SeqModel<NdArray> = config().init(8, 8, &device);

        let twelve = validation_batches::<NdArray>(&dataset(12), &symbols(), 4, ValidationMode::FirstBatch, &device).unwrap();
        let four   = validation_batches::<NdArray>(&dataset(4), &symbols(), 4, ValidationMode::FirstBatch, &device).unwrap();
        let all    = validation_batches::<NdArray>(&dataset(12), &symbols(), 4, ValidationMode::Full, &device).unwrap();
        assert_eq!(twelve.len(), 1);
        assert_eq!(all.len(), 3);

        let a = validation_loss(&model, &twelve);
        let b = validation_loss(&model, &four);
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_fit_reports_the_same_test_loss_for_any_validation_tail() {
        let device = Default::default();
        let cfg    = config();
        let model: Seq2SeqModel<TestBackend> = cfg.init(8, 8, &device);
        let options = FitOptions { epochs: 2, display_step: 1, ..FitOptions::default() };

        let (_, long)  = fit(model.clone(), &cfg, &symbols(), &dataset(8), &dataset(12), &options, &device, None).unwrap();
        let (_, short) = fit(model, &cfg, &symbols(), &dataset(8), &dataset(4), &options, &device, None).unwrap();

        assert_eq!(long.len(), short.len());
        for (l, s) in long.iter().zip(&short) {
            assert!((l.test_loss - s.test_loss).abs() < 1e-6, "{} != {}", l.test_loss, s.test_loss);
        }
    }
}
