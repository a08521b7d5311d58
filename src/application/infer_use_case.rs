// ============================================================
// Layer 2 — InferUseCase
// ============================================================
// Rebuilds a trained network from an artifact directory:
//
//   train_config.json  → tokenisation, hyperparameters, backend
//   *_vocab.json       → source / target vocabularies
//   model.mpk.gz       → final weights
//
// then greedy-translates each input line.

use anyhow::{ensure, Result};
use std::path::Path;
use burn::tensor::backend::AutodiffBackend;

use crate::application::backend::{BackendKind, CpuBackend, WgpuBackend};
use crate::application::train_use_case::TrainConfig;
use crate::data::preprocessor::Preprocessor;
use crate::domain::vocab::Side;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{inferencer::Translation, seq2seq::Seq2Seq};

pub struct InferUseCase {
    store:   CheckpointManager,
    config:  TrainConfig,
    backend: BackendKind,
}

impl InferUseCase {
    /// `backend` overrides the one recorded at training time.
    pub fn new(artifact_dir: &str, backend: Option<BackendKind>) -> Result<Self> {
        ensure!(Path::new(artifact_dir).is_dir(), "artifact directory '{artifact_dir}' does not exist");
        let store   = CheckpointManager::new(artifact_dir)?;
        let config  = store.load_config()?;
        let backend = backend.unwrap_or(config.backend);
        Ok(Self { store, config, backend })
    }

    pub fn execute(&self, inputs: &[String]) -> Result<Vec<Translation>> {
        match self.backend {
            BackendKind::Wgpu => self.run::<WgpuBackend>(burn::backend::wgpu::WgpuDevice::default(), inputs),
            BackendKind::Cpu  => self.run::<CpuBackend>(Default::default(), inputs),
        }
    }

    fn run<B: AutodiffBackend>(&self, device: B::Device, inputs: &[String]) -> Result<Vec<Translation>> {
        let source_vocab = self.store.load_vocab(Side::Source)?;
        let target_vocab = self.store.load_vocab(Side::Target)?;

        let s2s: Seq2Seq<B> =
            Seq2Seq::new(self.config.model_config(), source_vocab, target_vocab, device.clone())?;
        let model = self.store.load_model(s2s.model().clone(), &device)?;
        let s2s   = s2s.with_model(model);
        tracing::info!("Model loaded from '{}'", self.store.dir().display());

        let preprocessor = Preprocessor::new(self.config.tokenization);
        inputs
            .iter()
            .map(|line| {
                let translation = s2s.infer(&preprocessor.tokenize(line))?;
                tracing::debug!("{:?} → {:?}", line, translation.target_tokens);
                Ok(translation)
            })
            .collect()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainUseCase;

    #[test]
    fn test_infer_from_trained_artifacts() {
        let dir = std::env::temp_dir().join(format!("seq2seq_infer_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let dir = dir.to_string_lossy().into_owned();

        let cfg = TrainConfig {
            synthetic_pairs:       24,
            rnn_size:              6,
            n_layers:              1,
            encoder_embedding_dim: 3,
            decoder_embedding_dim: 3,
            batch_size:            4,
            epochs:                1,
            display_step:          5,
            samples:               vec![],
            backend:               BackendKind::Cpu,
            artifact_dir:          Some(dir.clone()),
            ..TrainConfig::default()
        };
        TrainUseCase::new(cfg).execute().unwrap();
        assert!(std::path::Path::new(&dir).join("metrics.csv").exists());

        let use_case = InferUseCase::new(&dir, None).unwrap();
        let out = use_case.execute(&["abc".to_string(), "hello".to_string()]).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out[1].target_ids.len() <= 10);

        assert!(use_case.execute(&["   ".to_string()]).is_err());
    }

    #[test]
    fn test_missing_artifacts_are_reported() {
        let dir = std::env::temp_dir().join(format!("seq2seq_infer_empty_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        assert!(InferUseCase::new(&dir.to_string_lossy(), None).is_err());
    }
}
