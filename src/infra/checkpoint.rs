// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Writes the artifacts of a finished training run and reads them
// back for inference. Nothing is written mid-training.
//
//   <dir>/
//     model.mpk.gz         final weights (CompactRecorder)
//     train_config.json    everything needed to rebuild the network
//     source_vocab.json    source tokens, index = id
//     target_vocab.json    target tokens, index = id
//
// CompactRecorder is type-safe: loading fails if the rebuilt
// network does not match the saved architecture.

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::domain::vocab::{Side, Vocabulary};
use crate::ml::model::Seq2SeqModel;

const MODEL_FILE:  &str = "model";
const CONFIG_FILE: &str = "train_config.json";

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create artifact directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save the final weights (the recorder appends `.mpk.gz`).
    pub fn save_model<B: Backend>(&self, model: &Seq2SeqModel<B>) -> Result<()> {
        let path = self.dir.join(MODEL_FILE);
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save model to '{}'", path.display()))?;
        tracing::debug!("Saved model weights to '{}'", path.display());
        Ok(())
    }

    /// Load saved weights into a network built with the same config.
    pub fn load_model<B: Backend>(
        &self,
        model:  Seq2SeqModel<B>,
        device: &B::Device,
    ) -> Result<Seq2SeqModel<B>> {
        let path = self.dir.join(MODEL_FILE);
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load model '{}'. Have you trained with --artifact-dir first?", path.display())
            })?;
        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!("Cannot read config from '{}'. Run 'train' before 'infer'.", path.display())
            })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config in '{}'", path.display()))
    }

    pub fn save_vocab(&self, side: Side, vocab: &Vocabulary) -> Result<()> {
        let path = self.vocab_path(side);
        fs::write(&path, serde_json::to_string(vocab)?)
            .with_context(|| format!("Cannot write {side} vocabulary to '{}'", path.display()))?;
        Ok(())
    }

    /// Fails if the stored token list is not a valid dense vocabulary.
    pub fn load_vocab(&self, side: Side) -> Result<Vocabulary> {
        let path = self.vocab_path(side);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read {side} vocabulary from '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid {side} vocabulary in '{}'", path.display()))
    }

    fn vocab_path(&self, side: Side) -> PathBuf {
        self.dir.join(format!("{side}_vocab.json"))
    }
}
