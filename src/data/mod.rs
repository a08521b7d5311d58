// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw text files to device-ready batches.
//
//   source/target text files      (or the synthetic corpus)
//       │
//       ▼
//   ParallelTextLoader   → line-aligned TextPairs
//       │
//       ▼
//   Preprocessor         → cleaned lines split into tokens
//       │
//       ▼
//   PairDataset          → id sequences, <EOS> appended to targets
//       │
//       ▼
//   Batches              → consecutive fixed-size chunks, remainder dropped
//       │
//       ▼
//   Seq2SeqBatcher       → right-padded tensors + lengths + target mask

/// Loads line-aligned source/target files
pub mod loader;

/// Generates the letter-sorting toy corpus
pub mod synthetic;

/// Cleans and tokenises raw lines
pub mod preprocessor;

/// Implements Burn's Dataset trait for encoded pairs
pub mod dataset;

/// Right-pads variable-length sequences
pub mod padding;

/// Implements Burn's Batcher trait for padded host and tensor batches
pub mod batcher;

/// Lazy, restartable fixed-size batch iteration
pub mod iterator;

/// Splits pairs into train/validation sets
pub mod splitter;
