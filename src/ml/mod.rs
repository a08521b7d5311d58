// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All network code lives here; the data layer only hands it
// padded batches.
//
//   model.rs      bidirectional LSTM encoder, LSTM decoder stack,
//                 masked sequence loss, greedy decoding
//   trainer.rs    Adam training loop with periodic loss reports
//   grad_clip.rs  gradient rescaling by the global norm
//   inferencer.rs single-sequence greedy translation
//   seq2seq.rs    façade tying vocabularies, symbols and model together

/// Encoder / decoder network
pub mod model;

/// Training loop and loss reports
pub mod trainer;

/// Greedy translation of one sequence
pub mod inferencer;

/// Vocabulary-aware model façade
pub mod seq2seq;

/// Global gradient norm clipping
pub mod grad_clip;
