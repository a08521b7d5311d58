// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers; no model math and no argument
// parsing here.
//
//   generate_use_case  write a synthetic letter-sorting corpus
//   train_use_case     corpus → vocabularies → training → artifacts
//   infer_use_case     artifacts → greedy translations

/// Run-time backend choice
pub mod backend;

/// Synthetic corpus generation
pub mod generate_use_case;

/// The training workflow
pub mod train_use_case;

/// The inference workflow
pub mod infer_use_case;
