// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File-system concerns shared by the application layer:
//
//   checkpoint.rs  final weights (CompactRecorder), train config
//                  and vocabularies as JSON, loaded back by `infer`
//
//   metrics.rs     loss reports appended to metrics.csv

/// Training artifact saving and loading
pub mod checkpoint;

/// Loss report CSV logger
pub mod metrics;
