// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing what the system works
// with: vocabularies, reserved symbols and sequence pairs.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits

// Token <-> id vocabularies and the reserved-symbol registry
pub mod vocab;

// Raw and encoded (source, target) pairs
pub mod pair;

// Core abstractions (traits) that other layers implement
pub mod traits;
