// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Two ways to hold out validation pairs:
//
//   split_leading    the first `n` pairs become validation, in order.
//                    With n = batch_size this yields exactly one
//                    fixed validation batch, the classic setup for
//                    small transduction corpora.
//
//   split_train_val  seeded Fisher-Yates shuffle, then a fractional
//                    split (e.g. 0.9 → 90% train / 10% validation).

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Move the first `n` samples into the validation set.
/// Returns (train, validation).
pub fn split_leading<T>(mut samples: Vec<T>, n: usize) -> (Vec<T>, Vec<T>) {
    let n     = n.min(samples.len());
    let train = samples.split_off(n);
    (train, samples)
}

/// Shuffle `samples` with `seed` and split into (train, validation).
pub fn split_train_val<T>(mut samples: Vec<T>, train_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total    = samples.len();
    let split_at = ((total as f64) * train_fraction).round() as usize;
    let split_at = split_at.min(total);

    let val = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation ({}% / {}%)",
        samples.len(),
        val.len(),
        (samples.len() * 100) / total.max(1),
        (val.len()     * 100) / total.max(1),
    );

    (samples, val)
}
