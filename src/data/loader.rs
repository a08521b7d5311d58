// ============================================================
// Layer 4 — Parallel Text Loader
// ============================================================
// Loads a transduction corpus stored as two line-aligned files:
//
//   letters_source.txt      letters_target.txt
//   ──────────────────      ──────────────────
//   common                  cmmnoo
//   apple                   aelpp
//   ...                     ...
//
// Line N of the source file pairs with line N of the target file.
// Trailing blank lines are ignored; any other line count mismatch
// is an error.

use anyhow::{bail, Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::domain::pair::TextPair;
use crate::domain::traits::CorpusSource;

pub struct ParallelTextLoader {
    source_path: PathBuf,
    target_path: PathBuf,
}

impl ParallelTextLoader {
    pub fn new(source_path: impl Into<PathBuf>, target_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            target_path: target_path.into(),
        }
    }
}

impl CorpusSource for ParallelTextLoader {
    fn load_pairs(&self) -> Result<Vec<TextPair>> {
        let source = read_lines(&self.source_path)?;
        let target = read_lines(&self.target_path)?;

        if source.len() != target.len() {
            bail!(
                "'{}' has {} lines but '{}' has {}",
                self.source_path.display(),
                source.len(),
                self.target_path.display(),
                target.len()
            );
        }

        let pairs: Vec<TextPair> = source
            .into_iter()
            .zip(target)
            .map(|(s, t)| TextPair::new(s, t))
            .collect();

        tracing::info!(
            "Loaded {} pairs from '{}' / '{}'",
            pairs.len(),
            self.source_path.display(),
            self.target_path.display()
        );
        Ok(pairs)
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read corpus file '{}'", path.display()))?;

    let mut lines: Vec<String> = text
        .lines()
        .map(|l| l.trim_end_matches('\r').to_string())
        .collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    Ok(lines)
}
