// ============================================================
// Layer 3 — Vocabulary and Reserved Symbols
// ============================================================
// A Vocabulary is a dense, bidirectional token <-> id mapping.
// Source and target each get their own vocabulary.
//
// Every vocabulary must contain four reserved tokens:
//   <GO>   start of a decoded sequence
//   <EOS>  end of a sequence
//   <PAD>  fills sequences up to the batch length
//   <UNK>  stands in for any out-of-vocabulary token
//
// Symbols resolves those four ids once for each side so the
// batching and decoding code never looks them up by string.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const GO_TOKEN:  &str = "<GO>";
pub const EOS_TOKEN: &str = "<EOS>";
pub const PAD_TOKEN: &str = "<PAD>";
pub const UNK_TOKEN: &str = "<UNK>";

/// Reserved tokens in the order `Vocabulary::build` assigns them.
pub const RESERVED_TOKENS: [&str; 4] = [GO_TOKEN, EOS_TOKEN, PAD_TOKEN, UNK_TOKEN];

/// Which vocabulary an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Source,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => write!(f, "source"),
            Side::Target => write!(f, "target"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VocabError {
    #[error("{side} vocabulary is missing reserved token {token}")]
    MissingReserved { side: Side, token: &'static str },

    #[error("token id {id} for {token:?} is outside the dense range 0..{len}")]
    IdOutOfRange { token: String, id: usize, len: usize },

    #[error("tokens {first:?} and {second:?} share id {id}")]
    DuplicateId { id: usize, first: String, second: String },
}

/// Dense token <-> id mapping. Ids run from 0 to `len - 1` with no gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    id_to_token: Vec<String>,
    token_to_id: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from every distinct token in `corpus`.
    /// The reserved tokens take ids 0..4, corpus tokens follow in sorted order.
    pub fn build<'a, I, S>(corpus: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = &'a String>,
    {
        let distinct: BTreeSet<&String> = corpus.into_iter().flatten().collect();

        let mut id_to_token: Vec<String> =
            RESERVED_TOKENS.iter().map(|t| t.to_string()).collect();
        id_to_token.extend(
            distinct
                .into_iter()
                .filter(|t| !RESERVED_TOKENS.contains(&t.as_str()))
                .cloned(),
        );

        Self::from_ordered(id_to_token)
    }

    /// Validate an externally supplied token -> id mapping.
    /// Ids must be unique and cover `0..map.len()` exactly.
    pub fn from_token_ids(map: HashMap<String, usize>) -> Result<Self, VocabError> {
        let len = map.len();
        let mut slots: Vec<Option<String>> = vec![None; len];

        for (token, &id) in &map {
            if id >= len {
                return Err(VocabError::IdOutOfRange { token: token.clone(), id, len });
            }
            if let Some(existing) = &slots[id] {
                return Err(VocabError::DuplicateId {
                    id,
                    first:  existing.clone(),
                    second: token.clone(),
                });
            }
            slots[id] = Some(token.clone());
        }

        // len distinct ids in 0..len means every slot is filled
        let id_to_token = slots.into_iter().flatten().collect();
        Ok(Self { id_to_token, token_to_id: map })
    }

    fn from_ordered(id_to_token: Vec<String>) -> Self {
        let token_to_id = id_to_token
            .iter()
            .enumerate()
            .map(|(id, t)| (t.clone(), id))
            .collect();
        Self { id_to_token, token_to_id }
    }

    pub fn len(&self) -> usize {
        self.id_to_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_token.is_empty()
    }

    pub fn id(&self, token: &str) -> Option<usize> {
        self.token_to_id.get(token).copied()
    }

    pub fn token(&self, id: usize) -> Option<&str> {
        self.id_to_token.get(id).map(String::as_str)
    }

    /// Map tokens to ids, sending anything unknown to `unk_id`.
    pub fn encode<S: AsRef<str>>(&self, tokens: &[S], unk_id: usize) -> Vec<usize> {
        tokens
            .iter()
            .map(|t| self.id(t.as_ref()).unwrap_or(unk_id))
            .collect()
    }

    /// Map ids back to tokens. Ids outside the vocabulary render as `<UNK>`.
    pub fn decode(&self, ids: &[usize]) -> Vec<String> {
        ids.iter()
            .map(|&id| self.token(id).unwrap_or(UNK_TOKEN).to_string())
            .collect()
    }
}

impl TryFrom<Vec<String>> for Vocabulary {
    type Error = VocabError;

    fn try_from(tokens: Vec<String>) -> Result<Self, Self::Error> {
        let map = tokens.into_iter().enumerate().map(|(id, t)| (t, id)).collect::<HashMap<_, _>>();
        Self::from_token_ids(map)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(v: Vocabulary) -> Self {
        v.id_to_token
    }
}

/// The four reserved ids of one vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedIds {
    pub go:  usize,
    pub eos: usize,
    pub pad: usize,
    pub unk: usize,
}

impl ReservedIds {
    pub fn resolve(vocab: &Vocabulary, side: Side) -> Result<Self, VocabError> {
        let lookup = |token: &'static str| {
            vocab.id(token).ok_or(VocabError::MissingReserved { side, token })
        };
        Ok(Self {
            go:  lookup(GO_TOKEN)?,
            eos: lookup(EOS_TOKEN)?,
            pad: lookup(PAD_TOKEN)?,
            unk: lookup(UNK_TOKEN)?,
        })
    }
}

/// Reserved ids for both sides, resolved once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbols {
    pub source: ReservedIds,
    pub target: ReservedIds,
}

impl Symbols {
    pub fn register(source: &Vocabulary, target: &Vocabulary) -> Result<Self, VocabError> {
        Ok(Self {
            source: ReservedIds::resolve(source, Side::Source)?,
            target: ReservedIds::resolve(target, Side::Target)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(words: &[&str]) -> Vec<Vec<String>> {
        words
            .iter()
            .map(|w| w.chars().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_build_puts_reserved_tokens_first() {
        let corpus = chars(&["cab", "bad"]);
        let vocab  = Vocabulary::build(&corpus);

        assert_eq!(vocab.id(GO_TOKEN),  Some(0));
        assert_eq!(vocab.id(EOS_TOKEN), Some(1));
        assert_eq!(vocab.id(PAD_TOKEN), Some(2));
        assert_eq!(vocab.id(UNK_TOKEN), Some(3));
        // a, b, c, d in sorted order after the reserved block
        assert_eq!(vocab.len(), 8);
        assert_eq!(vocab.token(4), Some("a"));
        assert_eq!(vocab.token(7), Some("d"));
    }

    #[test]
    fn test_round_trip_is_identity_for_known_tokens() {
        let corpus = chars(&["hello", "world"]);
        let vocab  = Vocabulary::build(&corpus);
        let unk    = vocab.id(UNK_TOKEN).unwrap();

        for id in 0..vocab.len() {
            let token = vocab.token(id).unwrap();
            assert_eq!(vocab.id(token), Some(id));
        }

        let tokens: Vec<String> = "hold".chars().map(|c| c.to_string()).collect();
        let ids = vocab.encode(&tokens, unk);
        assert_eq!(vocab.decode(&ids), tokens);
    }

    #[test]
    fn test_unknown_tokens_map_to_unk() {
        let corpus = chars(&["abc"]);
        let vocab  = Vocabulary::build(&corpus);
        let unk    = vocab.id(UNK_TOKEN).unwrap();

        let ids = vocab.encode(&["a", "z", "?"], unk);
        assert_eq!(ids, vec![vocab.id("a").unwrap(), unk, unk]);
    }

    #[test]
    fn test_from_token_ids_rejects_gaps() {
        let map: HashMap<String, usize> =
            [("a".to_string(), 0), ("b".to_string(), 2)].into_iter().collect();
        let err = Vocabulary::from_token_ids(map).unwrap_err();
        assert!(matches!(err, VocabError::IdOutOfRange { id: 2, len: 2, .. }));
    }

    #[test]
    fn test_from_token_ids_rejects_shared_ids() {
        let map: HashMap<String, usize> =
            [("a".to_string(), 0), ("b".to_string(), 0)].into_iter().collect();
        let err = Vocabulary::from_token_ids(map).unwrap_err();
        assert!(matches!(err, VocabError::DuplicateId { id: 0, .. }));
    }

    #[test]
    fn test_register_fails_on_missing_reserved_token() {
        let source = Vocabulary::build(&chars(&["ab"]));
        let map: HashMap<String, usize> = [
            (GO_TOKEN.to_string(), 0),
            (EOS_TOKEN.to_string(), 1),
            (UNK_TOKEN.to_string(), 2),
            ("x".to_string(), 3),
        ]
        .into_iter()
        .collect();
        let target = Vocabulary::from_token_ids(map).unwrap();

        let err = Symbols::register(&source, &target).unwrap_err();
        assert_eq!(err, VocabError::MissingReserved { side: Side::Target, token: PAD_TOKEN });
    }

    #[test]
    fn test_register_resolves_each_side_independently() {
        let source = Vocabulary::build(&chars(&["ab"]));
        let map: HashMap<String, usize> = [
            ("x".to_string(), 0),
            (PAD_TOKEN.to_string(), 1),
            (UNK_TOKEN.to_string(), 2),
            (EOS_TOKEN.to_string(), 3),
            (GO_TOKEN.to_string(), 4),
        ]
        .into_iter()
        .collect();
        let target = Vocabulary::from_token_ids(map).unwrap();

        let symbols = Symbols::register(&source, &target).unwrap();
        assert_eq!(symbols.source, ReservedIds { go: 0, eos: 1, pad: 2, unk: 3 });
        assert_eq!(symbols.target, ReservedIds { go: 4, eos: 3, pad: 1, unk: 2 });
    }

    #[test]
    fn test_serde_round_trip_keeps_ids() {
        let vocab = Vocabulary::build(&chars(&["xyz"]));
        let json  = serde_json::to_string(&vocab).unwrap();
        let back: Vocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vocab);
    }
}
