// ============================================================
// Layer 4 — Batch Iterator
// ============================================================
// Slices a dataset into consecutive fixed-size batches.
//
//   105 pairs, batch_size 10 → batches [0..10), [10..20), ... [90..100)
//                              pairs 100..104 are dropped
//
// The recurrent graph is built for one batch size, so a trailing
// partial batch is never yielded. Batches come out in dataset order
// unless an explicit shuffled order is requested.
//
// `Batches` only describes the slicing; every call to `iter()` starts
// a fresh lazy pass, so the same value is reused across epochs.

use std::marker::PhantomData;

use burn::{
    data::{dataloader::batcher::Batcher, dataset::Dataset},
    prelude::*,
};
use rand::{seq::SliceRandom, Rng};

use crate::domain::pair::SequencePair;

pub struct Batches<'a, D> {
    dataset:    &'a D,
    batch_size: usize,
    order:      Option<Vec<usize>>,
}

impl<'a, D: Dataset<SequencePair>> Batches<'a, D> {
    /// # Panics
    /// Panics if `batch_size` is zero.
    pub fn new(dataset: &'a D, batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch_size must be at least 1");
        Self { dataset, batch_size, order: None }
    }

    /// Same slicing over a random permutation of the dataset.
    pub fn shuffled<R: Rng>(dataset: &'a D, batch_size: usize, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..dataset.len()).collect();
        order.shuffle(rng);
        Self { order: Some(order), ..Self::new(dataset, batch_size) }
    }

    pub fn num_batches(&self) -> usize {
        self.dataset.len() / self.batch_size
    }

    /// Pairs left over after the last full batch.
    pub fn dropped(&self) -> usize {
        self.dataset.len() % self.batch_size
    }

    /// Start a lazy pass, turning each chunk into `O` with `batcher`.
    pub fn iter<'b, B, T, O>(&'b self, batcher: &'b T, device: &B::Device) -> BatchIter<'b, B, D, T, O>
    where
        B: Backend,
        T: Batcher<B, SequencePair, O>,
    {
        BatchIter {
            dataset:    self.dataset,
            order:      self.order.as_deref(),
            batch_size: self.batch_size,
            cursor:     0,
            total:      self.num_batches(),
            batcher,
            device:     device.clone(),
            _output:    PhantomData,
        }
    }
}

pub struct BatchIter<'b, B: Backend, D, T, O> {
    dataset:    &'b D,
    order:      Option<&'b [usize]>,
    batch_size: usize,
    cursor:     usize,
    total:      usize,
    batcher:    &'b T,
    device:     B::Device,
    _output:    PhantomData<fn() -> O>,
}

impl<B, D, T, O> Iterator for BatchIter<'_, B, D, T, O>
where
    B: Backend,
    D: Dataset<SequencePair>,
    T: Batcher<B, SequencePair, O>,
{
    type Item = O;

    fn next(&mut self) -> Option<O> {
        if self.cursor >= self.total {
            return None;
        }
        let start = self.cursor * self.batch_size;
        self.cursor += 1;

        let items: Vec<SequencePair> = (start..start + self.batch_size)
            .filter_map(|i| {
                let index = self.order.map_or(i, |order| order[i]);
                self.dataset.get(index)
            })
            .collect();
        Some(self.batcher.batch(items, &self.device))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.cursor;
        (remaining, Some(remaining))
    }
}

impl<B, D, T, O> ExactSizeIterator for BatchIter<'_, B, D, T, O>
where
    B: Backend,
    D: Dataset<SequencePair>,
    T: Batcher<B, SequencePair, O>,
{
}
