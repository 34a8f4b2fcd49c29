//! Per-cycle selection of candidates to act on.

use crate::candidates::Candidate;
use rand::seq::SliceRandom;
use rand::Rng;
use refresharr_common::SelectionOrder;
use std::collections::HashSet;
use std::fmt;

/// Per-cycle cap on the number of items acted on.
///
/// Zero and negative configuration values mean "no cap".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    Unlimited,
    Limit(usize),
}

impl Quota {
    pub fn from_config(value: i64) -> Self {
        if value <= 0 {
            Self::Unlimited
        } else {
            Self::Limit(value as usize)
        }
    }

    pub fn is_reached(&self, done: usize) -> bool {
        match self {
            Self::Unlimited => false,
            Self::Limit(limit) => done >= *limit,
        }
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => write!(f, "unlimited"),
            Self::Limit(limit) => write!(f, "{}", limit),
        }
    }
}

/// Index order over `len` candidates.
pub fn permutation<R: Rng + ?Sized>(len: usize, order: SelectionOrder, rng: &mut R) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..len).collect();
    if order == SelectionOrder::Randomized {
        indices.shuffle(rng);
    }
    indices
}

/// Lazily yields unprocessed, eligible candidates in permutation order.
///
/// Consumed once; build a new one for the next pass.
pub struct Selection<'a, F> {
    candidates: &'a [Candidate],
    indices: std::vec::IntoIter<usize>,
    processed: &'a HashSet<i64>,
    emitted: HashSet<i64>,
    quota: Quota,
    eligible: F,
}

impl<'a, F> Iterator for Selection<'a, F>
where
    F: FnMut(&Candidate) -> bool,
{
    type Item = &'a Candidate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.quota.is_reached(self.emitted.len()) {
            return None;
        }

        for index in self.indices.by_ref() {
            let candidate = &self.candidates[index];
            let id = candidate.id();
            if self.processed.contains(&id) || self.emitted.contains(&id) {
                continue;
            }
            if !(self.eligible)(candidate) {
                continue;
            }
            self.emitted.insert(id);
            return Some(candidate);
        }

        None
    }
}

/// Select up to `quota` candidates that are not in `processed` and pass
/// `eligible`, visiting them in `order`.
///
/// Candidates sharing an ID are emitted once. Callers that only count
/// successful actions against their own limit pass `Quota::Unlimited` and
/// stop pulling from the iterator once that limit is reached.
pub fn select<'a, R, F>(
    candidates: &'a [Candidate],
    processed: &'a HashSet<i64>,
    quota: Quota,
    order: SelectionOrder,
    rng: &mut R,
    eligible: F,
) -> Selection<'a, F>
where
    R: Rng + ?Sized,
    F: FnMut(&Candidate) -> bool,
{
    Selection {
        candidates,
        indices: permutation(candidates.len(), order, rng).into_iter(),
        processed,
        emitted: HashSet::new(),
        quota,
        eligible,
    }
}
