//! Candidate cycles and the consumable candidate list.

use crate::graph::Weight;

/// A cycle closed by one non-tree edge of one root's shortest-path tree.
///
/// The cycle is the tree path from the root to `row(non_tree_edge)`, the edge itself, and the
/// tree path back from `col(non_tree_edge)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cycle {
    /// Root vertex of the tree that produced the cycle.
    pub root: usize,
    /// Compact index of that tree.
    pub tree: usize,
    /// Canonical arc closing the cycle.
    pub non_tree_edge: usize,
    /// Cycle weight: `distance(row) + distance(col) + weight(edge)`.
    pub total_length: Weight,
    /// Position in the sorted candidate list; assigned after deduplication.
    pub id: usize,
}

impl Cycle {
    /// Key of the candidate order: weight, then root, then closing edge.
    #[inline]
    pub fn sort_key(&self) -> (Weight, usize, usize) {
        (self.total_length, self.root, self.non_tree_edge)
    }
}

/// Candidates in ascending `sort_key` order, each with a consumed flag.
///
/// Selecting a cycle flips its flag; entries never move, so ids stay valid.
#[derive(Clone, Debug, Default)]
pub struct CandidateList {
    cycles: Vec<Cycle>,
    consumed: Vec<bool>,
    remaining: usize,
}

impl CandidateList {
    /// Sorts `cycles` and assigns ids.
    pub fn new(mut cycles: Vec<Cycle>) -> Self {
        cycles.sort_by_key(Cycle::sort_key);
        for (id, c) in cycles.iter_mut().enumerate() {
            c.id = id;
        }
        let remaining = cycles.len();
        Self {
            consumed: vec![false; cycles.len()],
            cycles,
            remaining,
        }
    }

    /// Total number of candidates, consumed or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    /// Returns `true` if there are no candidates.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    /// Number of candidates not yet consumed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Candidate with id `id`.
    #[inline]
    pub fn get(&self, id: usize) -> &Cycle {
        &self.cycles[id]
    }

    /// Active candidates in order.
    pub fn active(&self) -> impl Iterator<Item = &Cycle> + '_ {
        self.cycles
            .iter()
            .zip(&self.consumed)
            .filter(|&(_, &used)| !used)
            .map(|(c, _)| c)
    }

    /// Marks candidate `id` as selected.
    ///
    /// # Panics
    /// Panics if `id` was already consumed.
    pub fn consume(&mut self, id: usize) {
        assert!(!self.consumed[id], "cycle {id} consumed twice");
        self.consumed[id] = true;
        self.remaining -= 1;
    }
}
