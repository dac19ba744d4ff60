//! Deduplication of cycles discovered from different roots.
//!
//! The same cycle is usually found from every root lying on it. Cycles are bucketed by their
//! smallest vertex and keyed by `(fingerprint, length)`, where the fingerprint hashes the edge
//! set alone. Within a key, cycles are grouped by their exact sorted edge list, so a hash
//! collision only costs a comparison and never merges two different cycles. Only each group's
//! representative becomes a candidate.

use std::collections::HashMap;

use super::cycle::{CandidateList, Cycle};

/// Bucket, fingerprint and length of a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Smallest vertex on the cycle.
    pub bucket: usize,
    /// Hash of the edge set.
    pub fingerprint: u64,
    /// Total weight of the cycle.
    pub length: u64,
}

/// A [`Signature`] together with the edge set it was computed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleKey {
    /// Hashed part, used to find the bucket entry.
    pub signature: Signature,
    /// Canonical edge ids, sorted.
    pub edges: Vec<usize>,
}

/// SplitMix64 finalizer.
#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Incremental builder for a [`CycleKey`]; edge order does not matter.
#[derive(Clone, Debug)]
pub struct SignatureBuilder {
    bucket: usize,
    acc: u64,
    edges: Vec<usize>,
}

impl Default for SignatureBuilder {
    fn default() -> Self {
        Self {
            bucket: usize::MAX,
            acc: 0,
            edges: Vec::new(),
        }
    }
}

impl SignatureBuilder {
    /// Records a vertex on the cycle.
    #[inline]
    pub fn vertex(&mut self, v: usize) {
        self.bucket = self.bucket.min(v);
    }

    /// Records an undirected edge of the cycle by its canonical id.
    #[inline]
    pub fn edge(&mut self, edge_id: usize) {
        self.acc ^= splitmix64(edge_id as u64);
        self.edges.push(edge_id);
    }

    /// Finishes the key for a cycle of weight `length`.
    pub fn finish(mut self, length: u64) -> CycleKey {
        self.edges.sort_unstable();
        CycleKey {
            signature: Signature {
                bucket: self.bucket,
                fingerprint: splitmix64(self.acc),
                length,
            },
            edges: self.edges,
        }
    }
}

/// Cycles with one edge set.
#[derive(Clone, Debug)]
pub struct CycleGroup {
    edges: Vec<usize>,
    members: Vec<Cycle>,
}

impl CycleGroup {
    /// Sorted canonical edge ids shared by all members.
    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    /// All cycles of the group in insertion order.
    pub fn members(&self) -> &[Cycle] {
        &self.members
    }

    /// Member with the smallest `(root, non_tree_edge)`.
    pub fn representative(&self) -> Option<&Cycle> {
        self.members.iter().min_by_key(|c| (c.root, c.non_tree_edge))
    }
}

/// Per-vertex buckets of cycle groups.
#[derive(Clone, Debug)]
pub struct CycleStorage {
    buckets: Vec<HashMap<(u64, u64), Vec<CycleGroup>>>,
    added: usize,
    groups: usize,
}

impl CycleStorage {
    /// Creates empty storage for a graph with `nodes` vertices.
    pub fn new(nodes: usize) -> Self {
        Self {
            buckets: vec![HashMap::new(); nodes],
            added: 0,
            groups: 0,
        }
    }

    /// Inserts `cycle` into the group with the same edge set, opening a new group if none.
    ///
    /// # Panics
    /// Panics if the signature's bucket is not a vertex.
    pub fn add(&mut self, cycle: Cycle, key: CycleKey) {
        let CycleKey { signature, edges } = key;
        let slot = self.buckets[signature.bucket]
            .entry((signature.fingerprint, signature.length))
            .or_default();
        match slot.iter_mut().find(|g| g.edges == edges) {
            Some(group) => group.members.push(cycle),
            None => {
                slot.push(CycleGroup {
                    edges,
                    members: vec![cycle],
                });
                self.groups += 1;
            }
        }
        self.added += 1;
    }

    /// Number of cycles added.
    #[inline]
    pub fn added(&self) -> usize {
        self.added
    }

    /// Number of distinct groups.
    #[inline]
    pub fn unique(&self) -> usize {
        self.groups
    }

    /// Group of `key`, if any.
    pub fn group(&self, key: &CycleKey) -> Option<&CycleGroup> {
        let sig = key.signature;
        self.buckets
            .get(sig.bucket)?
            .get(&(sig.fingerprint, sig.length))?
            .iter()
            .find(|g| g.edges == key.edges)
    }

    /// Consumes the storage, returning one representative per group as a sorted list.
    pub fn into_candidates(self) -> CandidateList {
        let reps: Vec<Cycle> = self
            .buckets
            .iter()
            .flat_map(|bucket| bucket.values().flatten())
            .filter_map(CycleGroup::representative)
            .copied()
            .collect();
        CandidateList::new(reps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle(root: usize, edge: usize, len: u64) -> Cycle {
        Cycle {
            root,
            tree: root,
            non_tree_edge: edge,
            total_length: len,
            id: 0,
        }
    }

    fn key(vertices: &[usize], edges: &[usize], len: u64) -> CycleKey {
        let mut b = SignatureBuilder::default();
        vertices.iter().for_each(|&v| b.vertex(v));
        edges.iter().for_each(|&e| b.edge(e));
        b.finish(len)
    }

    #[test]
    fn test_signature_ignores_edge_order() {
        let a = key(&[3, 1, 2], &[4, 8, 12], 9);
        let b = key(&[2, 3, 1], &[12, 4, 8], 9);
        assert_eq!(a, b);
        assert_eq!(a.signature.bucket, 1);
        assert_eq!(a.edges, vec![4, 8, 12]);
        assert_ne!(a, key(&[3, 1, 2], &[4, 8, 14], 9));
        assert_ne!(a.signature, key(&[3, 1, 2], &[4, 8, 12], 10).signature);
    }

    #[test]
    fn test_edge_and_length_do_not_trade_places() {
        // {1, 0} of length 2 against {1, 2} of length 0 on a two-vertex multigraph
        let a = key(&[0, 1], &[1, 0], 2);
        let b = key(&[0, 1], &[1, 2], 0);
        assert_ne!(a.signature, b.signature);

        let mut storage = CycleStorage::new(2);
        storage.add(cycle(0, 0, 2), a.clone());
        storage.add(cycle(0, 2, 0), b.clone());
        assert_eq!(storage.unique(), 2);
        assert_eq!(storage.group(&a).unwrap().edges(), &[0, 1]);
        assert_eq!(storage.group(&b).unwrap().edges(), &[1, 2]);
        assert_eq!(storage.into_candidates().active().count(), 2);
    }

    #[test]
    fn test_colliding_fingerprints_stay_apart() {
        let a = key(&[0, 1, 2], &[0, 2, 4], 3);
        let forged = CycleKey {
            signature: a.signature,
            edges: vec![1, 3, 5],
        };
        let mut storage = CycleStorage::new(3);
        storage.add(cycle(0, 0, 3), a.clone());
        storage.add(cycle(1, 1, 3), forged.clone());
        storage.add(cycle(2, 4, 3), a.clone());
        assert_eq!(storage.added(), 3);
        assert_eq!(storage.unique(), 2);
        assert_eq!(storage.group(&a).unwrap().members().len(), 2);
        assert_eq!(storage.group(&forged).unwrap().members().len(), 1);
    }

    #[test]
    fn test_duplicates_collapse_to_representative() {
        let sig = key(&[0, 1, 2], &[0, 2, 4], 3);
        let other = key(&[1, 2, 3], &[6, 8, 10], 3);
        let mut storage = CycleStorage::new(4);
        storage.add(cycle(2, 4, 3), sig.clone());
        storage.add(cycle(0, 2, 3), sig.clone());
        storage.add(cycle(1, 0, 3), sig.clone());
        storage.add(cycle(3, 10, 3), other);
        assert_eq!(storage.added(), 4);
        assert_eq!(storage.unique(), 2);
        assert_eq!(storage.group(&sig).unwrap().members().len(), 3);

        let list = storage.into_candidates();
        let picked: Vec<(usize, usize)> = list.active().map(|c| (c.root, c.non_tree_edge)).collect();
        assert_eq!(picked, vec![(0, 2), (3, 10)]);
    }

    #[test]
    fn test_splitmix_is_not_identity() {
        assert_ne!(splitmix64(0), 0);
        assert_ne!(splitmix64(1), splitmix64(2));
    }
}
