//! Packed containers used by the basis computation.

pub mod bit_vector;
pub mod disjoint_set;

pub use bit_vector::BitVector;
pub use disjoint_set::DisjointSet;
