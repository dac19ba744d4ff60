//! `BitVector`: a fixed-length packed vector over GF(2).
//!
//! Support vectors and cycle membership vectors are both `BitVector`s of length
//! `num_non_tree_edges`. The only arithmetic the basis loop needs is a single-bit read,
//! the GF(2) dot product and XOR-accumulation, so the layout is a flat `Vec<u64>` with the
//! unused high bits of the last word kept at zero.
//!
//! ### Performance Characteristics
//! | Operation | Complexity | Notes |
//! |-----------|------------|-------|
//! | `get` / `set` / `toggle` | \(O(1)\) | shift + mask |
//! | `dot_product` | \(O(n / 64)\) | AND + popcount parity per word |
//! | `xor_assign` | \(O(n / 64)\) | word-wise, auto-vectorizes |

use core::fmt;

const WORD_BITS: usize = u64::BITS as usize;

#[inline(always)]
fn word_mask(bit: usize) -> (usize, u64) {
    (bit / WORD_BITS, 1u64 << (bit % WORD_BITS))
}

/// A packed bit vector of fixed length.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitVector {
    words: Vec<u64>,
    len: usize,
}

impl BitVector {
    /// Creates the zero vector with `len` coordinates.
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    /// Creates the unit vector `e_bit`.
    ///
    /// # Panics
    /// Panics if `bit >= len`.
    pub fn unit(len: usize, bit: usize) -> Self {
        let mut v = Self::new(len);
        v.set(bit, true);
        v
    }

    /// Number of coordinates.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the vector has no coordinates.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns coordinate `bit`.
    ///
    /// # Panics
    /// Panics if `bit >= len()`.
    #[inline]
    pub fn get(&self, bit: usize) -> bool {
        assert!(bit < self.len, "bit {bit} out of range (len={})", self.len);
        let (w, m) = word_mask(bit);
        self.words[w] & m != 0
    }

    /// Sets coordinate `bit` to `value`.
    ///
    /// # Panics
    /// Panics if `bit >= len()`.
    #[inline]
    pub fn set(&mut self, bit: usize, value: bool) {
        assert!(bit < self.len, "bit {bit} out of range (len={})", self.len);
        let (w, m) = word_mask(bit);
        if value {
            self.words[w] |= m;
        } else {
            self.words[w] &= !m;
        }
    }

    /// Flips coordinate `bit` (adds `e_bit` over GF(2)).
    ///
    /// # Panics
    /// Panics if `bit >= len()`.
    #[inline]
    pub fn toggle(&mut self, bit: usize) {
        assert!(bit < self.len, "bit {bit} out of range (len={})", self.len);
        let (w, m) = word_mask(bit);
        self.words[w] ^= m;
    }

    /// Resets every coordinate to zero.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Returns `true` if no coordinate is set.
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Number of set coordinates.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// GF(2) inner product: parity of the number of coordinates set in both vectors.
    ///
    /// # Panics
    /// Panics if the lengths differ.
    pub fn dot_product(&self, other: &Self) -> bool {
        assert_eq!(self.len, other.len, "dot product of vectors with different lengths");
        let ones: u32 = self
            .words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a & b).count_ones())
            .sum();
        ones & 1 == 1
    }

    /// `self ^= other` (addition over GF(2)).
    ///
    /// # Panics
    /// Panics if the lengths differ.
    pub fn xor_assign(&mut self, other: &Self) {
        assert_eq!(self.len, other.len, "xor of vectors with different lengths");
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a ^= b;
        }
    }

    /// Iterates over the indices of set coordinates in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| {
            let mut rest = word;
            core::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some(wi * WORD_BITS + bit)
            })
        })
    }

    /// Raw packed words; bits past `len()` are always zero.
    pub fn words(&self) -> &[u64] {
        &self.words
    }
}

impl fmt::Debug for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitVector({self})")
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len {
            f.write_str(if self.get(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}
