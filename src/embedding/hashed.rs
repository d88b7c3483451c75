//! Deterministic vectors for out-of-vocabulary words.
//!
//! A word missing from the vector table would otherwise embed as all zeros and
//! never match anything, not even itself. Hashing the accent-folded word into
//! an RNG seed gives every unknown word a stable pseudo-random unit vector:
//! identical words compare at 1.0, distinct words land near 0.0.

use rand::{Rng, SeedableRng};

use super::normalize;
use super::tokenize::fold;

/// Generator of per-word pseudo-random unit vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashedVectors {
    dim: usize,
}

impl HashedVectors {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    pub fn dimension(&self) -> usize {
        self.dim
    }

    /// The vector for `word`. Case and diacritics do not change the result.
    pub fn vector(&self, word: &str) -> Vec<f32> {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed_for(word));
        let raw: Vec<f32> = (0..self.dim).map(|_| rng.gen_range(-1.0f32..1.0)).collect();
        normalize(raw).unwrap_or_else(|| vec![0.0; self.dim])
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a of the folded word. Fixed across toolchains and platforms.
fn seed_for(word: &str) -> u64 {
    fold(word)
        .bytes()
        .fold(FNV_OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::cosine;

    #[test]
    fn same_word_same_vector() {
        let h = HashedVectors::new(64);
        assert_eq!(h.vector("fioul"), h.vector("fioul"));
        assert_eq!(h.vector("Électricité"), h.vector("electricite"));
    }

    #[test]
    fn seeds_are_fixed_fnv1a_values() {
        assert_eq!(seed_for(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(seed_for("a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(seed_for("FooBar"), 0x8594_4171_f739_67e8);
        assert_eq!(seed_for("Électricité"), seed_for("electricite"));
    }

    #[test]
    fn distinct_words_are_roughly_orthogonal() {
        let h = HashedVectors::new(300);
        let s = cosine(&h.vector("fioul"), &h.vector("bois"));
        assert!(s.abs() < 0.3, "unexpected similarity {s}");
    }

    #[test]
    fn vectors_have_unit_norm() {
        let h = HashedVectors::new(32);
        let v = h.vector("gaz");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }
}
