use std::f64::consts::LN_2;

use sha2::{Digest, Sha256};

const MIN_BITS: u64 = 64;
const MAX_HASHES: u32 = 16;

/// Probabilistic set of strings. `has` never returns false for an inserted
/// item; it may return true for items never inserted.
#[derive(Debug, Clone)]
pub struct BloomFilter {
    bits: Vec<u64>,
    num_bits: u64,
    num_hashes: u32,
}

impl BloomFilter {
    /// Size the filter for `expected_items` at the given false-positive rate
    pub fn with_rate(expected_items: usize, false_positive_rate: f64) -> Self {
        let n = expected_items.max(1) as f64;
        let p = false_positive_rate.clamp(f64::MIN_POSITIVE, 0.5);

        let num_bits = ((-(n * p.ln()) / (LN_2 * LN_2)).ceil() as u64).max(MIN_BITS);
        let num_hashes = ((num_bits as f64 / n) * LN_2).round().clamp(1.0, MAX_HASHES as f64) as u32;
        let words = num_bits.div_ceil(64) as usize;

        Self {
            bits: vec![0; words],
            num_bits,
            num_hashes,
        }
    }

    pub fn from_items<I, S>(items: I, false_positive_rate: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let items: Vec<S> = items.into_iter().collect();
        let mut filter = Self::with_rate(items.len(), false_positive_rate);
        for item in &items {
            filter.insert(item.as_ref());
        }
        filter
    }

    pub fn insert(&mut self, item: &str) {
        for bit in self.probes(item) {
            self.bits[(bit / 64) as usize] |= 1u64 << (bit % 64);
        }
    }

    pub fn has(&self, item: &str) -> bool {
        self.probes(item)
            .all(|bit| self.bits[(bit / 64) as usize] & (1u64 << (bit % 64)) != 0)
    }

    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }

    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// Double hashing over the two halves of a SHA-256 digest
    fn probes(&self, item: &str) -> impl Iterator<Item = u64> {
        let digest = Sha256::digest(item.as_bytes());
        let mut first = [0u8; 8];
        let mut second = [0u8; 8];
        first.copy_from_slice(&digest[..8]);
        second.copy_from_slice(&digest[8..16]);

        let h1 = u64::from_le_bytes(first);
        let h2 = u64::from_le_bytes(second) | 1;
        let num_bits = self.num_bits;

        (0..self.num_hashes as u64).map(move |i| h1.wrapping_add(i.wrapping_mul(h2)) % num_bits)
    }
}
