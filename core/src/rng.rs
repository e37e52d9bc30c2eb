//! Deterministic random number generation.
//!
//! RULE: Nothing in the generator may call any platform RNG.
//! All randomness flows through StreamRng instances derived
//! from the single master seed of the run.
//!
//! Each concern gets its own stream, seeded from
//! (master_seed XOR slot_index * golden ratio). This means:
//!   - Adding a new stream never changes existing streams.
//!   - Drawing more identities never shifts the transaction stream.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single generation concern.
pub struct StreamRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl StreamRng {
    /// Create a stream from the master seed and a stable slot index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        use rand::RngCore;
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll an i64 in [lo, hi]. Callers guarantee lo <= hi.
    pub fn range_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        assert!(lo <= hi, "empty range {lo}..={hi}");
        let span = (hi - lo) as u64 + 1;
        lo + self.next_u64_below(span) as i64
    }

    /// Fill a byte buffer from the stream.
    pub fn fill_bytes(&mut self, buf: &mut [u8]) {
        use rand::RngCore;
        self.inner.fill_bytes(buf);
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform pick from a slice. None for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.next_u64_below(items.len() as u64) as usize;
        items.get(idx)
    }

    /// Weighted categorical draw over `weights`, returning the index.
    /// Weights are relative; they need not sum to one.
    pub fn pick_weighted(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        let roll = self.next_f64() * total;
        let mut cumulative = 0.0;
        for (i, w) in weights.iter().enumerate() {
            cumulative += w;
            if roll < cumulative {
                return i;
            }
        }
        weights.len().saturating_sub(1)
    }
}

/// All streams for a single run, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_stream(&self, slot: StreamSlot) -> StreamRng {
        StreamRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries; only append.
/// Reordering changes every stream's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Identity = 0,
    Customer = 1,
    Account = 2,
    Device = 3,
    ExternalBank = 4,
    Transaction = 5,
    Authentication = 6,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Customer => "customer",
            Self::Account => "account",
            Self::Device => "device",
            Self::ExternalBank => "external_bank",
            Self::Transaction => "transaction",
            Self::Authentication => "authentication",
        }
    }
}
