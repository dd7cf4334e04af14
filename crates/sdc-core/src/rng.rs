//! Deterministic RNG wrapper and seed-derivation helpers.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

use crate::CellRef;

/// Deterministic RNG handle used wherever the engine needs randomness.
///
/// Only demonstration paths draw random numbers (synthetic contributor
/// data). Each cell gets its own substream derived from the master seed and
/// the cell coordinates, so results do not depend on evaluation order or on
/// how rows are spread across worker threads.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Creates a new RNG handle from a master seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates the handle for a single cell's substream.
    pub fn for_cell(master_seed: u64, cell: CellRef) -> Self {
        let stream = derive_substream_seed(master_seed, cell.row as u64);
        Self::from_seed(derive_substream_seed(stream, cell.column as u64))
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Derives the deterministic seed for a specific substream.
///
/// SipHash-1-3 with fixed zero keys over `(master_seed, substream)`; stable
/// across platforms.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}
