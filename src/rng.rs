use std::collections::HashMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub const WORLDGEN_STREAM: &str = "worldgen";

/// Named ChaCha streams under one master seed. A stream's seed depends only
/// on the master seed and its name, never on the order streams are opened.
pub struct RngManager {
    seed: u64,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            streams: HashMap::new(),
        }
    }

    pub fn stream(&mut self, name: &str) -> SystemRng<'_> {
        let seed = stream_seed(self.seed, name);
        let inner = self
            .streams
            .entry(name.to_string())
            .or_insert_with(|| ChaCha8Rng::seed_from_u64(seed));
        SystemRng { inner }
    }
}

/// FNV-1a over the name, mixed into the master seed.
fn stream_seed(master: u64, name: &str) -> u64 {
    let hash = name.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |acc, byte| {
        (acc ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    });
    master.rotate_left(32) ^ hash
}

/// Borrowed handle to one stream, handed to a single system run.
pub struct SystemRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl RngCore for SystemRng<'_> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn same_seed_same_stream() {
        let mut a = RngManager::new(7);
        let mut b = RngManager::new(7);
        let x: u64 = a.stream(WORLDGEN_STREAM).gen();
        let y: u64 = b.stream(WORLDGEN_STREAM).gen();
        assert_eq!(x, y);
    }

    #[test]
    fn streams_are_independent() {
        let mut rng = RngManager::new(7);
        let x: u64 = rng.stream(WORLDGEN_STREAM).gen();
        let y: u64 = rng.stream("movement").gen();
        assert_ne!(x, y);
    }

    #[test]
    fn open_order_does_not_matter() {
        let mut a = RngManager::new(11);
        let mut b = RngManager::new(11);
        let _: u64 = a.stream(WORLDGEN_STREAM).gen();
        let x: u64 = a.stream("movement").gen();
        let y: u64 = b.stream("movement").gen();
        assert_eq!(x, y);
    }

    #[test]
    fn stream_state_persists_between_requests() {
        let mut rng = RngManager::new(3);
        let first: u64 = rng.stream("movement").gen();
        let second: u64 = rng.stream("movement").gen();
        assert_ne!(first, second);
    }
}
