//! Simulated environment with virtual time and seeded randomness.

use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sparklink_core::Environment;

/// Environment whose clock only moves when told to.
///
/// Clones share the same clock and RNG.
#[derive(Clone)]
pub struct SimEnv {
    epoch: Instant,
    elapsed: Arc<Mutex<Duration>>,
    rng: Arc<Mutex<ChaCha8Rng>>,
}

impl SimEnv {
    /// Environment with seed 0.
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Environment with a specific RNG seed.
    pub fn with_seed(seed: u64) -> Self {
        // The only real clock read; everything after is offsets from it.
        #[allow(clippy::disallowed_methods)]
        let epoch = Instant::now();
        Self {
            epoch,
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
            rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
        }
    }

    /// Virtual time since creation.
    pub fn elapsed(&self) -> Duration {
        *lock(&self.elapsed)
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        *lock(&self.elapsed) += by;
    }

    /// Move the clock to `instant`. Never moves backwards.
    pub fn advance_to(&self, instant: Instant) {
        let target = instant.saturating_duration_since(self.epoch);
        let mut elapsed = lock(&self.elapsed);
        if target > *elapsed {
            *elapsed = target;
        }
    }

    /// Instant at `offset` after creation.
    pub fn at(&self, offset: Duration) -> Instant {
        self.epoch + offset
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SimEnv {
    fn now(&self) -> Instant {
        self.epoch + self.elapsed()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.advance(duration);
        std::future::ready(())
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        lock(&self.rng).fill_bytes(buffer);
    }
}

// Poisoning only follows a panic in another test thread; the data is still
// a plain counter or RNG state.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_moves_only_when_advanced() {
        let env = SimEnv::new();
        let t0 = env.now();
        assert_eq!(env.now(), t0);

        env.advance(Duration::from_millis(250));
        assert_eq!(env.now(), t0 + Duration::from_millis(250));
        assert_eq!(env.elapsed(), Duration::from_millis(250));
    }

    #[test]
    fn advance_to_never_rewinds() {
        let env = SimEnv::new();
        env.advance_to(env.at(Duration::from_secs(3)));
        env.advance_to(env.at(Duration::from_secs(1)));
        assert_eq!(env.elapsed(), Duration::from_secs(3));
    }

    #[test]
    fn clones_share_state() {
        let env = SimEnv::with_seed(9);
        let other = env.clone();
        other.advance(Duration::from_secs(1));
        assert_eq!(env.elapsed(), Duration::from_secs(1));
    }

    #[test]
    fn same_seed_same_bytes() {
        let (a, b) = (SimEnv::with_seed(5), SimEnv::with_seed(5));
        let (mut x, mut y) = ([0u8; 16], [0u8; 16]);
        a.random_bytes(&mut x);
        b.random_bytes(&mut y);
        assert_eq!(x, y);
    }
}
