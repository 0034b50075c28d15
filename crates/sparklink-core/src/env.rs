//! Environment abstraction for time and randomness.
//!
//! State machines never read the system clock or a global RNG. Callers pass
//! an [`Environment`] (or values obtained from one) so the same code runs
//! against tokio time in production and a virtual clock in simulation.

use std::{
    future::Future,
    time::{Duration, Instant},
};

use rand::RngCore;

/// Source of time and randomness.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Current monotonic time.
    fn now(&self) -> Instant;

    /// Suspend the calling task for `duration`.
    ///
    /// Simulated environments may advance their virtual clock and return
    /// immediately.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;

    /// Fill `buffer` with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);
}

/// Adapts an [`Environment`] into a [`RngCore`].
///
/// Lets selection helpers from `rand` (such as `SliceRandom::choose`) draw
/// from the injected randomness source.
pub struct EnvRng<'a, E: Environment> {
    env: &'a E,
}

impl<'a, E: Environment> EnvRng<'a, E> {
    /// Wrap an environment.
    pub fn new(env: &'a E) -> Self {
        Self { env }
    }
}

impl<E: Environment> RngCore for EnvRng<'_, E> {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.env.random_bytes(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.env.random_bytes(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.env.random_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.env.random_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct CountingEnv;

    impl Environment for CountingEnv {
        #[allow(clippy::disallowed_methods)]
        fn now(&self) -> Instant {
            Instant::now()
        }

        fn sleep(&self, _duration: Duration) -> impl Future<Output = ()> + Send {
            std::future::ready(())
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            for (i, byte) in buffer.iter_mut().enumerate() {
                *byte = i as u8;
            }
        }
    }

    #[test]
    fn env_rng_draws_from_environment() {
        let env = CountingEnv;
        let mut rng = EnvRng::new(&env);

        assert_eq!(rng.next_u32(), u32::from_le_bytes([0, 1, 2, 3]));
        assert_eq!(rng.next_u64(), u64::from_le_bytes([0, 1, 2, 3, 4, 5, 6, 7]));

        let mut buf = [9u8; 3];
        rng.fill_bytes(&mut buf);
        assert_eq!(buf, [0, 1, 2]);
    }
}
