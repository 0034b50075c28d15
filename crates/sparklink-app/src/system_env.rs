//! Production environment.

use std::{
    future::Future,
    time::{Duration, Instant},
};

use rand::RngCore;
use sparklink_core::Environment;

/// Environment backed by tokio time and the thread-local RNG.
///
/// Reads time through tokio so a paused test runtime controls it too.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl Environment for SystemEnv {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        rand::thread_rng().fill_bytes(buffer);
    }
}
