//! Process-wide cooperative cancellation.
//!
//! A single token is shared by the interrupt handler, the quit command, the
//! update checker and the cycle driver. Triggering is one-way.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Resolves once the token has been triggered.
    ///
    /// Meant as one arm of a [`smol::future::race`] so that timed waits end
    /// promptly on cancellation.
    pub async fn wait(&self) {
        while !self.is_triggered() {
            smol::Timer::after(POLL_INTERVAL).await;
        }
    }
}
