//! Cooperative shutdown token
//!
//! A Shutdown token is created at runner start and passed by reference down
//! into the cycle and channel crawlers, which check it at every state-machine
//! transition. Tripping it also wakes any in-flight pacing sleep, so the loop
//! unwinds promptly and the store is closed deterministically.

use std::time::Duration;
use tokio::sync::watch;

/// Cancellation token shared between the runner and the crawl loops
#[derive(Clone)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx, rx }
    }

    /// Signals shutdown; wakes all pending interruptible sleeps
    pub fn trip(&self) {
        // Receivers are held as long as the token exists, so send cannot fail
        let _ = self.tx.send(true);
    }

    /// Returns true once shutdown has been signalled
    pub fn is_tripped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Sleeps for `duration`, returning early when the token trips
    pub async fn sleep(&self, duration: Duration) {
        let mut rx = self.rx.clone();
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = rx.wait_for(|tripped| *tripped) => {}
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
