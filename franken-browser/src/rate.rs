//! Minimum-spacing gate serialising access to the shared browser.
//!
//! Semantics:
//! - At most one [`RatePermit`] exists at a time; the holder has the browser
//!   to itself.
//! - A grant is delayed until the configured wait has passed since the
//!   previous permit was *released*, not since it was granted.
//! - Grants are first-come-first-served in the order callers started
//!   waiting.
//! - A waiter that is cancelled leaves the spacing clock untouched, so
//!   giving up a place in line never charges the next caller.

use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::BrowserError;

#[derive(Debug, Default)]
struct GateState {
    last_release: Option<Instant>,
}

/// Exclusive, spaced-out access to one underlying resource.
#[derive(Debug)]
pub struct RateGate {
    wait: Duration,
    state: Mutex<GateState>,
}

/// Proof of exclusive access.
///
/// Dropping the permit releases the gate and stamps the release instant the
/// next grant is spaced against.
#[derive(Debug)]
pub struct RatePermit<'a> {
    state: MutexGuard<'a, GateState>,
}

impl Drop for RatePermit<'_> {
    fn drop(&mut self) {
        self.state.last_release = Some(Instant::now());
    }
}

impl RateGate {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            state: Mutex::new(GateState::default()),
        }
    }

    /// Wait for the gate, answering `scope` cancellation the whole time.
    ///
    /// An already-cancelled scope is refused before joining the queue. The
    /// spacing sleep happens while holding the inner lock, which is what
    /// keeps later arrivals queued behind the sleeper.
    pub async fn acquire(&self, scope: &CancellationToken) -> Result<RatePermit<'_>, BrowserError> {
        if scope.is_cancelled() {
            return Err(BrowserError::Cancelled);
        }

        let state = tokio::select! {
            _ = scope.cancelled() => return Err(BrowserError::Cancelled),
            state = self.state.lock() => state,
        };

        if let Some(last_release) = state.last_release {
            let ready_at = last_release + self.wait;
            let now = Instant::now();
            if ready_at > now {
                trace!(wait_ms = (ready_at - now).as_millis() as u64, "spacing browser access");
                tokio::select! {
                    // Bailing out drops the guard without granting, so the
                    // clock still runs from the old release.
                    _ = scope.cancelled() => return Err(BrowserError::Cancelled),
                    _ = sleep_until(ready_at) => {}
                }
            }
        }

        Ok(RatePermit { state })
    }
}
