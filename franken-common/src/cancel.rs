//! Combinators over `tokio_util`'s [`CancellationToken`].
//!
//! Browser work in this workspace answers to two stop signals at once: the
//! run-wide token owned by the caller and the token tied to the browser
//! session's lifetime. [`first_of`] derives a scope that trips when either
//! parent does; [`until_cancelled`] races a future against a token so that a
//! trip abandons the future instead of letting it run to completion.

use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Derived cancellation scope returned by [`first_of`].
///
/// The scope owns a fresh token that trips as soon as either parent token
/// does. Dropping the scope cancels the derived token, which also winds down
/// the forwarding task, so nothing outlives the call that created the scope.
#[derive(Debug)]
pub struct LinkedScope {
    token: CancellationToken,
}

impl LinkedScope {
    /// The derived token. Trips when either parent trips.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for LinkedScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Derive a scope cancelled when either `a` or `b` is cancelled.
///
/// Must run inside a Tokio runtime; a small forwarding task watches both
/// parents and exits once the derived token trips for any reason.
///
/// ```
/// use franken_common::cancel::first_of;
/// use tokio_util::sync::CancellationToken;
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let run = CancellationToken::new();
///     let session = CancellationToken::new();
///     let scope = first_of(&run, &session);
///
///     session.cancel();
///     scope.token().cancelled().await;
/// });
/// ```
pub fn first_of(a: &CancellationToken, b: &CancellationToken) -> LinkedScope {
    let token = CancellationToken::new();

    // A parent that already tripped must be visible on the derived token
    // synchronously, before the forwarding task ever gets scheduled.
    if a.is_cancelled() || b.is_cancelled() {
        token.cancel();
        return LinkedScope { token };
    }

    let derived = token.clone();
    let a = a.clone();
    let b = b.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = a.cancelled() => derived.cancel(),
            _ = b.cancelled() => derived.cancel(),
            _ = derived.cancelled() => {}
        }
    });
    LinkedScope { token }
}

/// Run `fut` until it completes or `token` is cancelled.
///
/// Returns `Some(output)` on completion and `None` on cancellation. The check
/// is biased towards the token, so an already-cancelled token short-circuits
/// without polling the future's side effects to completion.
///
/// ```
/// use franken_common::cancel::until_cancelled;
/// use tokio_util::sync::CancellationToken;
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let stop = CancellationToken::new();
///     assert_eq!(until_cancelled(&stop, async { 21 * 2 }).await, Some(42));
///
///     stop.cancel();
///     let out = until_cancelled(&stop, std::future::pending::<()>()).await;
///     assert!(out.is_none());
/// });
/// ```
pub async fn until_cancelled<F: Future>(token: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = token.cancelled() => None,
        out = fut => Some(out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn derived_scope_trips_with_first_parent() {
        let run = CancellationToken::new();
        let session = CancellationToken::new();
        let scope = first_of(&run, &session);

        assert!(!scope.token().is_cancelled());
        run.cancel();
        scope.token().cancelled().await;
    }

    #[tokio::test]
    async fn derived_scope_trips_with_second_parent() {
        let run = CancellationToken::new();
        let session = CancellationToken::new();
        let scope = first_of(&run, &session);

        session.cancel();
        scope.token().cancelled().await;
        assert!(!run.is_cancelled());
    }

    #[tokio::test]
    async fn already_cancelled_parent_is_visible_synchronously() {
        let run = CancellationToken::new();
        let session = CancellationToken::new();
        session.cancel();

        let scope = first_of(&run, &session);
        assert!(scope.token().is_cancelled());
    }

    #[tokio::test]
    async fn dropping_the_scope_cancels_the_derived_token() {
        let run = CancellationToken::new();
        let session = CancellationToken::new();
        let scope = first_of(&run, &session);
        let derived = scope.token().clone();

        drop(scope);
        derived.cancelled().await;
        assert!(!run.is_cancelled());
        assert!(!session.is_cancelled());
    }

    #[tokio::test]
    async fn until_cancelled_passes_output_through() {
        let stop = CancellationToken::new();
        let out = until_cancelled(&stop, async { "done" }).await;
        assert_eq!(out, Some("done"));
    }

    #[tokio::test]
    async fn until_cancelled_short_circuits_when_already_cancelled() {
        let stop = CancellationToken::new();
        stop.cancel();
        let out = until_cancelled(&stop, async { "ran" }).await;
        assert_eq!(out, None);
    }

    #[tokio::test(start_paused = true)]
    async fn until_cancelled_abandons_future_mid_flight() {
        let stop = CancellationToken::new();
        let trip = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trip.cancel();
        });

        let out = until_cancelled(&stop, tokio::time::sleep(Duration::from_millis(500))).await;
        assert!(out.is_none());
    }
}
