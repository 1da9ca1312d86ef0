use thiserror::Error;

/// Failures surfaced by the browser session and the rate gate.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// The WebDriver endpoint refused or dropped the new-session handshake.
    #[error("couldn't reach webdriver at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: fantoccini::error::NewSessionError,
    },

    /// `start` was called on a session that had already been started or
    /// stopped. Sessions are single-use.
    #[error("browser session already started")]
    AlreadyStarted,

    /// A page operation arrived before `start` or after `stop`.
    #[error("browser session is not running")]
    NotRunning,

    /// An underlying WebDriver command failed.
    #[error("browser {operation} failed: {source}")]
    Command {
        operation: &'static str,
        #[source]
        source: fantoccini::error::CmdError,
    },

    /// A selector did not show up within the configured wait window.
    #[error("timed out waiting for selector {selector:?}")]
    WaitTimeout { selector: String },

    /// Closing the underlying browser failed; the session still counts as
    /// stopped.
    #[error("couldn't close browser session: {0}")]
    Close(#[source] fantoccini::error::CmdError),

    /// The operation was abandoned because a cancellation scope tripped.
    #[error("browser operation cancelled")]
    Cancelled,
}
