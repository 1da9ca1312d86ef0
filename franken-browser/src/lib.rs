//! Exclusive access to a WebDriver-controlled browser.
//!
//! [`BrowserSession`] owns the lifecycle of one underlying browser and
//! exposes the few page operations the snippet harvester needs through the
//! [`Automation`] trait. [`RateGate`] serialises callers onto that single
//! browser and keeps a minimum spacing between turns so the documentation
//! site is not hammered.

mod error;
pub mod rate;
pub mod session;

pub use error::BrowserError;
pub use rate::{RateGate, RatePermit};
pub use session::{Automation, BrowserConfig, BrowserSession};
