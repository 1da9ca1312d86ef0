//! Lifecycle and page operations for the single shared browser.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use webdriver::capabilities::Capabilities;

use crate::BrowserError;

/// Clicks synchronously inside the page, so one round trip covers every
/// matching anchor.
const CLICK_ALL_BY_TEXT_SCRIPT: &str = "\
    const label = arguments[0];\n\
    const hits = Array.from(document.querySelectorAll('a'))\n\
        .filter((el) => el.innerText === label);\n\
    for (const el of hits) { el.click(); }\n\
    return hits.length;";

/// Page operations the snippet extractor drives the browser with.
///
/// Callers stay declarative ("click everything labelled X") so tests can
/// substitute a scripted fake for the real WebDriver session.
#[async_trait]
pub trait Automation: Send + Sync {
    /// Load `url` in the browser tab.
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// Block until an element matching the CSS `selector` exists in the DOM.
    async fn wait_for_selector(&self, selector: &str) -> Result<(), BrowserError>;

    /// Click every anchor whose rendered text equals `label` exactly.
    /// Returns how many anchors matched.
    async fn click_all_by_text(&self, label: &str) -> Result<usize, BrowserError>;

    /// Serialise the current DOM.
    async fn outer_html(&self) -> Result<String, BrowserError>;
}

/// Connection settings for [`BrowserSession`].
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// WebDriver endpoint, typically a local chromedriver.
    pub webdriver_url: String,
    /// Run the browser without a visible window.
    pub headless: bool,
    /// Upper bound for [`Automation::wait_for_selector`].
    pub wait_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            wait_timeout: Duration::from_secs(30),
        }
    }
}

enum SessionState {
    NotStarted,
    Running(Client),
    Stopped,
}

/// One long-lived browser, started at most once and stopped at most once.
///
/// The state only moves forward (`NotStarted -> Running -> Stopped`); a
/// stopped session cannot be revived. The session also owns a
/// [`CancellationToken`] that trips when the session stops, which lets
/// in-flight page work linked to the session wind down instead of talking to
/// a closed browser.
pub struct BrowserSession {
    config: BrowserConfig,
    scope: CancellationToken,
    state: RwLock<SessionState>,
}

impl BrowserSession {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config,
            scope: CancellationToken::new(),
            state: RwLock::new(SessionState::NotStarted),
        }
    }

    /// Token tied to the session's lifetime. Trips on `stop` (and on drop).
    pub fn cancellation(&self) -> CancellationToken {
        self.scope.clone()
    }

    /// Launch the underlying browser by opening a WebDriver session.
    pub async fn start(&self) -> Result<(), BrowserError> {
        let mut state = self.state.write().await;
        match &*state {
            SessionState::NotStarted => {}
            SessionState::Running(_) | SessionState::Stopped => {
                return Err(BrowserError::AlreadyStarted)
            }
        }

        let mut caps = Capabilities::new();
        let mut chrome_opts = HashMap::new();
        let mut args = vec!["--disable-dev-shm-usage"];
        if self.config.headless {
            args.push("--headless");
            args.push("--disable-gpu");
        }
        chrome_opts.insert("args".to_string(), json!(args));
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        debug!(
            url = %self.config.webdriver_url,
            headless = self.config.headless,
            "connecting to webdriver"
        );
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&self.config.webdriver_url)
            .await
            .map_err(|source| BrowserError::Connect {
                url: self.config.webdriver_url.clone(),
                source,
            })?;

        info!("browser session started");
        *state = SessionState::Running(client);
        Ok(())
    }

    /// Tear the browser down.
    ///
    /// The session counts as stopped no matter how the close round trip
    /// goes, and stopping an unstarted or already stopped session is a
    /// quiet no-op.
    pub async fn stop(&self) -> Result<(), BrowserError> {
        // Trip the scope first so in-flight page work linked to it bails out
        // before the client disappears.
        self.scope.cancel();

        let mut state = self.state.write().await;
        let previous = std::mem::replace(&mut *state, SessionState::Stopped);
        drop(state);

        match previous {
            SessionState::Running(client) => {
                client.close().await.map_err(BrowserError::Close)?;
                info!("browser session stopped");
                Ok(())
            }
            SessionState::NotStarted | SessionState::Stopped => Ok(()),
        }
    }

    async fn client(&self) -> Result<Client, BrowserError> {
        match &*self.state.read().await {
            SessionState::Running(client) => Ok(client.clone()),
            SessionState::NotStarted | SessionState::Stopped => Err(BrowserError::NotRunning),
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}

#[async_trait]
impl Automation for BrowserSession {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let client = self.client().await?;
        debug!(%url, "navigating");
        client.goto(url).await.map_err(|source| BrowserError::Command {
            operation: "navigation",
            source,
        })
    }

    async fn wait_for_selector(&self, selector: &str) -> Result<(), BrowserError> {
        let client = self.client().await?;
        match client
            .wait()
            .at_most(self.config.wait_timeout)
            .for_element(Locator::Css(selector))
            .await
        {
            Ok(_) => Ok(()),
            Err(CmdError::WaitTimeout) => Err(BrowserError::WaitTimeout {
                selector: selector.to_string(),
            }),
            Err(source) => Err(BrowserError::Command {
                operation: "selector wait",
                source,
            }),
        }
    }

    async fn click_all_by_text(&self, label: &str) -> Result<usize, BrowserError> {
        let client = self.client().await?;
        let value = client
            .execute(CLICK_ALL_BY_TEXT_SCRIPT, vec![json!(label)])
            .await
            .map_err(|source| BrowserError::Command {
                operation: "text click",
                source,
            })?;
        let clicked = value.as_u64().unwrap_or(0) as usize;
        debug!(label, clicked, "clicked anchors by text");
        Ok(clicked)
    }

    async fn outer_html(&self) -> Result<String, BrowserError> {
        let client = self.client().await?;
        client.source().await.map_err(|source| BrowserError::Command {
            operation: "source capture",
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn operations_require_a_running_session() {
        let session = BrowserSession::new(BrowserConfig::default());
        let err = session.outer_html().await.unwrap_err();
        assert!(matches!(err, BrowserError::NotRunning));
    }

    #[tokio::test]
    async fn stop_before_start_still_seals_the_session() {
        let session = BrowserSession::new(BrowserConfig::default());
        session.stop().await.unwrap();
        assert!(session.cancellation().is_cancelled());

        let err = session.start().await.unwrap_err();
        assert!(matches!(err, BrowserError::AlreadyStarted));
    }

    #[tokio::test]
    async fn double_stop_is_idempotent() {
        let session = BrowserSession::new(BrowserConfig::default());
        session.stop().await.unwrap();
        session.stop().await.unwrap();
    }

    #[tokio::test]
    async fn dropping_the_session_trips_its_scope() {
        let session = BrowserSession::new(BrowserConfig::default());
        let scope = session.cancellation();
        drop(session);
        assert!(scope.is_cancelled());
    }
}
