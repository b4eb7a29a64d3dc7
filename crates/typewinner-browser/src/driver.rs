//! Browser lifecycle management and session wiring.
//!
//! `ChromeDriver` launches exactly one Chrome process with a persistent
//! profile and hands back a [`GameSession`] with the network observer and
//! race detector already attached. The CDP handler task doubles as the
//! disconnect watch: when its stream ends the browser is gone, and a
//! single terminal event reaches the coordinator.

use crate::chrome;
use crate::detector;
use crate::error::{BrowserError, Result};
use crate::game::{CHALLENGE_SUBMIT_SELECTOR, GAME_URL, LAUNCH_ARGS, RACE_INPUT_SELECTOR};
use crate::keys::PageKeys;
use crate::observer;
use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::target::{
    EventTargetCreated, EventTargetDestroyed, TargetId,
};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::time::sleep;
use tracing::{debug, info};
use typewinner_core::{GameBrowser, GameSession, KeySink, SessionEvent};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Launches the game browser and owns its configuration.
pub struct ChromeDriver {
    chrome_path: PathBuf,
    profile_dir: PathBuf,
    game_url: String,
}

impl ChromeDriver {
    pub fn new(chrome_path: PathBuf, profile_dir: PathBuf) -> Self {
        Self {
            chrome_path,
            profile_dir,
            game_url: GAME_URL.to_string(),
        }
    }

    /// Driver using the detected Chrome binary and the per-application
    /// profile directory.
    pub fn discover() -> anyhow::Result<Self> {
        let chrome_path = chrome::find_chrome().ok_or(BrowserError::ChromeNotFound)?;
        let profile_dir = typewinner_core::paths::chrome_profile_dir()?;
        Ok(Self::new(chrome_path, profile_dir))
    }

    /// Point the session at a different page. Used by integration tests.
    pub fn with_game_url(mut self, url: impl Into<String>) -> Self {
        self.game_url = url.into();
        self
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        if !self.chrome_path.exists() {
            return Err(BrowserError::ChromeNotFound);
        }
        std::fs::create_dir_all(&self.profile_dir)?;

        let mut builder = BrowserConfig::builder()
            .with_head()
            .chrome_executable(self.chrome_path.clone())
            .user_data_dir(&self.profile_dir);
        for arg in LAUNCH_ARGS {
            builder = builder.arg(*arg);
        }

        builder
            .build()
            .map_err(|reason| BrowserError::LaunchFailed { reason })
    }
}

#[async_trait]
impl GameBrowser for ChromeDriver {
    async fn launch(
        &self,
        events: mpsc::Sender<SessionEvent>,
    ) -> anyhow::Result<Arc<dyn GameSession>> {
        let config = self.browser_config()?;

        let (browser, mut handler) =
            Browser::launch(config)
                .await
                .map_err(|error| BrowserError::LaunchFailed {
                    reason: error.to_string(),
                })?;

        // Drive the CDP connection; when the stream ends the browser
        // process or its page is gone, which is the terminal event.
        let disconnect_events = events.clone();
        tokio::spawn(async move {
            while let Some(result) = handler.next().await {
                if let Err(error) = result {
                    debug!(%error, "browser handler error");
                }
            }
            let _ = disconnect_events.send(SessionEvent::Disconnected).await;
        });

        let page = match browser.pages().await?.into_iter().next() {
            Some(page) => page,
            None => browser.new_page("about:blank").await?,
        };
        page.goto(self.game_url.as_str()).await?;

        observer::attach(&page, events.clone()).await?;
        detector::attach(&page, events).await?;
        info!(url = %self.game_url, "game page ready");

        let mut created = browser.event_listener::<EventTargetCreated>().await?;
        let mut destroyed = browser.event_listener::<EventTargetDestroyed>().await?;
        let browser = Arc::new(Mutex::new(Some(browser)));
        let primary_id = page.target_id().clone();

        // Single-page discipline: any extra page target (e.g. spawned via
        // `target=_blank`) is closed as soon as it appears.
        let watch_browser = browser.clone();
        let watch_primary = primary_id.clone();
        tokio::spawn(async move {
            while let Some(event) = created.next().await {
                let info = &event.target_info;
                if !is_extra_page(&info.r#type, &info.target_id, &watch_primary) {
                    continue;
                }
                let guard = watch_browser.lock().await;
                let Some(active) = guard.as_ref() else { break };
                debug!(url = %info.url, "closing extra page");
                if let Err(error) = close_target(active, &info.target_id).await {
                    debug!(%error, "failed to close extra page");
                }
            }
        });

        // Losing the primary page tears the whole browser down, which
        // surfaces as the usual disconnect.
        let teardown_browser = browser.clone();
        tokio::spawn(async move {
            while let Some(event) = destroyed.next().await {
                if event.target_id != primary_id {
                    continue;
                }
                info!("primary page closed, shutting browser down");
                if let Some(mut active) = teardown_browser.lock().await.take() {
                    let _ = active.close().await;
                    let _ = active.wait().await;
                }
                break;
            }
        });

        Ok(Arc::new(ChromeSession {
            keys: Arc::new(PageKeys::new(page.clone())),
            page,
            browser,
        }))
    }
}

/// Page targets other than the primary one are closed; workers, iframes
/// and other target kinds are left alone.
fn is_extra_page(kind: &str, target: &TargetId, primary: &TargetId) -> bool {
    kind == "page" && target != primary
}

async fn close_target(browser: &Browser, target: &TargetId) -> Result<()> {
    for page in browser.pages().await? {
        if page.target_id() == target {
            page.close().await?;
        }
    }
    Ok(())
}

struct ChromeSession {
    page: Page,
    keys: Arc<PageKeys>,
    browser: Arc<Mutex<Option<Browser>>>,
}

#[async_trait]
impl GameSession for ChromeSession {
    fn keys(&self) -> Arc<dyn KeySink> {
        self.keys.clone()
    }

    async fn focus_race_input(&self) -> anyhow::Result<()> {
        let input = loop {
            if self.browser.lock().await.is_none() {
                return Err(BrowserError::AlreadyClosed.into());
            }
            match self.page.find_element(RACE_INPUT_SELECTOR).await {
                Ok(element) => break element,
                Err(_) => sleep(POLL_INTERVAL).await,
            }
        };
        input.click().await?;

        loop {
            let focused: bool = self
                .page
                .evaluate(
                    "document.activeElement !== null && \
                     document.activeElement.tagName === 'INPUT'",
                )
                .await?
                .into_value()
                .unwrap_or(false);
            if focused {
                return Ok(());
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn submit_challenge(&self) -> anyhow::Result<()> {
        let button = self.page.find_element(CHALLENGE_SUBMIT_SELECTOR).await?;
        button.click().await?;
        Ok(())
    }

    async fn close(&self) {
        let mut guard = self.browser.lock().await;
        if let Some(mut browser) = guard.take() {
            if let Err(error) = browser.close().await {
                debug!(%error, "browser close failed");
            }
            let _ = browser.wait().await;
        }
    }
}
