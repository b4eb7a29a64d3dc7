//! Race-start detection.
//!
//! A mutation-observer probe runs in the page context and reports the race
//! passage through a one-way CDP binding. The probe is installed on attach
//! and re-installed on every main-frame navigation; install failures are
//! discarded because the page may simply be mid-transition.

use crate::error::Result;
use crate::game::{RACE_BINDING, race_probe_js};
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::page::EventFrameNavigated;
use chromiumoxide::cdp::js_protocol::runtime::{AddBindingParams, EventBindingCalled};
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::debug;
use typewinner_core::SessionEvent;

pub(crate) async fn attach(page: &Page, events: mpsc::Sender<SessionEvent>) -> Result<()> {
    page.execute(AddBindingParams::new(RACE_BINDING)).await?;

    let mut bindings = page.event_listener::<EventBindingCalled>().await?;
    tokio::spawn(async move {
        while let Some(event) = bindings.next().await {
            if event.name != RACE_BINDING {
                continue;
            }
            debug!("in-page probe reported race start");
            if events
                .send(SessionEvent::RaceStarted(event.payload.clone()))
                .await
                .is_err()
            {
                break;
            }
        }
    });

    let mut navigations = page.event_listener::<EventFrameNavigated>().await?;
    let probe_page = page.clone();
    tokio::spawn(async move {
        while let Some(event) = navigations.next().await {
            // Sub-frame navigations never carry the game UI.
            if event.frame.parent_id.is_some() {
                continue;
            }
            install_probe(&probe_page).await;
        }
    });

    install_probe(page).await;
    Ok(())
}

async fn install_probe(page: &Page) {
    if let Err(error) = page.evaluate(race_probe_js()).await {
        debug!(%error, "race probe install failed");
    }
}
