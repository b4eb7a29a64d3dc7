//! Network observation via the CDP Fetch domain.
//!
//! Interception pauses every request at both stages. Each paused request
//! MUST be explicitly continued or the page stalls indefinitely, so the
//! continue call runs unconditionally and its failures are only logged.
//! Response-stage pauses whose URL matches the challenge endpoint have
//! their body captured and handed to the session event channel.

use crate::error::Result;
use crate::game::is_challenge_response;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, GetResponseBodyParams,
    RequestPattern, RequestStage,
};
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::debug;
use typewinner_core::SessionEvent;

pub(crate) async fn attach(page: &Page, events: mpsc::Sender<SessionEvent>) -> Result<()> {
    let mut paused = page.event_listener::<EventRequestPaused>().await?;

    page.execute(EnableParams {
        patterns: Some(vec![
            stage_pattern(RequestStage::Request),
            stage_pattern(RequestStage::Response),
        ]),
        handle_auth_requests: None,
    })
    .await?;

    let page = page.clone();
    tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            if event.response_status_code.is_some() && is_challenge_response(&event.request.url) {
                match read_response_body(&page, &event).await {
                    Ok(image) => {
                        debug!(bytes = image.len(), "captured challenge image");
                        let _ = events.send(SessionEvent::ChallengeCaptured(image)).await;
                    }
                    Err(error) => {
                        debug!(%error, "failed to read challenge image body");
                    }
                }
            }

            let release = ContinueRequestParams::new(event.request_id.clone());
            if let Err(error) = page.execute(release).await {
                debug!(%error, url = %event.request.url, "request continue failed");
            }
        }
    });

    Ok(())
}

fn stage_pattern(stage: RequestStage) -> RequestPattern {
    RequestPattern {
        url_pattern: Some("*".to_string()),
        resource_type: None,
        request_stage: Some(stage),
    }
}

async fn read_response_body(page: &Page, event: &EventRequestPaused) -> Result<Vec<u8>> {
    let response = page
        .execute(GetResponseBodyParams::new(event.request_id.clone()))
        .await?;

    if response.base64_encoded {
        Ok(BASE64.decode(response.body.as_bytes())?)
    } else {
        Ok(response.body.clone().into_bytes())
    }
}
