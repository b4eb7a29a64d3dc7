//! Keystroke delivery over the CDP Input domain.

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType,
};
use std::time::Duration;
use typewinner_core::{Key, KeySink};

const BACKSPACE_KEY_CODE: i64 = 8;

/// [`KeySink`] bound to the primary page. Waits out the drawn delay, then
/// dispatches the key as raw input events so the page sees real typing.
pub(crate) struct PageKeys {
    page: Page,
}

impl PageKeys {
    pub(crate) fn new(page: Page) -> Self {
        Self { page }
    }

    async fn send_char(&self, ch: char) -> anyhow::Result<()> {
        let params = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::Char)
            .text(ch.to_string())
            .build()
            .map_err(|reason| anyhow::anyhow!("failed to build key event: {reason}"))?;
        self.page.execute(params).await?;
        Ok(())
    }

    async fn press_backspace(&self) -> anyhow::Result<()> {
        let down = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyDown)
            .key("Backspace")
            .code("Backspace")
            .windows_virtual_key_code(BACKSPACE_KEY_CODE)
            .native_virtual_key_code(BACKSPACE_KEY_CODE)
            .build()
            .map_err(|reason| anyhow::anyhow!("failed to build key event: {reason}"))?;
        self.page.execute(down).await?;

        let up = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyUp)
            .key("Backspace")
            .code("Backspace")
            .windows_virtual_key_code(BACKSPACE_KEY_CODE)
            .native_virtual_key_code(BACKSPACE_KEY_CODE)
            .build()
            .map_err(|reason| anyhow::anyhow!("failed to build key event: {reason}"))?;
        self.page.execute(up).await?;
        Ok(())
    }
}

#[async_trait]
impl KeySink for PageKeys {
    async fn send(&self, key: Key, delay: Duration) -> anyhow::Result<()> {
        tokio::time::sleep(delay).await;
        match key {
            Key::Char(ch) => self.send_char(ch).await,
            Key::Backspace => self.press_backspace().await,
        }
    }
}
