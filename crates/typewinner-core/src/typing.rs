//! Character-level typing simulation.
//!
//! Converts a target string into a strictly ordered stream of keystrokes
//! with human-plausible randomized delays and self-canceling error bursts.
//! Delivery goes through the [`KeySink`] seam so the engine stays
//! independent of the browser transport.

use crate::config::{ConfigHandle, TypingConfig};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// One keystroke as delivered to the input target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
}

/// Destination for keystrokes.
///
/// Implementations wait out `delay` before delivering the key, mirroring
/// the per-keystroke delay of a human typist. An error means the input
/// target is gone; the engine treats it as a silent abort.
#[async_trait]
pub trait KeySink: Send + Sync {
    async fn send(&self, key: Key, delay: Duration) -> anyhow::Result<()>;
}

/// How a typing run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingOutcome {
    /// Every character was delivered.
    Completed,
    /// The sink failed mid-run; remaining characters were dropped.
    Aborted,
    /// Another run already holds the input focus; this run sent nothing.
    Busy,
}

/// The typing engine.
///
/// Holds the single-slot guard for the shared input focus: starting a run
/// while one is active drops the new run with [`TypingOutcome::Busy`].
pub struct Typist {
    config: ConfigHandle,
    slot: Mutex<()>,
}

impl Typist {
    pub fn new(config: ConfigHandle) -> Self {
        Self {
            config,
            slot: Mutex::new(()),
        }
    }

    /// Type `text` into the sink, one character at a time, in source order.
    ///
    /// The configuration is re-read at every character boundary, so host
    /// updates take effect mid-run. Each character may be preceded by an
    /// error burst according to the current error rate.
    pub async fn type_text(&self, text: &str, sink: &dyn KeySink) -> TypingOutcome {
        let Ok(_slot) = self.slot.try_lock() else {
            debug!("typing run already in progress, dropping new run");
            return TypingOutcome::Busy;
        };

        for ch in text.chars() {
            let config = self.config.snapshot();

            if roll_error(config.error_rate_percent) {
                if let Err(error) = self.error_burst(sink).await {
                    debug!(%error, "error burst failed, aborting typing run");
                    return TypingOutcome::Aborted;
                }
            }

            if let Err(error) = sink.send(Key::Char(ch), draw_delay(&config)).await {
                debug!(%error, "keystroke failed, aborting typing run");
                return TypingOutcome::Aborted;
            }
        }

        TypingOutcome::Completed
    }

    /// Send 1..=5 random lowercase letters, then the same number of
    /// backspaces. Net text length is unchanged.
    async fn error_burst(&self, sink: &dyn KeySink) -> anyhow::Result<()> {
        let count = rand::rng().random_range(1..=5u32);

        for _ in 0..count {
            let config = self.config.snapshot();
            sink.send(Key::Char(random_lowercase()), draw_delay(&config))
                .await?;
        }
        for _ in 0..count {
            let config = self.config.snapshot();
            sink.send(Key::Backspace, draw_delay(&config)).await?;
        }

        Ok(())
    }
}

fn roll_error(rate_percent: u8) -> bool {
    rand::rng().random_range(0..100u8) < rate_percent
}

fn draw_delay(config: &TypingConfig) -> Duration {
    // The fields are public, so a handle can hold an inverted range that
    // `set_speed` would have rejected; treat it as a fixed delay of `min`.
    let max = config.max_delay_ms.max(config.min_delay_ms);
    let millis = rand::rng().random_range(config.min_delay_ms..=max);
    Duration::from_millis(millis)
}

fn random_lowercase() -> char {
    (b'a' + rand::rng().random_range(0..26u8)) as char
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TypingConfig;
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::{Notify, watch};

    struct RecordingSink {
        keys: StdMutex<Vec<(Key, Duration)>>,
        fail_after: Option<usize>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                keys: StdMutex::new(Vec::new()),
                fail_after: None,
            }
        }

        fn failing_after(count: usize) -> Self {
            Self {
                keys: StdMutex::new(Vec::new()),
                fail_after: Some(count),
            }
        }

        fn keys(&self) -> Vec<Key> {
            self.keys.lock().unwrap().iter().map(|(k, _)| *k).collect()
        }

        fn delays(&self) -> Vec<Duration> {
            self.keys.lock().unwrap().iter().map(|(_, d)| *d).collect()
        }
    }

    #[async_trait]
    impl KeySink for RecordingSink {
        async fn send(&self, key: Key, delay: Duration) -> anyhow::Result<()> {
            let mut keys = self.keys.lock().unwrap();
            if let Some(limit) = self.fail_after
                && keys.len() >= limit
            {
                anyhow::bail!("input target gone");
            }
            keys.push((key, delay));
            Ok(())
        }
    }

    /// Sink that gates every send behind a watch flag the test flips.
    struct GatedSink {
        keys: StdMutex<Vec<Key>>,
        started: Notify,
        gate: watch::Sender<bool>,
    }

    impl GatedSink {
        fn new() -> Self {
            let (gate, _) = watch::channel(false);
            Self {
                keys: StdMutex::new(Vec::new()),
                started: Notify::new(),
                gate,
            }
        }

        fn open_gate(&self) {
            let _ = self.gate.send(true);
        }
    }

    #[async_trait]
    impl KeySink for GatedSink {
        async fn send(&self, key: Key, _delay: Duration) -> anyhow::Result<()> {
            self.started.notify_one();
            let mut rx = self.gate.subscribe();
            while !*rx.borrow_and_update() {
                rx.changed().await?;
            }
            self.keys.lock().unwrap().push(key);
            Ok(())
        }
    }

    /// Replay keystrokes against a text buffer.
    fn reconstruct(keys: &[Key]) -> String {
        let mut buffer = String::new();
        for key in keys {
            match key {
                Key::Char(ch) => buffer.push(*ch),
                Key::Backspace => {
                    buffer.pop();
                }
            }
        }
        buffer
    }

    /// With a 100% error rate every character must parse as:
    /// n burst letters, n backspaces, then the exact source character.
    fn assert_burst_before_every_char(keys: &[Key], text: &str) {
        let mut iter = keys.iter().copied().peekable();
        for expected in text.chars() {
            let mut burst = 0usize;
            while let Some(Key::Char(_)) = iter.peek() {
                // Look ahead: the correct character is only reached after
                // at least one backspace, so chars before the first
                // backspace all belong to the burst.
                burst += 1;
                iter.next();
            }
            assert!(burst >= 1, "missing error burst before {expected:?}");
            let mut backspaces = 0usize;
            while let Some(Key::Backspace) = iter.peek() {
                backspaces += 1;
                iter.next();
            }
            assert_eq!(burst, backspaces, "burst not self-canceling");
            assert_eq!(iter.next(), Some(Key::Char(expected)));
        }
        assert_eq!(iter.next(), None, "trailing keystrokes after text");
    }

    fn typist_with(config: TypingConfig) -> Typist {
        Typist::new(ConfigHandle::new(config))
    }

    #[tokio::test]
    async fn zero_error_rate_types_one_keystroke_per_character() {
        let typist = typist_with(TypingConfig::default());
        let sink = RecordingSink::new();

        let outcome = typist.type_text("the quick fox", &sink).await;

        assert_eq!(outcome, TypingOutcome::Completed);
        let keys = sink.keys();
        assert_eq!(keys.len(), "the quick fox".chars().count());
        assert!(!keys.contains(&Key::Backspace));
        assert_eq!(reconstruct(&keys), "the quick fox");
    }

    #[tokio::test]
    async fn all_delays_lie_within_configured_bounds() {
        let config = TypingConfig {
            min_delay_ms: 5,
            max_delay_ms: 9,
            error_rate_percent: 50,
        };
        let typist = typist_with(config);
        let sink = RecordingSink::new();

        typist.type_text("delays must stay bounded", &sink).await;

        for delay in sink.delays() {
            assert!(delay >= Duration::from_millis(5), "delay {delay:?} too low");
            assert!(delay <= Duration::from_millis(9), "delay {delay:?} too high");
        }
    }

    #[tokio::test]
    async fn bursts_are_self_canceling_at_any_rate() {
        let config = TypingConfig {
            min_delay_ms: 0,
            max_delay_ms: 0,
            error_rate_percent: 70,
        };
        let typist = typist_with(config);
        let sink = RecordingSink::new();

        typist.type_text("all work and no play", &sink).await;

        assert_eq!(reconstruct(&sink.keys()), "all work and no play");
    }

    #[tokio::test]
    async fn full_error_rate_bursts_before_every_character() {
        let config = TypingConfig {
            min_delay_ms: 0,
            max_delay_ms: 0,
            error_rate_percent: 100,
        };
        let typist = typist_with(config);
        let sink = RecordingSink::new();

        let outcome = typist.type_text("hi", &sink).await;

        assert_eq!(outcome, TypingOutcome::Completed);
        assert_burst_before_every_char(&sink.keys(), "hi");
    }

    #[tokio::test]
    async fn inverted_delay_range_falls_back_to_the_minimum() {
        let typist = typist_with(TypingConfig {
            min_delay_ms: 7,
            max_delay_ms: 3,
            error_rate_percent: 0,
        });
        let sink = RecordingSink::new();

        let outcome = typist.type_text("ok", &sink).await;

        assert_eq!(outcome, TypingOutcome::Completed);
        for delay in sink.delays() {
            assert_eq!(delay, Duration::from_millis(7));
        }
    }

    #[tokio::test]
    async fn sink_failure_aborts_silently_mid_run() {
        let typist = typist_with(TypingConfig::default());
        let sink = RecordingSink::failing_after(3);

        let outcome = typist.type_text("abcdef", &sink).await;

        assert_eq!(outcome, TypingOutcome::Aborted);
        assert_eq!(sink.keys().len(), 3);
    }

    #[tokio::test]
    async fn concurrent_run_is_dropped_without_interleaving() {
        let typist = Arc::new(typist_with(TypingConfig {
            min_delay_ms: 0,
            max_delay_ms: 0,
            error_rate_percent: 0,
        }));
        let sink = Arc::new(GatedSink::new());

        let race_typist = typist.clone();
        let race_sink = sink.clone();
        let race = tokio::spawn(async move {
            race_typist.type_text("race passage", race_sink.as_ref()).await
        });

        // Wait until the first keystroke is in flight, then contend.
        sink.started.notified().await;
        let contender = typist.type_text("abc123", sink.as_ref()).await;
        assert_eq!(contender, TypingOutcome::Busy);

        sink.open_gate();
        assert_eq!(race.await.unwrap(), TypingOutcome::Completed);

        // Only the first run's keystrokes reached the input target.
        let typed: String = sink
            .keys
            .lock()
            .unwrap()
            .iter()
            .map(|k| match k {
                Key::Char(ch) => *ch,
                Key::Backspace => '\u{8}',
            })
            .collect();
        assert_eq!(typed, "race passage");
    }

    #[tokio::test]
    async fn config_updates_apply_at_character_boundaries() {
        let handle = ConfigHandle::new(TypingConfig {
            min_delay_ms: 1,
            max_delay_ms: 1,
            error_rate_percent: 0,
        });
        let typist = Typist::new(handle.clone());

        let sink = RecordingSink::new();
        typist.type_text("ab", &sink).await;

        handle.set_speed(0, 0).unwrap();
        typist.type_text("cd", &sink).await;

        let delays = sink.delays();
        assert_eq!(delays[0], Duration::from_millis(1));
        assert_eq!(delays[3], Duration::from_millis(400));
    }
}
