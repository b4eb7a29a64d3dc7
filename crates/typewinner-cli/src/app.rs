//! Interactive console loop around the session coordinator.

use crate::console::{self, Command, HELP};
use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;
use typewinner_core::{ChallengeSolver, ConfigHandle, CredentialStore, SessionCoordinator};
use typewinner_vision::GroqVision;

enum Flow {
    Continue,
    Quit,
}

pub struct App {
    config: ConfigHandle,
    credentials: CredentialStore,
    solver: Arc<ChallengeSolver>,
    coordinator: Arc<SessionCoordinator>,
    ended: mpsc::UnboundedReceiver<()>,
}

impl App {
    pub fn new(
        config: ConfigHandle,
        credentials: CredentialStore,
        solver: Arc<ChallengeSolver>,
        coordinator: Arc<SessionCoordinator>,
        ended: mpsc::UnboundedReceiver<()>,
    ) -> Self {
        Self {
            config,
            credentials,
            solver,
            coordinator,
            ended,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        println!("{HELP}");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    match console::parse_command(&line) {
                        Ok(None) => {}
                        Ok(Some(command)) => {
                            if let Flow::Quit = self.dispatch(command).await {
                                break;
                            }
                        }
                        Err(message) => println!("{message}"),
                    }
                }
                ended = self.ended.recv() => {
                    if ended.is_none() {
                        break;
                    }
                    println!("session ended; type 'start' to launch again");
                }
            }
        }

        info!("console loop finished");
        Ok(())
    }

    async fn dispatch(&self, command: Command) -> Flow {
        match command {
            Command::Start => match self.coordinator.start().await {
                Ok(true) => println!("browser session launched"),
                Ok(false) => println!("a session is already running"),
                Err(error) => println!("failed to launch: {error:#}"),
            },
            Command::Speed { min, max } => match self.config.set_speed(min, max) {
                Ok(()) => {
                    let config = self.config.snapshot();
                    println!(
                        "speed set; keystroke delay now {}..={} ms",
                        config.min_delay_ms, config.max_delay_ms
                    );
                }
                Err(error) => println!("{error}"),
            },
            Command::Errors { percent } => match self.config.set_error_rate(percent) {
                Ok(()) => println!("error rate set to {percent}%"),
                Err(error) => println!("{error}"),
            },
            Command::Key { value: Some(key) } => match self.credentials.save(&key) {
                Ok(()) => {
                    self.solver
                        .set_recognizer(Some(Arc::new(GroqVision::new(key))));
                    println!("recognition key saved, challenge solving enabled");
                }
                Err(error) => println!("failed to save key: {error:#}"),
            },
            Command::Key { value: None } => {
                println!("{}", key_report(self.credentials.load()));
            }
            Command::Open { url } => {
                if let Err(error) = webbrowser::open(&url) {
                    println!("failed to open {url}: {error}");
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => {
                self.coordinator.quit().await;
                return Flow::Quit;
            }
        }
        Flow::Continue
    }
}

/// `key` with no argument reports the persisted credential itself, not
/// just whether one exists.
fn key_report(stored: Option<String>) -> String {
    match stored {
        Some(key) => format!("stored recognition key: {key}"),
        None => "no recognition key stored; challenge solving is disabled".to_string(),
    }
}
