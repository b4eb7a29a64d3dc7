//! Session coordination.
//!
//! Owns the `Idle -> Launching -> Active -> Terminating -> Idle` state
//! machine, wires race-start and challenge events to the typing engine and
//! solver, and tells the host when a session ends so it can re-arm its
//! start affordance.

use crate::solver::ChallengeSolver;
use crate::typing::{KeySink, Typist};
use async_trait::async_trait;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

/// Events a launched game session reports to the coordinator.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A race began; payload is the passage to type.
    RaceStarted(String),
    /// A challenge image was captured off the wire.
    ChallengeCaptured(Vec<u8>),
    /// The browser process exited or the primary page closed.
    Disconnected,
}

/// One launched browser session, seen through the narrow operations the
/// core needs. The underlying remote-control transport stays swappable.
#[async_trait]
pub trait GameSession: Send + Sync {
    /// Keystroke sink bound to the session's input focus.
    fn keys(&self) -> Arc<dyn KeySink>;

    /// Wait until the race's text input exists and holds focus.
    /// Unbounded: the driving page decides when the input appears.
    async fn focus_race_input(&self) -> anyhow::Result<()>;

    /// Press the challenge dialog's submit control.
    async fn submit_challenge(&self) -> anyhow::Result<()>;

    /// Tear the browser down. Idempotent.
    async fn close(&self);
}

/// Launches game sessions.
#[async_trait]
pub trait GameBrowser: Send + Sync {
    async fn launch(
        &self,
        events: mpsc::Sender<SessionEvent>,
    ) -> anyhow::Result<Arc<dyn GameSession>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Launching,
    Active,
    Terminating,
}

/// Top-level orchestrator for the single active session.
pub struct SessionCoordinator {
    browser: Arc<dyn GameBrowser>,
    typist: Arc<Typist>,
    solver: Arc<ChallengeSolver>,
    state: StdMutex<SessionState>,
    session: Mutex<Option<Arc<dyn GameSession>>>,
    ended_tx: mpsc::UnboundedSender<()>,
}

impl SessionCoordinator {
    /// Returns the coordinator plus the host-facing session-ended channel.
    pub fn new(
        browser: Arc<dyn GameBrowser>,
        typist: Arc<Typist>,
        solver: Arc<ChallengeSolver>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<()>) {
        let (ended_tx, ended_rx) = mpsc::unbounded_channel();
        let coordinator = Arc::new(Self {
            browser,
            typist,
            solver,
            state: StdMutex::new(SessionState::Idle),
            session: Mutex::new(None),
            ended_tx,
        });
        (coordinator, ended_rx)
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().expect("state lock poisoned")
    }

    /// Launch a session. Returns `Ok(false)` when one is already running.
    pub async fn start(self: &Arc<Self>) -> anyhow::Result<bool> {
        {
            let mut state = self.state.lock().expect("state lock poisoned");
            if *state != SessionState::Idle {
                debug!(state = ?*state, "start requested while session active, ignoring");
                return Ok(false);
            }
            *state = SessionState::Launching;
        }

        let (events_tx, events_rx) = mpsc::channel(16);
        let session = match self.browser.launch(events_tx).await {
            Ok(session) => session,
            Err(error) => {
                *self.state.lock().expect("state lock poisoned") = SessionState::Idle;
                return Err(error);
            }
        };

        *self.session.lock().await = Some(session.clone());
        *self.state.lock().expect("state lock poisoned") = SessionState::Active;
        info!("browser session active");

        let coordinator = self.clone();
        tokio::spawn(async move {
            coordinator.run_events(events_rx, session).await;
        });

        Ok(true)
    }

    /// Close the active session, if any. The resulting disconnect event
    /// drives the normal termination path.
    pub async fn quit(&self) {
        let session = self.session.lock().await.clone();
        if let Some(session) = session {
            session.close().await;
        }
    }

    async fn run_events(
        self: Arc<Self>,
        mut events: mpsc::Receiver<SessionEvent>,
        session: Arc<dyn GameSession>,
    ) {
        loop {
            match events.recv().await {
                Some(SessionEvent::RaceStarted(passage)) => {
                    let coordinator = self.clone();
                    let session = session.clone();
                    tokio::spawn(async move {
                        coordinator.handle_race(session, passage).await;
                    });
                }
                Some(SessionEvent::ChallengeCaptured(image)) => {
                    let coordinator = self.clone();
                    let session = session.clone();
                    tokio::spawn(async move {
                        coordinator.solver.solve(image, session.as_ref()).await;
                    });
                }
                Some(SessionEvent::Disconnected) | None => break,
            }
        }

        self.terminate().await;
    }

    async fn handle_race(&self, session: Arc<dyn GameSession>, passage: String) {
        info!(chars = passage.chars().count(), "race started");

        if let Err(error) = session.focus_race_input().await {
            warn!(%error, "race input never became focusable");
            return;
        }

        let keys = session.keys();
        let outcome = self.typist.type_text(&passage, keys.as_ref()).await;
        debug!(?outcome, "race typing finished");
    }

    async fn terminate(&self) {
        *self.state.lock().expect("state lock poisoned") = SessionState::Terminating;

        if let Some(session) = self.session.lock().await.take() {
            session.close().await;
        }

        *self.state.lock().expect("state lock poisoned") = SessionState::Idle;
        let _ = self.ended_tx.send(());
        info!("browser session ended");
    }
}
