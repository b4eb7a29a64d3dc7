//! Challenge solving.
//!
//! Takes the captured challenge image, asks the recognition capability for
//! the answer text, types it, and presses the dialog's submit control.
//! Every step is fault-isolated: a failed or unsolvable challenge leaves
//! the session running.

use crate::recognize::TextRecognizer;
use crate::session::GameSession;
use crate::typing::{Typist, TypingOutcome};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

pub struct ChallengeSolver {
    recognizer: RwLock<Option<Arc<dyn TextRecognizer>>>,
    typist: Arc<Typist>,
}

impl ChallengeSolver {
    /// Solver with no recognition capability; [`solve`](Self::solve) is a
    /// no-op until a recognizer is installed.
    pub fn new(typist: Arc<Typist>) -> Self {
        Self {
            recognizer: RwLock::new(None),
            typist,
        }
    }

    pub fn with_recognizer(typist: Arc<Typist>, recognizer: Arc<dyn TextRecognizer>) -> Self {
        let solver = Self::new(typist);
        solver.set_recognizer(Some(recognizer));
        solver
    }

    /// Install or remove the recognition capability. Called when the host
    /// saves a new credential.
    pub fn set_recognizer(&self, recognizer: Option<Arc<dyn TextRecognizer>>) {
        *self.recognizer.write().expect("recognizer lock poisoned") = recognizer;
    }

    pub fn is_enabled(&self) -> bool {
        self.recognizer
            .read()
            .expect("recognizer lock poisoned")
            .is_some()
    }

    /// Attempt to solve one challenge. Never fails; unsolved challenges are
    /// dropped without retry.
    pub async fn solve(&self, image: Vec<u8>, session: &dyn GameSession) {
        let recognizer = self
            .recognizer
            .read()
            .expect("recognizer lock poisoned")
            .clone();
        let Some(recognizer) = recognizer else {
            debug!("no recognition credential configured, skipping challenge");
            return;
        };

        let answer = match recognizer.extract_text(&image).await {
            Ok(Some(text)) if !text.is_empty() => text,
            Ok(_) => {
                debug!("challenge image yielded no text");
                return;
            }
            Err(error) => {
                warn!(%error, "challenge recognition failed");
                return;
            }
        };

        let keys = session.keys();
        match self.typist.type_text(&answer, keys.as_ref()).await {
            TypingOutcome::Completed => {
                if let Err(error) = session.submit_challenge().await {
                    warn!(%error, "challenge submit control unavailable");
                }
            }
            outcome => {
                debug!(?outcome, "challenge answer was not delivered");
            }
        }
    }
}
