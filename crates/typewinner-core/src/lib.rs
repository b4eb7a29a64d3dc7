//! Typing automation core for TypeWinner.
//!
//! This crate holds everything that does not touch a real browser or a
//! real recognition service: the shared typing configuration, credential
//! persistence, the character-level typing engine, the challenge solver,
//! and the session coordinator. The browser and recognition transports
//! plug in through the [`session::GameBrowser`], [`typing::KeySink`] and
//! [`recognize::TextRecognizer`] seams.

pub mod config;
pub mod credential;
pub mod paths;
pub mod recognize;
pub mod session;
pub mod solver;
pub mod typing;

pub use config::{ConfigHandle, MAX_DELAY_MS, TypingConfig};
pub use credential::CredentialStore;
pub use recognize::TextRecognizer;
pub use session::{GameBrowser, GameSession, SessionCoordinator, SessionEvent, SessionState};
pub use solver::ChallengeSolver;
pub use typing::{Key, KeySink, Typist, TypingOutcome};
