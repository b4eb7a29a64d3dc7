//! Chrome automation for the typing-race session.
//!
//! The crate drives a real, headful Chrome over the DevTools protocol:
//! launching it with a persistent profile, probing the game page for the
//! race start, intercepting challenge images off the network, and
//! delivering keystrokes as trusted input events.

mod chrome;
mod detector;
mod driver;
mod error;
mod game;
mod keys;
mod observer;

pub use chrome::find_chrome;
pub use driver::ChromeDriver;
pub use error::{BrowserError, Result};
pub use game::{CHALLENGE_URL_PREFIX, GAME_URL, is_challenge_response};
