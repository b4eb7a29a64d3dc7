//! Error types for browser session operations.

use thiserror::Error;

/// The main error type for browser-side failures.
///
/// Most per-keystroke and per-navigation failures are swallowed at the
/// task boundary that observes them; these variants cover the operations
/// whose failure is allowed to surface (launch, attach, explicit DOM ops).
#[derive(Debug, Error)]
pub enum BrowserError {
    /// No compatible Chrome installation was found on this system.
    #[error("Google Chrome could not be found on this system")]
    ChromeNotFound,

    /// The browser process failed to start.
    #[error("failed to launch browser: {reason}")]
    LaunchFailed {
        /// Human-readable reason for the launch failure
        reason: String,
    },

    /// An operation was attempted on a closed browser instance.
    #[error("browser instance is already closed")]
    AlreadyClosed,

    /// A response body could not be decoded into raw bytes.
    #[error("malformed response body: {0}")]
    BodyDecode(#[from] base64::DecodeError),

    /// Wraps errors from the chromiumoxide library.
    #[error("chromiumoxide error: {0}")]
    ChromiumOxide(#[from] chromiumoxide::error::CdpError),

    /// Generic I/O errors (profile directory access, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for browser operations.
pub type Result<T> = std::result::Result<T, BrowserError>;
