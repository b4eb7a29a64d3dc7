//! Per-application directory resolution.

use anyhow::Result;
use std::path::PathBuf;

const APP_DIR: &str = ".typewinner";
const KEY_FILE: &str = "grok.key";
const CHROME_PROFILE_DIR: &str = "chrome-profile";
const LOGS_DIR: &str = "logs";

/// Environment variable to override the TypeWinner directory.
const APP_DIR_ENV: &str = "TYPEWINNER_DIR";

/// Resolve the TypeWinner directory.
/// Priority: TYPEWINNER_DIR env var > ~/.typewinner/
pub fn resolve_app_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(APP_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|h| h.join(APP_DIR))
        .ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))
}

/// Ensure the TypeWinner directory exists and return its path.
pub fn ensure_app_dir() -> Result<PathBuf> {
    let dir = resolve_app_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Get the API key file path: ~/.typewinner/grok.key
pub fn key_path() -> Result<PathBuf> {
    Ok(resolve_app_dir()?.join(KEY_FILE))
}

/// Get the persistent browser profile directory: ~/.typewinner/chrome-profile
pub fn chrome_profile_dir() -> Result<PathBuf> {
    Ok(resolve_app_dir()?.join(CHROME_PROFILE_DIR))
}

/// Ensure the logs directory exists: ~/.typewinner/logs
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let dir = resolve_app_dir()?.join(LOGS_DIR);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_and_profile_paths_live_under_app_dir() {
        let app_dir = resolve_app_dir().unwrap();
        assert!(key_path().unwrap().starts_with(&app_dir));
        assert!(chrome_profile_dir().unwrap().starts_with(&app_dir));
    }
}
