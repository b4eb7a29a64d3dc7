//! Chrome binary discovery.

use std::path::PathBuf;

/// Locate a usable Chrome installation, checking the default install
/// locations for the current platform.
pub fn find_chrome() -> Option<PathBuf> {
    candidate_paths().into_iter().find(|path| path.exists())
}

#[cfg(target_os = "windows")]
fn candidate_paths() -> Vec<PathBuf> {
    let program_files =
        std::env::var("PROGRAMFILES").unwrap_or_else(|_| r"C:\Program Files".to_string());
    let program_files_x86 = std::env::var("PROGRAMFILES(X86)")
        .unwrap_or_else(|_| r"C:\Program Files (x86)".to_string());

    vec![
        PathBuf::from(program_files)
            .join("Google")
            .join("Chrome")
            .join("Application")
            .join("chrome.exe"),
        PathBuf::from(program_files_x86)
            .join("Google")
            .join("Chrome")
            .join("Application")
            .join("chrome.exe"),
    ]
}

#[cfg(target_os = "macos")]
fn candidate_paths() -> Vec<PathBuf> {
    vec![PathBuf::from(
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    )]
}

#[cfg(all(not(target_os = "windows"), not(target_os = "macos")))]
fn candidate_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/bin/google-chrome"),
        PathBuf::from("/usr/bin/google-chrome-stable"),
        PathBuf::from("/snap/bin/chromium"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_are_absolute_paths() {
        for path in candidate_paths() {
            assert!(path.is_absolute(), "{} is not absolute", path.display());
        }
    }

    #[test]
    fn discovery_does_not_panic() {
        // Result depends on the host; only the call itself is under test.
        let _ = find_chrome();
    }
}
