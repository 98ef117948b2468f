// Configuration path utilities.
// Locates the per-user configuration directory and file.

use std::path::PathBuf;

use directories::ProjectDirs;

/// Get the base config directory (~/.config/quizdesk on Linux).
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "quizdesk").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Path to the default configuration file.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path() {
        // Path construction only; the file need not exist
        if let Some(path) = config_path() {
            assert!(path.ends_with("config.json"));
            assert!(path.parent().unwrap().ends_with("quizdesk"));
        }
    }
}
