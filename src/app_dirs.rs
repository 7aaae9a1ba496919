use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "keypace";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    /// `$HOME/.local/state/keypace`, or the platform data dir without a HOME.
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join(APP_NAME))
        } else {
            Self::project_dirs().map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn settings_path() -> PathBuf {
        Self::project_dirs()
            .map(|pd| pd.config_dir().join("settings.json"))
            .unwrap_or_else(|| PathBuf::from("keypace_settings.json"))
    }

    pub fn history_path() -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join("history.json"))
            .unwrap_or_else(|| PathBuf::from("keypace_history.json"))
    }

    pub fn log_dir() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("logs"))
    }
}
