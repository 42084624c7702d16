use std::env;
use std::path::PathBuf;

use crate::store::{FileStorage, SessionStore};

pub const APP_NAME: &str = "workout-log";
/// Overrides the data directory when no `--data-dir` is given.
pub const DATA_DIR_ENV: &str = "WORKOUT_LOG_DIR";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Explicit directory first, then `WORKOUT_LOG_DIR`, then the platform's
    /// local data directory.
    pub fn resolve(data_dir: Option<PathBuf>) -> Self {
        let data_dir = data_dir
            .or_else(|| env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()).map(PathBuf::from))
            .unwrap_or_else(default_data_dir);
        Self { data_dir }
    }

    pub fn session_store(&self) -> SessionStore<FileStorage> {
        SessionStore::new(FileStorage::new(&self.data_dir))
    }
}

pub fn default_data_dir() -> PathBuf {
    match dirs::data_local_dir() {
        Some(dir) => dir.join(APP_NAME),
        None => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_directory_wins() {
        let config = AppConfig::resolve(Some(PathBuf::from("/tmp/lifts")));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/lifts"));
    }

    #[test]
    fn default_directory_is_app_scoped() {
        let dir = default_data_dir();
        assert!(dir.ends_with(APP_NAME) || dir == PathBuf::from("."));
    }
}
