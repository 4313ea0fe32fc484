//! Per-user file locations.

use std::io;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "notecli";
const STORE_FILE_NAME: &str = "notes.db";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub app_dir: PathBuf,
    pub store_file: PathBuf,
    pub log_dir: PathBuf,
}

impl AppPaths {
    /// Resolves paths under the OS configuration directory.
    pub fn resolve(store_override: Option<&Path>) -> Self {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::under(&config_dir, store_override)
    }

    pub fn under(config_dir: &Path, store_override: Option<&Path>) -> Self {
        let app_dir = config_dir.join(APP_DIR_NAME);
        let store_file = store_override
            .map(Path::to_path_buf)
            .unwrap_or_else(|| app_dir.join(STORE_FILE_NAME));
        let log_dir = app_dir.join(LOG_DIR_NAME);
        Self {
            app_dir,
            store_file,
            log_dir,
        }
    }

    /// Creates the directory holding the store file.
    pub fn ensure_store_dir(&self) -> io::Result<()> {
        match self.store_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => create_private_dir(parent),
            _ => Ok(()),
        }
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)
}

#[cfg(test)]
mod tests {
    use super::AppPaths;
    use std::path::Path;

    #[test]
    fn defaults_live_under_app_dir() {
        let paths = AppPaths::under(Path::new("/home/u/.config"), None);
        assert_eq!(paths.app_dir, Path::new("/home/u/.config/notecli"));
        assert_eq!(paths.store_file, Path::new("/home/u/.config/notecli/notes.db"));
        assert_eq!(paths.log_dir, Path::new("/home/u/.config/notecli/logs"));
    }

    #[test]
    fn store_override_replaces_only_store_file() {
        let paths = AppPaths::under(Path::new("/cfg"), Some(Path::new("/data/mine.db")));
        assert_eq!(paths.store_file, Path::new("/data/mine.db"));
        assert_eq!(paths.log_dir, Path::new("/cfg/notecli/logs"));
    }

    #[test]
    fn ensure_store_dir_creates_missing_parents() {
        let base = tempfile::tempdir().unwrap();
        let paths = AppPaths::under(base.path(), None);

        paths.ensure_store_dir().unwrap();
        paths.ensure_store_dir().unwrap();
        assert!(paths.app_dir.is_dir());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&paths.app_dir).unwrap().permissions().mode();
            assert_eq!(mode & 0o077, 0);
        }
    }
}
