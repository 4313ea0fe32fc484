//! Engine open options.

use std::time::Duration;

/// Owner read/write only.
pub const DEFAULT_STORE_FILE_MODE: u32 = 0o600;

/// Options applied when a store file is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Create the store file when it does not exist yet.
    pub create_if_missing: bool,
    /// How long to wait for another holder of the file lock. Zero fails fast.
    pub lock_timeout: Duration,
    /// Permission bits for a newly created store file. Unix only.
    pub file_mode: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            lock_timeout: Duration::ZERO,
            file_mode: DEFAULT_STORE_FILE_MODE,
        }
    }
}
