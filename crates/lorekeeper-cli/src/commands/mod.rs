//! Command implementations.

pub mod entries;
pub mod import;
pub mod merge;
pub mod profile;
pub mod segment;

pub use self::entries::execute_entries;
pub use self::import::{execute_import, execute_restart, execute_resume};
pub use self::merge::{execute_duplicates, execute_merge};
pub use self::profile::execute_profile;
pub use self::segment::execute_segment;

use crate::config::Config;
use crate::error::{CliError, Result};
use lorekeeper_extractor::ExtractorConfig;
use lorekeeper_llm::{CancelSignal, OpenAiProvider};
use lorekeeper_store::SqliteStore;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Store key of a paused or failed import.
pub const IMPORT_CHECKPOINT_KEY: &str = "import";

/// Everything a command needs besides its own arguments.
pub struct Context {
    /// Loaded configuration (profile already applied)
    pub config: Config,

    /// `--db` override
    pub db: Option<PathBuf>,

    /// `--api-key` / `LOREKEEPER_API_KEY`
    pub api_key: Option<String>,
}

impl Context {
    /// Open the knowledge database, creating its directory if needed.
    pub fn open_store(&self) -> Result<SqliteStore> {
        let path = self.config.database_path(self.db.as_deref())?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        debug!("Opening database {}", path.display());
        Ok(SqliteStore::new(&path)?)
    }

    /// Provider for the active profile.
    pub fn provider(&self) -> Result<OpenAiProvider> {
        let profile = self.config.get_active_profile()?;
        let api_key = self
            .api_key
            .clone()
            .or_else(|| profile.api_key.clone())
            .filter(|k| !k.trim().is_empty())
            .ok_or(CliError::MissingApiKey)?;
        Ok(OpenAiProvider::new(&profile.api_url, api_key, &profile.model)?)
    }

    /// Extractor settings with an optional chunk-length override.
    pub fn extractor_config(&self, max_chunk_length: Option<usize>) -> Result<ExtractorConfig> {
        let mut config = self.config.extractor.clone();
        if let Some(max) = max_chunk_length {
            config.segmenter.max_chunk_length = max;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Pauses `cancel` on Ctrl+C until dropped.
pub struct InterruptGuard(JoinHandle<()>);

impl InterruptGuard {
    /// Start listening for Ctrl+C.
    pub fn pause_on_ctrl_c(cancel: &CancelSignal) -> Self {
        let cancel = cancel.clone();
        Self(tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted; pausing the current run");
                cancel.pause();
            }
        }))
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}
