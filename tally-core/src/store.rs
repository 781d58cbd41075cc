use std::path::{Path, PathBuf};

use tally_model::LedgerRecord;
use tracing::warn;

/// Ledger persistence failures. Parse failures are not listed here: an
/// unreadable document is handled inside [`LedgerStore::load`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying filesystem failure.
    #[error("ledger io error: {0}")]
    Io(#[from] std::io::Error),

    /// The in-memory ledger could not be serialized.
    #[error("ledger serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable home of the ledger: one JSON document holding every record,
/// read and rewritten in full per tracking operation. There is no
/// row-level access and no in-memory cache between operations.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    /// Store backed by the document at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full ledger.
    ///
    /// A missing file is an empty ledger. An unparseable document is moved
    /// aside to `<path>.corrupt` and replaced by an empty ledger so
    /// tracking can continue without silently destroying the old bytes.
    pub async fn load(&self) -> Result<Vec<LedgerRecord>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_slice(&bytes) {
            Ok(records) => Ok(records),
            Err(err) => {
                let quarantine = self.quarantine_path();
                warn!(
                    path = %self.path.display(),
                    quarantine = %quarantine.display(),
                    error = %err,
                    "ledger document is unreadable, continuing with an empty ledger"
                );
                if let Err(rename_err) = tokio::fs::rename(&self.path, &quarantine).await {
                    warn!(error = %rename_err, "failed to move unreadable ledger aside");
                }
                Ok(Vec::new())
            }
        }
    }

    /// Overwrite the whole document with `records`.
    pub async fn save(&self, records: &[LedgerRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    fn quarantine_path(&self) -> PathBuf {
        let mut path = self.path.clone().into_os_string();
        path.push(".corrupt");
        PathBuf::from(path)
    }
}
