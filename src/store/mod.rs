pub mod keys;
pub mod migrate;
pub mod operations;
pub mod repository;
pub mod trees;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::TransactionError;
use sled::Db;
use thiserror::Error;

#[derive(Debug)]
pub struct Store {
    db: Db,
    pub learning_progress: sled::Tree,
    pub topic_progress: sled::Tree,
    pub word_progress: sled::Tree,
    pub config_versions: sled::Tree,
    // Secondary index trees
    pub progress_by_id: sled::Tree,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not found: entity={entity}, key={key}")]
    NotFound { entity: String, key: String },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("migration error at version {version}: {message}")]
    Migration { version: u32, message: String },
}

impl Store {
    pub fn open(sled_path: &str) -> Result<Self, StoreError> {
        let db = sled::open(sled_path)?;
        let learning_progress = db.open_tree(trees::LEARNING_PROGRESS)?;
        let topic_progress = db.open_tree(trees::TOPIC_PROGRESS)?;
        let word_progress = db.open_tree(trees::WORD_PROGRESS)?;
        let config_versions = db.open_tree(trees::CONFIG_VERSIONS)?;
        let progress_by_id = db.open_tree(trees::PROGRESS_BY_ID)?;

        Ok(Self {
            db,
            learning_progress,
            topic_progress,
            word_progress,
            config_versions,
            progress_by_id,
        })
    }

    pub fn run_migrations(&self) -> Result<(), StoreError> {
        migrate::run(self)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    pub fn raw_db(&self) -> &Db {
        &self.db
    }

    pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub(crate) fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

pub(crate) fn map_tx_error(e: TransactionError<StoreError>) -> StoreError {
    match e {
        TransactionError::Abort(inner) => inner,
        TransactionError::Storage(se) => StoreError::Sled(se),
    }
}
