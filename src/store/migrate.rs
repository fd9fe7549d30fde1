use crate::progress::types::LearningProgress;
use crate::store::keys;
use crate::store::{Store, StoreError};

const VERSION_KEY: &str = "_meta:version";

type MigrationFn = fn(&Store) -> Result<(), StoreError>;

fn migrations() -> Vec<(&'static str, MigrationFn)> {
    vec![
        ("001_initial", m001_initial),
        ("002_progress_id_index", m002_progress_id_index),
    ]
}

/// Applies pending migrations in order.
///
/// Each migration must be idempotent: a crash between running it and
/// recording its version re-runs it on the next start. Versions only move
/// forward.
pub fn run(store: &Store) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    let all = migrations();

    for (index, (name, func)) in all.iter().enumerate() {
        let version = (index + 1) as u32;
        if version > current {
            tracing::info!(version, name, "Running migration");
            func(store)?;
            set_version(store, version)?;
            tracing::info!(version, name, "Migration complete");
        } else {
            tracing::debug!(version, name, "Migration already applied, skipping");
        }
    }

    Ok(())
}

pub fn get_current_version(store: &Store) -> Result<u32, StoreError> {
    let Some(raw) = store.config_versions.get(VERSION_KEY.as_bytes())? else {
        return Ok(0);
    };
    let bytes: [u8; 4] = raw.as_ref().try_into().map_err(|_| StoreError::Migration {
        version: 0,
        message: format!("stored schema version has {} bytes, expected 4", raw.len()),
    })?;
    Ok(u32::from_be_bytes(bytes))
}

pub fn set_version(store: &Store, version: u32) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    if version < current {
        return Err(StoreError::Migration {
            version,
            message: format!("Refuse to downgrade from {} to {}", current, version),
        });
    }

    store
        .config_versions
        .insert(VERSION_KEY.as_bytes(), &version.to_be_bytes())?;
    Ok(())
}

fn m001_initial(_store: &Store) -> Result<(), StoreError> {
    Ok(())
}

/// Backfills the id index for records written before it existed.
fn m002_progress_id_index(store: &Store) -> Result<(), StoreError> {
    let mut backfilled = 0_u64;
    for item in store.learning_progress.iter() {
        let (user_key, value) = item?;
        let progress: LearningProgress = Store::deserialize(&value)?;
        let index_key = keys::progress_id_key(&progress.id)?;
        if !store.progress_by_id.contains_key(index_key.as_bytes())? {
            store.progress_by_id.insert(index_key.as_bytes(), user_key)?;
            backfilled += 1;
        }
    }
    tracing::info!(backfilled, "Progress id index backfilled");

    Ok(())
}
