//! Save-game snapshots.
//!
//! The whole [`GameState`] is wrapped in a small header document and
//! serialized as JSON. Every state field carries `#[serde(default)]`, so a
//! snapshot written before a field existed restores with that field at its
//! default instead of failing. Derived values are never persisted; restore
//! runs a full recompute over the restored owned state.

use crate::engine::{Engine, GameState};
use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies a document as an Emberhold snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0xE3B0_0451;
/// Bumped when the state schema changes incompatibly.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Malformed(String),
    #[error("not an emberhold snapshot (magic {0:#010x})")]
    BadMagic(u32),
    #[error("snapshot version {0} is newer than supported version {FORMAT_VERSION}")]
    FutureVersion(u32),
    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotDoc {
    magic: u32,
    version: u32,
    #[serde(default)]
    state: GameState,
}

impl Engine {
    /// Serialize the current owned state.
    pub fn snapshot(&self) -> Result<String, SnapshotError> {
        let doc = SnapshotDoc {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            state: self.state().clone(),
        };
        Ok(serde_json::to_string(&doc)?)
    }

    /// Restore an engine from a snapshot over the given content registry.
    pub fn restore(registry: Registry, json: &str) -> Result<Self, SnapshotError> {
        let doc: SnapshotDoc =
            serde_json::from_str(json).map_err(|e| SnapshotError::Malformed(e.to_string()))?;
        if doc.magic != SNAPSHOT_MAGIC {
            return Err(SnapshotError::BadMagic(doc.magic));
        }
        if doc.version > FORMAT_VERSION {
            return Err(SnapshotError::FutureVersion(doc.version));
        }
        Ok(Engine::from_state(registry, doc.state))
    }

    /// Restore, falling back to a fresh new-game engine when the payload
    /// cannot be interpreted. A corrupt snapshot is never partially applied.
    pub fn restore_or_new(registry: Registry, json: &str, seed: u64) -> Self {
        let doc: Option<SnapshotDoc> = serde_json::from_str(json).ok();
        match doc {
            Some(doc) if doc.magic == SNAPSHOT_MAGIC && doc.version <= FORMAT_VERSION => {
                Engine::from_state(registry, doc.state)
            }
            _ => Engine::new(registry, seed),
        }
    }
}
