//! Snapshot and seed files for the in-memory store

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tempfile::NamedTempFile;

use crate::core::{Document, Result, StoreError, document_from_json};

pub const SNAPSHOT_VERSION: u32 = 1;

// ============================================================================
// Database Snapshot
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    pub version: u32,
    pub metadata: SnapshotMetadata,
    pub collections: BTreeMap<String, Vec<Document>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub created_at: DateTime<Utc>,
    pub collection_count: usize,
    pub document_count: usize,
}

impl DatabaseSnapshot {
    pub fn new(collections: BTreeMap<String, Vec<Document>>) -> Self {
        let metadata = SnapshotMetadata {
            created_at: Utc::now(),
            collection_count: collections.len(),
            document_count: collections.values().map(Vec::len).sum(),
        };
        Self {
            version: SNAPSHOT_VERSION,
            metadata,
            collections,
        }
    }
}

// ============================================================================
// Snapshot Manager
// ============================================================================

pub struct SnapshotManager {
    snapshot_path: PathBuf,
}

impl SnapshotManager {
    pub fn new<P: AsRef<Path>>(snapshot_path: P) -> Self {
        Self {
            snapshot_path: snapshot_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Write through a temp file in the same directory, then rename over the
    /// target, so readers never see a half-written snapshot.
    pub fn save(&self, snapshot: &DatabaseSnapshot) -> Result<()> {
        let parent = match self.snapshot_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)?;

        let temp_file = NamedTempFile::new_in(&parent)?;
        {
            let mut writer = BufWriter::new(temp_file.as_file());
            serde_json::to_writer_pretty(&mut writer, snapshot)?;
            writer.flush()?;
        }
        temp_file.as_file().sync_all()?;
        temp_file
            .persist(&self.snapshot_path)
            .map_err(|e| StoreError::SnapshotError(format!("failed to persist snapshot: {}", e.error)))?;
        Ok(())
    }

    pub fn load(&self) -> Result<Option<DatabaseSnapshot>> {
        if !self.exists() {
            return Ok(None);
        }
        let reader = BufReader::new(File::open(&self.snapshot_path)?);
        let snapshot: DatabaseSnapshot = serde_json::from_reader(reader)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::SnapshotError(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }
        Ok(Some(snapshot))
    }

    pub fn exists(&self) -> bool {
        self.snapshot_path.exists()
    }
}

// ============================================================================
// Seed files
// ============================================================================

/// Read a seed file: either a full snapshot or a bare
/// `{"collection": [document, ...]}` object.
pub fn load_seed<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, Vec<Document>>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let raw: JsonValue = serde_json::from_reader(reader)?;
    parse_seed(raw).map_err(|e| match e {
        StoreError::SnapshotError(msg) => StoreError::SnapshotError(format!("{}: {msg}", path.display())),
        other => other,
    })
}

fn parse_seed(raw: JsonValue) -> Result<BTreeMap<String, Vec<Document>>> {
    let is_snapshot = raw.get("version").is_some() && raw.get("collections").is_some();
    if is_snapshot {
        let snapshot: DatabaseSnapshot = serde_json::from_value(raw)?;
        return Ok(snapshot.collections);
    }

    let JsonValue::Object(entries) = raw else {
        return Err(StoreError::SnapshotError(
            "seed must be an object mapping collection names to document arrays".to_string(),
        ));
    };

    let mut collections = BTreeMap::new();
    for (name, value) in entries {
        let JsonValue::Array(items) = value else {
            return Err(StoreError::SnapshotError(format!(
                "seed collection '{name}' must be an array"
            )));
        };
        let documents = items
            .into_iter()
            .map(document_from_json)
            .collect::<Result<Vec<_>>>()?;
        collections.insert(name, documents);
    }
    Ok(collections)
}
