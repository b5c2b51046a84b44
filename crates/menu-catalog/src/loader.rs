use crate::error::{CatalogError, Result};
use crate::index::CatalogIndex;
use crate::types::CatalogObject;
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Snapshot files hold either a bare array or a catalog list response.
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotDocument {
    Objects(Vec<CatalogObject>),
    Listing {
        #[serde(default)]
        objects: Vec<CatalogObject>,
    },
}

pub fn parse_snapshot(raw: &str) -> Result<Vec<CatalogObject>> {
    let doc: SnapshotDocument =
        serde_json::from_str(raw).map_err(|e| CatalogError::Decode(e.to_string()))?;
    Ok(match doc {
        SnapshotDocument::Objects(objects) => objects,
        SnapshotDocument::Listing { objects } => objects,
    })
}

pub fn load_snapshot_file(path: impl AsRef<Path>) -> anyhow::Result<Vec<CatalogObject>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading catalog snapshot: {}", path.display()))?;
    let objects =
        parse_snapshot(&raw).with_context(|| format!("parsing snapshot: {}", path.display()))?;
    Ok(objects)
}

pub fn load_index_file(path: impl AsRef<Path>) -> anyhow::Result<CatalogIndex> {
    let path = path.as_ref();
    let objects = load_snapshot_file(path)?;
    let index = CatalogIndex::build(&objects)
        .with_context(|| format!("indexing snapshot: {}", path.display()))?;
    Ok(index)
}
