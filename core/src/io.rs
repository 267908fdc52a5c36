// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reading and writing `model.json` documents

use std::io::Write;
use std::path::Path;

use serde_json::Value;
use tempfile::NamedTempFile;

use crate::error::TopologyError;
use crate::topology::ModelDocument;

/// JSON pointer to the layer list every document must carry
pub const LAYERS_POINTER: &str = "/modelTopology/model_config/config/layers";

/// Parse a document from raw bytes
pub fn read_document(bytes: &[u8]) -> Result<ModelDocument, TopologyError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| TopologyError::malformed(format!("invalid JSON: {}", e)))?;

    if !value.pointer(LAYERS_POINTER).is_some_and(Value::is_array) {
        return Err(TopologyError::malformed(format!(
            "no layer array at {}",
            LAYERS_POINTER
        )));
    }

    serde_json::from_value(value).map_err(|e| TopologyError::malformed(e.to_string()))
}

/// Serialize a document; compact unless `pretty` is set
pub fn write_document(document: &ModelDocument, pretty: bool) -> Result<Vec<u8>, TopologyError> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(document)
    } else {
        serde_json::to_vec(document)
    };
    bytes.map_err(TopologyError::Serialize)
}

/// Read and parse a document from disk
pub fn load(path: &Path) -> Result<ModelDocument, TopologyError> {
    let bytes = std::fs::read(path).map_err(|e| TopologyError::io(path, e))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "read model document");
    read_document(&bytes)
}

/// Write a document to disk.
///
/// The bytes go to a temporary file in the target directory which is then
/// renamed over `path`, so a failed write never leaves a partial artifact.
pub fn save(path: &Path, document: &ModelDocument, pretty: bool) -> Result<(), TopologyError> {
    let bytes = write_document(document, pretty)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| TopologyError::io(dir, e))?;
    tmp.write_all(&bytes).map_err(|e| TopologyError::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| TopologyError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| TopologyError::io(path, e.error))?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote model document");
    Ok(())
}
