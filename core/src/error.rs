// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors that abort a conversion run

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::validate::ValidationError;

/// Reasons a model document could not be converted
#[derive(Debug, Error)]
pub enum TopologyError {
    /// Input is not JSON or lacks the layer list
    #[error("malformed model document: {reason}")]
    MalformedDocument { reason: String },

    /// The migrated graph failed the smoke check
    #[error("migrated topology failed validation: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to serialize model document: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TopologyError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        TopologyError::MalformedDocument {
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        TopologyError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
