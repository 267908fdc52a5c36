// SPDX-License-Identifier: MIT OR Apache-2.0

//! read → migrate → validate → write
//!
//! Each run is a pure function of the input document. Nothing is written
//! unless validation passes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TopologyError;
use crate::io;
use crate::migrate::{migrate, MigrationReport};
use crate::topology::ModelDocument;
use crate::validate::validate;

/// Where to read the export from and where to put the result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// The Keras 3 `model.json`
    pub input_path: PathBuf,
    /// Destination; the input is rewritten in place when absent
    pub output_path: Option<PathBuf>,
    /// Indent the written JSON
    pub pretty: bool,
    /// Migrate and validate without writing anything
    pub dry_run: bool,
}

impl PipelineConfig {
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            ..Self::default()
        }
    }

    pub fn with_output(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(output_path.into());
        self
    }

    pub fn output_path(&self) -> &Path {
        self.output_path.as_deref().unwrap_or(&self.input_path)
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub migration: MigrationReport,
    pub layers: usize,
    /// `None` on a dry run
    pub written_to: Option<PathBuf>,
}

/// Migrate and validate a parsed document in memory
pub fn process(document: &mut ModelDocument) -> Result<MigrationReport, TopologyError> {
    let graph = document.graph_mut();
    let report = migrate(graph);
    validate(graph)?;
    Ok(report)
}

/// Byte-level conversion, for callers that manage their own storage
pub fn convert(input: &[u8], pretty: bool) -> Result<(Vec<u8>, MigrationReport), TopologyError> {
    let mut document = io::read_document(input)?;
    let report = process(&mut document)?;
    let output = io::write_document(&document, pretty)?;
    Ok((output, report))
}

/// Run the whole conversion for one file
pub fn run(config: &PipelineConfig) -> Result<PipelineReport, TopologyError> {
    let mut document = io::load(&config.input_path)?;
    let layers = document.graph().layers.len();

    let migration = process(&mut document)?;
    tracing::info!(
        layers,
        renamed_shapes = migration.renamed_shapes,
        converted_layers = migration.converted_layers,
        wrapped_layer_lists = migration.wrapped_layer_lists,
        "topology migrated and validated"
    );

    if config.dry_run {
        tracing::info!("dry run, nothing written");
        return Ok(PipelineReport {
            migration,
            layers,
            written_to: None,
        });
    }

    let output_path = config.output_path();
    io::save(output_path, &document, config.pretty)?;
    tracing::info!(path = %output_path.display(), "patched model written");

    Ok(PipelineReport {
        migration,
        layers,
        written_to: Some(output_path.to_path_buf()),
    })
}

/// Validate a document as it is on disk, without migrating it.
/// Returns the number of layers.
pub fn check(path: &Path) -> Result<usize, TopologyError> {
    let document = io::load(path)?;
    validate(document.graph())?;
    Ok(document.graph().layers.len())
}
