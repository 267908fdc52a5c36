// SPDX-License-Identifier: MIT OR Apache-2.0

//! chessnet core - model topology migration
//!
//! The evaluation network is trained and exported with Keras 3, but the
//! browser loads it through the TF.js layers runtime, which only reads the
//! older Keras 2 graph layout. This crate provides:
//! - a typed model of the `model.json` graph description
//! - the migration from the Keras 3 encoding to the legacy one
//! - a structural smoke check of the migrated graph
//! - reading/writing the document and a file-to-file pipeline

#![deny(unsafe_code)]
#![deny(clippy::all)]

pub mod error;
pub mod history;
pub mod io;
pub mod migrate;
pub mod pipeline;
pub mod topology;
pub mod validate;

pub use error::TopologyError;
pub use io::{read_document, write_document};
pub use migrate::{migrate, MigrationReport};
pub use pipeline::{PipelineConfig, PipelineReport};
pub use topology::{
    Argument, CallEvent, GraphDescription, LayerList, LayerRef, LayerSpec, ModelDocument, Slot,
};
pub use validate::{validate, LayerListKind, ValidationError};
