// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structural smoke check run on a migrated graph before it is written
//!
//! Checks run in a fixed order and stop at the first violation, scanning
//! layers in declaration order, so the same document always yields the
//! same diagnostic.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

use crate::topology::{CallEvent, GraphDescription, LayerList, Slot, LEGACY_SHAPE_KEY};

/// Which of the two model-level layer lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerListKind {
    Inputs,
    Outputs,
}

impl fmt::Display for LayerListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerListKind::Inputs => f.write_str("input_layers"),
            LayerListKind::Outputs => f.write_str("output_layers"),
        }
    }
}

/// A migrated graph the TF.js runtime would refuse to load
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The list is missing, empty, or a bare triple
    #[error("{list} is not a non-empty list of layer references")]
    UnnestedLayerList { list: LayerListKind },

    /// An object-shaped call event survived migration, or `inbound_nodes`
    /// itself is not a list (`event` is `None`)
    #[error("layer `{layer}` (#{index}) has unconverted {}", describe_event(.event))]
    UnconvertedCallEvent {
        layer: String,
        index: usize,
        event: Option<usize>,
    },

    #[error("input layer `{layer}` (#{index}) does not declare `batch_input_shape`")]
    MissingShapeDeclaration { layer: String, index: usize },

    /// A reference names a layer that is not declared before the referrer
    #[error("{referrer} references undeclared layer `{target}`")]
    UnknownLayerRef { referrer: String, target: String },
}

fn describe_event(event: &Option<usize>) -> String {
    match event {
        Some(event) => format!("call event at inbound_nodes[{}]", event),
        None => "inbound_nodes (not a list)".to_string(),
    }
}

/// Check a migrated graph
pub fn validate(graph: &GraphDescription) -> Result<(), ValidationError> {
    check_layer_list(graph.input_layers.get(), LayerListKind::Inputs)?;
    check_layer_list(graph.output_layers.get(), LayerListKind::Outputs)?;
    check_call_events(graph)?;
    check_shape_declarations(graph)?;
    check_references(graph)?;
    Ok(())
}

fn check_layer_list(list: Option<&LayerList>, kind: LayerListKind) -> Result<(), ValidationError> {
    match list {
        Some(LayerList::Nested(refs)) if !refs.is_empty() => Ok(()),
        _ => Err(ValidationError::UnnestedLayerList { list: kind }),
    }
}

fn check_call_events(graph: &GraphDescription) -> Result<(), ValidationError> {
    for (index, layer) in graph.layers.iter().enumerate() {
        let unconverted = match &layer.inbound_nodes {
            Slot::Absent => continue,
            Slot::Null => Some(None),
            Slot::Present(events) => events.iter().position(|event| !event.is_legacy()).map(Some),
        };
        if let Some(event) = unconverted {
            return Err(ValidationError::UnconvertedCallEvent {
                layer: layer.label(),
                index,
                event,
            });
        }
    }
    Ok(())
}

fn check_shape_declarations(graph: &GraphDescription) -> Result<(), ValidationError> {
    for (index, layer) in graph.layers.iter().enumerate() {
        if !layer.is_input_layer() {
            continue;
        }
        let declared = layer
            .config
            .get()
            .is_some_and(|config| config.contains_key(LEGACY_SHAPE_KEY));
        if !declared {
            return Err(ValidationError::MissingShapeDeclaration {
                layer: layer.label(),
                index,
            });
        }
    }
    Ok(())
}

fn check_references(graph: &GraphDescription) -> Result<(), ValidationError> {
    let mut declared: HashSet<&str> = HashSet::new();

    for (index, layer) in graph.layers.iter().enumerate() {
        for event in layer.inbound_nodes.get().into_iter().flatten() {
            let CallEvent::Legacy(refs) = event else {
                continue;
            };
            if let Some(missing) = refs.iter().find(|r| !declared.contains(r.layer_name.as_str())) {
                return Err(ValidationError::UnknownLayerRef {
                    referrer: format!("layer `{}` (#{})", layer.label(), index),
                    target: missing.layer_name.clone(),
                });
            }
        }
        if let Some(name) = layer.name() {
            declared.insert(name);
        }
    }

    for (kind, list) in [
        (LayerListKind::Inputs, &graph.input_layers),
        (LayerListKind::Outputs, &graph.output_layers),
    ] {
        let refs = list.get().map(LayerList::refs).unwrap_or_default();
        if let Some(missing) = refs.iter().find(|r| !declared.contains(r.layer_name.as_str())) {
            return Err(ValidationError::UnknownLayerRef {
                referrer: kind.to_string(),
                target: missing.layer_name.clone(),
            });
        }
    }

    Ok(())
}
