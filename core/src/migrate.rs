// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rewrites a Keras 3 graph description into the shape the TF.js layers
//! runtime loads
//!
//! Three independent steps, each a no-op when its part of the graph is
//! already legacy-shaped:
//! 1. `InputLayer` configs get `batch_shape` renamed to `batch_input_shape`
//! 2. object-shaped call events in `inbound_nodes` become reference lists
//! 3. a flat `input_layers` / `output_layers` triple is wrapped in a list

use serde::Serialize;

use crate::history;
use crate::topology::{
    CallEvent, GraphDescription, LayerList, LayerSpec, Slot, LEGACY_SHAPE_KEY, MODERN_SHAPE_KEY,
};

/// What a migration pass changed
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Input layers whose shape key was renamed
    pub renamed_shapes: usize,
    /// Layers whose `inbound_nodes` were rebuilt
    pub converted_layers: usize,
    /// Modern call events rewritten to the legacy form
    pub converted_events: usize,
    /// Call arguments dropped because no history reference was found
    pub dropped_arguments: usize,
    /// Modern call events that resolved to nothing and were omitted
    pub dropped_events: usize,
    /// Flat input/output lists that were wrapped
    pub wrapped_layer_lists: usize,
}

impl MigrationReport {
    /// True when the graph was already in legacy form
    pub fn is_noop(&self) -> bool {
        self.renamed_shapes == 0
            && self.converted_layers == 0
            && self.wrapped_layer_lists == 0
    }

    /// True when some call inputs could not be carried over
    pub fn is_lossy(&self) -> bool {
        self.dropped_arguments > 0 || self.dropped_events > 0
    }
}

/// Migrate a graph in place
pub fn migrate(graph: &mut GraphDescription) -> MigrationReport {
    let mut report = MigrationReport::default();

    for layer in &mut graph.layers {
        if rename_input_shape(layer) {
            report.renamed_shapes += 1;
        }
        convert_inbound_nodes(layer, &mut report);
    }

    for (list_name, list) in [
        ("input_layers", &mut graph.input_layers),
        ("output_layers", &mut graph.output_layers),
    ] {
        if nest_layer_list(list) {
            tracing::debug!(list = list_name, "wrapped flat layer list");
            report.wrapped_layer_lists += 1;
        }
    }

    if report.is_lossy() {
        tracing::warn!(
            dropped_arguments = report.dropped_arguments,
            dropped_events = report.dropped_events,
            "some call arguments had no keras_history and were dropped"
        );
    }

    report
}

/// Move `batch_shape` to `batch_input_shape` on an `InputLayer`.
/// Leaves the config alone if the legacy key is already there.
pub fn rename_input_shape(layer: &mut LayerSpec) -> bool {
    if !layer.is_input_layer() {
        return false;
    }
    let Some(config) = layer.config.get_mut() else {
        return false;
    };
    if config.contains_key(LEGACY_SHAPE_KEY) {
        return false;
    }

    match config.remove(MODERN_SHAPE_KEY) {
        Some(shape) => {
            config.insert(LEGACY_SHAPE_KEY.to_string(), shape);
            true
        }
        None => false,
    }
}

/// Rebuild object-shaped call events as lists of four-slot references.
///
/// Legacy events already present are kept. A modern event that yields no
/// reference at all is left out of the rebuilt list, which may end up empty.
pub fn convert_inbound_nodes(layer: &mut LayerSpec, report: &mut MigrationReport) {
    let label = layer.label();
    let Some(events) = layer.inbound_nodes.get_mut() else {
        return;
    };
    if events.iter().all(CallEvent::is_legacy) {
        return;
    }

    let mut rebuilt = Vec::with_capacity(events.len());
    for event in events.drain(..) {
        match event {
            CallEvent::Legacy(refs) => rebuilt.push(CallEvent::Legacy(refs)),
            CallEvent::Modern(modern) => {
                let resolved = history::resolve_arguments(&modern.args);
                if resolved.dropped > 0 {
                    tracing::warn!(
                        layer = %label,
                        dropped = resolved.dropped,
                        "call arguments without keras_history"
                    );
                }
                report.dropped_arguments += resolved.dropped;

                if resolved.refs.is_empty() {
                    report.dropped_events += 1;
                } else {
                    report.converted_events += 1;
                    rebuilt.push(CallEvent::Legacy(resolved.refs));
                }
            }
        }
    }

    tracing::debug!(layer = %label, events = rebuilt.len(), "converted inbound_nodes");
    *events = rebuilt;
    report.converted_layers += 1;
}

/// Wrap a single bare triple into a one-element list
pub fn nest_layer_list(list: &mut Slot<LayerList>) -> bool {
    let Slot::Present(LayerList::Flat(layer_ref)) = list else {
        return false;
    };
    let layer_ref = layer_ref.clone();
    *list = Slot::Present(LayerList::Nested(vec![layer_ref]));
    true
}
