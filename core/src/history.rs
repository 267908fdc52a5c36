// SPDX-License-Identifier: MIT OR Apache-2.0

//! Locating the `keras_history` origin of Keras 3 call arguments
//!
//! The history triple has been observed at two depths: directly on the
//! argument object, and under its `config` (the `__keras_tensor__` form).
//! Each depth is one extractor; they are tried in order and the first hit
//! wins.

use serde_json::{Map, Value};

use crate::topology::{Argument, LayerRef, HISTORY_KEY};

/// A named strategy for pulling a history reference out of a tensor object
#[derive(Clone, Copy)]
pub struct HistoryExtractor {
    pub name: &'static str,
    pub extract: fn(&Map<String, Value>) -> Option<LayerRef>,
}

/// Extractors in the order they are tried
pub const EXTRACTORS: [HistoryExtractor; 2] = [
    HistoryExtractor {
        name: "direct",
        extract: direct_history,
    },
    HistoryExtractor {
        name: "nested_config",
        extract: nested_config_history,
    },
];

fn direct_history(tensor: &Map<String, Value>) -> Option<LayerRef> {
    tensor.get(HISTORY_KEY).and_then(parse_history)
}

fn nested_config_history(tensor: &Map<String, Value>) -> Option<LayerRef> {
    tensor
        .get("config")?
        .as_object()?
        .get(HISTORY_KEY)
        .and_then(parse_history)
}

/// Parse a well-formed `[layer_name, call_index, tensor_index]` triple into
/// a four-slot inbound reference.
pub fn parse_history(value: &Value) -> Option<LayerRef> {
    match value.as_array()?.as_slice() {
        [Value::String(layer_name), call_index, tensor_index] => Some(LayerRef::with_empty_kwargs(
            layer_name.clone(),
            call_index.as_u64()?,
            tensor_index.as_u64()?,
        )),
        _ => None,
    }
}

/// Run the extractors over one tensor object
pub fn extract_history(tensor: &Map<String, Value>) -> Option<LayerRef> {
    EXTRACTORS.iter().find_map(|extractor| {
        let found = (extractor.extract)(tensor);
        if found.is_some() {
            tracing::trace!(strategy = extractor.name, "resolved keras_history");
        }
        found
    })
}

/// References recovered from one call event
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResolvedArguments {
    pub refs: Vec<LayerRef>,
    /// Arguments with no locatable history
    pub dropped: usize,
}

/// Resolve every argument of a call, in order. Grouped arguments are
/// expanded member by member.
pub fn resolve_arguments(args: &[Argument]) -> ResolvedArguments {
    let mut resolved = ResolvedArguments::default();
    for arg in args {
        resolve_argument(arg, &mut resolved);
    }
    resolved
}

fn resolve_argument(arg: &Argument, resolved: &mut ResolvedArguments) {
    match arg {
        Argument::Group(members) => {
            for member in members {
                resolve_argument(member, resolved);
            }
        }
        Argument::Tensor(tensor) => match extract_history(tensor) {
            Some(layer_ref) => resolved.refs.push(layer_ref),
            None => resolved.dropped += 1,
        },
        Argument::Literal(_) => resolved.dropped += 1,
    }
}
