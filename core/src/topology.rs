// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed view of a TensorFlow.js `model.json` graph description
//!
//! Only the fields the migration touches are modelled. Everything else is
//! kept in a flattened `extra` map at each level so that a document survives
//! a read/write cycle with the same key sets and array nesting.

use serde::de::Deserializer;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Layer kind that declares a model input
pub const INPUT_LAYER_CLASS: &str = "InputLayer";

/// Shape key written by Keras 3 exports
pub const MODERN_SHAPE_KEY: &str = "batch_shape";

/// Shape key the TF.js layers runtime reads
pub const LEGACY_SHAPE_KEY: &str = "batch_input_shape";

/// Field holding the `[layer, call, tensor]` origin of a Keras 3 tensor
pub const HISTORY_KEY: &str = "keras_history";

/// Root of a `model.json` file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    #[serde(rename = "modelTopology")]
    pub model_topology: ModelTopology,
    /// `format`, `generatedBy`, `weightsManifest`, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModelDocument {
    pub fn graph(&self) -> &GraphDescription {
        &self.model_topology.model_config.config
    }

    pub fn graph_mut(&mut self) -> &mut GraphDescription {
        &mut self.model_topology.model_config.config
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTopology {
    pub model_config: ModelConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub config: GraphDescription,
    /// Usually just `class_name: "Functional"`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The layer graph of a functional model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDescription {
    /// Layers in declaration order
    pub layers: Vec<LayerSpec>,
    #[serde(default, skip_serializing_if = "Slot::is_absent")]
    pub input_layers: Slot<LayerList>,
    #[serde(default, skip_serializing_if = "Slot::is_absent")]
    pub output_layers: Slot<LayerList>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GraphDescription {
    /// Find a layer by its identity
    pub fn layer(&self, name: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|layer| layer.name() == Some(name))
    }

    /// Names of all layers that declare one, in declaration order
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().filter_map(LayerSpec::name).collect()
    }
}

/// A single node of the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub class_name: String,
    #[serde(default, skip_serializing_if = "Slot::is_absent")]
    pub name: Slot<String>,
    #[serde(default, skip_serializing_if = "Slot::is_absent")]
    pub config: Slot<Map<String, Value>>,
    /// One entry per invocation of the layer
    #[serde(default, skip_serializing_if = "Slot::is_absent")]
    pub inbound_nodes: Slot<Vec<CallEvent>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LayerSpec {
    /// Stable layer identity. Keras 3 writes it at the top level, older
    /// exports only inside `config`.
    pub fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str).or_else(|| {
            self.config
                .get()
                .and_then(|config| config.get("name"))
                .and_then(Value::as_str)
        })
    }

    /// Name for diagnostics; falls back to the class name for anonymous layers
    pub fn label(&self) -> String {
        match self.name() {
            Some(name) => name.to_string(),
            None => format!("<{}>", self.class_name),
        }
    }

    pub fn is_input_layer(&self) -> bool {
        self.class_name == INPUT_LAYER_CLASS
    }
}

/// A modelled key that may be missing, explicitly `null`, or set
///
/// Missing keys stay missing and `null` stays `null` on write.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    Absent,
    Null,
    Present(T),
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Absent
    }
}

impl<T> Slot<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Slot::Absent)
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Slot::Present(value) => Some(value),
            Slot::Absent | Slot::Null => None,
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Slot::Present(value) => Some(value),
            Slot::Absent | Slot::Null => None,
        }
    }
}

impl<T: Serialize> Serialize for Slot<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Slot::Present(value) => value.serialize(serializer),
            Slot::Absent | Slot::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Slot<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Slot::Present(value),
            None => Slot::Null,
        })
    }
}

/// Reference to one output tensor of one invocation of a layer
///
/// On the wire this is `[name, call_index, tensor_index]`, or with a fourth
/// kwargs slot inside legacy `inbound_nodes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRef {
    pub layer_name: String,
    pub call_index: u64,
    pub tensor_index: u64,
    pub kwargs: Option<Map<String, Value>>,
}

impl LayerRef {
    /// A bare triple, as used in `input_layers` / `output_layers`
    pub fn new(layer_name: impl Into<String>, call_index: u64, tensor_index: u64) -> Self {
        Self {
            layer_name: layer_name.into(),
            call_index,
            tensor_index,
            kwargs: None,
        }
    }

    /// A four-slot inbound reference with empty call kwargs
    pub fn with_empty_kwargs(layer_name: impl Into<String>, call_index: u64, tensor_index: u64) -> Self {
        Self {
            kwargs: Some(Map::new()),
            ..Self::new(layer_name, call_index, tensor_index)
        }
    }
}

impl Serialize for LayerRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = if self.kwargs.is_some() { 4 } else { 3 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.layer_name)?;
        seq.serialize_element(&self.call_index)?;
        seq.serialize_element(&self.tensor_index)?;
        if let Some(kwargs) = &self.kwargs {
            seq.serialize_element(kwargs)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for LayerRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum LayerRefRepr {
            WithKwargs(String, u64, u64, Map<String, Value>),
            Triple(String, u64, u64),
        }

        Ok(match LayerRefRepr::deserialize(deserializer)? {
            LayerRefRepr::WithKwargs(layer_name, call_index, tensor_index, kwargs) => LayerRef {
                layer_name,
                call_index,
                tensor_index,
                kwargs: Some(kwargs),
            },
            LayerRefRepr::Triple(layer_name, call_index, tensor_index) => {
                LayerRef::new(layer_name, call_index, tensor_index)
            }
        })
    }
}

/// One invocation of a layer
///
/// Legacy exports list the consumed tensors directly; Keras 3 wraps them in
/// an object with `args` / `kwargs`. Which one we have is decided once, when
/// the document is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallEvent {
    Legacy(Vec<LayerRef>),
    Modern(ModernCallEvent),
}

impl CallEvent {
    pub fn is_legacy(&self) -> bool {
        matches!(self, CallEvent::Legacy(_))
    }
}

/// Keras 3 call record: `{"args": [...], "kwargs": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModernCallEvent {
    #[serde(default)]
    pub args: Vec<Argument>,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One positional argument of a Keras 3 call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Argument {
    /// List-valued input, e.g. the tensors fed to `Concatenate`
    Group(Vec<Argument>),
    /// A serialized tensor object, normally `__keras_tensor__`
    Tensor(Map<String, Value>),
    Literal(Value),
}

/// `input_layers` / `output_layers`
///
/// Entries are always bare triples; a kwargs slot is not accepted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayerList {
    /// `[["name", 0, 0], ...]`
    #[serde(deserialize_with = "deserialize_triples")]
    Nested(Vec<LayerRef>),
    /// `["name", 0, 0]`, emitted by Keras 3 for single-tensor models
    #[serde(deserialize_with = "deserialize_triple")]
    Flat(LayerRef),
}

fn deserialize_triple<'de, D>(deserializer: D) -> Result<LayerRef, D::Error>
where
    D: Deserializer<'de>,
{
    let (layer_name, call_index, tensor_index) = <(String, u64, u64)>::deserialize(deserializer)?;
    Ok(LayerRef::new(layer_name, call_index, tensor_index))
}

fn deserialize_triples<'de, D>(deserializer: D) -> Result<Vec<LayerRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let triples = Vec::<(String, u64, u64)>::deserialize(deserializer)?;
    Ok(triples
        .into_iter()
        .map(|(layer_name, call_index, tensor_index)| LayerRef::new(layer_name, call_index, tensor_index))
        .collect())
}

impl LayerList {
    pub fn refs(&self) -> &[LayerRef] {
        match self {
            LayerList::Nested(refs) => refs,
            LayerList::Flat(layer_ref) => std::slice::from_ref(layer_ref),
        }
    }
}
