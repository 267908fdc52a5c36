// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model documents shared by the integration tests

#![allow(dead_code)]

use serde_json::{json, Value};

fn keras_tensor(shape: Value, source: &str) -> Value {
    json!({
        "class_name": "__keras_tensor__",
        "config": {"shape": shape, "dtype": "float32", "keras_history": [source, 0, 0]}
    })
}

/// The evaluation net as exported by Keras 3 and the TF.js converter
pub fn keras3_document() -> Value {
    json!({
        "format": "layers-model",
        "generatedBy": "keras v3.3.3",
        "convertedBy": "TensorFlow.js Converter v4.20.0",
        "modelTopology": {
            "keras_version": "3.3.3",
            "backend": "tensorflow",
            "model_config": {
                "class_name": "Functional",
                "config": {
                    "name": "chess_eval",
                    "trainable": true,
                    "layers": [
                        {
                            "module": "keras.layers",
                            "class_name": "InputLayer",
                            "config": {"batch_shape": [1, 8, 8, 13], "dtype": "float32", "sparse": false, "name": "board"},
                            "registered_name": null,
                            "name": "board",
                            "inbound_nodes": []
                        },
                        {
                            "module": "keras.layers",
                            "class_name": "Conv2D",
                            "config": {"name": "conv2d_1", "filters": 32, "kernel_size": [3, 3], "padding": "same", "activation": "relu"},
                            "registered_name": null,
                            "build_config": {"input_shape": [1, 8, 8, 13]},
                            "name": "conv2d_1",
                            "inbound_nodes": [{"args": [keras_tensor(json!([1, 8, 8, 13]), "board")], "kwargs": {}}]
                        },
                        {
                            "module": "keras.layers",
                            "class_name": "Flatten",
                            "config": {"name": "flatten", "data_format": "channels_last"},
                            "registered_name": null,
                            "name": "flatten",
                            "inbound_nodes": [{"args": [keras_tensor(json!([1, 8, 8, 32]), "conv2d_1")], "kwargs": {}}]
                        },
                        {
                            "module": "keras.layers",
                            "class_name": "Dense",
                            "config": {"name": "dense_1", "units": 64, "activation": "relu"},
                            "registered_name": null,
                            "name": "dense_1",
                            "inbound_nodes": [{"args": [keras_tensor(json!([1, 2048]), "flatten")], "kwargs": {}}]
                        },
                        {
                            "module": "keras.layers",
                            "class_name": "Dense",
                            "config": {"name": "dense_2", "units": 1, "activation": "tanh"},
                            "registered_name": null,
                            "name": "dense_2",
                            "inbound_nodes": [{"args": [keras_tensor(json!([1, 64]), "dense_1")], "kwargs": {}}]
                        }
                    ],
                    "input_layers": ["board", 0, 0],
                    "output_layers": ["dense_2", 0, 0]
                }
            }
        },
        "weightsManifest": [{
            "paths": ["group1-shard1of1.bin"],
            "weights": [
                {"name": "conv2d_1/kernel", "shape": [3, 3, 13, 32], "dtype": "float32"},
                {"name": "dense_2/bias", "shape": [1], "dtype": "float32"}
            ]
        }]
    })
}

/// The same net in the layout the TF.js runtime reads
pub fn legacy_document() -> Value {
    json!({
        "format": "layers-model",
        "generatedBy": "keras v2.15.0",
        "convertedBy": "TensorFlow.js Converter v4.20.0",
        "modelTopology": {
            "keras_version": "2.15.0",
            "backend": "tensorflow",
            "model_config": {
                "class_name": "Functional",
                "config": {
                    "name": "chess_eval",
                    "layers": [
                        {
                            "class_name": "InputLayer",
                            "config": {"batch_input_shape": [1, 8, 8, 13], "dtype": "float32", "sparse": false, "name": "board"},
                            "name": "board",
                            "inbound_nodes": []
                        },
                        {
                            "class_name": "Conv2D",
                            "config": {"name": "conv2d_1", "filters": 32},
                            "name": "conv2d_1",
                            "inbound_nodes": [[["board", 0, 0, {}]]]
                        },
                        {
                            "class_name": "Flatten",
                            "config": {"name": "flatten"},
                            "name": "flatten",
                            "inbound_nodes": [[["conv2d_1", 0, 0, {}]]]
                        },
                        {
                            "class_name": "Dense",
                            "config": {"name": "dense_2", "units": 1},
                            "name": "dense_2",
                            "inbound_nodes": [[["flatten", 0, 0, {}]]]
                        }
                    ],
                    "input_layers": [["board", 0, 0]],
                    "output_layers": [["dense_2", 0, 0]]
                }
            }
        },
        "weightsManifest": [{"paths": ["group1-shard1of1.bin"], "weights": []}]
    })
}

pub fn to_bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap()
}

/// Pointer to a layer inside a whole document
pub fn layer_pointer(index: usize) -> String {
    format!("/modelTopology/model_config/config/layers/{}", index)
}
