// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! # ONNX Codegen Core
//!
//! The operator-dispatch and kernel-emission engine at the heart of an
//! ahead-of-time ONNX code generator: given a normalized, topologically
//! ordered graph with resolved tensor identities, shapes, data types and
//! category tags, emits for each node a correctly typed, correctly
//! parameterized kernel invocation against a small tensor math runtime.
//!
//! This crate contains no ONNX protobuf parser, no graph topological sort,
//! and no tensor math kernels themselves — those are external collaborators
//! (see [`mod@dispatcher`] for the data-flow this crate does own).
//!
//! ## Module organization
//!
//! - [`enums`]: the closed `DataType` / `AttributeType` / `TensorCategory` sets.
//! - [`shape`]: concrete, fully resolved tensor shapes.
//! - [`tensor`]: [`tensor::ReadyTensor`], the normalized tensor view.
//! - [`tensor_map`]: [`tensor_map::GlobalTensorMap`], name → tensor lookup.
//! - [`attribute`]: typed attribute values and the declarative extractor.
//! - [`node`]: [`node::ReadyNode`], one graph node ready for emission.
//! - [`config`]: [`config::EmitterConfig`] knobs.
//! - [`context`]: [`context::EmissionContext`], passed by value into every emitter.
//! - [`name_resolve`]: tensor address-form and type resolution (component A).
//! - [`arg`]: call-site argument materialization (component C).
//! - [`preamble`]: allocation prologue, comments, log hooks, fallible-suffix (component F).
//! - [`operator`]: the closed `Operator` registry (component D).
//! - [`emitters`]: one emitter module per operator family.
//! - [`dispatcher`]: routes nodes to emitters (component E).
//! - [`diagnostics`]: the closed emission-error taxonomy (component G).

pub mod arg;
pub mod attribute;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod dispatcher;
pub mod emitters;
pub mod enums;
pub mod name_resolve;
pub mod node;
pub mod operator;
pub mod preamble;
pub mod shape;
pub mod tensor;
pub mod tensor_map;

pub use attribute::{Attr, AttrValue};
pub use config::EmitterConfig;
pub use context::EmissionContext;
pub use diagnostics::Diagnostic;
pub use enums::{AttributeType, DataType, TensorCategory};
pub use node::ReadyNode;
pub use operator::Operator;
pub use shape::Shape;
pub use tensor::ReadyTensor;
pub use tensor_map::GlobalTensorMap;

/// Version of this engine's emitted-source-compatibility contract.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Emits source code for an entire graph: every node in `nodes`, in order,
/// against `map` and `config`, treating `network_output` as the tensor
/// whose storage must outlive the generated `predict` call (§3).
///
/// Returns the emitted source text, or the first [`Diagnostic`] raised —
/// per §7, the caller is responsible for discarding any partially written
/// output on error.
pub fn emit_model(
    map: &GlobalTensorMap,
    network_output: &str,
    config: EmitterConfig,
    nodes: &[ReadyNode],
) -> Result<String, Diagnostic> {
    let mut ctx = EmissionContext::new(map, network_output, config);
    dispatcher::emit_nodes(&mut ctx, nodes)?;
    Ok(ctx.writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::TensorCategory;
    use std::sync::Arc;

    fn tensor(name: &str, category: TensorCategory) -> Arc<ReadyTensor> {
        Arc::new(ReadyTensor::new(name, category, DataType::F32, Shape::new(vec![1, 3])))
    }

    #[test]
    fn emit_model_runs_every_node_in_order() {
        let map = GlobalTensorMap::new();
        let nodes = vec![
            ReadyNode::new("Relu", "relu0")
                .with_input(Some(tensor("x", TensorCategory::Activation)))
                .with_output(tensor("a", TensorCategory::Activation)),
            ReadyNode::new("Sigmoid", "sigmoid0")
                .with_input(Some(tensor("a", TensorCategory::Activation)))
                .with_output(tensor("y", TensorCategory::Activation)),
        ];
        let output = emit_model(&map, "y", EmitterConfig::all_off(), &nodes).unwrap();
        assert!(output.contains("relu_f32"));
        assert!(output.contains("sigmoid_f32"));
    }

    #[test]
    fn emit_model_propagates_diagnostic() {
        let map = GlobalTensorMap::new();
        let nodes = vec![ReadyNode::new("MaxPool", "mp0")
            .with_input(Some(tensor("x", TensorCategory::Activation)))
            .with_output(tensor("y", TensorCategory::Activation))];
        let err = emit_model(&map, "y", EmitterConfig::all_off(), &nodes).unwrap_err();
        assert!(matches!(err, Diagnostic::AttributeMissing { .. }));
    }
}
