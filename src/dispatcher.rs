// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dispatcher (component E, §4.E).

use crate::context::EmissionContext;
use crate::diagnostics::Diagnostic;
use crate::name_resolve::sanitize;
use crate::node::ReadyNode;
use crate::operator::Operator;
use crate::preamble::{emit_fallible_suffix, emit_preamble};

/// Routes one node to its emitter.
///
/// 1. Emits the preamble (comment block, log hook, allocation prologue).
/// 2. Looks up `node.op_type` in the registry; an unknown operator gets an
///    unreachable-stub statement and the dispatcher returns success — the
///    single soft failure in this engine's error model (§7).
/// 3. Otherwise invokes the matched emitter.
/// 4. Appends the common fallible-suffix, unless the operator's emitter
///    already produced its own terminator (`Constant`, `LogSoftmax`).
pub fn emit_node(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    emit_preamble(ctx, node);

    let operator = match Operator::from_op_type(&node.op_type) {
        Some(op) => op,
        None => {
            tracing::warn!(node = node.name(), op = %node.op_type, "unsupported operator");
            emit_unreachable_stub(ctx, node);
            return Ok(());
        }
    };

    tracing::debug!(node = node.name(), op = %node.op_type, "dispatching node");
    operator.dispatch(ctx, node)?;

    if !operator.skips_fallible_suffix() {
        emit_fallible_suffix(ctx);
    }

    debug_assert!(
        ctx.arena_is_drained(),
        "node `{}` left unreleased scratch slices",
        node.name()
    );

    Ok(())
}

/// Emits a runtime-unreachable marker naming the unsupported operator, and
/// no kernel invocation (§4.D unsupported-operator policy, §8 property 6).
fn emit_unreachable_stub(ctx: &mut EmissionContext, node: &ReadyNode) {
    ctx.emit_line(&format!(
        "unreachable; // unsupported operator `{}` at node `{}`",
        node.op_type,
        sanitize(node.name())
    ));
}

/// Runs the dispatcher over every node in `nodes`, in order, writing into a
/// fresh [`EmissionContext`]. Emission order equals node-visit order (§5,
/// §8 property 7) since the engine is single-threaded and synchronous.
pub fn emit_nodes(ctx: &mut EmissionContext, nodes: &[ReadyNode]) -> Result<(), Diagnostic> {
    for node in nodes {
        emit_node(ctx, node)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmitterConfig;
    use crate::enums::{DataType, TensorCategory};
    use crate::shape::Shape;
    use crate::tensor::ReadyTensor;
    use crate::tensor_map::GlobalTensorMap;
    use std::sync::Arc;

    fn tensor(name: &str, category: TensorCategory) -> Arc<ReadyTensor> {
        Arc::new(ReadyTensor::new(name, category, DataType::F32, Shape::new(vec![1, 3])))
    }

    #[test]
    fn unknown_operator_emits_stub_and_succeeds() {
        let map = GlobalTensorMap::new();
        let mut ctx = EmissionContext::new(&map, "Z", EmitterConfig::all_off());
        let node = ReadyNode::new("HypotheticalOp", "n0")
            .with_input(Some(tensor("x", TensorCategory::Activation)))
            .with_output(tensor("y", TensorCategory::Activation));
        let result = emit_node(&mut ctx, &node);
        assert!(result.is_ok());
        assert!(ctx.writer.contains("unreachable"));
        assert!(ctx.writer.contains("HypotheticalOp"));
        assert!(!ctx.writer.contains("tensor_math."));
    }

    #[test]
    fn known_operator_gets_fallible_suffix() {
        let map = GlobalTensorMap::new();
        let mut ctx = EmissionContext::new(&map, "Z", EmitterConfig::all_off());
        let node = ReadyNode::new("Relu", "relu0")
            .with_input(Some(tensor("x", TensorCategory::Activation)))
            .with_output(tensor("y", TensorCategory::Activation));
        emit_node(&mut ctx, &node).unwrap();
        assert!(ctx.writer.contains("tensor_math.relu_f32("));
        assert!(ctx.writer.contains("catch |err| return err;"));
    }

    #[test]
    fn emission_order_matches_node_visit_order() {
        let map = GlobalTensorMap::new();
        let mut ctx = EmissionContext::new(&map, "Z", EmitterConfig::all_off());
        let nodes = vec![
            ReadyNode::new("Relu", "first")
                .with_input(Some(tensor("x", TensorCategory::Activation)))
                .with_output(tensor("a", TensorCategory::Activation)),
            ReadyNode::new("Sigmoid", "second")
                .with_input(Some(tensor("a", TensorCategory::Activation)))
                .with_output(tensor("b", TensorCategory::Activation)),
        ];
        emit_nodes(&mut ctx, &nodes).unwrap();
        let relu_pos = ctx.writer.find("relu_f32").unwrap();
        let sigmoid_pos = ctx.writer.find("sigmoid_f32").unwrap();
        assert!(relu_pos < sigmoid_pos);
    }
}
