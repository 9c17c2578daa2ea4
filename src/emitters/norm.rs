// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! `BatchNormalization` (§4.D).

use crate::arg::{emit_kernel_call, scalar_float, tensor_pointer};
use crate::attribute::{extract, AttributeSpec, AttrValue};
use crate::context::EmissionContext;
use crate::diagnostics::Diagnostic;
use crate::enums::AttributeType;
use crate::node::ReadyNode;

const EPSILON: AttributeSpec = AttributeSpec {
    name: "epsilon",
    kind: AttributeType::Float,
    default: Some(AttrValue::Float(1e-5)),
    required: false,
};
const MOMENTUM: AttributeSpec = AttributeSpec {
    name: "momentum",
    kind: AttributeType::Float,
    default: Some(AttrValue::Float(0.9)),
    required: false,
};
const TRAINING_MODE: AttributeSpec = AttributeSpec {
    name: "training_mode",
    kind: AttributeType::Int,
    default: Some(AttrValue::Int(0)),
    required: false,
};

/// `BatchNormalization`: 5 required inputs (X, scale, B, input_mean,
/// input_var); `training_mode != 0` is unsupported (inference-only engine).
///
/// Input/scale/mean element types may differ from one another — each is
/// resolved independently rather than assumed uniform with `X`.
pub fn emit_batch_normalization(
    ctx: &mut EmissionContext,
    node: &ReadyNode,
) -> Result<(), Diagnostic> {
    let x = node.input(0).expect("BatchNormalization has input 0 (X)");
    let scale = node.input(1).expect("BatchNormalization has input 1 (scale)");
    let bias = node.input(2).expect("BatchNormalization has input 2 (B)");
    let mean = node
        .input(3)
        .expect("BatchNormalization has input 3 (input_mean)");
    let var = node
        .input(4)
        .expect("BatchNormalization has input 4 (input_var)");
    let out = node.output(0).expect("BatchNormalization has output 0");

    let training_mode = extract(node.attributes(), node.name(), "BatchNormalization", &TRAINING_MODE)?;
    if training_mode.as_int().expect("Int-typed") != 0 {
        return Err(Diagnostic::TrainingNotSupported {
            node: node.name().to_string(),
        });
    }

    let epsilon = extract(node.attributes(), node.name(), "BatchNormalization", &EPSILON)?;
    // momentum only matters for the training-mode running-stats update,
    // which this inference-only engine never emits; read for validation
    // (type-checked, forward-compatible) but otherwise unused.
    let _momentum = extract(node.attributes(), node.name(), "BatchNormalization", &MOMENTUM)?;

    let out_dtype = out.resolve_dtype(node.name())?;

    emit_kernel_call(
        ctx,
        &format!("batch_norm_{}", out_dtype.short_name()),
        &[
            tensor_pointer(x),
            tensor_pointer(scale),
            tensor_pointer(bias),
            tensor_pointer(mean),
            tensor_pointer(var),
            tensor_pointer(out),
            scalar_float(epsilon.as_float().expect("Float-typed")),
        ],
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Attr;
    use crate::config::EmitterConfig;
    use crate::enums::{DataType, TensorCategory};
    use crate::shape::Shape;
    use crate::tensor::ReadyTensor;
    use crate::tensor_map::GlobalTensorMap;
    use std::sync::Arc;

    fn tensor(name: &str, category: TensorCategory) -> Arc<ReadyTensor> {
        Arc::new(ReadyTensor::new(name, category, DataType::F32, Shape::new(vec![1, 3])))
    }

    fn bn_node() -> ReadyNode {
        ReadyNode::new("BatchNormalization", "bn0")
            .with_input(Some(tensor("x", TensorCategory::Activation)))
            .with_input(Some(tensor("scale", TensorCategory::Initializer)))
            .with_input(Some(tensor("bias", TensorCategory::Initializer)))
            .with_input(Some(tensor("mean", TensorCategory::Initializer)))
            .with_input(Some(tensor("var", TensorCategory::Initializer)))
            .with_output(tensor("y", TensorCategory::Activation))
    }

    #[test]
    fn training_mode_set_fails() {
        let map = GlobalTensorMap::new();
        let mut ctx = EmissionContext::new(&map, "Z", EmitterConfig::all_off());
        let node = bn_node().with_attribute(Attr::new("training_mode", AttrValue::Int(1)));
        let err = emit_batch_normalization(&mut ctx, &node).unwrap_err();
        assert!(matches!(err, Diagnostic::TrainingNotSupported { .. }));
    }

    #[test]
    fn default_epsilon_is_onnx_default() {
        let map = GlobalTensorMap::new();
        let mut ctx = EmissionContext::new(&map, "Z", EmitterConfig::all_off());
        emit_batch_normalization(&mut ctx, &bn_node()).unwrap();
        assert!(ctx.writer.contains("tensor_math.batch_norm_f32("));
        assert!(ctx.writer.contains("0.00001") || ctx.writer.contains("1e-5"));
    }
}
