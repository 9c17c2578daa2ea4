// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! `Pad`, `Resize` (§4.D).

use crate::arg::{emit_kernel_call, null_or_pointer, runtime_slice_from_tensor, scalar_float, scalar_int, scalar_string, tensor_pointer};
use crate::attribute::{extract, AttributeSpec, AttrValue};
use crate::context::EmissionContext;
use crate::diagnostics::Diagnostic;
use crate::enums::AttributeType;
use crate::node::ReadyNode;

const PAD_MODE: AttributeSpec = AttributeSpec {
    name: "mode",
    kind: AttributeType::String,
    default: Some(AttrValue::String("constant".to_string())),
    required: false,
};

/// `Pad`: `data` and `pads` required; `constant_value`/`axes` optional.
/// `pads` must be an initializer — its data is converted to an i64 slice
/// with a scoped release, same as any other runtime-built slice.
pub fn emit_pad(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let data = node.input(0).expect("Pad has input 0 (data)");
    let pads_tensor = node.input(1).expect("Pad has input 1 (pads)");
    let constant_value = node.input(2);
    let axes = node.input(3);
    let out = node.output(0).expect("Pad has output 0");

    let mode = extract(node.attributes(), node.name(), "Pad", &PAD_MODE)?;
    let mode_str = mode.as_str().expect("String-typed");
    if !matches!(mode_str, "constant" | "reflect" | "edge" | "wrap") {
        return Err(Diagnostic::UnsupportedMode {
            node: node.name().to_string(),
            op: "Pad".to_string(),
            attr: "mode".to_string(),
            value: mode_str.to_string(),
        });
    }

    let pads_local = "pad_pads_0";
    let pads_arg = runtime_slice_from_tensor(ctx, pads_tensor, pads_local);

    emit_kernel_call(
        ctx,
        &format!("pad_{}", mode_str),
        &[
            tensor_pointer(data),
            tensor_pointer(out),
            pads_arg,
            null_or_pointer(constant_value),
            null_or_pointer(axes),
        ],
    );
    ctx.release(pads_local);
    Ok(())
}

const ANTIALIAS: AttributeSpec = AttributeSpec {
    name: "antialias",
    kind: AttributeType::Int,
    default: Some(AttrValue::Int(0)),
    required: false,
};
const COORD_TRANSFORM: AttributeSpec = AttributeSpec {
    name: "coordinate_transformation_mode",
    kind: AttributeType::String,
    default: Some(AttrValue::String("half_pixel".to_string())),
    required: false,
};
const CUBIC_COEFF_A: AttributeSpec = AttributeSpec {
    name: "cubic_coeff_a",
    kind: AttributeType::Float,
    default: Some(AttrValue::Float(-0.75)),
    required: false,
};
const EXCLUDE_OUTSIDE: AttributeSpec = AttributeSpec {
    name: "exclude_outside",
    kind: AttributeType::Int,
    default: Some(AttrValue::Int(0)),
    required: false,
};
const EXTRAPOLATION_VALUE: AttributeSpec = AttributeSpec {
    name: "extrapolation_value",
    kind: AttributeType::Float,
    default: Some(AttrValue::Float(0.0)),
    required: false,
};
const MODE: AttributeSpec = AttributeSpec {
    name: "mode",
    kind: AttributeType::String,
    default: Some(AttrValue::String("nearest".to_string())),
    required: false,
};
const NEAREST_MODE: AttributeSpec = AttributeSpec {
    name: "nearest_mode",
    kind: AttributeType::String,
    default: Some(AttrValue::String("round_prefer_floor".to_string())),
    required: false,
};

/// `Resize`: only `X` is required; `roi`/`scales`/`sizes` are all optional.
pub fn emit_resize(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let x = node.input(0).expect("Resize has input 0 (X)");
    let roi = node.input(1);
    let scales = node.input(2);
    let sizes = node.input(3);
    let out = node.output(0).expect("Resize has output 0");

    let antialias = extract(node.attributes(), node.name(), "Resize", &ANTIALIAS)?;
    let coord_transform = extract(node.attributes(), node.name(), "Resize", &COORD_TRANSFORM)?;
    let cubic_coeff_a = extract(node.attributes(), node.name(), "Resize", &CUBIC_COEFF_A)?;
    let exclude_outside = extract(node.attributes(), node.name(), "Resize", &EXCLUDE_OUTSIDE)?;
    let extrapolation_value = extract(node.attributes(), node.name(), "Resize", &EXTRAPOLATION_VALUE)?;
    let mode = extract(node.attributes(), node.name(), "Resize", &MODE)?;
    let nearest_mode = extract(node.attributes(), node.name(), "Resize", &NEAREST_MODE)?;

    emit_kernel_call(
        ctx,
        &format!("resize_{}", mode.as_str().expect("String-typed")),
        &[
            tensor_pointer(x),
            tensor_pointer(out),
            null_or_pointer(roi),
            null_or_pointer(scales),
            null_or_pointer(sizes),
            scalar_int(antialias.as_int().expect("Int-typed")),
            scalar_string(coord_transform.as_str().expect("String-typed")),
            scalar_float(cubic_coeff_a.as_float().expect("Float-typed")),
            scalar_int(exclude_outside.as_int().expect("Int-typed")),
            scalar_float(extrapolation_value.as_float().expect("Float-typed")),
            scalar_string(nearest_mode.as_str().expect("String-typed")),
        ],
    );
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
        Arc::new(ReadyTensor::new(name, category, DataType::F32, Shape::new(vec![1, 3, 4, 4])))
    }

    #[test]
    fn pad_balances_acquire_release() {
        let map = GlobalTensorMap::new();
        let mut ctx = EmissionContext::new(&map, "Z", EmitterConfig::all_off());
        let node = ReadyNode::new("Pad", "pad0")
            .with_input(Some(tensor("x", TensorCategory::Activation)))
            .with_input(Some(tensor("pads", TensorCategory::Initializer)))
            .with_input(None)
            .with_input(None)
            .with_output(tensor("y", TensorCategory::Activation));
        emit_pad(&mut ctx, &node).unwrap();
        assert!(ctx.arena_is_drained());
        assert!(ctx.writer.contains("pad_constant"));
    }

    #[test]
    fn resize_all_optional_inputs_absent() {
        let map = GlobalTensorMap::new();
        let mut ctx = EmissionContext::new(&map, "Z", EmitterConfig::all_off());
        let node = ReadyNode::new("Resize", "resize0")
            .with_input(Some(tensor("x", TensorCategory::Activation)))
            .with_input(None)
            .with_input(None)
            .with_input(None)
            .with_output(tensor("y", TensorCategory::Activation));
        emit_resize(&mut ctx, &node).unwrap();
        assert!(ctx.writer.contains("resize_nearest"));
        assert!(ctx.writer.contains("null"));
    }
}
