// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shape-manipulation operators: `Reshape`, `Shape`, `Transpose`,
//! `Unsqueeze`, `Squeeze`, `Flatten`, `Concat`, `Split`, `Gather`, `Slice`
//! (§4.D).

use crate::arg::{
    emit_kernel_call, null_or_pointer, runtime_slice_from_tensor, scalar_int, tensor_pointer,
    usize_array_literal,
};
use crate::attribute::{extract, extract_optional, AttributeSpec, AttrValue};
use crate::context::EmissionContext;
use crate::diagnostics::Diagnostic;
use crate::enums::AttributeType;
use crate::node::ReadyNode;

const ALLOWZERO: AttributeSpec = AttributeSpec {
    name: "allowzero",
    kind: AttributeType::Int,
    default: Some(AttrValue::Int(0)),
    required: false,
};

/// `Reshape`: shape taken from the `shape` attribute when present, else from
/// the second input tensor's data (runtime conversion, scoped release).
pub fn emit_reshape(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let data = node.input(0).expect("Reshape has input 0 (data)");
    let out = node.output(0).expect("Reshape has output 0");
    let allowzero = extract(node.attributes(), node.name(), "Reshape", &ALLOWZERO)?;

    let shape_attr = extract_optional(
        node.attributes(),
        node.name(),
        "Reshape",
        "shape",
        AttributeType::Ints,
    )?;

    let mut from_runtime_tensor = false;
    let shape_arg = match shape_attr {
        Some(v) => usize_array_literal(v.as_ints().expect("Ints-typed")),
        None => {
            let shape_tensor = node
                .input(1)
                .expect("Reshape without a `shape` attribute must have a shape input tensor");
            from_runtime_tensor = true;
            runtime_slice_from_tensor(ctx, shape_tensor, "reshape_shape_0")
        }
    };

    emit_kernel_call(
        ctx,
        "reshape",
        &[
            tensor_pointer(data),
            tensor_pointer(out),
            shape_arg,
            scalar_int(allowzero.as_int().expect("Int-typed")),
        ],
    );
    if from_runtime_tensor {
        ctx.release("reshape_shape_0");
    }
    Ok(())
}

const SHAPE_START: AttributeSpec = AttributeSpec {
    name: "start",
    kind: AttributeType::Int,
    default: Some(AttrValue::Int(0)),
    required: false,
};
const SHAPE_END: AttributeSpec = AttributeSpec {
    name: "end",
    kind: AttributeType::Int,
    default: Some(AttrValue::Int(i64::MAX)),
    required: false,
};

/// `Shape`: no inputs beyond `data`; outputs a rank-1 int64 tensor of the
/// (optionally sliced) input shape.
pub fn emit_shape(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let data = node.input(0).expect("Shape has input 0");
    let out = node.output(0).expect("Shape has output 0");
    let start = extract(node.attributes(), node.name(), "Shape", &SHAPE_START)?;
    let end = extract(node.attributes(), node.name(), "Shape", &SHAPE_END)?;

    emit_kernel_call(
        ctx,
        "shape_of",
        &[
            tensor_pointer(data),
            tensor_pointer(out),
            scalar_int(start.as_int().expect("Int-typed")),
            scalar_int(end.as_int().expect("Int-typed")),
        ],
    );
    Ok(())
}

/// `Transpose`: `perm` defaults to the reversed axis order of the input's
/// rank when absent.
pub fn emit_transpose(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let data = node.input(0).expect("Transpose has input 0");
    let out = node.output(0).expect("Transpose has output 0");

    let perm = match extract_optional(
        node.attributes(),
        node.name(),
        "Transpose",
        "perm",
        AttributeType::Ints,
    )? {
        Some(v) => v.as_ints().expect("Ints-typed").to_vec(),
        None => (0..data.shape.rank() as i64).rev().collect(),
    };

    emit_kernel_call(
        ctx,
        "transpose",
        &[
            tensor_pointer(data),
            tensor_pointer(out),
            usize_array_literal(&perm),
        ],
    );
    Ok(())
}

/// `Unsqueeze`: axes come from the second input (opset >= 13) or the `axes`
/// attribute (opset <= 12) — whichever is actually present on this node.
pub fn emit_unsqueeze(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    emit_axes_driven(ctx, node, "unsqueeze", "Unsqueeze")
}

/// `Squeeze`: same dual-source `axes` pattern as `Unsqueeze`; an entirely
/// absent `axes` means "squeeze every size-1 dimension", left to the kernel.
pub fn emit_squeeze(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    emit_axes_driven(ctx, node, "squeeze", "Squeeze")
}

fn emit_axes_driven(
    ctx: &mut EmissionContext,
    node: &ReadyNode,
    kernel: &str,
    op: &str,
) -> Result<(), Diagnostic> {
    let data = node.input(0).expect("op has input 0 (data)");
    let out = node.output(0).expect("op has output 0");

    let axes_attr = extract_optional(node.attributes(), node.name(), op, "axes", AttributeType::Ints)?;
    let mut from_runtime_tensor = false;
    let axes_arg = match axes_attr {
        Some(v) => usize_array_literal(v.as_ints().expect("Ints-typed")),
        None => match node.input(1) {
            Some(axes_tensor) => {
                from_runtime_tensor = true;
                runtime_slice_from_tensor(ctx, axes_tensor, "axes_slice_0")
            }
            None => usize_array_literal(&[]),
        },
    };

    emit_kernel_call(ctx, kernel, &[tensor_pointer(data), tensor_pointer(out), axes_arg]);
    if from_runtime_tensor {
        ctx.release("axes_slice_0");
    }
    Ok(())
}

const FLATTEN_AXIS: AttributeSpec = AttributeSpec {
    name: "axis",
    kind: AttributeType::Int,
    default: Some(AttrValue::Int(1)),
    required: false,
};

/// `Flatten`: `axis:1`.
pub fn emit_flatten(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let data = node.input(0).expect("Flatten has input 0");
    let out = node.output(0).expect("Flatten has output 0");
    let axis = extract(node.attributes(), node.name(), "Flatten", &FLATTEN_AXIS)?;

    emit_kernel_call(
        ctx,
        "flatten",
        &[
            tensor_pointer(data),
            tensor_pointer(out),
            scalar_int(axis.as_int().expect("Int-typed")),
        ],
    );
    Ok(())
}

const CONCAT_AXIS: AttributeSpec = AttributeSpec::required("axis", AttributeType::Int);

/// `Concat`: variadic inputs, `axis` required. When `axis == 0` and the
/// inputs have mismatched ranks, emits the ragged-rank-tolerant call variant
/// and a warning instead of the uniform-rank call (§4.D).
pub fn emit_concat(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    if node.num_present_inputs() == 0 {
        return Err(Diagnostic::EmptyInputList {
            node: node.name().to_string(),
            op: "Concat".to_string(),
        });
    }
    let axis = extract(node.attributes(), node.name(), "Concat", &CONCAT_AXIS)?;
    let axis_val = axis.as_int().expect("Int-typed");
    let out = node.output(0).expect("Concat has output 0");

    let ranks: Vec<usize> = node
        .inputs
        .iter()
        .map(|i| i.as_ref().expect("Concat inputs are never optional slots").shape.rank())
        .collect();
    let ragged = axis_val == 0 && ranks.windows(2).any(|w| w[0] != w[1]);

    let mut args: Vec<String> = node
        .inputs
        .iter()
        .map(|i| tensor_pointer(i.as_ref().expect("Concat inputs are never optional slots")))
        .collect();
    args.push(tensor_pointer(out));
    args.push(scalar_int(axis_val));

    if ragged {
        tracing::warn!(node = node.name(), "Concat: ragged-rank inputs on axis 0");
        emit_kernel_call(ctx, "concat_ragged", &args);
    } else {
        emit_kernel_call(ctx, "concat", &args);
    }
    Ok(())
}

const SPLIT_AXIS: AttributeSpec = AttributeSpec {
    name: "axis",
    kind: AttributeType::Int,
    default: Some(AttrValue::Int(0)),
    required: false,
};

/// `Split`: split sizes come from the optional second input if present,
/// else the deprecated `split` attribute, else even division across the
/// node's declared output arity (fails only at runtime if not evenly
/// divisible — not diagnosable at emission time since shapes are static).
///
/// The split-size tensor is dispatched on its *actual* element type, not
/// assumed to be float — a prior implementation's bug, not reproduced here.
pub fn emit_split(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let data = node.input(0).expect("Split has input 0 (data)");
    let axis = extract(node.attributes(), node.name(), "Split", &SPLIT_AXIS)?;

    let mut from_runtime_tensor = false;
    let split_arg = if let Some(split_tensor) = node.input(1) {
        from_runtime_tensor = true;
        runtime_slice_from_tensor(ctx, split_tensor, "split_sizes_0")
    } else if let Some(split_attr) = extract_optional(
        node.attributes(),
        node.name(),
        "Split",
        "split",
        AttributeType::Ints,
    )? {
        usize_array_literal(split_attr.as_ints().expect("Ints-typed"))
    } else {
        // Even division across `node.outputs.len()` parts; the kernel
        // computes the actual per-part size from the input's shape and the
        // output count, since the output count is fixed at emission time.
        usize_array_literal(&[])
    };

    let mut args = vec![tensor_pointer(data)];
    for out in &node.outputs {
        args.push(tensor_pointer(out));
    }
    args.push(split_arg);
    args.push(scalar_int(axis.as_int().expect("Int-typed")));

    emit_kernel_call(ctx, "split", &args);
    if from_runtime_tensor {
        ctx.release("split_sizes_0");
    }
    Ok(())
}

const GATHER_AXIS: AttributeSpec = AttributeSpec {
    name: "axis",
    kind: AttributeType::Int,
    default: Some(AttrValue::Int(0)),
    required: false,
};

/// `Gather`: `indices` are int64-typed in ONNX but must be cast to the
/// target's unsigned index type at emission.
pub fn emit_gather(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let data = node.input(0).expect("Gather has input 0 (data)");
    let indices = node.input(1).expect("Gather has input 1 (indices)");
    let out = node.output(0).expect("Gather has output 0");
    let axis = extract(node.attributes(), node.name(), "Gather", &GATHER_AXIS)?;

    emit_kernel_call(
        ctx,
        "gather",
        &[
            tensor_pointer(data),
            format!("@intCast(usize, {})", tensor_pointer(indices)),
            tensor_pointer(out),
            scalar_int(axis.as_int().expect("Int-typed")),
        ],
    );
    Ok(())
}

/// `Slice`: `starts`/`ends` are required input tensors; `axes`/`steps` are
/// optional. Each present int64 tensor is converted to an i64 slice with a
/// scoped release (§4.C).
pub fn emit_slice(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let data = node.input(0).expect("Slice has input 0 (data)");
    let starts_tensor = node.input(1).expect("Slice has input 1 (starts)");
    let ends_tensor = node.input(2).expect("Slice has input 2 (ends)");
    let out = node.output(0).expect("Slice has output 0");

    let starts = runtime_slice_from_tensor(ctx, starts_tensor, "slice_starts_0");
    let ends = runtime_slice_from_tensor(ctx, ends_tensor, "slice_ends_0");

    let axes = match node.input(3) {
        Some(axes_tensor) => runtime_slice_from_tensor(ctx, axes_tensor, "slice_axes_0"),
        None => "null".to_string(),
    };
    let steps = match node.input(4) {
        Some(steps_tensor) => runtime_slice_from_tensor(ctx, steps_tensor, "slice_steps_0"),
        None => "null".to_string(),
    };

    emit_kernel_call(
        ctx,
        "slice",
        &[
            tensor_pointer(data),
            tensor_pointer(out),
            starts,
            ends,
            axes,
            steps,
        ],
    );

    if node.input(4).is_some() {
        ctx.release("slice_steps_0");
    }
    if node.input(3).is_some() {
        ctx.release("slice_axes_0");
    }
    ctx.release("slice_ends_0");
    ctx.release("slice_starts_0");
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
    use smallvec::SmallVec;
    use std::sync::Arc;

    fn tensor(name: &str, category: TensorCategory, dims: Vec<usize>) -> Arc<ReadyTensor> {
        Arc::new(ReadyTensor::new(name, category, DataType::F32, Shape::new(dims)))
    }

    #[test]
    fn reshape_prefers_shape_attribute_over_input() {
        let map = GlobalTensorMap::new();
        let mut ctx = EmissionContext::new(&map, "Z", EmitterConfig::all_off());
        let node = ReadyNode::new("Reshape", "reshape0")
            .with_attribute(Attr::new(
                "shape",
                AttrValue::Ints(SmallVec::from_slice(&[6, 4])),
            ))
            .with_input(Some(tensor("x", TensorCategory::Activation, vec![2, 3, 4])))
            .with_output(tensor("y", TensorCategory::Activation, vec![6, 4]));
        emit_reshape(&mut ctx, &node).unwrap();
        assert!(ctx.writer.contains("{6,4}"));
        assert!(!ctx.writer.contains("acquire"));
    }

    #[test]
    fn reshape_from_initializer_emits_runtime_conversion() {
        let map = GlobalTensorMap::new();
        let mut ctx = EmissionContext::new(&map, "Z", EmitterConfig::all_off());
        let node = ReadyNode::new("Reshape", "reshape0")
            .with_input(Some(tensor("x", TensorCategory::Activation, vec![2, 3, 4])))
            .with_input(Some(tensor("s", TensorCategory::Initializer, vec![2])))
            .with_output(tensor("y", TensorCategory::Activation, vec![6, 4]));
        emit_reshape(&mut ctx, &node).unwrap();
        assert!(ctx.writer.contains("toIndexSlice"));
        assert!(ctx.writer.contains("tensor_math.reshape("));
        assert!(ctx.arena_is_drained());
    }

    #[test]
    fn concat_ragged_rank_uses_special_case_kernel() {
        let map = GlobalTensorMap::new();
        let mut ctx = EmissionContext::new(&map, "Z", EmitterConfig::all_off());
        let node = ReadyNode::new("Concat", "concat0")
            .with_attribute(Attr::new("axis", AttrValue::Int(0)))
            .with_input(Some(tensor("a", TensorCategory::Activation, vec![2, 3])))
            .with_input(Some(tensor("b", TensorCategory::Activation, vec![2])))
            .with_output(tensor("y", TensorCategory::Activation, vec![5]));
        emit_concat(&mut ctx, &node).unwrap();
        assert!(ctx.writer.contains("concat_ragged"));
    }

    #[test]
    fn split_balances_acquire_release_from_input_tensor() {
        let map = GlobalTensorMap::new();
        let mut ctx = EmissionContext::new(&map, "Z", EmitterConfig::all_off());
        let node = ReadyNode::new("Split", "split0")
            .with_input(Some(tensor("x", TensorCategory::Activation, vec![6])))
            .with_input(Some(tensor("sizes", TensorCategory::Initializer, vec![2])))
            .with_output(tensor("y0", TensorCategory::Activation, vec![3]))
            .with_output(tensor("y1", TensorCategory::Activation, vec![3]));
        emit_split(&mut ctx, &node).unwrap();
        assert!(ctx.arena_is_drained());
        assert!(ctx.writer.contains("tensor_math.split("));
    }

    #[test]
    fn slice_balances_all_acquired_tokens() {
        let map = GlobalTensorMap::new();
        let mut ctx = EmissionContext::new(&map, "Z", EmitterConfig::all_off());
        let node = ReadyNode::new("Slice", "slice0")
            .with_input(Some(tensor("x", TensorCategory::Activation, vec![10])))
            .with_input(Some(tensor("starts", TensorCategory::Initializer, vec![1])))
            .with_input(Some(tensor("ends", TensorCategory::Initializer, vec![1])))
            .with_output(tensor("y", TensorCategory::Activation, vec![5]));
        emit_slice(&mut ctx, &node).unwrap();
        assert!(ctx.arena_is_drained());
    }
}
