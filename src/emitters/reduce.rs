// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! `ReduceMean` (§4.D).

use crate::arg::{emit_kernel_call, runtime_slice_from_tensor, scalar_int, tensor_pointer, usize_array_literal};
use crate::attribute::{extract, extract_optional, AttributeSpec, AttrValue};
use crate::context::EmissionContext;
use crate::diagnostics::Diagnostic;
use crate::enums::AttributeType;
use crate::node::ReadyNode;

const KEEPDIMS: AttributeSpec = AttributeSpec {
    name: "keepdims",
    kind: AttributeType::Int,
    default: Some(AttrValue::Int(1)),
    required: false,
};
const NOOP_WITH_EMPTY_AXES: AttributeSpec = AttributeSpec {
    name: "noop_with_empty_axes",
    kind: AttributeType::Int,
    default: Some(AttrValue::Int(0)),
    required: false,
};

/// `ReduceMean`: `axes` from the `axes` attribute (older opsets) if present,
/// else from the optional second input tensor (newer opsets); `keepdims:1`,
/// `noop_with_empty_axes:0`.
pub fn emit_reduce_mean(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let data = node.input(0).expect("ReduceMean has input 0 (data)");
    let out = node.output(0).expect("ReduceMean has output 0");
    let keepdims = extract(node.attributes(), node.name(), "ReduceMean", &KEEPDIMS)?;
    let noop = extract(
        node.attributes(),
        node.name(),
        "ReduceMean",
        &NOOP_WITH_EMPTY_AXES,
    )?;

    let axes_attr = extract_optional(
        node.attributes(),
        node.name(),
        "ReduceMean",
        "axes",
        AttributeType::Ints,
    )?;
    let mut from_runtime_tensor = false;
    let axes_arg = match axes_attr {
        Some(v) => usize_array_literal(v.as_ints().expect("Ints-typed")),
        None => match node.input(1) {
            Some(axes_tensor) => {
                from_runtime_tensor = true;
                runtime_slice_from_tensor(ctx, axes_tensor, "reduce_axes_0")
            }
            None => usize_array_literal(&[]),
        },
    };

    emit_kernel_call(
        ctx,
        "reduce_mean",
        &[
            tensor_pointer(data),
            tensor_pointer(out),
            axes_arg,
            scalar_int(keepdims.as_int().expect("Int-typed")),
            scalar_int(noop.as_int().expect("Int-typed")),
        ],
    );
    if from_runtime_tensor {
        ctx.release("reduce_axes_0");
    }
    Ok(())
}
