// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! `Conv`, `ConvInteger` (§4.D).

use crate::arg::{emit_kernel_call, null_or_pointer, scalar_int, tensor_pointer, usize_array_literal};
use crate::attribute::{extract, extract_optional, AttributeSpec, AttrValue};
use crate::context::EmissionContext;
use crate::diagnostics::Diagnostic;
use crate::enums::AttributeType;
use crate::node::ReadyNode;
use crate::tensor::ReadyTensor;

const AUTO_PAD: AttributeSpec = AttributeSpec {
    name: "auto_pad",
    kind: AttributeType::String,
    default: Some(AttrValue::String(String::new())),
    required: false,
};
const GROUP: AttributeSpec = AttributeSpec {
    name: "group",
    kind: AttributeType::Int,
    default: Some(AttrValue::Int(1)),
    required: false,
};
const STRIDES: AttributeSpec = AttributeSpec {
    name: "strides",
    kind: AttributeType::Ints,
    default: None,
    required: true,
};

fn spatial_rank(weight: &ReadyTensor) -> usize {
    weight.shape.rank().saturating_sub(2)
}

/// Per §4.D: `dilations`/`pads` default to all-ones/all-zeros sized to the
/// weight tensor's spatial rank when absent; an explicit empty list (rank
/// zero after inference is impossible in practice, but an explicitly
/// authored `[]`) still renders as the empty-slice marker, distinct from
/// `null`.
fn dims_or_default(
    attrs: &crate::attribute::AttributeMap,
    node_name: &str,
    op: &str,
    name: &str,
    default: Vec<i64>,
) -> Result<Vec<i64>, Diagnostic> {
    match extract_optional(attrs, node_name, op, name, AttributeType::Ints)? {
        Some(v) => Ok(v.as_ints().expect("Ints-typed by extract_optional").to_vec()),
        None => Ok(default),
    }
}

/// Attributes shared by `Conv` and `ConvInteger`: `kernel_shape` inferred
/// from `W`'s spatial dims when absent, `strides` with no default (fails
/// without it), `dilations`/`pads` defaulting to sized all-ones/all-zeros.
struct ConvAttrs {
    group: i64,
    strides: Vec<i64>,
    dilations: Vec<i64>,
    pads: Vec<i64>,
    kernel_shape: Vec<i64>,
}

fn read_conv_attrs(node: &ReadyNode, w: &ReadyTensor) -> Result<ConvAttrs, Diagnostic> {
    let rank = spatial_rank(w);
    let auto_pad = extract(node.attributes(), node.name(), &node.op_type, &AUTO_PAD)?;
    let group = extract(node.attributes(), node.name(), &node.op_type, &GROUP)?;
    let strides = extract(node.attributes(), node.name(), &node.op_type, &STRIDES)?;
    let dilations = dims_or_default(
        node.attributes(),
        node.name(),
        &node.op_type,
        "dilations",
        vec![1; rank],
    )?;
    let pads = dims_or_default(
        node.attributes(),
        node.name(),
        &node.op_type,
        "pads",
        vec![0; rank * 2],
    )?;
    let kernel_shape = match extract_optional(
        node.attributes(),
        node.name(),
        &node.op_type,
        "kernel_shape",
        AttributeType::Ints,
    )? {
        Some(v) => v.as_ints().expect("Ints-typed").to_vec(),
        None => w.shape.dims()[2..].iter().map(|&d| d as i64).collect(),
    };

    let auto_pad_str = auto_pad.as_str().expect("auto_pad is String-typed").to_string();
    if !matches!(auto_pad_str.as_str(), "" | "NOTSET" | "SAME_UPPER" | "SAME_LOWER" | "VALID") {
        return Err(Diagnostic::UnsupportedMode {
            node: node.name().to_string(),
            op: node.op_type.clone(),
            attr: "auto_pad".to_string(),
            value: auto_pad_str,
        });
    }

    Ok(ConvAttrs {
        group: group.as_int().expect("group is Int-typed"),
        strides: strides.as_ints().expect("strides is Ints-typed").to_vec(),
        dilations,
        pads,
        kernel_shape,
    })
}

/// `Conv`: 2 required inputs (X, W) + 1 optional (B). `kernel_shape` is
/// inferred from `W`'s spatial dims when the attribute is absent; `strides`
/// has no default and emission fails without it.
pub fn emit_conv(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let x = node.input(0).expect("Conv has input 0 (X)");
    let w = node.input(1).expect("Conv has input 1 (W)");
    let bias = node.input(2);
    let out = node.output(0).expect("Conv has output 0");
    let dtype = out.resolve_dtype(node.name())?;
    let attrs = read_conv_attrs(node, w)?;

    let args = [
        tensor_pointer(x),
        tensor_pointer(w),
        null_or_pointer(bias),
        tensor_pointer(out),
        usize_array_literal(&attrs.kernel_shape),
        usize_array_literal(&attrs.strides),
        usize_array_literal(&attrs.pads),
        usize_array_literal(&attrs.dilations),
        scalar_int(attrs.group),
    ];
    emit_kernel_call(ctx, &format!("conv_{}", dtype.short_name()), &args);
    Ok(())
}

/// `ConvInteger`: same attribute contract as `Conv`, but takes u8/i8 inputs
/// `X`, `W` with an i32 accumulator and two additional optional zero-point
/// inputs (`x_zero_point`, `w_zero_point`) that default to `null` (treated
/// as zero by the kernel) — there is no bias input.
pub fn emit_conv_integer(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let x = node.input(0).expect("ConvInteger has input 0 (X)");
    let w = node.input(1).expect("ConvInteger has input 1 (W)");
    let x_zero_point = node.input(2);
    let w_zero_point = node.input(3);
    let out = node.output(0).expect("ConvInteger has output 0");
    let dtype = out.resolve_dtype(node.name())?;
    let attrs = read_conv_attrs(node, w)?;

    let args = [
        tensor_pointer(x),
        tensor_pointer(w),
        tensor_pointer(out),
        usize_array_literal(&attrs.kernel_shape),
        usize_array_literal(&attrs.strides),
        usize_array_literal(&attrs.pads),
        usize_array_literal(&attrs.dilations),
        scalar_int(attrs.group),
        null_or_pointer(x_zero_point),
        null_or_pointer(w_zero_point),
    ];
    emit_kernel_call(ctx, &format!("conv_integer_{}", dtype.short_name()), &args);
    Ok(())
}
