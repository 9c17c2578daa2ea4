// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! `MaxPool`, `AveragePool` (§4.D).
//!
//! Unlike `Conv`, every shape attribute here is mandatory: emission fails
//! rather than inferring defaults, since pooling has no weight tensor to
//! infer `kernel_shape` from.

use crate::arg::{emit_kernel_call, scalar_int, tensor_pointer, usize_array_literal};
use crate::attribute::{extract, AttributeSpec, AttrValue};
use crate::context::EmissionContext;
use crate::diagnostics::Diagnostic;
use crate::enums::AttributeType;
use crate::node::ReadyNode;

const KERNEL_SHAPE: AttributeSpec = AttributeSpec::required("kernel_shape", AttributeType::Ints);
const STRIDES: AttributeSpec = AttributeSpec::required("strides", AttributeType::Ints);
const PADS: AttributeSpec = AttributeSpec::required("pads", AttributeType::Ints);
const AUTO_PAD: AttributeSpec = AttributeSpec {
    name: "auto_pad",
    kind: AttributeType::String,
    default: Some(AttrValue::String(String::new())),
    required: false,
};
const CEIL_MODE: AttributeSpec = AttributeSpec {
    name: "ceil_mode",
    kind: AttributeType::Int,
    default: Some(AttrValue::Int(0)),
    required: false,
};
const STORAGE_ORDER: AttributeSpec = AttributeSpec {
    name: "storage_order",
    kind: AttributeType::Int,
    default: Some(AttrValue::Int(0)),
    required: false,
};
const COUNT_INCLUDE_PAD: AttributeSpec = AttributeSpec {
    name: "count_include_pad",
    kind: AttributeType::Int,
    default: Some(AttrValue::Int(0)),
    required: false,
};

fn dilations_or_default(
    node: &ReadyNode,
    rank: usize,
) -> Result<Vec<i64>, Diagnostic> {
    match crate::attribute::extract_optional(
        node.attributes(),
        node.name(),
        &node.op_type,
        "dilations",
        AttributeType::Ints,
    )? {
        Some(v) => Ok(v.as_ints().expect("Ints-typed").to_vec()),
        None => Ok(vec![1; rank]),
    }
}

/// `MaxPool`: `kernel_shape`/`strides`/`pads` are all required (no defaults);
/// `dilations` defaults to all-ones; `storage_order:0`, `ceil_mode:0`.
pub fn emit_max_pool(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let x = node.input(0).expect("MaxPool has input 0");
    let out = node.output(0).expect("MaxPool has output 0");
    let dtype = out.resolve_dtype(node.name())?;

    let kernel_shape = extract(node.attributes(), node.name(), "MaxPool", &KERNEL_SHAPE)?;
    let strides = extract(node.attributes(), node.name(), "MaxPool", &STRIDES)?;
    let pads = extract(node.attributes(), node.name(), "MaxPool", &PADS)?;
    let ceil_mode = extract(node.attributes(), node.name(), "MaxPool", &CEIL_MODE)?;
    let storage_order = extract(node.attributes(), node.name(), "MaxPool", &STORAGE_ORDER)?;
    check_auto_pad(node, "MaxPool")?;
    let rank = kernel_shape.as_ints().expect("Ints").len();
    let dilations = dilations_or_default(node, rank)?;

    emit_kernel_call(
        ctx,
        &format!("max_pool_{}", dtype.short_name()),
        &[
            tensor_pointer(x),
            tensor_pointer(out),
            usize_array_literal(kernel_shape.as_ints().expect("Ints")),
            usize_array_literal(strides.as_ints().expect("Ints")),
            usize_array_literal(pads.as_ints().expect("Ints")),
            usize_array_literal(&dilations),
            scalar_int(ceil_mode.as_int().expect("Int")),
            scalar_int(storage_order.as_int().expect("Int")),
        ],
    );
    Ok(())
}

/// `AveragePool`: same mandatory shape attributes as `MaxPool`;
/// `count_include_pad:0` in place of `storage_order`.
pub fn emit_average_pool(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let x = node.input(0).expect("AveragePool has input 0");
    let out = node.output(0).expect("AveragePool has output 0");
    let dtype = out.resolve_dtype(node.name())?;

    let kernel_shape = extract(node.attributes(), node.name(), "AveragePool", &KERNEL_SHAPE)?;
    let strides = extract(node.attributes(), node.name(), "AveragePool", &STRIDES)?;
    let pads = extract(node.attributes(), node.name(), "AveragePool", &PADS)?;
    let count_include_pad = extract(
        node.attributes(),
        node.name(),
        "AveragePool",
        &COUNT_INCLUDE_PAD,
    )?;
    check_auto_pad(node, "AveragePool")?;
    let rank = kernel_shape.as_ints().expect("Ints").len();
    let dilations = dilations_or_default(node, rank)?;

    emit_kernel_call(
        ctx,
        &format!("average_pool_{}", dtype.short_name()),
        &[
            tensor_pointer(x),
            tensor_pointer(out),
            usize_array_literal(kernel_shape.as_ints().expect("Ints")),
            usize_array_literal(strides.as_ints().expect("Ints")),
            usize_array_literal(pads.as_ints().expect("Ints")),
            usize_array_literal(&dilations),
            scalar_int(count_include_pad.as_int().expect("Int")),
        ],
    );
    Ok(())
}

fn check_auto_pad(node: &ReadyNode, op: &str) -> Result<(), Diagnostic> {
    let auto_pad = extract(node.attributes(), node.name(), op, &AUTO_PAD)?;
    let value = auto_pad.as_str().expect("auto_pad is String-typed");
    if !matches!(value, "" | "NOTSET" | "SAME_UPPER" | "SAME_LOWER" | "VALID") {
        return Err(Diagnostic::UnsupportedMode {
            node: node.name().to_string(),
            op: op.to_string(),
            attr: "auto_pad".to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}
