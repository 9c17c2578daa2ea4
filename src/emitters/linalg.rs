// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! `MatMul`, `Gemm` (§4.D).

use crate::arg::{emit_kernel_call, null_or_pointer, scalar_float, scalar_int, tensor_pointer};
use crate::attribute::{extract, AttributeSpec, AttrValue};
use crate::context::EmissionContext;
use crate::diagnostics::Diagnostic;
use crate::enums::AttributeType;
use crate::node::ReadyNode;

/// Bytes per cache line on the target platform this engine generates code
/// for; see the blocked-vs-naive selection rule below (§4.D, §8 S5).
const CACHE_LINE_BYTES: usize = 64;

/// `MatMul`: 2 required inputs, no attributes.
///
/// Chooses the *blocked* kernel when `B`'s last-dim width times its element
/// size is at least one cache line; otherwise the *naive* kernel. Both
/// produce identical outputs — this is purely an algorithm-selection
/// optimization, not a semantic difference, so either choice is correct and
/// the test in §8 S5 only checks which kernel name is emitted.
pub fn emit_matmul(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let a = node.input(0).expect("MatMul has input 0");
    let b = node.input(1).expect("MatMul has input 1");
    let out = node.output(0).expect("MatMul has output 0");
    let dtype = out.resolve_dtype(node.name())?;

    let last_dim = *b.shape.dims().last().unwrap_or(&0);
    let elem_size = match dtype {
        crate::enums::DataType::F64 | crate::enums::DataType::I64 => 8,
        crate::enums::DataType::F16 | crate::enums::DataType::I16 => 2,
        crate::enums::DataType::I8 | crate::enums::DataType::U8 | crate::enums::DataType::Bool => 1,
        _ => 4,
    };
    let blocked = last_dim * elem_size >= CACHE_LINE_BYTES;
    let variant = if blocked { "blocked" } else { "naive" };

    emit_kernel_call(
        ctx,
        &format!("matmul_{}_{}", variant, dtype.short_name()),
        &[tensor_pointer(a), tensor_pointer(b), tensor_pointer(out)],
    );
    Ok(())
}

const GEMM_ALPHA: AttributeSpec = AttributeSpec {
    name: "alpha",
    kind: AttributeType::Float,
    default: Some(AttrValue::Float(1.0)),
    required: false,
};
const GEMM_BETA: AttributeSpec = AttributeSpec {
    name: "beta",
    kind: AttributeType::Float,
    default: Some(AttrValue::Float(1.0)),
    required: false,
};
const GEMM_TRANS_A: AttributeSpec = AttributeSpec {
    name: "transA",
    kind: AttributeType::Int,
    default: Some(AttrValue::Int(0)),
    required: false,
};
const GEMM_TRANS_B: AttributeSpec = AttributeSpec {
    name: "transB",
    kind: AttributeType::Int,
    default: Some(AttrValue::Int(0)),
    required: false,
};

/// `Gemm`: `Y = alpha * op(A) * op(B) + beta * C`; `C` is optional and
/// `null`s to zero when absent.
pub fn emit_gemm(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let a = node.input(0).expect("Gemm has input 0");
    let b = node.input(1).expect("Gemm has input 1");
    let c = node.input(2);
    let out = node.output(0).expect("Gemm has output 0");
    let dtype = out.resolve_dtype(node.name())?;

    let alpha = extract(node.attributes(), node.name(), "Gemm", &GEMM_ALPHA)?;
    let beta = extract(node.attributes(), node.name(), "Gemm", &GEMM_BETA)?;
    let trans_a = extract(node.attributes(), node.name(), "Gemm", &GEMM_TRANS_A)?;
    let trans_b = extract(node.attributes(), node.name(), "Gemm", &GEMM_TRANS_B)?;

    emit_kernel_call(
        ctx,
        &format!("gemm_{}", dtype.short_name()),
        &[
            tensor_pointer(a),
            tensor_pointer(b),
            null_or_pointer(c),
            tensor_pointer(out),
            scalar_float(alpha.as_float().expect("alpha is Float-typed")),
            scalar_float(beta.as_float().expect("beta is Float-typed")),
            scalar_int(trans_a.as_int().expect("transA is Int-typed")),
            scalar_int(trans_b.as_int().expect("transB is Int-typed")),
        ],
    );
    Ok(())
}
