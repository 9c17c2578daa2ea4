// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! Argument Materializer (component C, §4.C).
//!
//! Produces the textual argument forms consumed by kernel call sites, in the
//! five canonical shapes named by the spec: tensor pointer, compile-time
//! usize array, null-or-pointer, runtime-built slice, scalar literal.

use crate::context::EmissionContext;
use crate::name_resolve::{address_form, AddressKind};
use crate::tensor::ReadyTensor;
use std::sync::Arc;

/// A tensor pointer argument (§4.A address form).
pub fn tensor_pointer(tensor: &ReadyTensor) -> String {
    address_form(tensor, AddressKind::Pointer)
}

/// A tensor value argument (§4.A address form).
pub fn tensor_value(tensor: &ReadyTensor) -> String {
    address_form(tensor, AddressKind::Value)
}

/// A compile-time usize array literal from an attribute int-list, e.g.
/// `{3,3}`. An empty list is rendered as an explicit empty-slice marker
/// `{}`, distinct from the `null` marker used by [`null_or_pointer`] — an
/// empty `pads` list is "present but empty", not "absent" (§4.D Conv note).
pub fn usize_array_literal(values: &[i64]) -> String {
    let joined = values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("{{{}}}", joined)
}

/// A null-or-pointer argument for an optional input: the literal `null`
/// marker if the positional slot is absent, else a tensor pointer.
pub fn null_or_pointer(input: Option<&Arc<ReadyTensor>>) -> String {
    match input {
        Some(tensor) => tensor_pointer(tensor),
        None => "null".to_string(),
    }
}

/// A scalar literal for an attribute that maps directly to a call-site
/// argument (epsilon, alpha, axis, ...).
pub fn scalar_int(value: i64) -> String {
    value.to_string()
}

pub fn scalar_float(value: f32) -> String {
    format!("{:?}", value)
}

pub fn scalar_string(value: &str) -> String {
    format!("\"{}\"", value)
}

/// Emits a kernel invocation of the form `tensor_math.<kernel_name>(args)`,
/// with no trailing terminator: the dispatcher appends the common
/// fallible-suffix afterwards (§4.E, §4.F).
pub fn emit_kernel_call(ctx: &mut EmissionContext, kernel_name: &str, args: &[String]) {
    ctx.emit(&format!(
        "tensor_math.{}({})",
        kernel_name,
        args.join(", ")
    ));
}

/// Emits a runtime conversion of a tensor's raw data buffer into a
/// usize/isize slice local, registers the matching acquire token on `ctx`,
/// and returns the local variable name to use as the call-site argument.
///
/// The caller MUST invoke [`EmissionContext::release`] with the returned
/// token before the node's emission window ends (§4.C invariant, §8
/// acquire/release balance property).
pub fn runtime_slice_from_tensor(
    ctx: &mut EmissionContext,
    tensor: &ReadyTensor,
    local_name: &str,
) -> String {
    let source = tensor_value(tensor);
    ctx.emit_line(&format!(
        "const {} = try allocator.toIndexSlice({}.data);",
        local_name, source
    ));
    ctx.acquire(local_name.to_string());
    local_name.to_string()
}
