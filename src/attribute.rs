// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! Attribute extraction (component B).
//!
//! Per design note §9, attribute extraction is factored into a single typed
//! reader driven by a declarative [`AttributeSpec`], rather than duplicated
//! per emitter: each emitter declares the attributes it consumes as data and
//! calls [`extract`] / [`extract_optional`].

use crate::diagnostics::Diagnostic;
use crate::enums::AttributeType;
use crate::tensor::TensorProtoHandle;
use indexmap::IndexMap;
use smallvec::SmallVec;

/// A single typed attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Float(f32),
    String(String),
    Ints(SmallVec<[i64; 4]>),
    Floats(SmallVec<[f32; 4]>),
    Strings(Vec<String>),
    Tensor(TensorProtoHandle),
    SparseTensor(TensorProtoHandle),
}

impl AttrValue {
    pub fn kind(&self) -> AttributeType {
        match self {
            AttrValue::Int(_) => AttributeType::Int,
            AttrValue::Float(_) => AttributeType::Float,
            AttrValue::String(_) => AttributeType::String,
            AttrValue::Ints(_) => AttributeType::Ints,
            AttrValue::Floats(_) => AttributeType::Floats,
            AttrValue::Strings(_) => AttributeType::Strings,
            AttrValue::Tensor(_) => AttributeType::Tensor,
            AttrValue::SparseTensor(_) => AttributeType::SparseTensor,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            AttrValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            AttrValue::Ints(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_floats(&self) -> Option<&[f32]> {
        match self {
            AttrValue::Floats(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_tensor(&self) -> Option<&TensorProtoHandle> {
        match self {
            AttrValue::Tensor(v) | AttrValue::SparseTensor(v) => Some(v),
            _ => None,
        }
    }
}

/// An attribute attached to a node.
#[derive(Debug, Clone)]
pub struct Attr {
    pub name: String,
    pub value: AttrValue,
}

impl Attr {
    pub fn new(name: impl Into<String>, value: AttrValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// The map of attributes carried by a node.
///
/// `IndexMap` (not `HashMap`) so iteration order matches declaration order,
/// keeping emission deterministic (§8).
pub type AttributeMap = IndexMap<String, Attr>;

/// A declarative description of one attribute an emitter consumes.
///
/// `default = None` together with `required = true` means the attribute must
/// be present (e.g. `Conv.strides`); `default = Some(_)` supplies the ONNX
/// spec default (§8 property 5) and makes the attribute effectively always
/// resolvable via [`extract`].
pub struct AttributeSpec {
    pub name: &'static str,
    pub kind: AttributeType,
    pub default: Option<AttrValue>,
    pub required: bool,
}

impl AttributeSpec {
    pub const fn required(name: &'static str, kind: AttributeType) -> Self {
        Self {
            name,
            kind,
            default: None,
            required: true,
        }
    }

    pub fn optional(name: &'static str, kind: AttributeType, default: AttrValue) -> Self {
        Self {
            name,
            kind,
            default: Some(default),
            required: false,
        }
    }
}

/// Extracts a typed attribute value, applying the spec's default when the
/// attribute is absent.
///
/// Fails with [`Diagnostic::AttributeMissing`] when the attribute is absent,
/// required, and has no default; fails with
/// [`Diagnostic::AttributeTypeMismatch`] when present with the wrong type.
/// Unknown attributes on the node (not named by any spec the emitter
/// consults) are silently ignored, per ONNX forward-compatibility rules.
pub fn extract(
    attrs: &AttributeMap,
    node_name: &str,
    op: &str,
    spec: &AttributeSpec,
) -> Result<AttrValue, Diagnostic> {
    match attrs.get(spec.name) {
        Some(attr) if attr.value.kind() == spec.kind => Ok(attr.value.clone()),
        Some(attr) => Err(Diagnostic::AttributeTypeMismatch {
            node: node_name.to_string(),
            op: op.to_string(),
            attr: spec.name.to_string(),
            expected: spec.kind,
            actual: attr.value.kind(),
        }),
        None => match &spec.default {
            Some(default) => Ok(default.clone()),
            None => Err(Diagnostic::AttributeMissing {
                node: node_name.to_string(),
                op: op.to_string(),
                attr: spec.name.to_string(),
            }),
        },
    }
}

/// Extracts an attribute that may legitimately be absent because its value
/// has an alternate source (an input tensor, or a fixed computation),
/// e.g. `Reshape.shape`, `Split.split`, `Unsqueeze.axes`, `ReduceMean.axes`.
///
/// Returns `Ok(None)` when absent, `Ok(Some(_))` when present and
/// well-typed, and `Err` on a type mismatch.
pub fn extract_optional(
    attrs: &AttributeMap,
    node_name: &str,
    op: &str,
    name: &str,
    kind: AttributeType,
) -> Result<Option<AttrValue>, Diagnostic> {
    match attrs.get(name) {
        Some(attr) if attr.value.kind() == kind => Ok(Some(attr.value.clone())),
        Some(attr) => Err(Diagnostic::AttributeTypeMismatch {
            node: node_name.to_string(),
            op: op.to_string(),
            attr: name.to_string(),
            expected: kind,
            actual: attr.value.kind(),
        }),
        None => Ok(None),
    }
}
