// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! Closed enumerations used throughout the emission engine.
//!
//! Unlike a general ONNX IR, this crate only needs to represent the element
//! types and attribute kinds the kernel-emission engine actually dispatches
//! on. Both enums are therefore deliberately smaller than the full ONNX
//! `TensorProto.DataType` / `AttributeProto.AttributeType` spaces.

use std::fmt;

/// Element type token for a [`crate::tensor::ReadyTensor`].
///
/// This is the closed set the Name & Type Resolver is allowed to produce.
/// `Undefined` is a valid value for an as-yet-unresolved tensor but is never
/// a valid value to emit a kernel call with — resolving to it is always a
/// [`crate::diagnostics::Diagnostic::MissingTypeInformation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    F16,
    F32,
    F64,
    I8,
    U8,
    I16,
    I32,
    I64,
    Bool,
    String,
    Undefined,
}

impl DataType {
    /// The token used in emitted kernel names and type suffixes, e.g.
    /// `tensor_math.add_f32(...)`.
    pub fn short_name(&self) -> &'static str {
        match self {
            DataType::F16 => "f16",
            DataType::F32 => "f32",
            DataType::F64 => "f64",
            DataType::I8 => "i8",
            DataType::U8 => "u8",
            DataType::I16 => "i16",
            DataType::I32 => "i32",
            DataType::I64 => "i64",
            DataType::Bool => "bool",
            DataType::String => "string",
            DataType::Undefined => "undefined",
        }
    }

    pub fn is_floating_point(&self) -> bool {
        matches!(self, DataType::F16 | DataType::F32 | DataType::F64)
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::I8 | DataType::U8 | DataType::I16 | DataType::I32 | DataType::I64
        )
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            DataType::F16
                | DataType::F32
                | DataType::F64
                | DataType::I8
                | DataType::I16
                | DataType::I32
                | DataType::I64
        )
    }

    pub fn is_defined(&self) -> bool {
        !matches!(self, DataType::Undefined)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// The ONNX attribute-value kinds this engine understands.
///
/// Matches the subset of `AttributeProto.AttributeType` named in §4.B of the
/// spec: graphs and type-protos never appear as operator attributes for any
/// operator in the supported set, so they are intentionally absent here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Int,
    Float,
    String,
    Ints,
    Floats,
    Strings,
    Tensor,
    SparseTensor,
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Determines how a tensor is addressed at a kernel call site (§4.A).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TensorCategory {
    /// Static weight or constant, resident in the parameter library.
    Initializer,
    /// Graph input.
    Input,
    /// Intermediate value computed by some node.
    Activation,
    /// Graph output.
    Output,
}

impl TensorCategory {
    pub fn is_initializer(&self) -> bool {
        matches!(self, TensorCategory::Initializer)
    }
}
