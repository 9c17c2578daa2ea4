// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! The normalized tensor view the emission engine operates on (§3).

use crate::diagnostics::Diagnostic;
use crate::enums::{DataType, TensorCategory};
use crate::shape::Shape;
use std::sync::Arc;

/// A thin handle to the original ONNX `TensorProto`, carrying only the
/// fields this engine reads: the raw bytes of a constant's data, and — when
/// [`ReadyTensor::dtype`] is `Undefined` — the authoritative element type.
///
/// Parsing the protobuf itself is out of scope (§1); this handle is produced
/// by the upstream graph loader and treated as opaque data here.
#[derive(Debug, Clone)]
pub struct TensorProtoHandle {
    pub data_type: DataType,
    pub raw_data: Arc<[u8]>,
}

impl TensorProtoHandle {
    pub fn new(data_type: DataType, raw_data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            data_type,
            raw_data: raw_data.into(),
        }
    }
}

/// The normalized, already-resolved view of an ONNX tensor at emit time.
///
/// Created by the external graph builder before emission begins; never
/// mutated during emission (§3 lifetime note).
#[derive(Debug, Clone)]
pub struct ReadyTensor {
    pub name: String,
    pub category: TensorCategory,
    pub dtype: DataType,
    pub shape: Shape,
    pub tensor_proto_ref: Option<TensorProtoHandle>,
}

impl ReadyTensor {
    pub fn new(name: impl Into<String>, category: TensorCategory, dtype: DataType, shape: Shape) -> Self {
        Self {
            name: name.into(),
            category,
            dtype,
            shape,
            tensor_proto_ref: None,
        }
    }

    pub fn with_proto_ref(mut self, handle: TensorProtoHandle) -> Self {
        self.tensor_proto_ref = Some(handle);
        self
    }

    /// Resolves the tensor's element type per the priority rule in §4.A:
    /// (1) `dtype` if defined, (2) `tensor_proto_ref.data_type`, (3) fail.
    ///
    /// Never silently defaults to F32.
    pub fn resolve_dtype(&self, node_name: &str) -> Result<DataType, Diagnostic> {
        if self.dtype.is_defined() {
            return Ok(self.dtype);
        }
        if let Some(proto) = &self.tensor_proto_ref {
            if proto.data_type.is_defined() {
                return Ok(proto.data_type);
            }
        }
        Err(Diagnostic::MissingTypeInformation {
            node: node_name.to_string(),
            tensor: self.name.clone(),
        })
    }
}

impl PartialEq for ReadyTensor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for ReadyTensor {}
