// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! Node representation the dispatcher and emitters operate on.

use crate::attribute::{Attr, AttributeMap};
use crate::tensor::ReadyTensor;
use indexmap::IndexMap;
use std::sync::Arc;

/// A thin handle to the original `NodeProto`, carrying only the fields this
/// engine reads beyond what [`ReadyNode`] already normalizes: the attribute
/// list and the node's own name, used for diagnostics and for
/// [`crate::attribute::extract`].
///
/// Parsing the protobuf itself is out of scope (§1); this handle is produced
/// by the upstream graph loader and treated as opaque data here.
#[derive(Debug, Clone)]
pub struct NodeProtoHandle {
    pub name: String,
    pub attributes: AttributeMap,
}

impl NodeProtoHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
        }
    }

    pub fn with_attribute(mut self, attr: Attr) -> Self {
        self.attributes.insert(attr.name.clone(), attr);
        self
    }
}

/// One node of the topologically-ordered graph the dispatcher walks.
///
/// Inputs are `Option<Arc<ReadyTensor>>` rather than `Arc<ReadyTensor>`
/// because ONNX permits a trailing optional input to be omitted entirely
/// (encoded upstream as an empty name) — e.g. `Resize`'s `roi` and `scales`
/// inputs. A `None` input reaching an emitter that requires it at that
/// position is a caller/loader bug, not an emission-time diagnostic, since
/// arity is fixed per operator version and checked once at graph-build time.
#[derive(Debug, Clone)]
pub struct ReadyNode {
    pub op_type: String,
    pub domain: String,
    pub inputs: Vec<Option<Arc<ReadyTensor>>>,
    pub outputs: Vec<Arc<ReadyTensor>>,
    pub proto_ref: NodeProtoHandle,
}

impl ReadyNode {
    pub fn new(op_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            op_type: op_type.into(),
            domain: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            proto_ref: NodeProtoHandle::new(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.proto_ref.name
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.proto_ref.attributes
    }

    pub fn with_attribute(mut self, attr: Attr) -> Self {
        self.proto_ref = self.proto_ref.with_attribute(attr);
        self
    }

    pub fn with_input(mut self, tensor: Option<Arc<ReadyTensor>>) -> Self {
        self.inputs.push(tensor);
        self
    }

    pub fn with_output(mut self, tensor: Arc<ReadyTensor>) -> Self {
        self.outputs.push(tensor);
        self
    }

    /// The number of inputs that are actually present (not an omitted
    /// optional slot).
    pub fn num_present_inputs(&self) -> usize {
        self.inputs.iter().filter(|i| i.is_some()).count()
    }

    pub fn input(&self, index: usize) -> Option<&Arc<ReadyTensor>> {
        self.inputs.get(index).and_then(|i| i.as_ref())
    }

    pub fn output(&self, index: usize) -> Option<&Arc<ReadyTensor>> {
        self.outputs.get(index)
    }
}
