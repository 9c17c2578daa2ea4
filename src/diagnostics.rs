// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! Emission-time diagnostics (component G).
//!
//! Every emitter either produces a well-formed kernel call site or returns a
//! [`Diagnostic`]. The taxonomy is closed and matches §4.G / §7 of the spec:
//! every variant names the offending node, and the tensor/attribute/mode
//! involved where applicable, so the dispatcher can surface a single
//! human-readable failure line without the caller needing to inspect the
//! partially-written output sink.

use crate::enums::AttributeType;

#[derive(Debug, Clone, thiserror::Error)]
pub enum Diagnostic {
    #[error("node `{node}`: tensor `{tensor}` not found in the global tensor map")]
    TensorNotFound { node: String, tensor: String },

    #[error("node `{node}`: cannot determine element type of tensor `{tensor}`")]
    MissingTypeInformation { node: String, tensor: String },

    #[error(
        "node `{node}` ({op}): attribute `{attr}` has type {actual}, expected {expected}"
    )]
    AttributeTypeMismatch {
        node: String,
        op: String,
        attr: String,
        expected: AttributeType,
        actual: AttributeType,
    },

    #[error("node `{node}` ({op}): required attribute `{attr}` is missing")]
    AttributeMissing {
        node: String,
        op: String,
        attr: String,
    },

    #[error("node `{node}` ({op}): variadic input list is empty")]
    EmptyInputList { node: String, op: String },

    #[error("node `{node}`: tensor `{tensor}` has a zero-sized dimension where a shape was required")]
    InvalidShape { node: String, tensor: String },

    #[error("node `{node}`: BatchNormalization with training_mode set is not supported")]
    TrainingNotSupported { node: String },

    #[error("node `{node}` ({op}): attribute `{attr}` has unsupported value `{value}`")]
    UnsupportedMode {
        node: String,
        op: String,
        attr: String,
        value: String,
    },
}

impl Diagnostic {
    /// The name of the node this diagnostic is attached to, for callers that
    /// want to correlate failures with the node-visit order independent of
    /// the specific diagnostic kind.
    pub fn node_name(&self) -> &str {
        match self {
            Diagnostic::TensorNotFound { node, .. }
            | Diagnostic::MissingTypeInformation { node, .. }
            | Diagnostic::AttributeTypeMismatch { node, .. }
            | Diagnostic::AttributeMissing { node, .. }
            | Diagnostic::EmptyInputList { node, .. }
            | Diagnostic::InvalidShape { node, .. }
            | Diagnostic::TrainingNotSupported { node }
            | Diagnostic::UnsupportedMode { node, .. } => node,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_names_node() {
        let d = Diagnostic::AttributeMissing {
            node: "conv1".into(),
            op: "Conv".into(),
            attr: "strides".into(),
        };
        assert_eq!(d.node_name(), "conv1");
        assert_eq!(
            d.to_string(),
            "node `conv1` (Conv): required attribute `strides` is missing"
        );
    }

    #[test]
    fn attribute_type_mismatch_message() {
        let d = Diagnostic::AttributeTypeMismatch {
            node: "n0".into(),
            op: "Cast".into(),
            attr: "to".into(),
            expected: AttributeType::Int,
            actual: AttributeType::String,
        };
        assert!(d.to_string().contains("expected Int"));
    }
}
