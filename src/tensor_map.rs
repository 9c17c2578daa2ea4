// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! The global tensor map: the single source of truth for resolving a tensor
//! name reference into its normalized [`ReadyTensor`] (§3).

use crate::diagnostics::Diagnostic;
use crate::tensor::ReadyTensor;
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only during emission (§5): built once by the external graph loader,
/// then looked up by every node's inputs/outputs.
#[derive(Debug, Default, Clone)]
pub struct GlobalTensorMap {
    tensors: HashMap<String, Arc<ReadyTensor>>,
}

impl GlobalTensorMap {
    pub fn new() -> Self {
        Self {
            tensors: HashMap::new(),
        }
    }

    pub fn insert(&mut self, tensor: Arc<ReadyTensor>) {
        self.tensors.insert(tensor.name.clone(), tensor);
    }

    /// The only legal way to resolve a tensor handle referenced by a node
    /// (§3). A missing name is a fatal emission error naming both the
    /// referencing node and the missing tensor.
    pub fn lookup(&self, name: &str, node_name: &str) -> Result<&Arc<ReadyTensor>, Diagnostic> {
        self.tensors
            .get(name)
            .ok_or_else(|| Diagnostic::TensorNotFound {
                node: node_name.to_string(),
                tensor: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }
}

impl FromIterator<Arc<ReadyTensor>> for GlobalTensorMap {
    fn from_iter<I: IntoIterator<Item = Arc<ReadyTensor>>>(iter: I) -> Self {
        let mut map = Self::new();
        for tensor in iter {
            map.insert(tensor);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{DataType, TensorCategory};
    use crate::shape::Shape;

    #[test]
    fn lookup_hits_and_misses() {
        let tensor = Arc::new(ReadyTensor::new(
            "x",
            TensorCategory::Activation,
            DataType::F32,
            Shape::new(vec![1]),
        ));
        let map: GlobalTensorMap = std::iter::once(tensor).collect();

        assert!(map.lookup("x", "n0").is_ok());
        let err = map.lookup("missing", "n0").unwrap_err();
        assert!(matches!(err, Diagnostic::TensorNotFound { .. }));
    }
}
