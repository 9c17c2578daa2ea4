// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! Concrete tensor shapes.
//!
//! Shapes reaching this engine are already fully resolved: by the time a
//! graph builder hands a [`crate::tensor::ReadyTensor`] to the emitter,
//! shape inference has run and every dimension is a concrete non-negative
//! size. There is no symbolic/dynamic dimension support here — that belongs
//! to the out-of-scope shape-inference collaborator (§1).

use smallvec::SmallVec;
use std::fmt;

/// An ordered sequence of non-negative dimension sizes.
///
/// Per §3, a `ReadyTensor.shape` always has length >= 1 (scalars are
/// represented as rank-1 shapes of size 1 elsewhere in the pipeline, mirroring
/// how the operator table treats e.g. `OneHot`'s depth input).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape(SmallVec<[usize; 4]>);

impl Shape {
    pub fn new(dims: impl IntoIterator<Item = usize>) -> Self {
        Self(dims.into_iter().collect())
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    pub fn numel(&self) -> usize {
        self.0.iter().product()
    }

    pub fn is_empty_dim(&self) -> bool {
        self.0.iter().any(|&d| d == 0)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, dim) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", dim)?;
        }
        write!(f, "]")
    }
}

impl FromIterator<usize> for Shape {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.iter().copied())
    }
}
