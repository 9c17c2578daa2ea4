// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! One module per operator family (component D, §4.D). Each function here
//! is the emitter for one or more closely related [`crate::operator::Operator`]
//! variants; [`crate::operator::Operator::dispatch`] is the only caller.

pub mod conv;
pub mod elementwise;
pub mod linalg;
pub mod misc;
pub mod norm;
pub mod pad_resize;
pub mod pooling;
pub mod reduce;
pub mod shape_ops;
