// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! Emitter configuration knobs (§3).

/// The fully enumerated set of recognized emission knobs.
///
/// Unlike the teacher's graph-wide metadata, this is a plain value type with
/// no storage semantics: it is read, never mutated, during emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmitterConfig {
    /// If on, emit heap allocation + scoped release for every
    /// non-network-output activation.
    pub dynamic: bool,
    /// If on, emit human-readable operator comments.
    pub comm: bool,
    /// If on, emit a runtime logging callback invocation before each
    /// operator, into the *generated* code (distinct from this crate's own
    /// `tracing` instrumentation of its own execution).
    pub log: bool,
}

impl EmitterConfig {
    pub const fn all_off() -> Self {
        Self {
            dynamic: false,
            comm: false,
            log: false,
        }
    }

    pub const fn all_on() -> Self {
        Self {
            dynamic: true,
            comm: true,
            log: true,
        }
    }
}
