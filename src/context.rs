// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! Emission context (design note §9): replaces the source's global mutable
//! state (tensor map, network-output name, config) with a value passed into
//! every emitter.

use crate::config::EmitterConfig;
use crate::tensor_map::GlobalTensorMap;
use std::fmt::Write as _;

/// Bundles everything an emitter needs to produce a call site, plus the
/// per-node scratch arena of pending "acquire" tokens.
///
/// `writer` accumulates the emitted source text; `arena` tracks runtime-built
/// slices (§4.C) that still owe a matching release within the current node's
/// emission window. `EmissionContext` itself carries no process-wide state:
/// a fresh writer/arena pair is created once per `emit_model` call.
pub struct EmissionContext<'a> {
    pub map: &'a GlobalTensorMap,
    pub network_output: &'a str,
    pub config: EmitterConfig,
    pub writer: String,
    arena: Vec<String>,
}

impl<'a> EmissionContext<'a> {
    pub fn new(map: &'a GlobalTensorMap, network_output: &'a str, config: EmitterConfig) -> Self {
        Self {
            map,
            network_output,
            config,
            writer: String::new(),
            arena: Vec::new(),
        }
    }

    /// Appends a line of emitted source text.
    pub fn emit_line(&mut self, text: &str) {
        self.writer.push_str(text);
        self.writer.push('\n');
    }

    pub fn emit(&mut self, text: &str) {
        let _ = write!(self.writer, "{}", text);
    }

    /// Registers a pending runtime-built-slice acquisition that must be
    /// matched by [`Self::release`] before the node's emission window ends.
    pub fn acquire(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.emit_line(&format!("// acquire {}", token));
        self.arena.push(token);
    }

    /// Releases the most recently acquired scratch token (LIFO, matching the
    /// nested-scope release order a real allocator would require).
    pub fn release(&mut self, token: &str) {
        if let Some(pos) = self.arena.iter().rposition(|t| t == token) {
            self.arena.remove(pos);
        }
        self.emit_line(&format!("// release {}", token));
    }

    /// True once every acquired scratch token for the current node has been
    /// released. Checked at the end of each node's emission window; a
    /// violation indicates an emitter bug, not a diagnosable graph error.
    pub fn arena_is_drained(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn is_network_output(&self, tensor_name: &str) -> bool {
        tensor_name == self.network_output
    }
}
