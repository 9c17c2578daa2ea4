// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! Preamble & Postamble Emitter (component F, §4.F).

use crate::arg::usize_array_literal;
use crate::context::EmissionContext;
use crate::name_resolve::sanitize;
use crate::node::ReadyNode;

/// The uniform token appended after every kernel invocation to propagate its
/// failure through the generated `predict` function. Never silently
/// consumed (§4.F, §7).
pub const FALLIBLE_SUFFIX: &str = " catch |err| return err;";

/// Emits the dynamic-allocation prologue for every output of `node`, iff
/// `ctx.config.dynamic` is set (§4.F).
///
/// For each output: a shape constant, a heap allocation bound to
/// `tensor_<sanitized(name)>`, and a scoped release unless the output is the
/// network output.
pub fn emit_allocation_prologue(ctx: &mut EmissionContext, node: &ReadyNode) {
    if !ctx.config.dynamic {
        return;
    }
    for output in &node.outputs {
        let local = sanitize(&output.name);
        let dims: Vec<i64> = output.shape.dims().iter().map(|&d| d as i64).collect();
        ctx.emit_line(&format!(
            "const shape_{} = {};",
            local,
            usize_array_literal(&dims)
        ));
        ctx.emit_line(&format!(
            "var tensor_{} = try allocator.alloc({}, shape_{});",
            local,
            output.dtype.short_name(),
            local
        ));
        if !ctx.is_network_output(&output.name) {
            ctx.emit_line(&format!("defer allocator.release(tensor_{});", local));
        }
    }
}

/// Emits a human-readable operator comment, iff `ctx.config.comm` is set.
pub fn emit_comment_block(ctx: &mut EmissionContext, node: &ReadyNode) {
    if !ctx.config.comm {
        return;
    }
    let inputs: Vec<&str> = node
        .inputs
        .iter()
        .map(|i| i.as_ref().map(|t| t.name.as_str()).unwrap_or("<absent>"))
        .collect();
    let outputs: Vec<&str> = node.outputs.iter().map(|t| t.name.as_str()).collect();
    ctx.emit_line(&format!(
        "// {} : inputs [{}] -> outputs [{}]",
        node.op_type,
        inputs.join(", "),
        outputs.join(", ")
    ));
}

/// Emits a call through the caller-supplied logging handle, iff
/// `ctx.config.log` is set. Note: this logs *into the generated target
/// source*, distinct from this crate's own `tracing` instrumentation of its
/// own execution.
pub fn emit_log_hook(ctx: &mut EmissionContext, node: &ReadyNode) {
    if !ctx.config.log {
        return;
    }
    ctx.emit_line(&format!("log_function(\"{}\");", node.op_type));
}

/// Runs the full preamble sequence: comment block, log hook, allocation
/// prologue, in that order so a human reading `comm=on` output sees the
/// operator named before any allocation noise.
pub fn emit_preamble(ctx: &mut EmissionContext, node: &ReadyNode) {
    emit_comment_block(ctx, node);
    emit_log_hook(ctx, node);
    emit_allocation_prologue(ctx, node);
}

/// Appends the common fallible-suffix to the most recently emitted kernel
/// invocation.
pub fn emit_fallible_suffix(ctx: &mut EmissionContext) {
    ctx.emit_line(FALLIBLE_SUFFIX);
}
