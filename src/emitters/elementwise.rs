// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! Elementwise binary, variadic, and unary operators (§4.D).

use crate::arg::{emit_kernel_call, tensor_pointer};
use crate::attribute::{extract, AttributeSpec, AttrValue};
use crate::context::EmissionContext;
use crate::diagnostics::Diagnostic;
use crate::enums::AttributeType;
use crate::node::ReadyNode;
use crate::operator::Operator;

fn kernel_name(op: Operator, node: &ReadyNode) -> Result<String, Diagnostic> {
    let suffix = node.output(0).expect("op has exactly one output").resolve_dtype(node.name())?;
    let base = match op {
        Operator::Add => "add",
        Operator::Sub => "sub",
        Operator::Mul => "mul",
        Operator::Div => "div",
        Operator::Relu => "relu",
        Operator::Sigmoid => "sigmoid",
        Operator::Tanh => "tanh",
        Operator::Floor => "floor",
        Operator::Ceil => "ceil",
        Operator::Sqrt => "sqrt",
        Operator::Neg => "neg",
        Operator::Identity => "identity",
        Operator::Softmax => "softmax",
        _ => unreachable!("kernel_name called for an operator without a fixed kernel name"),
    };
    Ok(format!("{}_{}", base, suffix.short_name()))
}

/// `Add`, `Sub`, `Mul`, `Div`: 2 required inputs, broadcasting per ONNX rules
/// is the tensor math library's concern (§1), not this engine's.
pub fn emit_binary(ctx: &mut EmissionContext, node: &ReadyNode, op: Operator) -> Result<(), Diagnostic> {
    let kernel = kernel_name(op, node)?;
    let a = node.input(0).expect("binary op has input 0");
    let b = node.input(1).expect("binary op has input 1");
    let out = node.output(0).expect("binary op has output 0");
    emit_kernel_call(
        ctx,
        &kernel,
        &[tensor_pointer(a), tensor_pointer(b), tensor_pointer(out)],
    );
    Ok(())
}

/// `Relu`, `Sigmoid`, `Tanh`, `Floor`, `Ceil`, `Sqrt`, `Neg`, `Identity`,
/// `Softmax`: 1 input, no attributes.
///
/// `LogSoftmax` is routed here by [`Operator::dispatch`] but is not a valid
/// argument to this function — it is currently unimplemented and emits a
/// stub via [`emit_log_softmax_stub`] instead.
pub fn emit_unary(ctx: &mut EmissionContext, node: &ReadyNode, op: Operator) -> Result<(), Diagnostic> {
    if op == Operator::LogSoftmax {
        emit_log_softmax_stub(ctx, node);
        return Ok(());
    }
    let kernel = kernel_name(op, node)?;
    let x = node.input(0).expect("unary op has input 0");
    let out = node.output(0).expect("unary op has output 0");
    emit_kernel_call(ctx, &kernel, &[tensor_pointer(x), tensor_pointer(out)]);
    Ok(())
}

/// `LogSoftmax` has no corresponding tensor math kernel yet: emit a comment
/// stub and no call, matching the unsupported-operator soft-failure policy
/// rather than treating it as a hard diagnostic.
fn emit_log_softmax_stub(ctx: &mut EmissionContext, node: &ReadyNode) {
    ctx.emit_line(&format!(
        "// LogSoftmax not yet implemented: node `{}` skipped",
        node.name()
    ));
}

/// `Sum`: variadic, n inputs, no attributes. Fails with `EmptyInputList` if
/// the node has zero inputs.
pub fn emit_variadic_sum(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    emit_variadic(ctx, node, "sum")
}

/// `Mean`: elementwise mean across a variadic input list.
pub fn emit_variadic_mean(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    emit_variadic(ctx, node, "mean")
}

fn emit_variadic(ctx: &mut EmissionContext, node: &ReadyNode, base: &str) -> Result<(), Diagnostic> {
    if node.num_present_inputs() == 0 {
        return Err(Diagnostic::EmptyInputList {
            node: node.name().to_string(),
            op: node.op_type.clone(),
        });
    }
    let out = node.output(0).expect("variadic op has output 0");
    let dtype = out.resolve_dtype(node.name())?;
    let kernel = format!("{}_{}", base, dtype.short_name());
    let mut args: Vec<String> = node
        .inputs
        .iter()
        .map(|i| tensor_pointer(i.as_ref().expect("variadic inputs are never optional slots")))
        .collect();
    args.push(tensor_pointer(out));
    emit_kernel_call(ctx, &kernel, &args);
    Ok(())
}

const LEAKY_RELU_ALPHA: AttributeSpec = AttributeSpec {
    name: "alpha",
    kind: AttributeType::Float,
    default: Some(AttrValue::Float(0.01)),
    required: false,
};

/// `LeakyRelu`: `alpha:0.01`.
pub fn emit_leaky_relu(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let alpha = extract(node.attributes(), node.name(), "LeakyRelu", &LEAKY_RELU_ALPHA)?;
    let x = node.input(0).expect("LeakyRelu has input 0");
    let out = node.output(0).expect("LeakyRelu has output 0");
    let dtype = out.resolve_dtype(node.name())?;
    emit_kernel_call(
        ctx,
        &format!("leaky_relu_{}", dtype.short_name()),
        &[
            tensor_pointer(x),
            tensor_pointer(out),
            crate::arg::scalar_float(alpha.as_float().expect("alpha is Float-typed")),
        ],
    );
    Ok(())
}

/// `Elu`: `alpha:1.0`.
pub fn emit_elu(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let spec = AttributeSpec::optional("alpha", AttributeType::Float, AttrValue::Float(1.0));
    let alpha = extract(node.attributes(), node.name(), "Elu", &spec)?;
    let x = node.input(0).expect("Elu has input 0");
    let out = node.output(0).expect("Elu has output 0");
    let dtype = out.resolve_dtype(node.name())?;
    emit_kernel_call(
        ctx,
        &format!("elu_{}", dtype.short_name()),
        &[
            tensor_pointer(x),
            tensor_pointer(out),
            crate::arg::scalar_float(alpha.as_float().expect("alpha is Float-typed")),
        ],
    );
    Ok(())
}

/// `Gelu`: `approximate:"none"`.
pub fn emit_gelu(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let spec = AttributeSpec::optional(
        "approximate",
        AttributeType::String,
        AttrValue::String("none".to_string()),
    );
    let approximate = extract(node.attributes(), node.name(), "Gelu", &spec)?;
    let x = node.input(0).expect("Gelu has input 0");
    let out = node.output(0).expect("Gelu has output 0");
    let dtype = out.resolve_dtype(node.name())?;
    let variant = approximate.as_str().expect("approximate is String-typed");
    if variant != "none" && variant != "tanh" {
        return Err(Diagnostic::UnsupportedMode {
            node: node.name().to_string(),
            op: "Gelu".to_string(),
            attr: "approximate".to_string(),
            value: variant.to_string(),
        });
    }
    emit_kernel_call(
        ctx,
        &format!("gelu_{}_{}", variant, dtype.short_name()),
        &[tensor_pointer(x), tensor_pointer(out)],
    );
    Ok(())
}
