// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! Operator Emitter Registry (component D, §4.D).
//!
//! Design note §9: the registry is a closed tagged variant with a `dispatch`
//! method, not a string-dispatch chain. Adding an operator means extending
//! this enum and its `dispatch` arm; `from_op_type` is the only place that
//! still deals in strings, mapping a `NodeProto.op_type` to a variant once.

use crate::context::EmissionContext;
use crate::diagnostics::Diagnostic;
use crate::emitters::{
    conv, elementwise, linalg, misc, norm, pad_resize, pooling, reduce, shape_ops,
};
use crate::node::ReadyNode;

/// The closed set of operators this engine emits kernel calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Sum,
    Mean,
    MatMul,
    Gemm,
    Conv,
    ConvInteger,
    MaxPool,
    AveragePool,
    BatchNormalization,
    Concat,
    Split,
    Gather,
    Reshape,
    Resize,
    Pad,
    Clip,
    ReduceMean,
    Slice,
    Constant,
    Shape,
    Transpose,
    Unsqueeze,
    Squeeze,
    Flatten,
    Relu,
    Sigmoid,
    Tanh,
    Floor,
    Ceil,
    Sqrt,
    Neg,
    Identity,
    Softmax,
    LogSoftmax,
    LeakyRelu,
    Elu,
    Gelu,
    OneHot,
    Cast,
    DynamicQuantizeLinear,
}

impl Operator {
    /// Maps an ONNX `op_type` string to its registry entry, or `None` if the
    /// operator is not in the supported set (§4.D unsupported-operator
    /// policy: the dispatcher emits an unreachable stub rather than failing).
    pub fn from_op_type(op_type: &str) -> Option<Self> {
        use Operator::*;
        Some(match op_type {
            "Add" => Add,
            "Sub" => Sub,
            "Mul" => Mul,
            "Div" => Div,
            "Sum" => Sum,
            "Mean" => Mean,
            "MatMul" => MatMul,
            "Gemm" => Gemm,
            "Conv" => Conv,
            "ConvInteger" => ConvInteger,
            "MaxPool" => MaxPool,
            "AveragePool" => AveragePool,
            "BatchNormalization" => BatchNormalization,
            "Concat" => Concat,
            "Split" => Split,
            "Gather" => Gather,
            "Reshape" => Reshape,
            "Resize" => Resize,
            "Pad" => Pad,
            "Clip" => Clip,
            "ReduceMean" => ReduceMean,
            "Slice" => Slice,
            "Constant" => Constant,
            "Shape" => Shape,
            "Transpose" => Transpose,
            "Unsqueeze" => Unsqueeze,
            "Squeeze" => Squeeze,
            "Flatten" => Flatten,
            "Relu" => Relu,
            "Sigmoid" => Sigmoid,
            "Tanh" => Tanh,
            "Floor" => Floor,
            "Ceil" => Ceil,
            "Sqrt" => Sqrt,
            "Neg" => Neg,
            "Identity" => Identity,
            "Softmax" => Softmax,
            "LogSoftmax" => LogSoftmax,
            "LeakyRelu" => LeakyRelu,
            "Elu" => Elu,
            "Gelu" => Gelu,
            "OneHot" => OneHot,
            "Cast" => Cast,
            "DynamicQuantizeLinear" => DynamicQuantizeLinear,
            _ => return None,
        })
    }

    /// Invokes this operator's emitter against `node`, writing the kernel
    /// invocation (and, for most operators, its paired scratch-slice
    /// release) into `ctx`. The common fallible-suffix is appended by the
    /// dispatcher, not here, since `Constant` and a few others skip it.
    pub fn dispatch(&self, ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
        use Operator::*;
        match self {
            Add | Sub | Mul | Div => elementwise::emit_binary(ctx, node, *self),
            Sum => elementwise::emit_variadic_sum(ctx, node),
            Mean => elementwise::emit_variadic_mean(ctx, node),
            Relu | Sigmoid | Tanh | Floor | Ceil | Sqrt | Neg | Identity | Softmax
            | LogSoftmax => elementwise::emit_unary(ctx, node, *self),
            LeakyRelu => elementwise::emit_leaky_relu(ctx, node),
            Elu => elementwise::emit_elu(ctx, node),
            Gelu => elementwise::emit_gelu(ctx, node),
            MatMul => linalg::emit_matmul(ctx, node),
            Gemm => linalg::emit_gemm(ctx, node),
            Conv => conv::emit_conv(ctx, node),
            ConvInteger => conv::emit_conv_integer(ctx, node),
            MaxPool => pooling::emit_max_pool(ctx, node),
            AveragePool => pooling::emit_average_pool(ctx, node),
            BatchNormalization => norm::emit_batch_normalization(ctx, node),
            Concat => shape_ops::emit_concat(ctx, node),
            Split => shape_ops::emit_split(ctx, node),
            Gather => shape_ops::emit_gather(ctx, node),
            Reshape => shape_ops::emit_reshape(ctx, node),
            Slice => shape_ops::emit_slice(ctx, node),
            Shape => shape_ops::emit_shape(ctx, node),
            Transpose => shape_ops::emit_transpose(ctx, node),
            Unsqueeze => shape_ops::emit_unsqueeze(ctx, node),
            Squeeze => shape_ops::emit_squeeze(ctx, node),
            Flatten => shape_ops::emit_flatten(ctx, node),
            Resize => pad_resize::emit_resize(ctx, node),
            Pad => pad_resize::emit_pad(ctx, node),
            Clip => misc::emit_clip(ctx, node),
            ReduceMean => reduce::emit_reduce_mean(ctx, node),
            Constant => misc::emit_constant(ctx, node),
            OneHot => misc::emit_one_hot(ctx, node),
            Cast => misc::emit_cast(ctx, node),
            DynamicQuantizeLinear => misc::emit_dynamic_quantize_linear(ctx, node),
        }
    }

    /// Whether this operator's emitter writes its own terminator and must
    /// NOT receive the common fallible-suffix from the dispatcher (§4.F,
    /// §4.D call-site post-condition).
    pub fn skips_fallible_suffix(&self) -> bool {
        matches!(self, Operator::Constant | Operator::LogSoftmax)
    }
}
