// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! `Clip`, `Constant`, `OneHot`, `Cast`, `DynamicQuantizeLinear` (§4.D).

use crate::arg::{emit_kernel_call, null_or_pointer, scalar_int, tensor_pointer, tensor_value};
use crate::attribute::{extract, AttributeSpec, AttrValue};
use crate::context::EmissionContext;
use crate::diagnostics::Diagnostic;
use crate::enums::{AttributeType, DataType};
use crate::name_resolve::sanitize;
use crate::node::ReadyNode;

/// `Clip`: `min`/`max` are optional inputs, `null` when absent (unbounded).
pub fn emit_clip(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let x = node.input(0).expect("Clip has input 0");
    let min = node.input(1);
    let max = node.input(2);
    let out = node.output(0).expect("Clip has output 0");
    let dtype = out.resolve_dtype(node.name())?;

    emit_kernel_call(
        ctx,
        &format!("clip_{}", dtype.short_name()),
        &[
            tensor_pointer(x),
            tensor_pointer(out),
            null_or_pointer(min),
            null_or_pointer(max),
        ],
    );
    Ok(())
}

const CONSTANT_KEYS: &[&str] = &[
    "value",
    "sparse_value",
    "value_float",
    "value_floats",
    "value_int",
    "value_ints",
    "value_string",
    "value_strings",
];

/// `Constant`: exactly one of the eight value-carrying attributes is
/// present. A `TENSOR` value has already been hoisted to the parameter
/// library by an external pre-pass (§9), so only a comment is emitted here;
/// scalar/1-D numeric values are materialized inline as a local constant;
/// string values are emitted as a zero placeholder with an explanatory
/// comment, since the target has no runtime string constant form in this
/// engine's supported kernel set.
///
/// `Constant` skips the common fallible-suffix — it never invokes a
/// fallible kernel (see [`crate::operator::Operator::skips_fallible_suffix`]).
pub fn emit_constant(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let out = node.output(0).expect("Constant has output 0");
    let local = sanitize(&out.name);

    let present: Vec<&str> = CONSTANT_KEYS
        .iter()
        .copied()
        .filter(|k| node.attributes().contains_key(*k))
        .collect();
    if present.len() != 1 {
        return Err(Diagnostic::AttributeMissing {
            node: node.name().to_string(),
            op: "Constant".to_string(),
            attr: "value|sparse_value|value_float|value_floats|value_int|value_ints|value_string|value_strings".to_string(),
        });
    }
    let key = present[0];

    match key {
        "value" | "sparse_value" => {
            ctx.emit_line(&format!(
                "// Constant `{}`: tensor value hoisted to param_lib.tensor_{}",
                node.name(),
                local
            ));
        }
        "value_float" => {
            let spec = AttributeSpec::required("value_float", AttributeType::Float);
            let v = extract(node.attributes(), node.name(), "Constant", &spec)?;
            ctx.emit_line(&format!(
                "const tensor_{}: f32 = {:?};",
                local,
                v.as_float().expect("Float-typed")
            ));
        }
        "value_floats" => {
            let spec = AttributeSpec::required("value_floats", AttributeType::Floats);
            let v = extract(node.attributes(), node.name(), "Constant", &spec)?;
            let joined = v
                .as_floats()
                .expect("Floats-typed")
                .iter()
                .map(|f| format!("{:?}", f))
                .collect::<Vec<_>>()
                .join(",");
            ctx.emit_line(&format!("const tensor_{} = [_]f32{{{}}};", local, joined));
        }
        "value_int" => {
            let spec = AttributeSpec::required("value_int", AttributeType::Int);
            let v = extract(node.attributes(), node.name(), "Constant", &spec)?;
            ctx.emit_line(&format!(
                "const tensor_{}: i64 = {};",
                local,
                v.as_int().expect("Int-typed")
            ));
        }
        "value_ints" => {
            let spec = AttributeSpec::required("value_ints", AttributeType::Ints);
            let v = extract(node.attributes(), node.name(), "Constant", &spec)?;
            let joined = v
                .as_ints()
                .expect("Ints-typed")
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(",");
            ctx.emit_line(&format!("const tensor_{} = [_]i64{{{}}};", local, joined));
        }
        "value_string" | "value_strings" => {
            ctx.emit_line(&format!(
                "// Constant `{}`: string value `{}` has no runtime constant form, emitting zero placeholder",
                node.name(),
                key
            ));
            ctx.emit_line(&format!("const tensor_{}: usize = 0;", local));
        }
        _ => unreachable!(),
    }
    Ok(())
}

const ONE_HOT_AXIS: AttributeSpec = AttributeSpec {
    name: "axis",
    kind: AttributeType::Int,
    default: Some(AttrValue::Int(-1)),
    required: false,
};

/// `OneHot`: 3 required inputs (indices, depth, values); `axis:-1`. Depth is
/// read as a scalar from the depth tensor's data at index 0. The emitted
/// kernel's type token is taken from `values`, not `indices`.
pub fn emit_one_hot(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let indices = node.input(0).expect("OneHot has input 0 (indices)");
    let depth = node.input(1).expect("OneHot has input 1 (depth)");
    let values = node.input(2).expect("OneHot has input 2 (values)");
    let out = node.output(0).expect("OneHot has output 0");
    let axis = extract(node.attributes(), node.name(), "OneHot", &ONE_HOT_AXIS)?;
    let dtype = values.resolve_dtype(node.name())?;

    emit_kernel_call(
        ctx,
        &format!("one_hot_{}", dtype.short_name()),
        &[
            tensor_pointer(indices),
            format!("{}.data[0]", tensor_value(depth)),
            tensor_pointer(values),
            tensor_pointer(out),
            scalar_int(axis.as_int().expect("Int-typed")),
        ],
    );
    Ok(())
}

const CAST_TO: AttributeSpec = AttributeSpec::required("to", AttributeType::Int);

/// Maps an ONNX `TensorProto.DataType` enum code (as carried by `Cast.to`)
/// to this engine's closed [`DataType`] set.
fn from_onnx_type_code(code: i64) -> Option<DataType> {
    Some(match code {
        1 => DataType::F32,
        2 => DataType::U8,
        3 => DataType::I8,
        5 => DataType::I16,
        6 => DataType::I32,
        7 => DataType::I64,
        8 => DataType::String,
        9 => DataType::Bool,
        10 => DataType::F16,
        11 => DataType::F64,
        _ => return None,
    })
}

/// `Cast`: source type resolved via the Name & Type Resolver; target type
/// taken from the required `to` attribute.
pub fn emit_cast(ctx: &mut EmissionContext, node: &ReadyNode) -> Result<(), Diagnostic> {
    let x = node.input(0).expect("Cast has input 0");
    let out = node.output(0).expect("Cast has output 0");
    let source_dtype = x.resolve_dtype(node.name())?;

    let to = extract(node.attributes(), node.name(), "Cast", &CAST_TO)?;
    let to_code = to.as_int().expect("Int-typed");
    let target_dtype = from_onnx_type_code(to_code).ok_or_else(|| Diagnostic::UnsupportedMode {
        node: node.name().to_string(),
        op: "Cast".to_string(),
        attr: "to".to_string(),
        value: to_code.to_string(),
    })?;

    emit_kernel_call(
        ctx,
        &format!("cast_{}_to_{}", source_dtype.short_name(), target_dtype.short_name()),
        &[tensor_pointer(x), tensor_pointer(out)],
    );
    Ok(())
}

/// `DynamicQuantizeLinear`: 1 input, no attributes, output arity 3
/// (`y:u8`, `y_scale:f32`, `y_zero_point:u8`).
pub fn emit_dynamic_quantize_linear(
    ctx: &mut EmissionContext,
    node: &ReadyNode,
) -> Result<(), Diagnostic> {
    let x = node.input(0).expect("DynamicQuantizeLinear has input 0");
    let y = node.output(0).expect("DynamicQuantizeLinear has output 0 (y)");
    let y_scale = node
        .output(1)
        .expect("DynamicQuantizeLinear has output 1 (y_scale)");
    let y_zero_point = node
        .output(2)
        .expect("DynamicQuantizeLinear has output 2 (y_zero_point)");

    emit_kernel_call(
        ctx,
        "dynamic_quantize_linear",
        &[
            tensor_pointer(x),
            tensor_pointer(y),
            tensor_pointer(y_scale),
            tensor_pointer(y_zero_point),
        ],
    );
    Ok(())
}
