// Copyright (c) ONNX Project Contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end emission scenarios and cross-cutting testable properties.

use onnx_codegen_core::attribute::{Attr, AttrValue};
use onnx_codegen_core::config::EmitterConfig;
use onnx_codegen_core::context::EmissionContext;
use onnx_codegen_core::dispatcher::emit_node;
use onnx_codegen_core::enums::{DataType, TensorCategory};
use onnx_codegen_core::node::ReadyNode;
use onnx_codegen_core::shape::Shape;
use onnx_codegen_core::tensor::ReadyTensor;
use onnx_codegen_core::tensor_map::GlobalTensorMap;
use onnx_codegen_core::{emit_model, Diagnostic};
use smallvec::SmallVec;
use std::sync::Arc;

fn tensor(
    name: &str,
    category: TensorCategory,
    dtype: DataType,
    dims: Vec<usize>,
) -> Arc<ReadyTensor> {
    Arc::new(ReadyTensor::new(name, category, dtype, Shape::new(dims)))
}

/// S1 — Conv + Relu, one-hot convergence of two emitters.
#[test]
fn s1_conv_relu_convergence() {
    let x = tensor("X", TensorCategory::Activation, DataType::F32, vec![1, 1, 5, 5]);
    let w = tensor("W", TensorCategory::Initializer, DataType::F32, vec![1, 1, 3, 3]);
    let b = tensor("B", TensorCategory::Initializer, DataType::F32, vec![1]);
    let y = tensor("Y", TensorCategory::Activation, DataType::F32, vec![1, 1, 3, 3]);
    let z = tensor("Z", TensorCategory::Activation, DataType::F32, vec![1, 1, 3, 3]);

    let conv = ReadyNode::new("Conv", "conv0")
        .with_attribute(Attr::new("strides", AttrValue::Ints(SmallVec::from_slice(&[1, 1]))))
        .with_attribute(Attr::new("pads", AttrValue::Ints(SmallVec::from_slice(&[0, 0, 0, 0]))))
        .with_attribute(Attr::new("group", AttrValue::Int(1)))
        .with_attribute(Attr::new("dilations", AttrValue::Ints(SmallVec::from_slice(&[1, 1]))))
        .with_attribute(Attr::new("auto_pad", AttrValue::String("NOTSET".into())))
        .with_input(Some(x))
        .with_input(Some(w))
        .with_input(Some(b))
        .with_output(y.clone());
    let relu = ReadyNode::new("Relu", "relu0")
        .with_input(Some(y))
        .with_output(z);

    let map = GlobalTensorMap::new();
    let output = emit_model(&map, "Z", EmitterConfig::all_off(), &[conv, relu]).unwrap();

    assert!(output.contains("tensor_math.conv_f32("));
    assert!(output.contains("param_lib.tensor_W"));
    assert!(output.contains("param_lib.tensor_B"));
    assert!(output.contains("&tensor_Y"));
    let relu_start = output.find("tensor_math.relu_f32(").unwrap();
    let relu_call = &output[relu_start..];
    assert!(relu_call.starts_with("tensor_math.relu_f32(&tensor_Y, &tensor_Z)"));
    assert!(output.contains("catch |err| return err;"));
}

/// S2 — Reshape with shape from initializer.
#[test]
fn s2_reshape_shape_from_initializer() {
    let x = tensor("X", TensorCategory::Activation, DataType::F32, vec![2, 3, 4]);
    let s = tensor("S", TensorCategory::Initializer, DataType::I64, vec![2]);
    let y = tensor("Y", TensorCategory::Activation, DataType::F32, vec![6, 4]);

    let node = ReadyNode::new("Reshape", "reshape0")
        .with_input(Some(x))
        .with_input(Some(s))
        .with_output(y);

    let map = GlobalTensorMap::new();
    let output = emit_model(&map, "Y", EmitterConfig::all_off(), &[node]).unwrap();

    assert!(output.contains("toIndexSlice(param_lib.tensor_S.data)"));
    assert!(output.contains("tensor_math.reshape("));
}

/// S3 — MaxPool missing strides.
#[test]
fn s3_max_pool_missing_strides_diagnostic() {
    let x = tensor("X", TensorCategory::Activation, DataType::F32, vec![1, 1, 4, 4]);
    let y = tensor("Y", TensorCategory::Activation, DataType::F32, vec![1, 1, 2, 2]);

    let node = ReadyNode::new("MaxPool", "mp0")
        .with_attribute(Attr::new("kernel_shape", AttrValue::Ints(SmallVec::from_slice(&[2, 2]))))
        .with_attribute(Attr::new("pads", AttrValue::Ints(SmallVec::from_slice(&[0, 0, 0, 0]))))
        .with_input(Some(x))
        .with_output(y);

    let map = GlobalTensorMap::new();
    let err = emit_model(&map, "Y", EmitterConfig::all_off(), &[node]).unwrap_err();
    match err {
        Diagnostic::AttributeMissing { op, attr, .. } => {
            assert_eq!(op, "MaxPool");
            assert_eq!(attr, "strides");
        }
        other => panic!("expected AttributeMissing, got {:?}", other),
    }
}

/// S4 — unknown operator.
#[test]
fn s4_unknown_operator_produces_stub() {
    let x = tensor("X", TensorCategory::Activation, DataType::F32, vec![1]);
    let y = tensor("Y", TensorCategory::Activation, DataType::F32, vec![1]);
    let node = ReadyNode::new("HypotheticalOp", "n0")
        .with_input(Some(x))
        .with_output(y);

    let map = GlobalTensorMap::new();
    let output = emit_model(&map, "Y", EmitterConfig::all_off(), &[node]).unwrap();
    assert!(output.contains("unreachable"));
    assert!(output.contains("HypotheticalOp"));
    assert!(!output.contains("tensor_math."));
}

/// S5 — MatMul threshold selection.
#[test]
fn s5_matmul_threshold_selection() {
    let a_narrow = tensor("A", TensorCategory::Activation, DataType::F32, vec![4, 4]);
    let b_narrow = tensor("B", TensorCategory::Activation, DataType::F32, vec![4, 8]);
    let c_narrow = tensor("C", TensorCategory::Activation, DataType::F32, vec![4, 8]);
    let narrow = ReadyNode::new("MatMul", "mm_narrow")
        .with_input(Some(a_narrow))
        .with_input(Some(b_narrow))
        .with_output(c_narrow);

    let a_wide = tensor("A2", TensorCategory::Activation, DataType::F32, vec![4, 4]);
    let b_wide = tensor("B2", TensorCategory::Activation, DataType::F32, vec![4, 64]);
    let c_wide = tensor("C2", TensorCategory::Activation, DataType::F32, vec![4, 64]);
    let wide = ReadyNode::new("MatMul", "mm_wide")
        .with_input(Some(a_wide))
        .with_input(Some(b_wide))
        .with_output(c_wide);

    let map = GlobalTensorMap::new();
    let mut ctx_narrow = EmissionContext::new(&map, "C", EmitterConfig::all_off());
    emit_node(&mut ctx_narrow, &narrow).unwrap();
    assert!(ctx_narrow.writer.contains("matmul_naive_f32"));

    let mut ctx_wide = EmissionContext::new(&map, "C2", EmitterConfig::all_off());
    emit_node(&mut ctx_wide, &wide).unwrap();
    assert!(ctx_wide.writer.contains("matmul_blocked_f32"));
}

/// S6 — BatchNormalization with training_mode=1.
#[test]
fn s6_batch_norm_training_mode_diagnostic() {
    let x = tensor("X", TensorCategory::Activation, DataType::F32, vec![1, 3]);
    let scale = tensor("scale", TensorCategory::Initializer, DataType::F32, vec![3]);
    let bias = tensor("bias", TensorCategory::Initializer, DataType::F32, vec![3]);
    let mean = tensor("mean", TensorCategory::Initializer, DataType::F32, vec![3]);
    let var = tensor("var", TensorCategory::Initializer, DataType::F32, vec![3]);
    let y = tensor("Y", TensorCategory::Activation, DataType::F32, vec![1, 3]);

    let node = ReadyNode::new("BatchNormalization", "bn0")
        .with_attribute(Attr::new("training_mode", AttrValue::Int(1)))
        .with_input(Some(x))
        .with_input(Some(scale))
        .with_input(Some(bias))
        .with_input(Some(mean))
        .with_input(Some(var))
        .with_output(y);

    let map = GlobalTensorMap::new();
    let err = emit_model(&map, "Y", EmitterConfig::all_off(), &[node]).unwrap_err();
    assert!(matches!(err, Diagnostic::TrainingNotSupported { .. }));
}

/// Property 2 — initializer address forms carry the param_lib qualifier;
/// non-initializers never do.
#[test]
fn property_initializer_addressing_qualifier() {
    let x = tensor("X", TensorCategory::Activation, DataType::F32, vec![4]);
    let w = tensor("W", TensorCategory::Initializer, DataType::F32, vec![4, 4]);
    let y = tensor("Y", TensorCategory::Activation, DataType::F32, vec![4]);
    let node = ReadyNode::new("MatMul", "mm0")
        .with_input(Some(w))
        .with_input(Some(x))
        .with_output(y);

    let map = GlobalTensorMap::new();
    let output = emit_model(&map, "Y", EmitterConfig::all_off(), std::slice::from_ref(&node)).unwrap();
    assert!(output.contains("param_lib.tensor_W"));
    assert!(!output.contains("param_lib.tensor_X"));
}

/// Property 4 — dynamic=off emits no allocation; dynamic=on emits exactly
/// one allocation and a release for every non-network-output.
#[test]
fn property_dynamic_allocation_toggle() {
    let x = tensor("X", TensorCategory::Activation, DataType::F32, vec![4]);
    let y = tensor("Y", TensorCategory::Activation, DataType::F32, vec![4]);
    let node = ReadyNode::new("Relu", "relu0")
        .with_input(Some(x))
        .with_output(y);

    let map = GlobalTensorMap::new();
    let off = emit_model(&map, "Z", EmitterConfig::all_off(), std::slice::from_ref(&node)).unwrap();
    assert!(!off.contains("allocator.alloc"));

    let on = emit_model(&map, "Z", EmitterConfig::all_on(), std::slice::from_ref(&node)).unwrap();
    assert_eq!(on.matches("allocator.alloc(").count(), 1);
    assert_eq!(on.matches("allocator.release(tensor_Y)").count(), 1);

    let as_output = emit_model(&map, "Y", EmitterConfig::all_on(), &[node]).unwrap();
    assert!(!as_output.contains("allocator.release(tensor_Y)"));
}

/// Round-trip / idempotence (§8): running the emitter twice on the same
/// (graph, config) yields byte-identical output.
#[test]
fn idempotent_emission() {
    let x = tensor("X", TensorCategory::Activation, DataType::F32, vec![4]);
    let y = tensor("Y", TensorCategory::Activation, DataType::F32, vec![4]);
    let node = ReadyNode::new("Sigmoid", "sig0")
        .with_input(Some(x))
        .with_output(y);

    let map = GlobalTensorMap::new();
    let first = emit_model(&map, "Y", EmitterConfig::all_on(), std::slice::from_ref(&node)).unwrap();
    let second = emit_model(&map, "Y", EmitterConfig::all_on(), std::slice::from_ref(&node)).unwrap();
    assert_eq!(first, second);
}

/// A node referencing a tensor that isn't registered anywhere still has a
/// resolvable identity on `ReadyNode` (the invariant in §3 is enforced by
/// the upstream graph loader, not re-checked here) — but `GlobalTensorMap`
/// lookups used by a loader must fail closed.
#[test]
fn tensor_map_lookup_fails_closed_on_missing_name() {
    let map = GlobalTensorMap::new();
    let err = map.lookup("ghost", "n0").unwrap_err();
    assert!(matches!(err, Diagnostic::TensorNotFound { .. }));
}
