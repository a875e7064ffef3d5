use std::collections::BTreeMap;

use autoscan_ir::{OpConfig, OpKind, TensorData};
use test_case::test_case;

use crate::backend::{Backend, OpInputs};
use crate::reference::ReferenceBackend;

fn reduce_min(x: TensorData, dims: &[i64], keep_dim: bool, reduce_all: bool) -> TensorData {
    let op = OpConfig::new(OpKind::ReduceMin)
        .with_input("X", ["x"])
        .with_output("Out", ["y"])
        .with_attr("dim", dims.to_vec())
        .with_attr("keep_dim", keep_dim)
        .with_attr("reduce_all", reduce_all);
    let inputs = OpInputs::from([("X".to_string(), vec![x])]);
    let mut outputs = ReferenceBackend.run_op(&op, &inputs).unwrap();
    outputs.remove("Out").unwrap().remove(0)
}

fn stack(xs: Vec<TensorData>, axis: i64) -> TensorData {
    let op = OpConfig::new(OpKind::Stack)
        .with_input("X", ["a", "b", "c"])
        .with_output("Y", ["y"])
        .with_attr("axis", axis);
    let inputs: OpInputs = BTreeMap::from([("X".to_string(), xs)]);
    let mut outputs = ReferenceBackend.run_op(&op, &inputs).unwrap();
    outputs.remove("Y").unwrap().remove(0)
}

fn iota_f32(shape: &[usize]) -> TensorData {
    let n: usize = shape.iter().product();
    TensorData::from_vec(shape, (0..n).map(|v| v as f32).collect()).unwrap()
}

// ============================================================================
// reduce_min
// ============================================================================

#[test_case(true, &[2, 1, 4, 5]; "keep_dim")]
#[test_case(false, &[2, 4, 5]; "drop_dim")]
fn test_reduce_min_shape(keep_dim: bool, expected: &[usize]) {
    let out = reduce_min(iota_f32(&[2, 3, 4, 5]), &[1], keep_dim, false);
    assert_eq!(out.shape(), expected);
}

#[test]
fn test_reduce_min_values() {
    // [[3, 1, 2], [0, 5, -4]]
    let x = TensorData::from_vec(&[2, 3], vec![3.0f32, 1.0, 2.0, 0.0, 5.0, -4.0]).unwrap();
    assert_eq!(reduce_min(x.clone(), &[1], false, false).to_f64_vec(), vec![1.0, -4.0]);
    assert_eq!(reduce_min(x.clone(), &[0], true, false).to_f64_vec(), vec![0.0, 1.0, -4.0]);
    assert_eq!(reduce_min(x.clone(), &[-1], true, false).shape(), &[2, 1]);
}

#[test]
fn test_reduce_all() {
    let x = iota_f32(&[2, 3, 4]);
    let out = reduce_min(x.clone(), &[1], false, true);
    assert_eq!(out.shape(), &[1]);
    assert_eq!(out.to_f64_vec(), vec![0.0]);

    let out = reduce_min(x, &[1], true, true);
    assert_eq!(out.shape(), &[1, 1, 1]);
}

#[test]
fn test_reduce_min_integers_and_nan() {
    let x = TensorData::from_vec(&[4], vec![7i64, -3, 9, 0]).unwrap();
    assert_eq!(reduce_min(x, &[0], false, false).to_f64_vec(), vec![-3.0]);

    let x = TensorData::from_vec(&[3], vec![1.0f32, f32::NAN, -2.0]).unwrap();
    assert!(reduce_min(x, &[0], false, false).to_f64_vec()[0].is_nan());
}

// ============================================================================
// stack
// ============================================================================

#[test_case(0, &[3, 3, 4]; "axis_0")]
#[test_case(1, &[3, 3, 4]; "axis_1")]
#[test_case(2, &[3, 4, 3]; "axis_2")]
#[test_case(-1, &[3, 4, 3]; "axis_neg_1")]
fn test_stack_shape(axis: i64, expected: &[usize]) {
    let xs = vec![iota_f32(&[3, 4]), iota_f32(&[3, 4]), iota_f32(&[3, 4])];
    assert_eq!(stack(xs, axis).shape(), expected);
}

#[test]
fn test_stack_values() {
    let a = TensorData::from_vec(&[2], vec![1i32, 2]).unwrap();
    let b = TensorData::from_vec(&[2], vec![3i32, 4]).unwrap();
    let c = TensorData::from_vec(&[2], vec![5i32, 6]).unwrap();
    assert_eq!(stack(vec![a.clone(), b.clone(), c.clone()], 0).to_f64_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(stack(vec![a, b, c], 1).to_f64_vec(), vec![1.0, 3.0, 5.0, 2.0, 4.0, 6.0]);
}

#[test]
fn test_stack_rejects_mixed_inputs() {
    let op = OpConfig::new(OpKind::Stack).with_input("X", ["a", "b"]).with_output("Y", ["y"]).with_attr("axis", 0i64);

    let mixed_dtype = OpInputs::from([(
        "X".to_string(),
        vec![
            TensorData::from_vec(&[2], vec![1.0f32, 2.0]).unwrap(),
            TensorData::from_vec(&[2], vec![1i32, 2]).unwrap(),
        ],
    )]);
    assert!(ReferenceBackend.run_op(&op, &mixed_dtype).is_err());

    let mixed_shape = OpInputs::from([("X".to_string(), vec![iota_f32(&[2]), iota_f32(&[3])])]);
    assert!(ReferenceBackend.run_op(&op, &mixed_shape).is_err());
}

#[test]
fn test_stack_axis_out_of_range() {
    let op = OpConfig::new(OpKind::Stack).with_input("X", ["a"]).with_output("Y", ["y"]).with_attr("axis", 3i64);
    let inputs = OpInputs::from([("X".to_string(), vec![iota_f32(&[2, 2])])]);
    assert!(ReferenceBackend.run_op(&op, &inputs).is_err());
}
