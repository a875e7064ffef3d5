use autoscan_ir::TensorData;

use crate::executor::Feeds;
use crate::quant::{fake_quantize, quantize_feeds};

#[test]
fn test_fake_quantize_grid() {
    let x = TensorData::from_vec(&[4], vec![-1.27f32, 0.0, 0.5, 1.27]).unwrap();
    let q = fake_quantize(&x).to_f64_vec();
    let scale = 1.27f32 as f64 / 127.0;
    for v in &q {
        let steps = v / scale;
        assert!((steps - steps.round()).abs() < 1e-3, "{v} is not on the int8 grid");
    }
    assert!((q[3] - 1.27).abs() < 1e-6);
    assert_eq!(q[1], 0.0);
}

#[test]
fn test_zero_tensor_unchanged() {
    let x = TensorData::from_vec(&[3], vec![0.0f32; 3]).unwrap();
    assert_eq!(fake_quantize(&x), x);
}

#[test]
fn test_integer_tensor_unchanged() {
    let x = TensorData::from_vec(&[3], vec![1i32, -200, 300]).unwrap();
    assert_eq!(fake_quantize(&x), x);
}

#[test]
fn test_quantize_feeds_keeps_names() {
    let feeds = Feeds::from([
        ("a".to_string(), TensorData::from_vec(&[2], vec![0.1f32, 0.3]).unwrap()),
        ("b".to_string(), TensorData::from_vec(&[2], vec![1i64, 2]).unwrap()),
    ]);
    let quantized = quantize_feeds(&feeds);
    assert_eq!(quantized.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(quantized["b"], feeds["b"]);
}
