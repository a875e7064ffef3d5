//! Symmetric per-tensor int8 fake quantization.
//!
//! `scale = max|x| / 127` and every element becomes `round(x / scale) * scale`.
//! Integer tensors and tensors that are all zero (or hold non-finite values)
//! pass through unchanged.

use autoscan_ir::TensorData;

use crate::executor::Feeds;

const INT8_MAX: f64 = 127.0;

/// Fake-quantize one tensor.
///
/// # Examples
///
/// ```rust
/// # use autoscan_ir::TensorData;
/// # use autoscan_runtime::quant::fake_quantize;
/// let x = TensorData::from_vec(&[3], vec![0.0f32, 0.5, 1.27]).unwrap();
/// let q = fake_quantize(&x);
/// assert_eq!(q.to_f64_vec()[0], 0.0);
/// ```
pub fn fake_quantize(data: &TensorData) -> TensorData {
    if !data.dtype().is_float() {
        return data.clone();
    }
    let max_abs = data.to_f64_vec().into_iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    if max_abs == 0.0 || !max_abs.is_finite() {
        return data.clone();
    }
    let scale = max_abs / INT8_MAX;
    data.map_f64(|v| (v / scale).round().clamp(-INT8_MAX, INT8_MAX) * scale)
}

/// Fake-quantize every float feed.
pub fn quantize_feeds(feeds: &Feeds) -> Feeds {
    feeds.iter().map(|(name, data)| (name.clone(), fake_quantize(data))).collect()
}
