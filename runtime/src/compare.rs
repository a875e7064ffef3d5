//! Elementwise output comparison within an (atol, rtol) tolerance.

use std::fmt;

use autoscan_dtype::DType;
use autoscan_ir::TensorData;
use snafu::ensure;

use crate::error::*;
use crate::place::PredictorConfig;

/// Absolute and relative tolerance pair.
///
/// An element matches when `|actual - expected| <= atol + rtol * |expected|`.
/// NaN matches NaN and equal infinities match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub atol: f64,
    pub rtol: f64,
}

impl Tolerance {
    pub fn new(atol: f64, rtol: f64) -> Result<Self> {
        ensure!(atol >= 0.0 && rtol >= 0.0, InvalidToleranceSnafu { atol, rtol });
        Ok(Self { atol, rtol })
    }

    pub fn is_close(&self, actual: f64, expected: f64) -> bool {
        if actual.is_nan() || expected.is_nan() {
            return actual.is_nan() && expected.is_nan();
        }
        if actual.is_infinite() || expected.is_infinite() {
            return actual == expected;
        }
        (actual - expected).abs() <= self.atol + self.rtol * expected.abs()
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self { atol: 1e-5, rtol: 1e-5 }
    }
}

/// How an output differs from the reference.
#[derive(Debug, Clone, PartialEq)]
pub enum MismatchKind {
    Shape { expected: Vec<usize>, actual: Vec<usize> },
    DType { expected: DType, actual: DType },
    Values {
        /// Multi-index of the first element out of tolerance.
        first_index: Vec<usize>,
        max_abs_diff: f64,
        max_rel_diff: f64,
        count: usize,
        total: usize,
    },
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape { expected, actual } => write!(f, "shape {actual:?}, expected {expected:?}"),
            Self::DType { expected, actual } => write!(f, "dtype {actual}, expected {expected}"),
            Self::Values { first_index, max_abs_diff, max_rel_diff, count, total } => write!(
                f,
                "{count}/{total} elements out of tolerance, first at {first_index:?}, \
                 max abs diff {max_abs_diff:e}, max rel diff {max_rel_diff:e}"
            ),
        }
    }
}

/// One output of one config that disagrees with the reference.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputMismatch {
    pub config: PredictorConfig,
    pub output: String,
    pub kind: MismatchKind,
}

impl fmt::Display for OutputMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] output '{}': {}", self.config, self.output, self.kind)
    }
}

/// Compare an output against the reference: shape, then dtype, then values.
pub fn compare(expected: &TensorData, actual: &TensorData, tolerance: Tolerance) -> Option<MismatchKind> {
    if expected.shape() != actual.shape() {
        return Some(MismatchKind::Shape { expected: expected.shape().to_vec(), actual: actual.shape().to_vec() });
    }
    if expected.dtype() != actual.dtype() {
        return Some(MismatchKind::DType { expected: expected.dtype(), actual: actual.dtype() });
    }

    let expected_values = expected.to_f64_vec();
    let actual_values = actual.to_f64_vec();
    let mut first = None;
    let mut count = 0;
    let mut max_abs_diff = 0.0f64;
    let mut max_rel_diff = 0.0f64;
    for (i, (&a, &e)) in actual_values.iter().zip(&expected_values).enumerate() {
        if tolerance.is_close(a, e) {
            continue;
        }
        count += 1;
        first.get_or_insert(i);
        let abs_diff = (a - e).abs();
        max_abs_diff = max_abs_diff.max(abs_diff);
        max_rel_diff = max_rel_diff.max(abs_diff / e.abs().max(f64::MIN_POSITIVE));
    }

    first.map(|flat| MismatchKind::Values {
        first_index: unravel(flat, expected.shape()),
        max_abs_diff,
        max_rel_diff,
        count,
        total: expected_values.len(),
    })
}

fn unravel(mut flat: usize, shape: &[usize]) -> Vec<usize> {
    let mut index = vec![0; shape.len()];
    for (slot, &extent) in index.iter_mut().zip(shape).rev() {
        *slot = flat % extent;
        flat /= extent;
    }
    index
}
