//! Concrete tensor data.
//!
//! [`TensorData`] is the only place where values exist; descriptors carry a
//! [`crate::DataGen`] instead. Backends work on `ndarray` arrays and dispatch on
//! the element type through [`DataElement`].

use autoscan_dtype::{DType, Element};
use ndarray::{ArrayD, IxDyn};
use snafu::ensure;

use crate::error::*;
use crate::{Result, shape};

/// Dense, row-major tensor of one of the supported element types.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    Float32(ArrayD<f32>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
}

/// Host element types that can be wrapped into [`TensorData`].
pub trait DataElement: Element {
    fn wrap(array: ArrayD<Self>) -> TensorData;
    fn view(data: &TensorData) -> Option<&ArrayD<Self>>;
}

macro_rules! impl_data_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl DataElement for $ty {
                fn wrap(array: ArrayD<Self>) -> TensorData {
                    TensorData::$variant(array)
                }

                fn view(data: &TensorData) -> Option<&ArrayD<Self>> {
                    match data {
                        TensorData::$variant(array) => Some(array),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_data_element! {
    f32 => Float32,
    i32 => Int32,
    i64 => Int64,
}

impl TensorData {
    /// Build tensor data from a flat row-major vector.
    pub fn from_vec<T: DataElement>(shape: &[usize], values: Vec<T>) -> Result<Self> {
        let len = values.len();
        ensure!(len == shape::numel(shape), DataLengthSnafu { len, shape: shape.to_vec() });
        let array = ArrayD::from_shape_vec(IxDyn(shape), values)
            .map_err(|_| DataLengthSnafu { len, shape: shape.to_vec() }.build())?;
        Ok(T::wrap(array))
    }

    /// Build tensor data of `dtype` from `f64` samples, casting each sample.
    pub fn from_f64(shape: &[usize], dtype: DType, values: &[f64]) -> Result<Self> {
        match dtype {
            DType::Float32 => Self::from_vec(shape, values.iter().map(|&v| f32::from_f64(v)).collect()),
            DType::Int32 => Self::from_vec(shape, values.iter().map(|&v| i32::from_f64(v)).collect()),
            DType::Int64 => Self::from_vec(shape, values.iter().map(|&v| i64::from_f64(v)).collect()),
        }
    }

    pub fn dtype(&self) -> DType {
        match self {
            Self::Float32(_) => DType::Float32,
            Self::Int32(_) => DType::Int32,
            Self::Int64(_) => DType::Int64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Float32(a) => a.shape(),
            Self::Int32(a) => a.shape(),
            Self::Int64(a) => a.shape(),
        }
    }

    pub fn len(&self) -> usize {
        shape::numel(self.shape())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Typed view of the underlying array, `None` when the dtype differs.
    pub fn as_array<T: DataElement>(&self) -> Option<&ArrayD<T>> {
        T::view(self)
    }

    /// Typed view of the underlying array, failing on a dtype mismatch.
    pub fn expect_array<T: DataElement>(&self) -> Result<&ArrayD<T>> {
        T::view(self).ok_or_else(|| DTypeMismatchSnafu { expected: T::DTYPE, actual: self.dtype() }.build())
    }

    /// All elements in logical row-major order, widened to `f64`.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            Self::Float32(a) => a.iter().map(|v| v.to_f64()).collect(),
            Self::Int32(a) => a.iter().map(|v| v.to_f64()).collect(),
            Self::Int64(a) => a.iter().map(|v| v.to_f64()).collect(),
        }
    }

    /// Check this tensor against a declared shape and dtype.
    pub fn ensure_matches(&self, shape: &[usize], dtype: DType) -> Result<()> {
        ensure!(self.dtype() == dtype, DTypeMismatchSnafu { expected: dtype, actual: self.dtype() });
        ensure!(self.shape() == shape, ShapeMismatchSnafu { expected: shape.to_vec(), actual: self.shape().to_vec() });
        Ok(())
    }

    /// Copy of this tensor with every element passed through `f`.
    pub fn map_f64(&self, f: impl Fn(f64) -> f64) -> Self {
        match self {
            Self::Float32(a) => Self::Float32(a.mapv(|v| f32::from_f64(f(v.to_f64())))),
            Self::Int32(a) => Self::Int32(a.mapv(|v| i32::from_f64(f(v.to_f64())))),
            Self::Int64(a) => Self::Int64(a.mapv(|v| i64::from_f64(f(v.to_f64())))),
        }
    }
}

impl<T: DataElement> From<ArrayD<T>> for TensorData {
    fn from(array: ArrayD<T>) -> Self {
        T::wrap(array)
    }
}
