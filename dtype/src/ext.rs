use super::*;

pub trait HasDType {
    const DTYPE: DType;
}

macro_rules! impl_dtype_ext {
    ($($ty:ty => $dtype:expr),* $(,)?) => {
        $(impl HasDType for $ty { const DTYPE: DType = $dtype; })*
    };
}

impl_dtype_ext! {
    f32 => DType::Float32,
    i32 => DType::Int32,
    i64 => DType::Int64,
}

/// Host element type with lossy conversions through `f64`.
///
/// Generators sample in `f64` and convert with [`Element::from_f64`]; the
/// oracle compares in `f64` after [`Element::to_f64`].
pub trait Element: HasDType + Copy + PartialOrd + Send + Sync + std::fmt::Debug + 'static {
    /// Identity of [`Element::min_nan`].
    const MAX_VALUE: Self;

    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;

    /// Minimum of two elements. NaN wins over any other value.
    fn min_nan(self, other: Self) -> Self {
        #[allow(clippy::eq_op)]
        let other_wins = self == self && (other != other || other < self);
        if other_wins { other } else { self }
    }
}

impl Element for f32 {
    const MAX_VALUE: Self = f32::INFINITY;

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Element for i32 {
    const MAX_VALUE: Self = i32::MAX;

    fn from_f64(value: f64) -> Self {
        value as i32
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Element for i64 {
    const MAX_VALUE: Self = i64::MAX;

    fn from_f64(value: f64) -> Self {
        value as i64
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}
