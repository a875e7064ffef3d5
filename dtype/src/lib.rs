pub mod ext;


pub use ext::{Element, HasDType};

/// Element type of a tensor descriptor.
///
/// The string form (`Display` / `FromStr`) is the lowercase numpy-style name
/// used in operator test modules: `"float32"`, `"int32"`, `"int64"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumString, strum::EnumIter, strum::VariantArray, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "proptest", derive(proptest_derive::Arbitrary))]
pub enum DType {
    Float32,
    Int32,
    Int64,
}

impl DType {
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float32)
    }

    pub const fn is_int(&self) -> bool {
        matches!(self, Self::Int32 | Self::Int64)
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }
}
