//! Target places and predictor configurations.
//!
//! A [`Place`] is a (target, precision, layout) triple that has passed the
//! legality check; a [`PredictorConfig`] adds the thread count a backend runs
//! with. Operator modules declare [`PlaceSet`]s, which expand into one config
//! per (precision, thread count) combination.

use std::fmt;

use snafu::ensure;

use crate::error::*;

/// Compute target a backend is created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumString, strum::EnumIter, strum::VariantArray)]
#[strum(serialize_all = "UPPERCASE")]
pub enum TargetType {
    Host,
    X86,
    Arm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumString, strum::EnumIter, strum::VariantArray)]
#[strum(serialize_all = "UPPERCASE")]
pub enum PrecisionType {
    Fp32,
    Fp16,
    Int8,
    Int32,
    Int64,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumString, strum::EnumIter, strum::VariantArray)]
#[strum(serialize_all = "UPPERCASE")]
pub enum DataLayoutType {
    Nchw,
    Nhwc,
    Any,
}

impl TargetType {
    /// Precisions a place on this target may request.
    pub const fn precisions(self) -> &'static [PrecisionType] {
        use PrecisionType::*;
        match self {
            Self::Host => &[Fp32, Int32, Int64, Any],
            Self::X86 => &[Fp32, Int8, Any],
            Self::Arm => &[Fp32, Fp16, Int8],
        }
    }

    /// Layouts a place on this target may request.
    pub const fn layouts(self) -> &'static [DataLayoutType] {
        use DataLayoutType::*;
        match self {
            Self::Host => &[Nchw, Any],
            Self::X86 => &[Nchw, Nhwc, Any],
            Self::Arm => &[Nchw, Nhwc],
        }
    }
}

/// Legal (target, precision, layout) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Place {
    target: TargetType,
    precision: PrecisionType,
    layout: DataLayoutType,
}

impl Place {
    /// Create a place, rejecting combinations the target does not support.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use autoscan_runtime::place::*;
    /// assert!(Place::new(TargetType::X86, PrecisionType::Fp32, DataLayoutType::Nhwc).is_ok());
    /// assert!(Place::new(TargetType::Host, PrecisionType::Int8, DataLayoutType::Nchw).is_err());
    /// ```
    pub fn new(target: TargetType, precision: PrecisionType, layout: DataLayoutType) -> Result<Self> {
        ensure!(
            target.precisions().contains(&precision) && target.layouts().contains(&layout),
            IllegalPlaceSnafu { target, precision, layout }
        );
        Ok(Self { target, precision, layout })
    }

    pub const fn target(&self) -> TargetType {
        self.target
    }

    pub const fn precision(&self) -> PrecisionType {
        self.precision
    }

    pub const fn layout(&self) -> DataLayoutType {
        self.layout
    }

    /// Layout a backend computes in; `Any` resolves to `NCHW`.
    pub const fn effective_layout(&self) -> DataLayoutType {
        match self.layout {
            DataLayoutType::Any => DataLayoutType::Nchw,
            layout => layout,
        }
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.target, self.precision, self.layout)
    }
}

/// A place plus the thread count a backend is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PredictorConfig {
    place: Place,
    threads: usize,
}

impl PredictorConfig {
    pub fn new(place: Place, threads: usize) -> Result<Self> {
        ensure!(threads > 0, ZeroThreadsSnafu);
        Ok(Self { place, threads })
    }

    pub const fn place(&self) -> Place {
        self.place
    }

    pub const fn threads(&self) -> usize {
        self.threads
    }

    /// Whether this config runs int8 kernels, which only makes sense on
    /// fake-quantized feeds.
    pub fn is_quantized(&self) -> bool {
        self.place.precision == PrecisionType::Int8
    }
}

impl fmt::Display for PredictorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} threads={}", self.place, self.threads)
    }
}

/// Declared testing surface of an operator module on one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceSet {
    pub target: TargetType,
    pub precisions: Vec<PrecisionType>,
    pub layout: DataLayoutType,
    pub threads: Vec<usize>,
}

impl PlaceSet {
    pub fn new(
        target: TargetType,
        precisions: impl IntoIterator<Item = PrecisionType>,
        layout: DataLayoutType,
        threads: impl IntoIterator<Item = usize>,
    ) -> Self {
        Self { target, precisions: precisions.into_iter().collect(), layout, threads: threads.into_iter().collect() }
    }

    /// One config per (precision, thread count) pair, precisions outermost.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use autoscan_runtime::place::*;
    /// let set = PlaceSet::new(TargetType::X86, [PrecisionType::Fp32], DataLayoutType::Nchw, [1, 2]);
    /// let configs = set.expand().unwrap();
    /// assert_eq!(configs.len(), 2);
    /// assert_eq!(configs[1].threads(), 2);
    /// ```
    pub fn expand(&self) -> Result<Vec<PredictorConfig>> {
        let mut configs = Vec::with_capacity(self.precisions.len() * self.threads.len());
        for &precision in &self.precisions {
            let place = Place::new(self.target, precision, self.layout)?;
            for &threads in &self.threads {
                configs.push(PredictorConfig::new(place, threads)?);
            }
        }
        Ok(configs)
    }
}
