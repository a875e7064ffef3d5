//! Operator test modules.

pub mod reduce_min;
pub mod stack;

pub use reduce_min::ReduceMinScan;
pub use stack::StackScan;

use crate::driver::SearchDriver;
use crate::error::Result;
use crate::stats::ScanReport;

/// Every operator module the CLI can run, by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::Display, strum::EnumString, strum::EnumIter, strum::VariantArray, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum OpModule {
    ReduceMin,
    Stack,
}

impl OpModule {
    pub fn name(&self) -> &'static str {
        self.into()
    }

    pub const fn description(&self) -> &'static str {
        match self {
            Self::ReduceMin => "minimum over one axis of a rank-4 float32 tensor",
            Self::Stack => "stack three tensors of rank 1 to 4 along a new axis",
        }
    }

    pub fn run(&self, driver: &SearchDriver<'_>) -> Result<ScanReport> {
        match self {
            Self::ReduceMin => driver.run(&ReduceMinScan),
            Self::Stack => driver.run(&StackScan),
        }
    }
}
