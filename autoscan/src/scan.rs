//! The operator module contract.
//!
//! An operator module is a sampler plus a program builder: [`AutoScan::sample`]
//! draws raw parameters, [`AutoScan::check`] rejects draws that violate a
//! cross-parameter constraint, and [`AutoScan::build`] turns a valid draw into
//! a [`ProgramConfig`]. Shrinking comes from the sampling strategy.

use std::fmt;

use autoscan_ir::{OpKind, ProgramConfig};
use autoscan_runtime::{PlaceSet, PredictorConfig, Result, Tolerance};
use proptest::strategy::BoxedStrategy;

use crate::ignore::IgnoreRule;

/// Why a draw was discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub reason: String,
}

impl Rejection {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl From<autoscan_ir::Error> for Rejection {
    fn from(error: autoscan_ir::Error) -> Self {
        Self::new(error.to_string())
    }
}

/// Configs, op kinds under test and tolerance of a module.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorConfigs {
    pub configs: Vec<PredictorConfig>,
    pub ops: Vec<OpKind>,
    pub tolerance: Tolerance,
}

/// A generative test of one operator.
pub trait AutoScan {
    /// Raw sampled parameters of one case.
    type Draw: Clone + fmt::Debug + 'static;

    fn name(&self) -> &'static str;

    /// Targets, precisions, layout and thread counts the module runs on.
    fn places(&self) -> Vec<PlaceSet>;

    /// Strategy over raw draws. Constraints that tie parameters together
    /// belong in [`AutoScan::check`], not here.
    fn sample(&self) -> BoxedStrategy<Self::Draw>;

    /// Reject draws that violate a cross-parameter constraint.
    fn check(&self, _draw: &Self::Draw) -> std::result::Result<(), Rejection> {
        Ok(())
    }

    /// Build the program of a valid draw. Data generators are stored, not run.
    fn build(&self, draw: &Self::Draw) -> ProgramConfig;

    fn predictor_configs(&self) -> Result<PredictorConfigs>;

    /// Whether `program` should be evaluated on `config` at all.
    fn is_program_valid(&self, _program: &ProgramConfig, _config: &PredictorConfig) -> bool {
        true
    }

    fn ignore_rules(&self) -> Vec<IgnoreRule> {
        Vec::new()
    }

    /// Example bound used when the scan config does not override it.
    fn max_examples(&self) -> u32;

    /// Every config declared by [`AutoScan::places`].
    fn enabled_configs(&self) -> Result<Vec<PredictorConfig>> {
        let mut configs = Vec::new();
        for set in self.places() {
            configs.extend(set.expand()?);
        }
        Ok(configs)
    }
}
