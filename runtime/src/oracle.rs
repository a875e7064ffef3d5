//! Differential oracle.
//!
//! Runs a program once on the [`ReferenceBackend`] and once per predictor
//! config on a registered backend, then compares every declared output.

use std::collections::BTreeMap;

use autoscan_ir::{ProgramConfig, TensorData};
use snafu::ResultExt;

use crate::compare::{self, OutputMismatch, Tolerance};
use crate::error::*;
use crate::executor::{self, Feeds};
use crate::place::PredictorConfig;
use crate::quant;
use crate::reference::ReferenceBackend;
use crate::registry::{BACKENDS, BackendRegistry};

/// Result of evaluating one predictor config.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigOutcome {
    Passed,
    Mismatched(Vec<OutputMismatch>),
    /// The backend could not be created or failed while executing.
    Errored(String),
}

impl ConfigOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigResult {
    pub config: PredictorConfig,
    pub outcome: ConfigOutcome,
}

/// Per-config outcomes of one case, in config order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Verdict {
    pub results: Vec<ConfigResult>,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.results.iter().all(|result| result.outcome.is_passed())
    }

    /// Results that did not pass.
    pub fn failures(&self) -> impl Iterator<Item = &ConfigResult> {
        self.results.iter().filter(|result| !result.outcome.is_passed())
    }

    /// Every mismatch across all configs.
    pub fn mismatches(&self) -> impl Iterator<Item = &OutputMismatch> {
        self.results.iter().flat_map(|result| match &result.outcome {
            ConfigOutcome::Mismatched(mismatches) => mismatches.as_slice(),
            _ => [].as_slice(),
        })
    }
}

/// Evaluates programs against the reference backend.
pub struct OracleRunner<'a> {
    registry: &'a BackendRegistry,
    reference: ReferenceBackend,
    quant: bool,
}

impl OracleRunner<'static> {
    /// Runner backed by the global [`BACKENDS`] registry.
    pub fn new(quant: bool) -> Self {
        Self::with_registry(&BACKENDS, quant)
    }
}

impl<'a> OracleRunner<'a> {
    pub fn with_registry(registry: &'a BackendRegistry, quant: bool) -> Self {
        Self { registry, reference: ReferenceBackend, quant }
    }

    /// Generate the feeds of a program, fake-quantized in quant mode.
    pub fn feeds(&self, program: &ProgramConfig) -> Result<Feeds> {
        let feeds = program.feeds().context(GenerateSnafu)?;
        Ok(if self.quant { quant::quantize_feeds(&feeds) } else { feeds })
    }

    /// Evaluate `program` on every config.
    ///
    /// Errors cover only the program itself (validation, data generation,
    /// reference execution); per-config failures are reported in the verdict.
    #[tracing::instrument(skip_all, fields(configs = configs.len()))]
    pub fn run(&self, program: &ProgramConfig, configs: &[PredictorConfig], tolerance: Tolerance) -> Result<Verdict> {
        program.validate().context(InvalidProgramSnafu)?;
        let feeds = self.feeds(program)?;
        let expected = executor::execute(&self.reference, program, &feeds)?;

        let results = configs
            .iter()
            .map(|config| {
                let outcome = self.evaluate(config, program, &feeds, &expected, tolerance);
                tracing::debug!(%config, passed = outcome.is_passed(), "config evaluated");
                ConfigResult { config: *config, outcome }
            })
            .collect();
        Ok(Verdict { results })
    }

    fn evaluate(
        &self,
        config: &PredictorConfig,
        program: &ProgramConfig,
        feeds: &Feeds,
        expected: &BTreeMap<String, TensorData>,
        tolerance: Tolerance,
    ) -> ConfigOutcome {
        let run = self.registry.backend(config).and_then(|backend| executor::execute(&*backend, program, feeds));
        let actual = match run {
            Ok(actual) => actual,
            Err(error) => return ConfigOutcome::Errored(error.to_string()),
        };

        let mismatches: Vec<_> = expected
            .iter()
            .filter_map(|(name, reference)| {
                let kind = compare::compare(reference, actual.get(name)?, tolerance)?;
                Some(OutputMismatch { config: *config, output: name.clone(), kind })
            })
            .collect();

        if mismatches.is_empty() { ConfigOutcome::Passed } else { ConfigOutcome::Mismatched(mismatches) }
    }
}
