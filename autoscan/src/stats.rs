//! Run statistics and the final report.

use std::collections::BTreeMap;
use std::fmt;

use autoscan_runtime::{ConfigOutcome, Verdict};

use crate::ignore::IgnoreReason;

/// Where a search invocation is.
///
/// `Ready -> Sampling -> Building -> Evaluating`, then back to `Sampling` on
/// a pass, or `Fail -> Shrinking -> FailReported` on the first failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(strum::Display, strum::EnumIter, strum::VariantArray, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING-KEBAB-CASE")]
pub enum Phase {
    #[default]
    Ready,
    Sampling,
    Building,
    Evaluating,
    Pass,
    Fail,
    Shrinking,
    FailReported,
}

/// Counters collected while the search runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counters {
    /// Draws that passed the validator.
    pub examples: u32,
    /// Draws discarded by the validator.
    pub rejected: u32,
    /// (program, config) pairs sent to the oracle.
    pub evaluated: u32,
    /// Pairs dropped by `is_program_valid`.
    pub filtered: u32,
    pub ignored: BTreeMap<IgnoreReason, u32>,
    pub generator_errors: u32,
}

impl Counters {
    pub fn ignore(&mut self, reason: IgnoreReason) {
        *self.ignored.entry(reason).or_default() += 1;
    }

    pub fn ignored(&self, reason: IgnoreReason) -> u32 {
        self.ignored.get(&reason).copied().unwrap_or(0)
    }
}

/// Why the search failed.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureKind {
    /// At least one config disagreed with the reference or errored.
    Verdict(Verdict),
    /// More generator errors than the configured budget.
    GeneratorBudget { errors: u32, budget: u32 },
    /// The program could not be evaluated at all.
    Harness(String),
}

/// Minimal failing case after shrinking.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// Debug rendering of the shrunk draw.
    pub draw: String,
    pub program: String,
    pub kind: FailureKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub module: String,
    pub seed: u64,
    pub quant: bool,
    pub max_examples: u32,
    pub counters: Counters,
    pub phase: Phase,
    pub failure: Option<Failure>,
}

impl ScanReport {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed() { "PASS" } else { "FAIL" };
        writeln!(f, "{status} {} (seed {}, quant {}, phase {})", self.module, self.seed, self.quant, self.phase)?;
        let c = &self.counters;
        writeln!(f, "  examples  {}/{}", c.examples, self.max_examples)?;
        writeln!(f, "  rejected  {}", c.rejected)?;
        writeln!(f, "  evaluated {}", c.evaluated)?;
        writeln!(f, "  filtered  {}", c.filtered)?;
        for (reason, count) in &c.ignored {
            writeln!(f, "  ignored   {count} ({reason})")?;
        }
        if c.generator_errors > 0 {
            writeln!(f, "  generator errors {}", c.generator_errors)?;
        }

        let Some(failure) = &self.failure else {
            return Ok(());
        };
        writeln!(f, "minimal failing case:")?;
        writeln!(f, "  draw   {}", failure.draw)?;
        writeln!(f, "{}", failure.program)?;
        match &failure.kind {
            FailureKind::Verdict(verdict) => {
                for result in verdict.failures() {
                    match &result.outcome {
                        ConfigOutcome::Mismatched(mismatches) => {
                            for mismatch in mismatches {
                                writeln!(f, "  {mismatch}")?;
                            }
                        }
                        ConfigOutcome::Errored(message) => writeln!(f, "  [{}] error: {message}", result.config)?,
                        ConfigOutcome::Passed => {}
                    }
                }
            }
            FailureKind::GeneratorBudget { errors, budget } => {
                writeln!(f, "  {errors} generator errors exceed the budget of {budget}")?;
            }
            FailureKind::Harness(message) => writeln!(f, "  {message}")?,
        }
        Ok(())
    }
}
