//! Seeded, bounded, shrinking search over an operator module.
//!
//! The driver feeds draws from the module's strategy through the validator,
//! the builder, the config filters and the oracle. The first failing draw is
//! shrunk by proptest, then evaluated once more to report the minimal case.

use std::cell::{Cell, RefCell};

use autoscan_runtime::{BACKENDS, BackendRegistry, ConfigOutcome, OracleRunner, PredictorConfig, Tolerance};
use proptest::test_runner::{Config, RngAlgorithm, TestCaseError, TestError, TestRng, TestRunner};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use snafu::{ResultExt, ensure};

use crate::config::ScanConfig;
use crate::error::*;
use crate::ignore::{IgnoreReason, IgnoreRule, find_rule};
use crate::scan::{AutoScan, PredictorConfigs, Rejection};
use crate::stats::{Counters, Failure, FailureKind, Phase, ScanReport};

/// Runs operator modules against a backend registry.
pub struct SearchDriver<'r> {
    config: ScanConfig,
    registry: &'r BackendRegistry,
}

impl SearchDriver<'static> {
    /// Driver backed by the global [`BACKENDS`] registry.
    pub fn new(config: ScanConfig) -> Self {
        Self::with_registry(config, &BACKENDS)
    }
}

impl<'r> SearchDriver<'r> {
    pub fn with_registry(config: ScanConfig, registry: &'r BackendRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Run a module with the configured quant mode and example bound.
    pub fn run<S: AutoScan>(&self, scan: &S) -> Result<ScanReport> {
        let max_examples = self.config.max_examples.unwrap_or_else(|| scan.max_examples());
        self.run_and_statis(scan, self.config.quant, max_examples)
    }

    /// Search up to `max_examples` valid draws and collect statistics.
    ///
    /// A failing case is not an error: it ends the search and is reported,
    /// shrunk, in the returned [`ScanReport`].
    #[tracing::instrument(
        skip_all,
        fields(module = scan.name(), quant = quant, max_examples = max_examples, phase = tracing::field::Empty)
    )]
    pub fn run_and_statis<S: AutoScan>(&self, scan: &S, quant: bool, max_examples: u32) -> Result<ScanReport> {
        let module = scan.name();
        let PredictorConfigs { configs, ops, tolerance } = scan.predictor_configs().context(RuntimeSnafu)?;
        let configs: Vec<_> = configs.into_iter().filter(|config| quant || !config.is_quantized()).collect();
        ensure!(!configs.is_empty(), NoConfigsSnafu { module });
        tracing::info!(configs = configs.len(), ?ops, seed = self.config.seed, "starting search");

        let evaluator = Evaluator {
            scan,
            configs,
            ops,
            tolerance,
            rules: scan.ignore_rules(),
            oracle: OracleRunner::with_registry(self.registry, quant),
        };

        let counters = RefCell::new(Counters::default());
        let phase = Cell::new(Phase::Ready);
        let over_budget: RefCell<Option<(String, String)>> = RefCell::new(None);

        let mut runner = TestRunner::new_with_rng(
            self.runner_config(max_examples),
            TestRng::from_seed(RngAlgorithm::ChaCha, &seed_bytes(self.config.seed)),
        );
        let result = runner.run(&scan.sample(), |draw| {
            // Once a case has failed every further call is a shrinking step;
            // those are evaluated but not counted.
            let shrinking = matches!(phase.get(), Phase::Fail | Phase::Shrinking);
            if shrinking {
                enter_phase(&phase, Phase::Shrinking);
            } else if over_budget.borrow().is_some() {
                return Ok(());
            }

            let mut scratch = Counters::default();
            let mut live = counters.borrow_mut();
            let stats = if shrinking { &mut scratch } else { &mut *live };
            let tracked = (!shrinking).then_some(&phase);

            match evaluator.evaluate(&draw, stats, tracked) {
                CaseOutcome::Rejected(rejection) => Err(TestCaseError::reject(rejection.reason)),
                CaseOutcome::Passed => {
                    if !shrinking {
                        enter_phase(&phase, Phase::Pass);
                    }
                    Ok(())
                }
                CaseOutcome::GeneratorError { program } => {
                    if !shrinking && stats.generator_errors > self.config.failure_budget {
                        *over_budget.borrow_mut() = Some((format!("{draw:?}"), program));
                    }
                    Ok(())
                }
                CaseOutcome::Failed { kind, .. } => {
                    if !shrinking {
                        enter_phase(&phase, Phase::Fail);
                        tracing::info!(?draw, "case failed, shrinking");
                    }
                    Err(TestCaseError::fail(summary(&kind)))
                }
            }
        });

        let counters = counters.into_inner();
        let failure = match result {
            Ok(()) => over_budget.into_inner().map(|(draw, program)| Failure {
                draw,
                program,
                kind: FailureKind::GeneratorBudget {
                    errors: counters.generator_errors,
                    budget: self.config.failure_budget,
                },
            }),
            Err(TestError::Fail(reason, draw)) => {
                let mut scratch = Counters::default();
                let failure = match evaluator.evaluate(&draw, &mut scratch, None) {
                    CaseOutcome::Failed { program, kind } => Failure { draw: format!("{draw:?}"), program, kind },
                    _ => Failure {
                        draw: format!("{draw:?}"),
                        program: scan.build(&draw).to_string(),
                        kind: FailureKind::Harness(reason.to_string()),
                    },
                };
                Some(failure)
            }
            Err(TestError::Abort(reason)) => {
                return AbortedSnafu { module, reason: reason.to_string() }.fail();
            }
        };

        let phase = if failure.is_some() { Phase::FailReported } else { Phase::Pass };
        tracing::Span::current().record("phase", tracing::field::display(phase));
        tracing::info!(
            %phase,
            examples = counters.examples,
            rejected = counters.rejected,
            evaluated = counters.evaluated,
            "search finished"
        );
        Ok(ScanReport {
            module: module.to_string(),
            seed: self.config.seed,
            quant,
            max_examples,
            counters,
            phase,
            failure,
        })
    }

    fn runner_config(&self, max_examples: u32) -> Config {
        Config {
            cases: max_examples,
            max_global_rejects: self.config.max_rejects,
            max_shrink_iters: self.config.max_shrink_iters,
            failure_persistence: None,
            ..Config::default()
        }
    }
}

enum CaseOutcome {
    Rejected(Rejection),
    Passed,
    GeneratorError { program: String },
    Failed { program: String, kind: FailureKind },
}

/// Per-invocation state shared by every case.
struct Evaluator<'a, S> {
    scan: &'a S,
    configs: Vec<PredictorConfig>,
    ops: Vec<autoscan_ir::OpKind>,
    tolerance: Tolerance,
    rules: Vec<IgnoreRule>,
    oracle: OracleRunner<'a>,
}

impl<S: AutoScan> Evaluator<'_, S> {
    fn evaluate(&self, draw: &S::Draw, stats: &mut Counters, phase: Option<&Cell<Phase>>) -> CaseOutcome {
        let enter = |next: Phase| {
            if let Some(cell) = phase {
                enter_phase(cell, next);
            }
        };

        enter(Phase::Sampling);
        if let Err(rejection) = self.scan.check(draw) {
            tracing::trace!(%rejection, "draw rejected");
            stats.rejected += 1;
            return CaseOutcome::Rejected(rejection);
        }
        stats.examples += 1;

        enter(Phase::Building);
        let program = self.scan.build(draw);
        if let Some(kind) = program.op_kinds().into_iter().find(|kind| !self.ops.contains(kind)) {
            let message = format!("program uses '{kind}', which the module does not test");
            return CaseOutcome::Failed { program: program.to_string(), kind: FailureKind::Harness(message) };
        }

        let mut selected = Vec::with_capacity(self.configs.len());
        let mut downgraded = Vec::new();
        for config in &self.configs {
            if !self.scan.is_program_valid(&program, config) {
                stats.filtered += 1;
                continue;
            }
            match find_rule(&self.rules, &program, config) {
                Some(rule) if rule.reason.skips_evaluation() => {
                    tracing::debug!(%config, reason = %rule.reason, note = %rule.note, "config ignored");
                    stats.ignore(rule.reason);
                    continue;
                }
                Some(_) => downgraded.push(*config),
                None => {}
            }
            selected.push(*config);
        }
        if selected.is_empty() {
            return CaseOutcome::Passed;
        }

        enter(Phase::Evaluating);
        let mut verdict = match self.oracle.run(&program, &selected, self.tolerance) {
            Ok(verdict) => verdict,
            Err(error @ autoscan_runtime::Error::Generate { .. }) => {
                tracing::warn!(%error, "data generation failed");
                stats.generator_errors += 1;
                return CaseOutcome::GeneratorError { program: program.to_string() };
            }
            Err(error) => {
                return CaseOutcome::Failed {
                    program: program.to_string(),
                    kind: FailureKind::Harness(error.to_string()),
                };
            }
        };
        stats.evaluated += selected.len() as u32;

        for result in &mut verdict.results {
            if matches!(result.outcome, ConfigOutcome::Mismatched(_)) && downgraded.contains(&result.config) {
                tracing::debug!(config = %result.config, "accuracy mismatch ignored");
                stats.ignore(IgnoreReason::AccuracyError);
                result.outcome = ConfigOutcome::Passed;
            }
        }

        if verdict.passed() {
            CaseOutcome::Passed
        } else {
            CaseOutcome::Failed { program: program.to_string(), kind: FailureKind::Verdict(verdict) }
        }
    }
}

fn summary(kind: &FailureKind) -> String {
    match kind {
        FailureKind::Verdict(verdict) => format!("{} config(s) failed", verdict.failures().count()),
        FailureKind::GeneratorBudget { errors, budget } => format!("{errors} generator errors, budget {budget}"),
        FailureKind::Harness(message) => message.clone(),
    }
}

/// Move the search to `next` and record it on the current span.
fn enter_phase(cell: &Cell<Phase>, next: Phase) {
    cell.set(next);
    tracing::Span::current().record("phase", tracing::field::display(next));
}

/// Expand a 64-bit seed into a ChaCha seed.
pub(crate) fn seed_bytes(seed: u64) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    StdRng::seed_from_u64(seed).fill_bytes(&mut bytes);
    bytes
}
