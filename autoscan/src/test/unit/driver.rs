use std::fmt;
use std::sync::Arc;

use autoscan_ir::{Distribution, OpConfig, ProgramConfig};
use autoscan_runtime::{
    Backend, BackendFactory, BackendRegistry, ConfigOutcome, DataLayoutType, OpInputs, OpOutputs, PlaceSet,
    PrecisionType, PredictorConfig, ReferenceBackend, TargetType, Tolerance,
};
use parking_lot::Mutex;
use proptest::strategy::BoxedStrategy;
use tracing::field::{Field, Visit};
use tracing::span;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use crate::driver::seed_bytes;
use crate::ignore::{IgnoreReason, IgnoreRule};
use crate::ops::StackScan;
use crate::ops::reduce_min::{ReduceMinDraw, ReduceMinScan};
use crate::scan::{AutoScan, PredictorConfigs, Rejection};
use crate::stats::{FailureKind, Phase};
use crate::{Error, ScanConfig, SearchDriver};

/// Reference results shifted by one whenever the input's leading extent
/// reaches `from`.
struct Faulty {
    from: usize,
}

impl Backend for Faulty {
    fn name(&self) -> &str {
        "faulty"
    }

    fn run_op(&self, op: &OpConfig, inputs: &OpInputs) -> autoscan_runtime::Result<OpOutputs> {
        let mut outputs = ReferenceBackend.run_op(op, inputs)?;
        let leading = inputs["X"][0].shape()[0];
        if leading >= self.from {
            for data in outputs.values_mut().flatten() {
                *data = data.map_f64(|v| v + 1.0);
            }
        }
        Ok(outputs)
    }
}

fn faulty_registry(from: usize) -> BackendRegistry {
    let registry = BackendRegistry::empty();
    let factory: BackendFactory = Arc::new(move |_| Ok(Arc::new(Faulty { from }) as Arc<dyn Backend>));
    registry.register_factory(TargetType::X86, factory);
    registry
}

/// `reduce_min` with replaceable places, rules, filters and generators.
struct Tweaked {
    places: Vec<PlaceSet>,
    check: fn(&ReduceMinDraw) -> Result<(), Rejection>,
    valid: fn(&ProgramConfig, &PredictorConfig) -> bool,
    rules: fn() -> Vec<IgnoreRule>,
    distribution: Option<Distribution>,
}

impl Default for Tweaked {
    fn default() -> Self {
        Self {
            places: ReduceMinScan.places(),
            check: |draw| ReduceMinScan.check(draw),
            valid: |_, _| true,
            rules: Vec::new,
            distribution: None,
        }
    }
}

impl AutoScan for Tweaked {
    type Draw = ReduceMinDraw;

    fn name(&self) -> &'static str {
        "tweaked_reduce_min"
    }

    fn places(&self) -> Vec<PlaceSet> {
        self.places.clone()
    }

    fn sample(&self) -> BoxedStrategy<ReduceMinDraw> {
        ReduceMinScan.sample()
    }

    fn check(&self, draw: &ReduceMinDraw) -> Result<(), Rejection> {
        (self.check)(draw)
    }

    fn build(&self, draw: &ReduceMinDraw) -> ProgramConfig {
        assert!((self.check)(draw).is_ok(), "built a rejected draw: {draw:?}");
        let mut program = ReduceMinScan.build(draw);
        if let Some(distribution) = self.distribution {
            for tensor in program.inputs.values_mut() {
                tensor.data_gen.distribution = distribution;
            }
        }
        program
    }

    fn predictor_configs(&self) -> autoscan_runtime::Result<PredictorConfigs> {
        Ok(PredictorConfigs {
            configs: self.enabled_configs()?,
            ops: vec![autoscan_ir::OpKind::ReduceMin],
            tolerance: Tolerance::default(),
        })
    }

    fn is_program_valid(&self, program: &ProgramConfig, config: &PredictorConfig) -> bool {
        (self.valid)(program, config)
    }

    fn ignore_rules(&self) -> Vec<IgnoreRule> {
        (self.rules)()
    }

    fn max_examples(&self) -> u32 {
        5
    }
}

fn config(seed: u64, max_examples: u32) -> ScanConfig {
    ScanConfig::builder().seed(seed).max_examples(max_examples).build()
}

// ============================================================================
// Passing Searches
// ============================================================================

#[test]
fn test_reduce_min_passes_on_host() {
    let report = SearchDriver::new(config(1, 5)).run(&ReduceMinScan).unwrap();

    assert!(report.passed(), "{report}");
    assert_eq!(report.phase, Phase::Pass);
    assert_eq!(report.counters.examples, 5);
    assert_eq!(report.counters.rejected, 0);
    // Two thread counts per example.
    assert_eq!(report.counters.evaluated, 10);
    assert!(report.to_string().starts_with("PASS reduce_min"));
}

#[test]
fn test_stack_passes_on_host() {
    let report = SearchDriver::new(config(2, 20)).run(&StackScan).unwrap();

    assert!(report.passed(), "{report}");
    assert_eq!(report.counters.examples, 20);
    // Axes beyond the input rank are drawn and discarded.
    assert!(report.counters.rejected > 0);
    // Host with one and four threads.
    assert_eq!(report.counters.evaluated, 2 * report.counters.examples);
}

#[test]
fn test_same_seed_same_report() {
    let first = SearchDriver::new(config(42, 4)).run(&ReduceMinScan).unwrap();
    let second = SearchDriver::new(config(42, 4)).run(&ReduceMinScan).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_module_default_example_bound() {
    let report = SearchDriver::new(ScanConfig::default()).run(&Tweaked::default()).unwrap();
    assert_eq!(report.max_examples, 5);
    assert_eq!(report.counters.examples, 5);
}

#[test]
fn test_rejected_draws_are_never_built() {
    let scan = Tweaked {
        check: |draw| if draw.seed % 2 == 0 { Ok(()) } else { Err(Rejection::new("odd seed")) },
        ..Tweaked::default()
    };
    let report = SearchDriver::new(config(3, 10)).run(&scan).unwrap();

    assert!(report.passed(), "{report}");
    assert_eq!(report.counters.examples, 10);
    assert!(report.counters.rejected > 0);
    assert_eq!(report.counters.evaluated, 20);
}

// ============================================================================
// Failures and Shrinking
// ============================================================================

#[test]
fn test_faulty_backend_shrinks_to_minimal_case() {
    let registry = faulty_registry(3);
    let report = SearchDriver::with_registry(config(0, 25), &registry).run(&ReduceMinScan).unwrap();

    assert!(!report.passed());
    assert_eq!(report.phase, Phase::FailReported);
    let failure = report.failure.as_ref().unwrap();
    assert!(failure.draw.contains("shape: [3, 1, 1, 1]"), "{}", failure.draw);
    assert!(failure.program.contains("reduce_min"));
    match &failure.kind {
        FailureKind::Verdict(verdict) => {
            assert_eq!(verdict.failures().count(), 2);
            assert!(verdict.mismatches().all(|m| m.output == "output_data"));
        }
        other => panic!("expected a verdict, got {other:?}"),
    }
    assert!(report.to_string().contains("minimal failing case"));
}

#[test]
fn test_missing_backend_is_reported_as_error() {
    let registry = BackendRegistry::empty();
    let report = SearchDriver::with_registry(config(0, 5), &registry).run(&ReduceMinScan).unwrap();

    let failure = report.failure.unwrap();
    assert!(failure.draw.contains("shape: [1, 1, 1, 1]"), "{}", failure.draw);
    let FailureKind::Verdict(verdict) = failure.kind else {
        panic!("expected a verdict");
    };
    assert!(verdict.results.iter().all(|r| matches!(r.outcome, ConfigOutcome::Errored(_))));
}

// ============================================================================
// Ignore Rules and Filters
// ============================================================================

#[test]
fn test_skipping_rule_keeps_pairs_from_oracle() {
    let scan = Tweaked {
        rules: || {
            vec![IgnoreRule::new(|_, config| config.threads() == 2, IgnoreReason::NotSupported, "no second thread")]
        },
        ..Tweaked::default()
    };
    let report = SearchDriver::new(config(5, 5)).run(&scan).unwrap();

    assert!(report.passed());
    assert_eq!(report.counters.evaluated, 5);
    assert_eq!(report.counters.ignored(IgnoreReason::NotSupported), 5);
    assert_eq!(report.counters.ignored(IgnoreReason::AccuracyError), 0);
}

#[test]
fn test_accuracy_rule_downgrades_mismatch() {
    let registry = faulty_registry(1);
    let scan = Tweaked {
        rules: || vec![IgnoreRule::new(|_, _| true, IgnoreReason::AccuracyError, "off by one")],
        ..Tweaked::default()
    };
    let report = SearchDriver::with_registry(config(5, 5), &registry).run(&scan).unwrap();

    assert!(report.passed(), "{report}");
    assert_eq!(report.counters.evaluated, 10);
    assert_eq!(report.counters.ignored(IgnoreReason::AccuracyError), 10);
}

#[test]
fn test_invalid_programs_are_filtered() {
    let scan = Tweaked { valid: |_, config| config.threads() == 1, ..Tweaked::default() };
    let report = SearchDriver::new(config(6, 5)).run(&scan).unwrap();

    assert!(report.passed());
    assert_eq!(report.counters.filtered, 5);
    assert_eq!(report.counters.evaluated, 5);
}

// ============================================================================
// Quantization
// ============================================================================

fn int8_places() -> Vec<PlaceSet> {
    vec![PlaceSet::new(TargetType::X86, [PrecisionType::Fp32, PrecisionType::Int8], DataLayoutType::Nchw, [1])]
}

#[test]
fn test_int8_configs_require_quant() {
    let scan = Tweaked { places: int8_places(), ..Tweaked::default() };
    let driver = SearchDriver::new(config(7, 4));

    let plain = driver.run_and_statis(&scan, false, 4).unwrap();
    assert!(plain.passed());
    assert!(!plain.quant);
    assert_eq!(plain.counters.evaluated, 4);

    let quant = driver.run_and_statis(&scan, true, 4).unwrap();
    assert!(quant.passed(), "{quant}");
    assert!(quant.quant);
    assert_eq!(quant.counters.evaluated, 8);
}

#[test]
fn test_no_configs_without_quant() {
    let scan = Tweaked {
        places: vec![PlaceSet::new(TargetType::X86, [PrecisionType::Int8], DataLayoutType::Nchw, [1])],
        ..Tweaked::default()
    };
    let result = SearchDriver::new(config(0, 3)).run(&scan);
    assert!(matches!(result, Err(Error::NoConfigs { .. })));
}

// ============================================================================
// Generator Errors
// ============================================================================

fn broken_generator() -> Tweaked {
    Tweaked { distribution: Some(Distribution::Uniform { low: 1.0, high: 0.0 }), ..Tweaked::default() }
}

#[test]
fn test_generator_errors_within_budget() {
    let config = ScanConfig::builder().seed(8).max_examples(5).failure_budget(10).build();
    let report = SearchDriver::new(config).run(&broken_generator()).unwrap();

    assert!(report.passed());
    assert_eq!(report.counters.generator_errors, 5);
    assert_eq!(report.counters.evaluated, 0);
}

#[test]
fn test_generator_errors_over_budget() {
    let config = ScanConfig::builder().seed(8).max_examples(5).failure_budget(2).build();
    let report = SearchDriver::new(config).run(&broken_generator()).unwrap();

    assert!(!report.passed());
    assert_eq!(report.phase, Phase::FailReported);
    let failure = report.failure.unwrap();
    assert_eq!(failure.kind, FailureKind::GeneratorBudget { errors: 3, budget: 2 });
}

// ============================================================================
// Seeding and Tracing
// ============================================================================

#[test]
fn test_seed_bytes() {
    assert_eq!(seed_bytes(7), seed_bytes(7));
    assert_ne!(seed_bytes(7), seed_bytes(8));
    assert_ne!(seed_bytes(0), [0u8; 32]);
}

/// Collects every value recorded into a span's `phase` field.
struct PhaseRecorder(Arc<Mutex<Vec<String>>>);

impl Visit for PhaseRecorder {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "phase" {
            self.0.lock().push(format!("{value:?}"));
        }
    }
}

struct PhaseLayer(Arc<Mutex<Vec<String>>>);

impl<S: tracing::Subscriber> Layer<S> for PhaseLayer {
    fn on_record(&self, _id: &span::Id, values: &span::Record<'_>, _ctx: Context<'_, S>) {
        values.record(&mut PhaseRecorder(Arc::clone(&self.0)));
    }
}

#[test]
fn test_phases_are_recorded_on_the_search_span() {
    let phases = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(PhaseLayer(Arc::clone(&phases)));
    let report = tracing::subscriber::with_default(subscriber, || {
        SearchDriver::new(config(4, 2)).run(&ReduceMinScan).unwrap()
    });
    assert!(report.passed());

    let phases = phases.lock().clone();
    for expected in ["SAMPLING", "BUILDING", "EVALUATING", "PASS"] {
        assert!(phases.iter().any(|phase| phase == expected), "{expected} missing from {phases:?}");
    }
    assert_eq!(phases.last().map(String::as_str), Some("PASS"));
}

#[test]
fn test_failed_search_ends_in_fail_reported_phase() {
    let phases = Arc::new(Mutex::new(Vec::new()));
    let registry = faulty_registry(1);
    let subscriber = tracing_subscriber::registry().with(PhaseLayer(Arc::clone(&phases)));
    tracing::subscriber::with_default(subscriber, || {
        SearchDriver::with_registry(config(4, 3), &registry).run(&ReduceMinScan).unwrap()
    });

    let phases = phases.lock().clone();
    assert!(phases.iter().any(|phase| phase == "FAIL"), "{phases:?}");
    assert_eq!(phases.last().map(String::as_str), Some("FAIL-REPORTED"));
}
