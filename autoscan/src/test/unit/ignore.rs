use std::str::FromStr;

use autoscan_runtime::{DataLayoutType, Place, PrecisionType, PredictorConfig, TargetType};

use crate::ignore::{IgnoreReason, IgnoreRule, find_rule};
use crate::ops::ReduceMinScan;
use crate::scan::AutoScan;

fn config(threads: usize) -> PredictorConfig {
    PredictorConfig::new(Place::new(TargetType::X86, PrecisionType::Fp32, DataLayoutType::Nchw).unwrap(), threads)
        .unwrap()
}

#[test]
fn test_reason_names() {
    assert_eq!(IgnoreReason::AccuracyError.to_string(), "ACCURACY_ERROR");
    assert_eq!(IgnoreReason::from_str("NOT_SUPPORTED").unwrap(), IgnoreReason::NotSupported);
}

#[test]
fn test_skips_evaluation() {
    assert!(IgnoreReason::NotImplemented.skips_evaluation());
    assert!(IgnoreReason::NotSupported.skips_evaluation());
    assert!(!IgnoreReason::AccuracyError.skips_evaluation());
}

#[test]
fn test_first_matching_rule_wins() {
    let program = ReduceMinScan.build(&crate::ops::reduce_min::ReduceMinDraw {
        shape: [2, 3, 4, 5].into_iter().collect(),
        keep_dim: true,
        axis: 1,
        seed: 0,
    });
    let rules = vec![
        IgnoreRule::new(|_, config| config.threads() == 2, IgnoreReason::NotImplemented, "two threads"),
        IgnoreRule::new(|_, _| true, IgnoreReason::AccuracyError, "everything else"),
    ];

    assert_eq!(find_rule(&rules, &program, &config(2)).map(|rule| rule.reason), Some(IgnoreReason::NotImplemented));
    assert_eq!(find_rule(&rules, &program, &config(1)).map(|rule| rule.note.as_str()), Some("everything else"));
    assert!(find_rule(&[], &program, &config(1)).is_none());
}
