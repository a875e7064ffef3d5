//! Declared ignore rules.
//!
//! A module can mark (program, config) pairs as known failures. Rules with a
//! reason that skips evaluation keep the pair away from the oracle; an
//! accuracy rule still evaluates but downgrades a mismatch to an ignored
//! result.

use std::fmt;

use autoscan_ir::ProgramConfig;
use autoscan_runtime::PredictorConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumString, strum::EnumIter, strum::VariantArray)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IgnoreReason {
    /// The backend does not implement this case yet.
    NotImplemented,
    /// The target cannot run this case at all.
    NotSupported,
    /// The backend runs the case but is known to miss the tolerance.
    AccuracyError,
}

impl IgnoreReason {
    /// Whether a matching pair is kept away from the oracle.
    pub const fn skips_evaluation(self) -> bool {
        matches!(self, Self::NotImplemented | Self::NotSupported)
    }
}

pub type IgnoreMatcher = Box<dyn Fn(&ProgramConfig, &PredictorConfig) -> bool + Send + Sync>;

pub struct IgnoreRule {
    pub reason: IgnoreReason,
    pub note: String,
    matcher: IgnoreMatcher,
}

impl IgnoreRule {
    pub fn new(
        matcher: impl Fn(&ProgramConfig, &PredictorConfig) -> bool + Send + Sync + 'static,
        reason: IgnoreReason,
        note: impl Into<String>,
    ) -> Self {
        Self { reason, note: note.into(), matcher: Box::new(matcher) }
    }

    pub fn matches(&self, program: &ProgramConfig, config: &PredictorConfig) -> bool {
        (self.matcher)(program, config)
    }
}

impl fmt::Debug for IgnoreRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnoreRule").field("reason", &self.reason).field("note", &self.note).finish_non_exhaustive()
    }
}

/// First rule matching the pair, in declaration order.
pub fn find_rule<'a>(
    rules: &'a [IgnoreRule],
    program: &ProgramConfig,
    config: &PredictorConfig,
) -> Option<&'a IgnoreRule> {
    rules.iter().find(|rule| rule.matches(program, config))
}
