//! Scan configuration.
//!
//! Built explicitly with [`ScanConfig::builder`] or read from the environment
//! with [`ScanConfig::from_env`]; the CLI starts from the environment and
//! overrides it with its flags.

use bon::bon;

/// Settings shared by every module a driver runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Seed of the draw source. Same seed and example bound give the same run.
    pub seed: u64,
    /// Overrides the module's own example bound when set.
    pub max_examples: Option<u32>,
    /// Fake-quantize float feeds and enable int8 configs.
    pub quant: bool,
    /// Generator errors tolerated before the run fails.
    pub failure_budget: u32,
    pub max_shrink_iters: u32,
    /// Rejected draws tolerated before the run is aborted.
    pub max_rejects: u32,
}

#[bon]
impl ScanConfig {
    #[builder]
    pub fn builder(
        #[builder(default = 0)] seed: u64,
        max_examples: Option<u32>,
        #[builder(default = false)] quant: bool,
        #[builder(default = 0)] failure_budget: u32,
        #[builder(default = 1024)] max_shrink_iters: u32,
        #[builder(default = 4096)] max_rejects: u32,
    ) -> Self {
        Self { seed, max_examples, quant, failure_budget, max_shrink_iters, max_rejects }
    }
}

impl ScanConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `AUTOSCAN_SEED` - Draw source seed (default: 0)
    /// * `AUTOSCAN_MAX_EXAMPLES` - Example bound for every module (default: per module)
    /// * `AUTOSCAN_QUANT` - Quantization mode if set to `1` or `true`
    /// * `AUTOSCAN_FAILURE_BUDGET` - Tolerated generator errors (default: 0)
    /// * `AUTOSCAN_MAX_SHRINK_ITERS` - Shrinking step bound (default: 1024)
    /// * `AUTOSCAN_MAX_REJECTS` - Rejected draw bound (default: 4096)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; missing or malformed values keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let seed = lookup("AUTOSCAN_SEED").and_then(|s| s.parse().ok()).unwrap_or(0);
        let max_examples = lookup("AUTOSCAN_MAX_EXAMPLES").and_then(|s| s.parse().ok());
        let quant = lookup("AUTOSCAN_QUANT").is_some_and(|s| matches!(s.as_str(), "1" | "true"));
        let failure_budget = lookup("AUTOSCAN_FAILURE_BUDGET").and_then(|s| s.parse().ok()).unwrap_or(0);
        let max_shrink_iters = lookup("AUTOSCAN_MAX_SHRINK_ITERS").and_then(|s| s.parse().ok()).unwrap_or(1024);
        let max_rejects = lookup("AUTOSCAN_MAX_REJECTS").and_then(|s| s.parse().ok()).unwrap_or(4096);

        Self { seed, max_examples, quant, failure_budget, max_shrink_iters, max_rejects }
    }

    /// Apply command-line flags on top of this configuration.
    ///
    /// Flags that were given win; `quant` can only be switched on.
    pub fn with_overrides(mut self, seed: Option<u64>, max_examples: Option<u32>, quant: bool) -> Self {
        if let Some(seed) = seed {
            self.seed = seed;
        }
        if max_examples.is_some() {
            self.max_examples = max_examples;
        }
        self.quant |= quant;
        self
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
