//! Error types for the search driver.

use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Harness errors. A failing case is not an error; it is reported in the
/// [`crate::ScanReport`].
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Runtime { source: autoscan_runtime::Error },

    #[snafu(display("unknown operator module '{name}'"))]
    UnknownModule { name: String },

    /// Every declared config was filtered out before the search started.
    #[snafu(display("module '{module}' has no predictor config to test"))]
    NoConfigs { module: String },

    /// The runner gave up, usually after too many rejected draws.
    #[snafu(display("search for '{module}' aborted: {reason}"))]
    Aborted { module: String, reason: String },
}
