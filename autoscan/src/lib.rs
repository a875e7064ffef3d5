//! Generative differential testing of operator kernels.
//!
//! An operator module implements [`AutoScan`]: it samples raw parameters,
//! rejects draws that break a cross-parameter constraint and builds a
//! [`autoscan_ir::ProgramConfig`] from every valid draw. The [`SearchDriver`]
//! evaluates programs with the oracle from `autoscan-runtime` on each declared
//! predictor config, and shrinks the first failure to a minimal case.
//!
//! # Module Organization
//!
//! - [`scan`] - The operator module contract
//! - [`ignore`] - Declared ignore rules
//! - [`config`] - Scan configuration (builder and environment)
//! - [`driver`] - Seeded, bounded, shrinking search
//! - [`stats`] - Counters, phases and the final report
//! - [`ops`] - `reduce_min` and `stack` modules

pub mod config;
pub mod driver;
pub mod error;
pub mod ignore;
pub mod ops;
pub mod scan;
pub mod stats;


pub use config::ScanConfig;
pub use driver::SearchDriver;
pub use error::{Error, Result};
pub use ignore::{IgnoreReason, IgnoreRule};
pub use ops::OpModule;
pub use scan::{AutoScan, PredictorConfigs, Rejection};
pub use stats::{Counters, Failure, FailureKind, Phase, ScanReport};
