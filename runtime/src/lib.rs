//! Backends and the differential oracle for generated operator tests.
//!
//! A program is executed on the [`ReferenceBackend`] and on one backend per
//! [`PredictorConfig`], obtained from the [`BACKENDS`] registry; outputs are
//! compared elementwise within a [`Tolerance`].
//!
//! # Module Organization
//!
//! - [`place`] - Targets, precisions, layouts and predictor configs
//! - [`backend`] - Backend trait and shared attribute decoding
//! - [`reference`] - Reference backend on `ndarray`
//! - [`devices`] - Host backend on a rayon pool
//! - [`registry`] - Target to backend factory registry
//! - [`executor`] - Sequential program execution
//! - [`quant`] - Int8 fake quantization of feeds
//! - [`compare`] - Tolerance comparison
//! - [`oracle`] - Oracle runner and verdicts

pub mod backend;
pub mod compare;
pub mod devices;
pub mod error;
pub mod executor;
pub mod oracle;
pub mod place;
pub mod quant;
pub mod reference;
pub mod registry;


pub use backend::{Backend, OpInputs, OpOutputs};
pub use compare::{MismatchKind, OutputMismatch, Tolerance};
pub use devices::HostBackend;
pub use error::*;
pub use executor::{Feeds, execute};
pub use oracle::{ConfigOutcome, ConfigResult, OracleRunner, Verdict};
pub use place::{DataLayoutType, Place, PlaceSet, PrecisionType, PredictorConfig, TargetType};
pub use reference::ReferenceBackend;
pub use registry::{BACKENDS, BackendFactory, BackendRegistry};
