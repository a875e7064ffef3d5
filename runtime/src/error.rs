//! Error types for backends and the oracle.

use autoscan_dtype::DType;
use autoscan_ir::OpKind;
use snafu::Snafu;

use crate::place::{DataLayoutType, PrecisionType, TargetType};

/// Result type for runtime operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while executing a program.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Descriptor or shape error from the IR.
    #[snafu(display("{source}"))]
    Ir { source: autoscan_ir::Error },

    /// The program failed validation before execution.
    #[snafu(display("invalid program: {source}"))]
    InvalidProgram { source: autoscan_ir::Error },

    /// A data generator failed while materializing feeds.
    #[snafu(display("{source}"))]
    Generate { source: autoscan_ir::Error },

    #[snafu(display("{precision}/{layout} is not a legal place on target {target}"))]
    IllegalPlace { target: TargetType, precision: PrecisionType, layout: DataLayoutType },

    #[snafu(display("predictor config needs at least one thread"))]
    ZeroThreads,

    /// No backend factory is registered for the target.
    #[snafu(display("no backend registered for target {target}"))]
    UnsupportedTarget { target: TargetType },

    #[snafu(display("backend '{backend}' does not implement '{op}'"))]
    UnsupportedOp { backend: String, op: OpKind },

    #[snafu(display("backend '{backend}' does not support {dtype} for '{op}'"))]
    UnsupportedDType { backend: String, op: OpKind, dtype: DType },

    /// An op reads a tensor that has no value at execution time.
    #[snafu(display("no value for tensor '{name}'"))]
    MissingValue { name: String },

    /// An op did not produce a tensor its descriptor declares.
    #[snafu(display("'{op}' did not produce output '{name}'"))]
    MissingOutput { op: OpKind, name: String },

    #[snafu(display("failed to build thread pool: {source}"))]
    ThreadPool { source: rayon::ThreadPoolBuildError },

    /// Array construction failed inside a backend.
    #[snafu(display("backend '{backend}' failed: {source}"))]
    Array { backend: String, source: ndarray::ShapeError },

    #[snafu(display("invalid tolerance (atol {atol}, rtol {rtol})"))]
    InvalidTolerance { atol: f64, rtol: f64 },
}
