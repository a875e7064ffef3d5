//! Backend interface.
//!
//! A backend executes one [`OpConfig`] at a time on concrete tensors. Inputs
//! and outputs are keyed by the op's slot names, each slot holding its tensors
//! in declaration order.

use std::collections::BTreeMap;

use autoscan_ir::{OpConfig, TensorData, shape};
use snafu::{OptionExt, ResultExt};

use crate::error::*;

/// Tensors bound to an op's input slots.
pub type OpInputs = BTreeMap<String, Vec<TensorData>>;

/// Tensors produced for an op's output slots.
pub type OpOutputs = BTreeMap<String, Vec<TensorData>>;

/// An implementation of the supported operators.
pub trait Backend: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Execute a single op.
    fn run_op(&self, op: &OpConfig, inputs: &OpInputs) -> Result<OpOutputs>;
}

/// Tensors bound to `slot`, failing when the slot is absent.
pub fn slot<'a>(op: &OpConfig, inputs: &'a OpInputs, slot: &str) -> Result<&'a [TensorData]> {
    inputs
        .get(slot)
        .map(Vec::as_slice)
        .context(MissingValueSnafu { name: format!("{}.{slot}", op.kind) })
}

/// The single tensor bound to `slot`.
pub fn single<'a>(op: &OpConfig, inputs: &'a OpInputs, name: &str) -> Result<&'a TensorData> {
    let tensors = slot(op, inputs, name)?;
    if tensors.len() != 1 {
        let source =
            autoscan_ir::Error::SlotArity { op: op.kind, slot: name.to_string(), expected: 1, actual: tensors.len() };
        return Err(Error::Ir { source });
    }
    Ok(&tensors[0])
}

/// Wrap one result tensor for output slot `name`.
pub fn single_output(name: &str, data: TensorData) -> OpOutputs {
    BTreeMap::from([(name.to_string(), vec![data])])
}

/// Run a generic body with `$T` bound to the host type of `$dtype`.
macro_rules! dispatch_dtype {
    ($dtype:expr, $T:ident => $body:expr) => {
        match $dtype {
            autoscan_dtype::DType::Float32 => {
                type $T = f32;
                $body
            }
            autoscan_dtype::DType::Int32 => {
                type $T = i32;
                $body
            }
            autoscan_dtype::DType::Int64 => {
                type $T = i64;
                $body
            }
        }
    };
}

pub(crate) use dispatch_dtype;

// =========================================================================
// Attribute Decoding
// =========================================================================

/// Decoded attributes of a `reduce_min` op for an input of `rank`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReduceParams {
    /// Normalized, sorted reduction axes.
    pub axes: Vec<usize>,
    pub keep_dim: bool,
}

impl ReduceParams {
    pub fn from_op(op: &OpConfig, rank: usize) -> Result<Self> {
        let dims: &[i64] = match op.attrs.get("dim") {
            Some(_) => op.attr_ints("dim").context(IrSnafu)?,
            None => &[],
        };
        let reduce_all = op.attr_bool_or("reduce_all", false).context(IrSnafu)?;
        let keep_dim = op.attr_bool_or("keep_dim", false).context(IrSnafu)?;
        let axes = shape::reduction_axes(dims, reduce_all, rank).context(IrSnafu)?;
        Ok(Self { axes, keep_dim })
    }
}

/// Normalized axis of a `stack` op over inputs of `rank`.
pub fn stack_axis(op: &OpConfig, rank: usize) -> Result<usize> {
    let axis = match op.attrs.get("axis") {
        Some(_) => op.attr_int("axis").context(IrSnafu)?,
        None => 0,
    };
    shape::stack_axis(axis, rank).context(IrSnafu)
}
