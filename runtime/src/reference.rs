//! Reference backend.
//!
//! Plain `ndarray` code with no layout handling or parallelism. The oracle
//! treats its results as the expected values.

use autoscan_ir::{DataElement, OpConfig, OpKind, TensorData, shape};
use ndarray::{ArrayD, Axis, IxDyn};
use snafu::ResultExt;

use crate::backend::{self, Backend, OpInputs, OpOutputs, ReduceParams, dispatch_dtype};
use crate::error::*;

const NAME: &str = "reference";

#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceBackend;

impl Backend for ReferenceBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn run_op(&self, op: &OpConfig, inputs: &OpInputs) -> Result<OpOutputs> {
        match op.kind {
            OpKind::ReduceMin => {
                let x = backend::single(op, inputs, "X")?;
                let params = ReduceParams::from_op(op, x.shape().len())?;
                let out = dispatch_dtype!(x.dtype(), T => reduce_min::<T>(x, &params)?);
                Ok(backend::single_output("Out", out))
            }
            OpKind::Stack => {
                let xs = backend::slot(op, inputs, "X")?;
                let first = xs.first().ok_or(Error::Ir { source: autoscan_ir::Error::EmptyStack })?;
                let axis = backend::stack_axis(op, first.shape().len())?;
                let out = dispatch_dtype!(first.dtype(), T => stack::<T>(xs, axis)?);
                Ok(backend::single_output("Y", out))
            }
        }
    }
}

fn reduce_min<T: DataElement>(x: &TensorData, params: &ReduceParams) -> Result<TensorData> {
    let array = x.expect_array::<T>().context(IrSnafu)?;
    shape::validate_shape(array.shape()).context(IrSnafu)?;

    // Fold the highest axis first so lower axis indices stay valid.
    let mut folded = array.clone();
    for &axis in params.axes.iter().rev() {
        folded = folded.fold_axis(Axis(axis), T::MAX_VALUE, |&acc, &v| acc.min_nan(v));
    }

    let out_shape = shape::reduce_shape(array.shape(), &params.axes, params.keep_dim);
    let out = ArrayD::from_shape_vec(IxDyn(&out_shape), folded.into_iter().collect())
        .context(ArraySnafu { backend: NAME })?;
    Ok(out.into())
}

fn stack<T: DataElement>(xs: &[TensorData], axis: usize) -> Result<TensorData> {
    let views = xs
        .iter()
        .map(|x| x.expect_array::<T>().map(|array| array.view()))
        .collect::<autoscan_ir::Result<Vec<_>>>()
        .context(IrSnafu)?;
    let out = ndarray::stack(Axis(axis), &views).context(ArraySnafu { backend: NAME })?;
    Ok(out.into())
}
