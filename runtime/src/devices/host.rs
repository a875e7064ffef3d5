//! Host backend.
//!
//! Computes over flat row-major buffers with explicit index arithmetic and
//! runs every op on a private rayon pool sized by the predictor config. With
//! an `NHWC` layout, rank-4 inputs are transposed into NHWC before the kernel
//! runs and results are transposed back to the logical NCHW order.

use autoscan_dtype::Element;
use autoscan_ir::{DataElement, OpConfig, OpKind, Shape, TensorData, shape};
use ndarray::{ArrayD, IxDyn};
use rayon::prelude::*;
use snafu::ResultExt;

use crate::backend::{self, Backend, OpInputs, OpOutputs, ReduceParams, dispatch_dtype};
use crate::error::*;
use crate::place::{DataLayoutType, PredictorConfig};

/// NHWC position `i` holds NCHW axis `NHWC[i]`.
const NHWC: [usize; 4] = [0, 2, 3, 1];

/// Row-major buffer in the compute layout.
struct HostTensor<T> {
    values: Vec<T>,
    shape: Shape,
}

pub struct HostBackend {
    name: String,
    layout: DataLayoutType,
    pool: rayon::ThreadPool,
}

impl std::fmt::Debug for HostBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostBackend")
            .field("name", &self.name)
            .field("layout", &self.layout)
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}

impl HostBackend {
    /// Create a backend with a dedicated pool of `config.threads()` workers.
    pub fn new(config: &PredictorConfig) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads())
            .thread_name(|i| format!("autoscan-host-{i}"))
            .build()
            .context(ThreadPoolSnafu)?;
        tracing::debug!(%config, "created host backend");
        Ok(Self { name: format!("host[{config}]"), layout: config.place().effective_layout(), pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Axis permutation from the logical layout into the compute layout.
    fn permutation(&self, rank: usize) -> Vec<usize> {
        match self.layout {
            DataLayoutType::Nhwc if rank == 4 => NHWC.to_vec(),
            _ => (0..rank).collect(),
        }
    }

    fn load<T: DataElement>(&self, x: &TensorData, perm: &[usize]) -> Result<HostTensor<T>> {
        let array = x.expect_array::<T>().context(IrSnafu)?;
        shape::validate_shape(array.shape()).context(IrSnafu)?;
        let view = array.view().permuted_axes(perm);
        Ok(HostTensor { shape: Shape::from_slice(view.shape()), values: view.iter().copied().collect() })
    }

    /// Bring a compute-layout buffer back to logical axis order.
    ///
    /// Compute axis `j` holds logical axis `perm[j]`.
    fn restore<T: DataElement>(&self, values: Vec<T>, compute_shape: &[usize], perm: &[usize]) -> Result<Vec<T>> {
        if is_identity(perm) {
            return Ok(values);
        }
        let array =
            ArrayD::from_shape_vec(IxDyn(compute_shape), values).context(ArraySnafu { backend: self.name.as_str() })?;
        let inverse = invert(perm);
        Ok(array.permuted_axes(inverse.as_slice()).iter().copied().collect())
    }

    fn reduce_min<T: DataElement>(&self, x: &TensorData, params: &ReduceParams) -> Result<TensorData> {
        let perm = self.permutation(x.shape().len());
        let input = self.load::<T>(x, &perm)?;
        let inverse = invert(&perm);
        let axes: Vec<usize> = params.axes.iter().map(|&axis| inverse[axis]).collect();

        // Reduce with kept dims so the compute layout keeps its rank.
        let kept = shape::reduce_shape(&input.shape, &axes, true);
        let values = self.pool.install(|| reduce_min_flat(&input, &axes, &kept));
        let values = self.restore(values, &kept, &perm)?;

        let out_shape = shape::reduce_shape(x.shape(), &params.axes, params.keep_dim);
        TensorData::from_vec(&out_shape, values).context(IrSnafu)
    }

    fn stack<T: DataElement>(&self, xs: &[TensorData], axis: usize) -> Result<TensorData> {
        shape::ensure_same_shape(xs.iter().map(TensorData::shape)).context(IrSnafu)?;
        let logical_shape = xs.first().map(|x| Shape::from_slice(x.shape())).unwrap_or_default();
        let out_shape = shape::stack_shape(&logical_shape, xs.len(), axis).context(IrSnafu)?;
        let rank = logical_shape.len();
        let perm = self.permutation(rank);
        let inputs = xs.iter().map(|x| self.load::<T>(x, &perm)).collect::<Result<Vec<_>>>()?;

        // A permuted layout stacks along a new trailing axis, then restores.
        let compute_axis = if is_identity(&perm) { axis } else { rank };
        let input_shape = inputs.first().map(|x| x.shape.clone()).unwrap_or_default();
        let compute_shape = shape::stack_shape(&input_shape, inputs.len(), compute_axis).context(IrSnafu)?;
        let values = self.pool.install(|| stack_flat(&inputs, &input_shape, compute_axis));

        let out_perm: Vec<usize> = (0..=rank)
            .map(|j| match j.cmp(&compute_axis) {
                std::cmp::Ordering::Equal => axis,
                ordering => {
                    let logical = perm[if ordering == std::cmp::Ordering::Less { j } else { j - 1 }];
                    if logical < axis { logical } else { logical + 1 }
                }
            })
            .collect();
        let values = self.restore(values, &compute_shape, &out_perm)?;
        TensorData::from_vec(&out_shape, values).context(IrSnafu)
    }
}

impl Backend for HostBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn run_op(&self, op: &OpConfig, inputs: &OpInputs) -> Result<OpOutputs> {
        tracing::trace!(backend = %self.name, op = %op.kind, "running op");
        match op.kind {
            OpKind::ReduceMin => {
                let x = backend::single(op, inputs, "X")?;
                let params = ReduceParams::from_op(op, x.shape().len())?;
                let out = dispatch_dtype!(x.dtype(), T => self.reduce_min::<T>(x, &params)?);
                Ok(backend::single_output("Out", out))
            }
            OpKind::Stack => {
                let xs = backend::slot(op, inputs, "X")?;
                let first = xs.first().ok_or(Error::Ir { source: autoscan_ir::Error::EmptyStack })?;
                let axis = backend::stack_axis(op, first.shape().len())?;
                let out = dispatch_dtype!(first.dtype(), T => self.stack::<T>(xs, axis)?);
                Ok(backend::single_output("Y", out))
            }
        }
    }
}

// =========================================================================
// Kernels
// =========================================================================

/// Minimum over `axes` of a row-major buffer; `out_shape` keeps reduced
/// axes with extent 1.
fn reduce_min_flat<T: Element>(input: &HostTensor<T>, axes: &[usize], out_shape: &[usize]) -> Vec<T> {
    let in_strides = shape::strides(&input.shape);
    let out_strides = shape::strides(out_shape);
    let reduced: Vec<(usize, usize)> = axes.iter().map(|&axis| (input.shape[axis], in_strides[axis])).collect();
    let window: usize = reduced.iter().map(|&(extent, _)| extent).product();

    (0..shape::numel(out_shape))
        .into_par_iter()
        .map(|o| {
            let base: usize = (0..out_shape.len()).map(|d| (o / out_strides[d]) % out_shape[d] * in_strides[d]).sum();
            let mut acc = T::MAX_VALUE;
            for r in 0..window {
                let mut rem = r;
                let mut offset = base;
                for &(extent, stride) in reduced.iter().rev() {
                    offset += (rem % extent) * stride;
                    rem /= extent;
                }
                acc = acc.min_nan(input.values[offset]);
            }
            acc
        })
        .collect()
}

/// Interleave equally shaped row-major buffers along a new `axis`.
fn stack_flat<T: Element>(inputs: &[HostTensor<T>], shape: &[usize], axis: usize) -> Vec<T> {
    let outer = shape::numel(&shape[..axis]);
    let inner = shape::numel(&shape[axis..]);
    (0..outer)
        .into_par_iter()
        .flat_map_iter(|o| inputs.iter().flat_map(move |x| x.values[o * inner..(o + 1) * inner].iter().copied()))
        .collect()
}

fn is_identity(perm: &[usize]) -> bool {
    perm.iter().enumerate().all(|(i, &p)| i == p)
}

fn invert(perm: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; perm.len()];
    for (i, &p) in perm.iter().enumerate() {
        inverse[p] = i;
    }
    inverse
}
