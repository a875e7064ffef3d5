//! Shape utilities for tensor descriptors.
//!
//! Shapes are fully concrete: every case is sampled with fixed extents, so a
//! shape is just a row-major sequence of positive integers. Axis arguments may
//! be negative (counted from the end) and are normalized against a rank before
//! any other check.

use smallvec::SmallVec;
use snafu::ensure;

use crate::{Result, error::*};

/// Shape type - sequence of concrete extents.
///
/// Uses SmallVec with inline capacity of 4: every operator module samples
/// tensors of rank 4 or less.
pub type Shape = SmallVec<[usize; 4]>;

// =========================================================================
// Shape Validation
// =========================================================================

/// Validate that every extent of a shape is positive.
///
/// # Examples
/// ```rust
/// # use autoscan_ir::shape::validate_shape;
/// assert!(validate_shape(&[1, 2, 3]).is_ok());
/// assert!(validate_shape(&[1, 0, 3]).is_err());
/// ```
pub fn validate_shape(shape: &[usize]) -> Result<()> {
    ensure!(shape.iter().all(|&s| s > 0), ZeroDimensionSnafu { shape: shape.to_vec() });
    Ok(())
}

/// Number of elements addressed by a shape (1 for rank 0).
pub fn numel(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Row-major strides of a shape, in elements.
///
/// # Examples
/// ```rust
/// # use autoscan_ir::shape::strides;
/// assert_eq!(strides(&[2, 3, 4]).as_slice(), &[12, 4, 1]);
/// ```
pub fn strides(shape: &[usize]) -> Shape {
    let mut strides: Shape = SmallVec::from_elem(1, shape.len());
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

// =========================================================================
// Axis Normalization
// =========================================================================

/// Normalize a possibly-negative axis against `rank`.
///
/// Negative axes count from the end (`-1` is the last dimension). The result
/// is always strictly less than `rank`.
///
/// # Examples
/// ```rust
/// # use autoscan_ir::shape::normalize_axis;
/// assert_eq!(normalize_axis(-1, 4).unwrap(), 3);
/// assert_eq!(normalize_axis(2, 4).unwrap(), 2);
/// assert!(normalize_axis(4, 4).is_err());
/// assert!(normalize_axis(-5, 4).is_err());
/// ```
pub fn normalize_axis(axis: i64, rank: usize) -> Result<usize> {
    let rank_i = rank as i64;
    ensure!((-rank_i..rank_i).contains(&axis), AxisOutOfRangeSnafu { axis, rank });
    Ok(if axis < 0 { (axis + rank_i) as usize } else { axis as usize })
}

/// Normalize a list of axes, returning them sorted and deduplicated.
pub fn normalize_axes(axes: &[i64], rank: usize) -> Result<Vec<usize>> {
    let mut normalized = axes.iter().map(|&axis| normalize_axis(axis, rank)).collect::<Result<Vec<_>>>()?;
    normalized.sort_unstable();
    normalized.dedup();
    Ok(normalized)
}

/// Resolve the reduction axes of a reduce op.
///
/// An empty `dims` list or a set `reduce_all` flag selects every axis.
pub fn reduction_axes(dims: &[i64], reduce_all: bool, rank: usize) -> Result<Vec<usize>> {
    if reduce_all || dims.is_empty() {
        return Ok((0..rank).collect());
    }
    normalize_axes(dims, rank)
}

// =========================================================================
// Output Shape Rules
// =========================================================================

/// Output shape of a reduction over `axes` (already normalized).
///
/// With `keep_dim` reduced axes become extent 1. Without it they are removed;
/// reducing every axis then yields the one-element shape `[1]`.
///
/// # Examples
/// ```rust
/// # use autoscan_ir::shape::reduce_shape;
/// assert_eq!(reduce_shape(&[2, 3, 4, 5], &[1], true).as_slice(), &[2, 1, 4, 5]);
/// assert_eq!(reduce_shape(&[2, 3, 4, 5], &[1], false).as_slice(), &[2, 4, 5]);
/// assert_eq!(reduce_shape(&[2, 3], &[0, 1], false).as_slice(), &[1]);
/// ```
pub fn reduce_shape(shape: &[usize], axes: &[usize], keep_dim: bool) -> Shape {
    if keep_dim {
        return shape.iter().enumerate().map(|(i, &dim)| if axes.contains(&i) { 1 } else { dim }).collect();
    }

    let kept: Shape = shape.iter().enumerate().filter(|(i, _)| !axes.contains(i)).map(|(_, &dim)| dim).collect();
    if kept.is_empty() { SmallVec::from_slice(&[1]) } else { kept }
}

/// Normalize the axis of a stack op.
///
/// Stacking inserts a new dimension, so the axis is normalized against
/// `rank + 1`: `-1` addresses the new trailing dimension.
///
/// # Examples
/// ```rust
/// # use autoscan_ir::shape::stack_axis;
/// assert_eq!(stack_axis(-1, 2).unwrap(), 2);
/// assert_eq!(stack_axis(0, 2).unwrap(), 0);
/// assert!(stack_axis(3, 2).is_err());
/// ```
pub fn stack_axis(axis: i64, rank: usize) -> Result<usize> {
    normalize_axis(axis, rank + 1)
}

/// Output shape of stacking `count` tensors of `shape` along `axis`
/// (already normalized with [`stack_axis`]).
///
/// # Examples
/// ```rust
/// # use autoscan_ir::shape::stack_shape;
/// assert_eq!(stack_shape(&[3, 4], 3, 0).unwrap().as_slice(), &[3, 3, 4]);
/// assert_eq!(stack_shape(&[3, 4], 3, 2).unwrap().as_slice(), &[3, 4, 3]);
/// ```
pub fn stack_shape(shape: &[usize], count: usize, axis: usize) -> Result<Shape> {
    ensure!(count > 0, EmptyStackSnafu);
    ensure!(axis <= shape.len(), AxisOutOfRangeSnafu { axis: axis as i64, rank: shape.len() + 1 });

    let mut out = Shape::from_slice(shape);
    out.insert(axis, count);
    Ok(out)
}

/// Check that every shape in `shapes` equals the first one.
pub fn ensure_same_shape<'a>(shapes: impl IntoIterator<Item = &'a [usize]>) -> Result<()> {
    let mut iter = shapes.into_iter();
    let Some(first) = iter.next() else {
        return Ok(());
    };
    for shape in iter {
        ensure!(shape == first, ShapeMismatchSnafu { expected: first.to_vec(), actual: shape.to_vec() });
    }
    Ok(())
}
