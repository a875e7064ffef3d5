//! Program descriptions for generated operator tests.
//!
//! A test case is a [`ProgramConfig`]: an ordered list of [`OpConfig`]s plus the
//! tensors it consumes and produces. Input tensors are declared with a shape, an
//! element type and a [`DataGen`] that only produces concrete [`TensorData`]
//! when a runner asks for it.
//!
//! # Module Organization
//!
//! - [`shape`] - Shapes, axis normalization, output shape rules
//! - [`types`] - Operation kinds and attribute values
//! - [`op`] - Operation descriptors
//! - [`program`] - Tensor and program descriptors
//! - [`generator`] - Deferred, seeded data generators
//! - [`data`] - Concrete tensor data
//! - [`error`] - Error types and result handling

pub mod data;
pub mod error;
pub mod generator;
pub mod op;
pub mod program;
pub mod shape;
pub mod types;


pub use data::{DataElement, TensorData};
pub use error::{Error, Result};
pub use generator::{DataGen, Distribution};
pub use op::OpConfig;
pub use program::{ProgramConfig, TensorConfig};
pub use shape::Shape;
pub use types::{AttrValue, OpKind};

pub use autoscan_dtype::DType;
