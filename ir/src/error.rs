use autoscan_dtype::DType;
use snafu::Snafu;

use crate::OpKind;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Axis does not address a dimension of the tensor.
    #[snafu(display("axis {axis} is out of range for rank {rank}"))]
    AxisOutOfRange { axis: i64, rank: usize },

    /// Shapes must have strictly positive extents.
    #[snafu(display("shape {shape:?} has a zero-sized dimension"))]
    ZeroDimension { shape: Vec<usize> },

    #[snafu(display("shape mismatch: expected {expected:?}, got {actual:?}"))]
    ShapeMismatch { expected: Vec<usize>, actual: Vec<usize> },

    #[snafu(display("dtype mismatch: expected {expected}, got {actual}"))]
    DTypeMismatch { expected: DType, actual: DType },

    #[snafu(display("data length {len} does not fit shape {shape:?}"))]
    DataLength { len: usize, shape: Vec<usize> },

    #[snafu(display("operation '{op}' has no attribute '{name}'"))]
    MissingAttribute { op: OpKind, name: String },

    #[snafu(display("attribute '{name}' of '{op}' is {actual}, expected {expected}"))]
    AttributeType { op: OpKind, name: String, expected: &'static str, actual: &'static str },

    #[snafu(display("operation '{op}' has no slot '{slot}'"))]
    MissingSlot { op: OpKind, slot: String },

    #[snafu(display("operation '{op}' expects {expected} tensor(s) in slot '{slot}', got {actual}"))]
    SlotArity { op: OpKind, slot: String, expected: usize, actual: usize },

    /// An op reads a tensor that is neither declared nor produced earlier.
    #[snafu(display("tensor '{name}' is read before it is declared or produced"))]
    UnknownTensor { name: String },

    #[snafu(display("tensor '{name}' is defined more than once"))]
    DuplicateTensor { name: String },

    /// A declared program output that no op produces.
    #[snafu(display("declared output '{name}' is never produced"))]
    UndeclaredOutput { name: String },

    #[snafu(display("program has no operations"))]
    EmptyProgram,

    #[snafu(display("stack needs at least one input tensor"))]
    EmptyStack,

    /// A declared tensor's generator failed.
    #[snafu(display("failed to generate '{name}': {source}"))]
    Generate {
        name: String,
        #[snafu(source(from(Error, Box::new)))]
        source: Box<Error>,
    },

    #[snafu(display("invalid {distribution} parameters: {reason}"))]
    InvalidDistribution { distribution: &'static str, reason: String },
}
