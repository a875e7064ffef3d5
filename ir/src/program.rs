//! Tensor and program descriptors.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use autoscan_dtype::DType;
use bon::bon;
use snafu::{ResultExt, ensure};

use crate::error::*;
use crate::{DataGen, OpConfig, OpKind, Result, Shape, TensorData, shape};

/// Declared input or weight tensor: shape, element type and a lazy generator.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorConfig {
    pub shape: Shape,
    pub dtype: DType,
    pub data_gen: DataGen,
}

impl TensorConfig {
    pub fn new(shape: &[usize], dtype: DType, data_gen: DataGen) -> Self {
        Self { shape: Shape::from_slice(shape), dtype, data_gen }
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Run the generator and check the result against the declaration.
    pub fn generate(&self) -> Result<TensorData> {
        let data = self.data_gen.generate(&self.shape, self.dtype)?;
        data.ensure_matches(&self.shape, self.dtype)?;
        Ok(data)
    }
}

/// One complete test case: ordered ops plus declared inputs, weights and outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramConfig {
    pub ops: Vec<OpConfig>,
    pub weights: BTreeMap<String, TensorConfig>,
    pub inputs: BTreeMap<String, TensorConfig>,
    pub outputs: Vec<String>,
}

#[bon]
impl ProgramConfig {
    /// Create a program description with builder pattern.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::collections::BTreeMap;
    /// # use autoscan_ir::{DType, DataGen, OpConfig, OpKind, ProgramConfig, TensorConfig};
    /// let input = TensorConfig::new(&[2, 3], DType::Float32, DataGen::uniform(0.0, 1.0, 7));
    /// let program = ProgramConfig::builder()
    ///     .ops(vec![
    ///         OpConfig::new(OpKind::ReduceMin)
    ///             .with_input("X", ["x"])
    ///             .with_output("Out", ["y"])
    ///             .with_attr("dim", vec![0i64]),
    ///     ])
    ///     .inputs(BTreeMap::from([("x".to_string(), input)]))
    ///     .outputs(vec!["y".to_string()])
    ///     .build();
    /// assert!(program.validate().is_ok());
    /// ```
    #[builder]
    pub fn builder(
        ops: Vec<OpConfig>,
        #[builder(default)] weights: BTreeMap<String, TensorConfig>,
        #[builder(default)] inputs: BTreeMap<String, TensorConfig>,
        outputs: Vec<String>,
    ) -> Self {
        Self { ops, weights, inputs, outputs }
    }
}

impl ProgramConfig {
    /// Check that the program is well formed.
    ///
    /// - every declared tensor has a valid shape,
    /// - every op input is a declared input, a weight, or an earlier op's output,
    /// - no tensor name is defined twice,
    /// - every declared output is produced by some op.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.ops.is_empty(), EmptyProgramSnafu);

        let mut defined = BTreeSet::new();
        for (name, tensor) in self.inputs.iter().chain(&self.weights) {
            shape::validate_shape(&tensor.shape)?;
            ensure!(defined.insert(name.as_str()), DuplicateTensorSnafu { name: name.as_str() });
        }

        for op in &self.ops {
            for name in op.input_names() {
                ensure!(defined.contains(name), UnknownTensorSnafu { name });
            }
            for name in op.output_names() {
                ensure!(defined.insert(name), DuplicateTensorSnafu { name });
            }
        }

        let produced: BTreeSet<&str> = self.ops.iter().flat_map(OpConfig::output_names).collect();
        for name in &self.outputs {
            ensure!(produced.contains(name.as_str()), UndeclaredOutputSnafu { name: name.as_str() });
        }
        Ok(())
    }

    /// Materialize every declared input and weight.
    ///
    /// This is the only place generators run; call it once per evaluation.
    pub fn feeds(&self) -> Result<BTreeMap<String, TensorData>> {
        self.inputs
            .iter()
            .chain(&self.weights)
            .map(|(name, tensor)| {
                let data = tensor.generate().context(GenerateSnafu { name: name.as_str() })?;
                Ok::<_, Error>((name.clone(), data))
            })
            .collect()
    }

    /// Distinct op kinds in program order.
    pub fn op_kinds(&self) -> Vec<OpKind> {
        let mut kinds = Vec::new();
        for op in &self.ops {
            if !kinds.contains(&op.kind) {
                kinds.push(op.kind);
            }
        }
        kinds
    }

    /// Look up a declared input or weight by name.
    pub fn tensor(&self, name: &str) -> Option<&TensorConfig> {
        self.inputs.get(name).or_else(|| self.weights.get(name))
    }
}

impl fmt::Display for ProgramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, tensor) in &self.inputs {
            writeln!(f, "  input  {name}: {}{:?} <- {:?}", tensor.dtype, tensor.shape.as_slice(), tensor.data_gen)?;
        }
        for (name, tensor) in &self.weights {
            writeln!(f, "  weight {name}: {}{:?} <- {:?}", tensor.dtype, tensor.shape.as_slice(), tensor.data_gen)?;
        }
        for op in &self.ops {
            writeln!(f, "  op     {op}")?;
        }
        write!(f, "  output {:?}", self.outputs)
    }
}
