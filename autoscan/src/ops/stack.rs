//! `stack` of three equally shaped tensors along a new axis.

use std::collections::BTreeMap;

use autoscan_ir::test::property::generators::arb_shape;
use autoscan_ir::{DType, DataGen, OpConfig, OpKind, ProgramConfig, Shape, TensorConfig, shape};
use autoscan_runtime::{DataLayoutType, PlaceSet, PrecisionType, Result, TargetType, Tolerance};
use proptest::prelude::*;
use strum::VariantArray;

use crate::scan::{AutoScan, PredictorConfigs, Rejection};

const INPUTS: [&str; 3] = ["stack_input1", "stack_input2", "stack_input3"];

#[derive(Debug, Clone, PartialEq)]
pub struct StackDraw {
    pub shape: Shape,
    pub dtype: DType,
    /// Raw axis attribute, possibly negative.
    pub axis: i64,
    /// One generator seed per input.
    pub seeds: [u64; 3],
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StackScan;

impl AutoScan for StackScan {
    type Draw = StackDraw;

    fn name(&self) -> &'static str {
        "stack"
    }

    fn places(&self) -> Vec<PlaceSet> {
        vec![PlaceSet::new(TargetType::Host, [PrecisionType::Fp32], DataLayoutType::Nchw, [1, 4])]
    }

    fn sample(&self) -> BoxedStrategy<StackDraw> {
        let dtype = prop::sample::select(DType::VARIANTS);
        let axis = prop::sample::select(vec![-1i64, 0, 1, 2, 3]);
        (arb_shape(1..=4, 64), dtype, axis, any::<[u64; 3]>())
            .prop_map(|(shape, dtype, axis, seeds)| StackDraw { shape, dtype, axis, seeds })
            .boxed()
    }

    /// The axis must address a dimension of the inputs once normalized
    /// against their rank.
    fn check(&self, draw: &StackDraw) -> Result<(), Rejection> {
        shape::normalize_axis(draw.axis, draw.shape.len())?;
        Ok(())
    }

    fn build(&self, draw: &StackDraw) -> ProgramConfig {
        let inputs: BTreeMap<_, _> = INPUTS
            .iter()
            .zip(draw.seeds)
            .map(|(name, seed)| {
                (name.to_string(), TensorConfig::new(&draw.shape, draw.dtype, DataGen::normal(1.0, 6.0, seed)))
            })
            .collect();
        let op = OpConfig::new(OpKind::Stack)
            .with_input("X", INPUTS)
            .with_output("Y", ["output_data"])
            .with_attr("axis", draw.axis);

        ProgramConfig::builder().ops(vec![op]).inputs(inputs).outputs(vec!["output_data".to_string()]).build()
    }

    fn predictor_configs(&self) -> Result<PredictorConfigs> {
        Ok(PredictorConfigs {
            configs: self.enabled_configs()?,
            ops: vec![OpKind::Stack],
            tolerance: Tolerance::new(1e-5, 1e-5)?,
        })
    }

    fn max_examples(&self) -> u32 {
        100
    }
}
