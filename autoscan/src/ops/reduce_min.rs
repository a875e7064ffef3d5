//! `reduce_min` over one axis of a rank-4 float32 tensor.

use std::collections::BTreeMap;

use autoscan_ir::test::property::generators::arb_shape;
use autoscan_ir::{DType, DataGen, OpConfig, OpKind, ProgramConfig, Shape, TensorConfig, shape};
use autoscan_runtime::{DataLayoutType, PlaceSet, PrecisionType, Result, TargetType, Tolerance};
use proptest::prelude::*;

use crate::scan::{AutoScan, PredictorConfigs, Rejection};

#[derive(Debug, Clone, PartialEq)]
pub struct ReduceMinDraw {
    pub shape: Shape,
    pub keep_dim: bool,
    pub axis: i64,
    pub seed: u64,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ReduceMinScan;

impl AutoScan for ReduceMinScan {
    type Draw = ReduceMinDraw;

    fn name(&self) -> &'static str {
        "reduce_min"
    }

    fn places(&self) -> Vec<PlaceSet> {
        vec![PlaceSet::new(TargetType::X86, [PrecisionType::Fp32], DataLayoutType::Nchw, [1, 2])]
    }

    fn sample(&self) -> BoxedStrategy<ReduceMinDraw> {
        (arb_shape(4..=4, 10), any::<bool>(), -1i64..=3, any::<u64>())
            .prop_map(|(shape, keep_dim, axis, seed)| ReduceMinDraw { shape, keep_dim, axis, seed })
            .boxed()
    }

    fn check(&self, draw: &ReduceMinDraw) -> Result<(), Rejection> {
        shape::normalize_axis(draw.axis, draw.shape.len())?;
        Ok(())
    }

    fn build(&self, draw: &ReduceMinDraw) -> ProgramConfig {
        let dim = vec![draw.axis];
        let reduce_all = dim.is_empty();
        let op = OpConfig::new(OpKind::ReduceMin)
            .with_input("X", ["input_data"])
            .with_output("Out", ["output_data"])
            .with_attr("dim", dim)
            .with_attr("keep_dim", draw.keep_dim)
            .with_attr("reduce_all", reduce_all);
        let input = TensorConfig::new(&draw.shape, DType::Float32, DataGen::uniform(0.0, 1.0, draw.seed));

        ProgramConfig::builder()
            .ops(vec![op])
            .inputs(BTreeMap::from([("input_data".to_string(), input)]))
            .outputs(vec!["output_data".to_string()])
            .build()
    }

    fn predictor_configs(&self) -> Result<PredictorConfigs> {
        Ok(PredictorConfigs {
            configs: self.enabled_configs()?,
            ops: vec![OpKind::ReduceMin],
            tolerance: Tolerance::new(1e-5, 1e-5)?,
        })
    }

    fn max_examples(&self) -> u32 {
        25
    }
}
