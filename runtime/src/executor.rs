//! Sequential program execution on one backend.

use std::collections::BTreeMap;

use autoscan_ir::{ProgramConfig, TensorData};
use snafu::OptionExt;

use crate::backend::{Backend, OpInputs};
use crate::error::*;

/// Concrete values of a program's declared inputs and weights.
pub type Feeds = BTreeMap<String, TensorData>;

/// Run every op of `program` in order and return the declared outputs.
///
/// Values are bound by tensor name; an op sees the feeds plus everything
/// earlier ops produced.
#[tracing::instrument(skip_all, fields(backend = backend.name()))]
pub fn execute(backend: &dyn Backend, program: &ProgramConfig, feeds: &Feeds) -> Result<BTreeMap<String, TensorData>> {
    let mut values: BTreeMap<&str, TensorData> =
        feeds.iter().map(|(name, data)| (name.as_str(), data.clone())).collect();

    for op in &program.ops {
        let mut inputs = OpInputs::new();
        for (slot, names) in &op.inputs {
            let tensors = names
                .iter()
                .map(|name| values.get(name.as_str()).cloned().context(MissingValueSnafu { name: name.as_str() }))
                .collect::<Result<Vec<_>>>()?;
            inputs.insert(slot.clone(), tensors);
        }

        let mut outputs = backend.run_op(op, &inputs)?;
        for (slot, names) in &op.outputs {
            let mut produced = outputs.remove(slot).unwrap_or_default().into_iter();
            for name in names {
                let data = produced.next().context(MissingOutputSnafu { op: op.kind, name: name.as_str() })?;
                values.insert(name.as_str(), data);
            }
        }
        tracing::trace!(op = %op.kind, "op executed");
    }

    program
        .outputs
        .iter()
        .map(|name| {
            let data = values.remove(name.as_str()).context(MissingValueSnafu { name: name.as_str() })?;
            Ok((name.clone(), data))
        })
        .collect()
}
