//! Operation descriptors.
//!
//! An [`OpConfig`] names its operands instead of holding them: input and output
//! slots map to ordered lists of tensor names, which the program resolves
//! against its declared inputs, weights and earlier outputs.

use std::collections::BTreeMap;
use std::fmt;

use snafu::{OptionExt, ensure};

use crate::error::*;
use crate::{AttrValue, OpKind, Result};

/// One operation of a program: kind, named operand slots and attributes.
///
/// # Examples
///
/// ```rust
/// # use autoscan_ir::{OpConfig, OpKind};
/// let op = OpConfig::new(OpKind::ReduceMin)
///     .with_input("X", ["input_data"])
///     .with_output("Out", ["output_data"])
///     .with_attr("dim", vec![1i64])
///     .with_attr("keep_dim", true);
/// assert_eq!(op.attr_ints("dim").unwrap(), &[1]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OpConfig {
    pub kind: OpKind,
    pub inputs: BTreeMap<String, Vec<String>>,
    pub outputs: BTreeMap<String, Vec<String>>,
    pub attrs: BTreeMap<String, AttrValue>,
}

impl OpConfig {
    pub fn new(kind: OpKind) -> Self {
        Self { kind, inputs: BTreeMap::new(), outputs: BTreeMap::new(), attrs: BTreeMap::new() }
    }

    pub fn with_input<I, S>(mut self, slot: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.insert(slot.to_string(), names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_output<I, S>(mut self, slot: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs.insert(slot.to_string(), names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    // =========================================================================
    // Slot Access
    // =========================================================================

    /// Tensor names bound to an input slot.
    pub fn input(&self, slot: &str) -> Result<&[String]> {
        self.inputs.get(slot).map(Vec::as_slice).context(MissingSlotSnafu { op: self.kind, slot })
    }

    /// Tensor names bound to an output slot.
    pub fn output(&self, slot: &str) -> Result<&[String]> {
        self.outputs.get(slot).map(Vec::as_slice).context(MissingSlotSnafu { op: self.kind, slot })
    }

    /// The single tensor name bound to an output slot.
    pub fn single_output(&self, slot: &str) -> Result<&str> {
        let names = self.output(slot)?;
        ensure!(names.len() == 1, SlotAritySnafu { op: self.kind, slot, expected: 1usize, actual: names.len() });
        Ok(&names[0])
    }

    /// Every tensor name this op reads, in slot order.
    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.values().flatten().map(String::as_str)
    }

    /// Every tensor name this op writes, in slot order.
    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.values().flatten().map(String::as_str)
    }

    // =========================================================================
    // Attribute Access
    // =========================================================================

    pub fn attr(&self, name: &str) -> Result<&AttrValue> {
        self.attrs.get(name).context(MissingAttributeSnafu { op: self.kind, name })
    }

    pub fn attr_int(&self, name: &str) -> Result<i64> {
        let value = self.attr(name)?;
        value.as_int().context(AttributeTypeSnafu { op: self.kind, name, expected: "int", actual: value.type_name() })
    }

    pub fn attr_bool(&self, name: &str) -> Result<bool> {
        let value = self.attr(name)?;
        value.as_bool().context(AttributeTypeSnafu { op: self.kind, name, expected: "bool", actual: value.type_name() })
    }

    pub fn attr_ints(&self, name: &str) -> Result<&[i64]> {
        let value = self.attr(name)?;
        value.as_ints().context(AttributeTypeSnafu {
            op: self.kind,
            name,
            expected: "int list",
            actual: value.type_name(),
        })
    }

    /// Boolean attribute that defaults to `default` when absent.
    pub fn attr_bool_or(&self, name: &str, default: bool) -> Result<bool> {
        match self.attrs.get(name) {
            Some(_) => self.attr_bool(name),
            None => Ok(default),
        }
    }
}

impl fmt::Display for OpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind)?;
        let mut first = true;
        for (slot, names) in &self.inputs {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{slot}={names:?}")?;
        }
        for (name, value) in &self.attrs {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{name}={value}")?;
        }
        write!(f, ") -> ")?;
        let outputs: Vec<_> = self.output_names().collect();
        write!(f, "{outputs:?}")
    }
}
