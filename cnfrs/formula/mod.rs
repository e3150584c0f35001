//! Formula nodes stored in the arena of [`crate::manager::FormulaManager`].
mod formula;

pub(crate) use crate::formula::formula::Formula;
pub use crate::formula::formula::{FormulaId, FormulaKind, OpType};
