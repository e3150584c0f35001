//! Manager responsible for building, flattening, and encoding formulas
//! as well as maintaining the state of a single compilation run.
mod flatten;
mod manager;
pub mod options;
mod statistics;
mod tseitin;

pub use crate::manager::manager::*;
pub use crate::manager::statistics::Statistics;
