//! Clause sets produced by the encoder and their DIMACS serialization.
mod clause;
pub mod dimacs;
pub mod model;

pub use crate::cnf::clause::*;
pub use crate::cnf::dimacs::Cnf;
pub use crate::cnf::model::Model;
