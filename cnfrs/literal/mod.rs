pub mod literal;
pub(crate) mod manager;

pub use crate::literal::literal::*;
pub use crate::literal::manager::*;
