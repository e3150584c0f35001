//! Total assignments over the variables of a CNF.
use bitvec::prelude::*;
use std::fmt::Display;

use crate::literal::{Literal, Polarity, VariableIdx};

/// Truth value of every variable `1..=n`. Bit `i` holds variable `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    values: BitVec,
}

impl Model {
    /// All-false assignment over `variables` variables.
    #[must_use]
    pub fn new(variables: usize) -> Model {
        Model {
            values: bitvec![0; variables],
        }
    }

    /// Assignment whose bits are taken from the binary representation of `bits`,
    /// least significant bit being variable 1. Handy for exhaustive enumeration.
    #[must_use]
    pub fn from_bits(bits: u64, variables: usize) -> Model {
        assert!(variables <= 64, "at most 64 variables fit into u64");
        let mut values = BitVec::with_capacity(variables);
        for n in 0..variables {
            values.push((bits >> n) & 1 == 1);
        }

        Model { values }
    }

    #[must_use]
    pub fn variables(&self) -> usize {
        self.values.len()
    }

    /// # Panics
    ///
    /// Panics if the variable is outside of the model.
    pub fn set(&mut self, variable: VariableIdx, value: bool) {
        let position = Model::position(variable);
        self.values.set(position, value);
    }

    /// Value of the variable, `None` if the variable is outside of the model.
    #[must_use]
    pub fn value(&self, variable: VariableIdx) -> Option<bool> {
        let position = (variable.0 as usize).checked_sub(1)?;
        self.values.get(position).map(|bit| *bit)
    }

    /// Check whether the literal holds. Variables outside of the model are false.
    #[must_use]
    pub fn satisfies(&self, literal: Literal) -> bool {
        let value = self.value(literal.variable()).unwrap_or(false);
        match literal.polarity() {
            Polarity::Positive => value,
            Polarity::Negative => !value,
        }
    }

    fn position(variable: VariableIdx) -> usize {
        assert!(variable.0 > 0, "variable indices start at 1");
        variable.0 as usize - 1
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let literals: Vec<_> = self
            .values
            .iter()
            .enumerate()
            .map(|(position, value)| {
                let literal = Literal::new(VariableIdx::from(position + 1), Polarity::from(*value));
                literal.to_string()
            })
            .collect();

        write!(f, "{{{}}}", literals.join(", "))
    }
}
