use derive_more::derive::From;
use std::{convert::From, fmt::Display};

/// Index of a variable. Indices are allocated by [`crate::literal::VariableManager`]
/// starting at 1, for named atoms and Tseitin auxiliaries alike.
#[derive(PartialEq, Eq, Clone, PartialOrd, Ord, Debug, Copy, Hash, From)]
pub struct VariableIdx(pub u32);

impl From<usize> for VariableIdx {
    fn from(value: usize) -> Self {
        VariableIdx(value.try_into().expect("variable index must fit into u32"))
    }
}

impl Display for VariableIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Polarity of a variable.
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Copy, Hash)]
pub enum Polarity {
    Positive,
    Negative,
}

impl From<bool> for Polarity {
    fn from(item: bool) -> Self {
        if item {
            Polarity::Positive
        } else {
            Polarity::Negative
        }
    }
}

impl std::ops::Not for Polarity {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
        }
    }
}

/// Literal in the DIMACS sense: the magnitude is the [`VariableIdx`],
/// the sign is the [`Polarity`]. A literal is never zero.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct Literal(i32);

impl Literal {
    /// Create a new [`Literal`].
    ///
    /// # Panics
    ///
    /// Panics if the variable index is 0 or does not fit into `i32`.
    #[must_use]
    pub fn new(variable: VariableIdx, polarity: Polarity) -> Literal {
        let magnitude = i32::try_from(variable.0).expect("variable index must fit into i32");
        assert!(magnitude > 0, "variable indices start at 1");

        match polarity {
            Polarity::Positive => Literal(magnitude),
            Polarity::Negative => Literal(-magnitude),
        }
    }

    #[must_use]
    pub fn positive(variable: VariableIdx) -> Literal {
        Literal::new(variable, Polarity::Positive)
    }

    #[must_use]
    pub fn negative(variable: VariableIdx) -> Literal {
        Literal::new(variable, Polarity::Negative)
    }

    #[must_use]
    pub fn variable(&self) -> VariableIdx {
        VariableIdx(self.0.unsigned_abs())
    }

    #[must_use]
    pub fn polarity(&self) -> Polarity {
        Polarity::from(self.0 > 0)
    }

    /// Signed integer as written in DIMACS.
    #[must_use]
    pub fn as_dimacs(&self) -> i32 {
        self.0
    }
}

impl std::ops::Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        Literal(-self.0)
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
