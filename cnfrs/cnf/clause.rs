use derive_more::derive::From;
use std::fmt::Display;

use crate::cnf::Model;
use crate::literal::Literal;

/// Single clause -- disjunction of literals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, From)]
pub struct Clause(Vec<Literal>);

impl Clause {
    #[must_use]
    pub fn new(literals: Vec<Literal>) -> Clause {
        Clause(literals)
    }

    #[must_use]
    pub fn unit(literal: Literal) -> Clause {
        Clause(vec![literal])
    }

    #[must_use]
    pub fn literals(&self) -> &[Literal] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check whether at least one literal of the clause holds in the model.
    #[must_use]
    pub fn is_satisfied_by(&self, model: &Model) -> bool {
        self.0.iter().any(|literal| model.satisfies(*literal))
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({})",
            self.0
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        )
    }
}

/// Conjunction of clauses in the order they were emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClauseSet(Vec<Clause>);

impl ClauseSet {
    #[must_use]
    pub fn new() -> ClauseSet {
        ClauseSet::default()
    }

    pub fn push(&mut self, clause: Clause) {
        self.0.push(clause);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Clause> {
        self.0.iter()
    }

    #[must_use]
    pub fn is_satisfied_by(&self, model: &Model) -> bool {
        self.0.iter().all(|clause| clause.is_satisfied_by(model))
    }
}

impl<'a> IntoIterator for &'a ClauseSet {
    type Item = &'a Clause;
    type IntoIter = std::slice::Iter<'a, Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Extend<Clause> for ClauseSet {
    fn extend<T: IntoIterator<Item = Clause>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

/// Build a [`Clause`] from literals.
#[macro_export]
macro_rules! clause {
    ( $( $x:expr ),* $(,)? ) => {
        $crate::cnf::Clause::new(vec![$( $x ),*])
    };
}

#[cfg(test)]
mod test {
    use super::{Clause, ClauseSet};
    use crate::cnf::Model;
    use crate::literal::{Literal, VariableIdx};

    fn lit(value: i32) -> Literal {
        let variable = VariableIdx(value.unsigned_abs());
        if value > 0 {
            Literal::positive(variable)
        } else {
            Literal::negative(variable)
        }
    }

    #[test]
    fn display() {
        assert_eq!(clause![lit(-3), lit(1)].to_string(), "(-3 1)");
        assert_eq!(Clause::unit(lit(3)).to_string(), "(3)");
    }

    #[test]
    fn satisfaction() {
        let mut clauses = ClauseSet::new();
        clauses.push(clause![lit(-3), lit(1)]);
        clauses.push(clause![lit(-3), lit(2)]);
        clauses.push(Clause::unit(lit(3)));

        let mut model = Model::new(3);
        model.set(VariableIdx(3), true);
        assert!(!clauses.is_satisfied_by(&model));

        model.set(VariableIdx(1), true);
        model.set(VariableIdx(2), true);
        assert!(clauses.is_satisfied_by(&model));
    }

    #[test]
    fn empty_clause_is_unsatisfiable() {
        assert!(!Clause::new(Vec::new()).is_satisfied_by(&Model::new(0)));
        assert!(ClauseSet::new().is_satisfied_by(&Model::new(0)));
    }
}
