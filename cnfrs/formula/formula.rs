use core::fmt;
use derive_more::derive::From;
use std::fmt::Display;

use crate::literal::{Literal, Polarity};

/// Operator of a formula node. The set is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpType {
    Var,
    Not,
    And,
    Or,
    Imp,
    Iff,
}

impl OpType {
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            OpType::Var => "x",
            OpType::Not => "!",
            OpType::And => "&",
            OpType::Or => "|",
            OpType::Imp => "=>",
            OpType::Iff => "<=>",
        }
    }

    /// Operators that may be chained into a single n-ary node.
    #[must_use]
    pub fn is_associative(&self) -> bool {
        matches!(self, OpType::And | OpType::Or)
    }
}

impl Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Handle of an interned formula. Two handles obtained from the same
/// [`crate::manager::FormulaManager`] are equal iff the formulas are
/// structurally identical (with operand order being significant).
#[derive(Eq, PartialEq, Hash, Debug, PartialOrd, Ord, Clone, Copy, From)]
pub struct FormulaId(pub(crate) u32);

impl FormulaId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for FormulaId {
    fn from(value: usize) -> Self {
        FormulaId(value.try_into().unwrap())
    }
}

impl Display for FormulaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FormulaId({})", self.0)
    }
}

/// Shape of a formula node. Operands are referred to by their handles,
/// so structural equality of two kinds is a shallow comparison.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum FormulaKind {
    Atom(String),
    Not(FormulaId),
    Binary(OpType, [FormulaId; 2]),
    Nary(OpType, Vec<FormulaId>),
}

impl FormulaKind {
    #[must_use]
    pub fn op_type(&self) -> OpType {
        match self {
            FormulaKind::Atom(..) => OpType::Var,
            FormulaKind::Not(..) => OpType::Not,
            FormulaKind::Binary(op, ..) | FormulaKind::Nary(op, ..) => *op,
        }
    }

    #[must_use]
    pub fn operands(&self) -> &[FormulaId] {
        match self {
            FormulaKind::Atom(..) => &[],
            FormulaKind::Not(operand) => std::slice::from_ref(operand),
            FormulaKind::Binary(_, operands) => operands,
            FormulaKind::Nary(_, operands) => operands,
        }
    }

    pub(crate) fn name(&self) -> &str {
        match self {
            FormulaKind::Atom(..) => "atom",
            FormulaKind::Not(..) => "negation",
            FormulaKind::Binary(..) => "binary",
            FormulaKind::Nary(..) => "n-ary",
        }
    }
}

/// Directions of the Tseitin definition already emitted for a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Emitted {
    positive: bool,
    negative: bool,
}

impl Emitted {
    pub(crate) fn contains(self, polarity: Polarity) -> bool {
        match polarity {
            Polarity::Positive => self.positive,
            Polarity::Negative => self.negative,
        }
    }

    pub(crate) fn insert(&mut self, polarity: Polarity) {
        match polarity {
            Polarity::Positive => self.positive = true,
            Polarity::Negative => self.negative = true,
        }
    }
}

/// Node of the formula arena.
#[derive(Clone, Debug)]
pub(crate) struct Formula {
    pub(crate) kind: FormulaKind,
    // How many times the node has been handed out by the manager.
    pub(crate) references: u32,
    pub(crate) flattened: Option<FormulaId>,
    pub(crate) literal: Option<Literal>,
    pub(crate) emitted: Emitted,
}

impl Formula {
    #[must_use]
    pub(crate) fn new(kind: FormulaKind) -> Formula {
        Formula {
            kind,
            references: 1,
            flattened: None,
            literal: None,
            emitted: Emitted::default(),
        }
    }

    /// Forget the results of flattening and encoding.
    pub(crate) fn clear_memos(&mut self) {
        self.flattened = None;
        self.literal = None;
        self.emitted = Emitted::default();
    }
}

#[cfg(test)]
mod test {
    use super::{Emitted, Formula, FormulaId, FormulaKind, OpType};
    use crate::literal::{Literal, Polarity, VariableIdx};

    #[test]
    fn kind_accessors() {
        let (a, b) = (FormulaId(0), FormulaId(1));

        assert_eq!(FormulaKind::Atom("a".to_owned()).op_type(), OpType::Var);
        assert!(FormulaKind::Atom("a".to_owned()).operands().is_empty());
        assert_eq!(FormulaKind::Not(a).operands(), &[a]);
        assert_eq!(FormulaKind::Binary(OpType::Imp, [a, b]).operands(), &[a, b]);
        assert_eq!(FormulaKind::Binary(OpType::Imp, [a, b]).op_type(), OpType::Imp);
    }

    #[test]
    fn operand_order_matters() {
        let (a, b) = (FormulaId(0), FormulaId(1));
        assert_ne!(
            FormulaKind::Binary(OpType::Or, [a, b]),
            FormulaKind::Binary(OpType::Or, [b, a])
        );
    }

    #[test]
    fn emitted_directions() {
        let mut emitted = Emitted::default();
        assert!(!emitted.contains(Polarity::Positive));

        emitted.insert(Polarity::Negative);
        assert!(emitted.contains(Polarity::Negative));
        assert!(!emitted.contains(Polarity::Positive));
    }

    #[test]
    fn clear_memos_keeps_identity() {
        let (a, b) = (FormulaId(0), FormulaId(1));
        let mut node = Formula::new(FormulaKind::Binary(OpType::And, [a, b]));
        node.references = 3;
        node.flattened = Some(FormulaId(4));
        node.literal = Some(Literal::positive(VariableIdx(3)));
        node.emitted.insert(Polarity::Positive);

        node.clear_memos();
        assert_eq!(node.kind, FormulaKind::Binary(OpType::And, [a, b]));
        assert_eq!(node.references, 3);
        assert_eq!(node.flattened, None);
        assert_eq!(node.literal, None);
        assert!(!node.emitted.contains(Polarity::Positive));
    }
}
