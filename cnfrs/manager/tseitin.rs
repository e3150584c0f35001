//! Tseitin transformation of formulas to clause sets.
//!
//! Every distinct `&`, `|`, `=>` and `<=>` node gets one auxiliary variable `V`
//! defined by clauses over the literals of its operands. Atoms map to their
//! variables and negation only flips the sign of a literal, so neither emits
//! clauses. Definitions are cached on the nodes, which keeps the output linear
//! in the number of distinct nodes no matter how often a node is shared.
//!
//! Only the direction of the definition needed by an occurrence is emitted:
//! `V => op(L1, ..., Ln)` where the node occurs positively and
//! `op(L1, ..., Ln) => V` where it occurs negatively (under an odd number
//! of negations or in the antecedent of an implication).
use tracing::instrument;

use crate::{
    clause,
    cnf::{Clause, ClauseSet},
    error::{CnfError, Result},
    formula::{FormulaId, FormulaKind, OpType},
    literal::{Literal, Polarity},
    manager::{options::Definitions, FormulaManager},
};

#[derive(Debug, Clone, Copy)]
enum Frame {
    Enter(FormulaId, Polarity),
    Exit(FormulaId, Polarity),
}

impl FormulaManager {
    /// Encode the formula and append its defining clauses to `clauses`.
    ///
    /// The returned literal stands for the formula: the clauses together with
    /// the unit clause of the literal are satisfiable iff the formula is.
    /// Asserting the literal is left to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`CnfError::Structural`] if `=>` or `<=>` does not have exactly
    /// two operands or a compound node carries an operator it cannot have.
    #[instrument(skip(self, clauses))]
    pub fn transform(&self, root: FormulaId, clauses: &mut ClauseSet) -> Result<Literal> {
        let emitted_before = clauses.len();
        let mut stack = vec![Frame::Enter(root, Polarity::Positive)];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(id, polarity) => self.enter(id, polarity, &mut stack)?,
                Frame::Exit(id, polarity) => self.exit(id, polarity, clauses)?,
            }
        }

        let literal = self
            .literal(root)
            .ok_or_else(|| CnfError::missing_literal(root))?;

        tracing::debug!(
            %literal,
            clauses = clauses.len() - emitted_before,
            "encoded"
        );
        Ok(literal)
    }

    fn enter(&self, id: FormulaId, polarity: Polarity, stack: &mut Vec<Frame>) -> Result<()> {
        let kind = self.kind(id);
        match &kind {
            FormulaKind::Atom(label) => {
                if self.literal(id).is_none() {
                    let variable = self.variables_mut().lookup_or_assign(label);
                    self.node_mut(id, |node| node.literal = Some(Literal::positive(variable)));
                }
            }
            // Negations are not cached as the operand may still lack the
            // definition for the flipped polarity.
            FormulaKind::Not(operand) => {
                stack.push(Frame::Exit(id, polarity));
                stack.push(Frame::Enter(*operand, !polarity));
            }
            FormulaKind::Binary(op, ..) | FormulaKind::Nary(op, ..) => {
                let operands = kind.operands();
                check_arity(id, *op, operands.len())?;

                // Reversed so that the positive direction is processed first.
                for direction in self.directions(polarity).iter().rev() {
                    if self.node(id, |node| node.emitted.contains(*direction)) {
                        continue;
                    }

                    stack.push(Frame::Exit(id, *direction));
                    for (position, operand) in operands.iter().enumerate().rev() {
                        let polarities = operand_polarities(*op, position, *direction);
                        for operand_polarity in polarities.iter().rev() {
                            stack.push(Frame::Enter(*operand, *operand_polarity));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn exit(&self, id: FormulaId, polarity: Polarity, clauses: &mut ClauseSet) -> Result<()> {
        let kind = self.kind(id);
        match &kind {
            FormulaKind::Atom(..) => Ok(()),
            FormulaKind::Not(operand) => {
                let literal = self
                    .literal(*operand)
                    .ok_or_else(|| CnfError::missing_literal(*operand))?;
                self.node_mut(id, |node| node.literal = Some(!literal));
                Ok(())
            }
            FormulaKind::Binary(op, ..) | FormulaKind::Nary(op, ..) => {
                if self.node(id, |node| node.emitted.contains(polarity)) {
                    return Ok(());
                }

                let literals = kind
                    .operands()
                    .iter()
                    .map(|operand| {
                        self.literal(*operand)
                            .ok_or_else(|| CnfError::missing_literal(*operand))
                    })
                    .collect::<Result<Vec<_>>>()?;

                if literals.is_empty() {
                    return Err(CnfError::InvariantViolation(format!(
                        "{} node {id} has no operands",
                        kind.name()
                    )));
                }

                let variable = match self.literal(id) {
                    Some(variable) => variable,
                    None => {
                        let variable = Literal::positive(self.variables_mut().fresh());
                        self.node_mut(id, |node| node.literal = Some(variable));
                        tracing::trace!(id = id.0, %variable, "auxiliary variable");
                        variable
                    }
                };

                clauses.extend(definition(*op, polarity, variable, &literals));
                self.node_mut(id, |node| node.emitted.insert(polarity));
                Ok(())
            }
        }
    }

    fn directions(&self, polarity: Polarity) -> &'static [Polarity] {
        match (self.options().definitions, polarity) {
            (Definitions::Full, _) => &[Polarity::Positive, Polarity::Negative],
            (Definitions::Polarity, Polarity::Positive) => &[Polarity::Positive],
            (Definitions::Polarity, Polarity::Negative) => &[Polarity::Negative],
        }
    }
}

fn check_arity(id: FormulaId, op: OpType, operands: usize) -> Result<()> {
    match op {
        OpType::And | OpType::Or if operands >= 2 => Ok(()),
        OpType::Imp | OpType::Iff if operands == 2 => Ok(()),
        OpType::And | OpType::Or | OpType::Imp | OpType::Iff => Err(CnfError::structural(
            id.to_string(),
            format!("{op} applied to {operands} operands"),
        )),
        OpType::Var | OpType::Not => Err(CnfError::structural(
            id.to_string(),
            format!("{op} cannot be a compound operator"),
        )),
    }
}

/// Polarities under which the operand at `position` occurs when its parent
/// with operator `op` occurs under `polarity`.
fn operand_polarities(op: OpType, position: usize, polarity: Polarity) -> &'static [Polarity] {
    const POSITIVE: &[Polarity] = &[Polarity::Positive];
    const NEGATIVE: &[Polarity] = &[Polarity::Negative];
    const BOTH: &[Polarity] = &[Polarity::Positive, Polarity::Negative];

    let polarity = match (op, position) {
        (OpType::Iff, _) => return BOTH,
        (OpType::Imp, 0) => !polarity,
        _ => polarity,
    };

    match polarity {
        Polarity::Positive => POSITIVE,
        Polarity::Negative => NEGATIVE,
    }
}

/// Clauses defining `variable` in the given direction. Operand counts
/// have been checked by [`check_arity`].
fn definition(op: OpType, polarity: Polarity, variable: Literal, literals: &[Literal]) -> Vec<Clause> {
    let v = variable;
    match (op, polarity, literals) {
        (OpType::And, Polarity::Positive, _) => literals.iter().map(|l| clause![!v, *l]).collect(),
        (OpType::And, Polarity::Negative, _) => {
            let mut clause = vec![v];
            clause.extend(literals.iter().map(|l| !*l));
            vec![Clause::new(clause)]
        }
        (OpType::Or, Polarity::Positive, _) => {
            let mut clause = vec![!v];
            clause.extend_from_slice(literals);
            vec![Clause::new(clause)]
        }
        (OpType::Or, Polarity::Negative, _) => literals.iter().map(|l| clause![v, !*l]).collect(),
        (OpType::Imp, Polarity::Positive, [fst, snd]) => vec![clause![!v, !*fst, *snd]],
        (OpType::Imp, Polarity::Negative, [fst, snd]) => vec![clause![v, *fst], clause![v, !*snd]],
        (OpType::Iff, Polarity::Positive, [fst, snd]) => {
            vec![clause![!v, !*fst, *snd], clause![!v, *fst, !*snd]]
        }
        (OpType::Iff, Polarity::Negative, [fst, snd]) => {
            vec![clause![v, *fst, *snd], clause![v, !*fst, !*snd]]
        }
        _ => unreachable!("{op} over {} operands", literals.len()),
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::definition;
    use crate::clause;
    use crate::cnf::ClauseSet;
    use crate::error::CnfError;
    use crate::formula::OpType;
    use crate::literal::{Literal, Polarity, VariableIdx};
    use crate::manager::{options::CnfOptions, options::Definitions, FormulaManager};

    fn lit(value: i32) -> Literal {
        let variable = VariableIdx(value.unsigned_abs());
        Literal::new(variable, Polarity::from(value > 0))
    }

    fn dimacs(clauses: &ClauseSet) -> Vec<Vec<i32>> {
        clauses
            .iter()
            .map(|clause| clause.literals().iter().map(Literal::as_dimacs).collect())
            .collect()
    }

    #[test]
    fn atom() {
        let manager = FormulaManager::default();
        let mut clauses = ClauseSet::new();

        let a = manager.atom("a");
        assert_eq!(manager.transform(a, &mut clauses).unwrap(), lit(1));
        assert!(clauses.is_empty());
        assert_eq!(manager.variables().index("a"), Some(VariableIdx(1)));
    }

    #[test]
    fn negated_atom() {
        let manager = FormulaManager::default();
        let mut clauses = ClauseSet::new();

        let not_a = manager.not(manager.atom("a"));
        assert_eq!(manager.transform(not_a, &mut clauses).unwrap(), lit(-1));
        assert!(clauses.is_empty());
    }

    #[test]
    fn conjunction() {
        let manager = FormulaManager::default();
        let mut clauses = ClauseSet::new();

        let formula = manager.and(manager.atom("a"), manager.atom("b"));
        assert_eq!(manager.transform(formula, &mut clauses).unwrap(), lit(3));
        assert_eq!(dimacs(&clauses), vec![vec![-3, 1], vec![-3, 2]]);
    }

    #[test]
    fn disjunction() {
        let manager = FormulaManager::default();
        let mut clauses = ClauseSet::new();

        let formula = manager.or(manager.atom("a"), manager.atom("b"));
        assert_eq!(manager.transform(formula, &mut clauses).unwrap(), lit(3));
        assert_eq!(dimacs(&clauses), vec![vec![-3, 1, 2]]);
    }

    #[test]
    fn implication() {
        let manager = FormulaManager::default();
        let mut clauses = ClauseSet::new();

        let formula = manager.imp(manager.atom("a"), manager.atom("b"));
        assert_eq!(manager.transform(formula, &mut clauses).unwrap(), lit(3));
        assert_eq!(dimacs(&clauses), vec![vec![-3, -1, 2]]);
    }

    #[test]
    fn equivalence() {
        let manager = FormulaManager::default();
        let mut clauses = ClauseSet::new();

        let formula = manager.iff(manager.atom("a"), manager.atom("b"));
        assert_eq!(manager.transform(formula, &mut clauses).unwrap(), lit(3));
        assert_eq!(dimacs(&clauses), vec![vec![-3, -1, 2], vec![-3, 1, -2]]);
    }

    #[test]
    fn negated_conjunction_gets_converse_definition() {
        let manager = FormulaManager::default();
        let mut clauses = ClauseSet::new();

        let formula = manager.not(manager.and(manager.atom("a"), manager.atom("b")));
        assert_eq!(manager.transform(formula, &mut clauses).unwrap(), lit(-3));
        assert_eq!(dimacs(&clauses), vec![vec![3, -1, -2]]);
    }

    #[test]
    fn shared_node_under_both_polarities() {
        let manager = FormulaManager::default();
        let mut clauses = ClauseSet::new();

        // (a | b) & !(a | b)
        let a_or_b = manager.or(manager.atom("a"), manager.atom("b"));
        let formula = manager.and(a_or_b, manager.not(a_or_b));

        assert_eq!(manager.transform(formula, &mut clauses).unwrap(), lit(4));
        assert_eq!(
            dimacs(&clauses),
            vec![vec![-3, 1, 2], vec![3, -1], vec![3, -2], vec![-4, 3], vec![-4, -3]]
        );
    }

    #[test]
    fn full_definitions() {
        let manager = FormulaManager::new(
            CnfOptions::builder()
                .definitions(Definitions::Full)
                .build(),
        );
        let mut clauses = ClauseSet::new();

        let formula = manager.and(manager.atom("a"), manager.atom("b"));
        assert_eq!(manager.transform(formula, &mut clauses).unwrap(), lit(3));
        assert_eq!(
            dimacs(&clauses),
            vec![vec![-3, 1], vec![-3, 2], vec![3, -1, -2]]
        );
    }

    #[test]
    fn repeated_transform_reuses_literals() {
        let manager = FormulaManager::default();
        let mut clauses = ClauseSet::new();

        let formula = manager.and(manager.atom("a"), manager.atom("b"));
        let literal = manager.transform(formula, &mut clauses).unwrap();
        assert_eq!(manager.transform(formula, &mut clauses).unwrap(), literal);
        assert_eq!(clauses.len(), 2);
        assert_eq!(manager.variables().count(), 3);
    }

    #[test]
    fn deep_formula_does_not_overflow() {
        let manager = FormulaManager::default();
        let mut clauses = ClauseSet::new();

        let mut formula = manager.atom("x0");
        for n in 1..100_000 {
            let atom = manager.atom(&format!("x{n}"));
            formula = if n % 2 == 0 {
                manager.and(formula, atom)
            } else {
                manager.not(manager.or(atom, formula))
            };
        }

        manager.transform(formula, &mut clauses).unwrap();
        assert_eq!(manager.variables().count(), 100_000 + 99_999);
    }

    #[test]
    fn malformed_nary_is_rejected() {
        let manager = FormulaManager::default();
        let a = manager.atom("a");
        // Bypass the constructors to plant an n-ary implication.
        let id = manager.nary(OpType::And, vec![a, a, a]).unwrap();
        manager.node_mut(id, |node| {
            node.kind = crate::formula::FormulaKind::Nary(OpType::Imp, vec![a, a, a]);
        });

        let mut clauses = ClauseSet::new();
        assert!(matches!(
            manager.transform(id, &mut clauses),
            Err(CnfError::Structural { .. })
        ));
    }

    #[test]
    fn definition_shapes() {
        let (v, a, b, c) = (lit(4), lit(1), lit(2), lit(3));
        assert_eq!(
            definition(OpType::And, Polarity::Positive, v, &[a, b, c]),
            vec![clause![!v, a], clause![!v, b], clause![!v, c]]
        );
        assert_eq!(
            definition(OpType::Or, Polarity::Negative, v, &[a, b, c]),
            vec![clause![v, !a], clause![v, !b], clause![v, !c]]
        );
        assert_eq!(
            definition(OpType::Imp, Polarity::Negative, v, &[a, b]),
            vec![clause![v, a], clause![v, !b]]
        );
    }
}
