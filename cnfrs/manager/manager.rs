use std::{
    cell::{Cell, Ref, RefCell, RefMut},
    fmt::{self, Display},
};

use rustc_hash::FxHashMap;
use tracing::instrument;

use crate::{
    cnf::{Clause, ClauseSet, Cnf, Model},
    error::{CnfError, Result},
    formula::{Formula, FormulaId, FormulaKind, OpType},
    literal::{Literal, VariableManager},
    manager::{options::CnfOptions, Statistics},
};

/// Context of a single compilation run.
///
/// The manager owns every formula node in an arena and hands out [`FormulaId`]s.
/// Nodes are hash-consed: constructing a node structurally identical to an
/// existing one (same operator, same operand handles in the same order) returns
/// the existing handle. The manager also owns the [`VariableManager`] shared by
/// atoms and Tseitin auxiliaries, and the per-node caches of flattening and
/// encoding. Everything lives until [`FormulaManager::reset`].
#[allow(clippy::module_name_repetitions)]
#[derive(Debug)]
pub struct FormulaManager {
    options: CnfOptions,

    nodes: RefCell<Vec<Formula>>,

    // Unique table from structural hash to the nodes sharing that hash.
    unique_table: RefCell<FxHashMap<u64, Vec<FormulaId>>>,

    variables: RefCell<VariableManager>,
    interning_hits: Cell<usize>,
}

impl FormulaManager {
    #[must_use]
    pub fn new(options: CnfOptions) -> FormulaManager {
        let manager = FormulaManager {
            options,
            nodes: RefCell::new(Vec::new()),
            unique_table: RefCell::new(FxHashMap::default()),
            variables: RefCell::new(VariableManager::new()),
            interning_hits: Cell::new(0),
        };

        manager.register_variables();
        manager
    }

    #[must_use]
    pub fn options(&self) -> &CnfOptions {
        &self.options
    }

    /// Drop all nodes, cached results, and variables. Handles obtained before
    /// the reset must not be used afterwards.
    pub fn reset(&self) {
        self.nodes.borrow_mut().clear();
        self.unique_table.borrow_mut().clear();
        *self.variables.borrow_mut() = VariableManager::new();
        self.interning_hits.set(0);
        self.register_variables();

        tracing::debug!("manager reset");
    }

    fn register_variables(&self) {
        let mut variables = self.variables.borrow_mut();
        for label in &self.options.variables {
            variables.lookup_or_assign(label);
        }
    }

    pub fn atom(&self, label: &str) -> FormulaId {
        self.intern(FormulaKind::Atom(label.to_owned()))
    }

    pub fn not(&self, operand: FormulaId) -> FormulaId {
        self.intern(FormulaKind::Not(operand))
    }

    pub fn and(&self, fst: FormulaId, snd: FormulaId) -> FormulaId {
        self.intern(FormulaKind::Binary(OpType::And, [fst, snd]))
    }

    pub fn or(&self, fst: FormulaId, snd: FormulaId) -> FormulaId {
        self.intern(FormulaKind::Binary(OpType::Or, [fst, snd]))
    }

    pub fn imp(&self, fst: FormulaId, snd: FormulaId) -> FormulaId {
        self.intern(FormulaKind::Binary(OpType::Imp, [fst, snd]))
    }

    pub fn iff(&self, fst: FormulaId, snd: FormulaId) -> FormulaId {
        self.intern(FormulaKind::Binary(OpType::Iff, [fst, snd]))
    }

    pub(crate) fn binary(&self, op: OpType, fst: FormulaId, snd: FormulaId) -> Result<FormulaId> {
        match op {
            OpType::And | OpType::Or | OpType::Imp | OpType::Iff => {
                Ok(self.intern(FormulaKind::Binary(op, [fst, snd])))
            }
            OpType::Var | OpType::Not => Err(CnfError::structural(
                format!("{op} over {fst}, {snd}"),
                "binary node must be one of &, |, =>, <=>",
            )),
        }
    }

    /// # Errors
    ///
    /// Returns [`CnfError::Structural`] if `op` is not `&` or `|`, or if
    /// there are fewer than 3 operands.
    pub(crate) fn nary(&self, op: OpType, operands: Vec<FormulaId>) -> Result<FormulaId> {
        if !op.is_associative() {
            return Err(CnfError::structural(
                format!("{op} over {} operands", operands.len()),
                "n-ary node must be a conjunction or a disjunction",
            ));
        }

        if operands.len() <= 2 {
            return Err(CnfError::structural(
                format!("{op} over {} operands", operands.len()),
                format!(
                    "n-ary node needs at least 3 operands, got {}",
                    operands.len()
                ),
            ));
        }

        Ok(self.intern(FormulaKind::Nary(op, operands)))
    }

    fn intern(&self, kind: FormulaKind) -> FormulaId {
        let hash = fxhash::hash64(&kind);
        let mut nodes = self.nodes.borrow_mut();
        let mut unique_table = self.unique_table.borrow_mut();
        let bucket = unique_table.entry(hash).or_default();

        if let Some(id) = bucket
            .iter()
            .copied()
            .find(|id| nodes[id.index()].kind == kind)
        {
            nodes[id.index()].references += 1;
            self.interning_hits.set(self.interning_hits.get() + 1);
            tracing::trace!(id = id.0, kind = kind.name(), "unique table hit");
            return id;
        }

        for operand in kind.operands() {
            assert!(
                operand.index() < nodes.len(),
                "operand {operand} does not belong to this manager"
            );
        }

        let id = FormulaId::from(nodes.len());
        tracing::trace!(id = id.0, kind = kind.name(), "new node");
        bucket.push(id);
        nodes.push(Formula::new(kind));
        id
    }

    /// # Panics
    ///
    /// Panics if the handle does not belong to this manager.
    #[must_use]
    pub fn kind(&self, id: FormulaId) -> FormulaKind {
        self.nodes.borrow()[id.index()].kind.clone()
    }

    #[must_use]
    pub fn op_type(&self, id: FormulaId) -> OpType {
        self.nodes.borrow()[id.index()].kind.op_type()
    }

    #[must_use]
    pub fn operands(&self, id: FormulaId) -> Vec<FormulaId> {
        self.nodes.borrow()[id.index()].kind.operands().to_vec()
    }

    /// How many times the node has been handed out by the constructors:
    /// 1 when created, plus 1 for every construction that found it interned.
    #[must_use]
    pub fn references(&self, id: FormulaId) -> u32 {
        self.nodes.borrow()[id.index()].references
    }

    /// Literal assigned to the node by [`FormulaManager::transform`] in this run.
    #[must_use]
    pub fn literal(&self, id: FormulaId) -> Option<Literal> {
        self.nodes.borrow()[id.index()].literal
    }

    /// Number of distinct nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    pub(crate) fn node<R>(&self, id: FormulaId, f: impl FnOnce(&Formula) -> R) -> R {
        f(&self.nodes.borrow()[id.index()])
    }

    pub(crate) fn node_mut<R>(&self, id: FormulaId, f: impl FnOnce(&mut Formula) -> R) -> R {
        f(&mut self.nodes.borrow_mut()[id.index()])
    }

    pub(crate) fn for_each_node_mut(&self, f: impl FnMut(&mut Formula)) {
        self.nodes.borrow_mut().iter_mut().for_each(f);
    }

    pub fn variables(&self) -> Ref<'_, VariableManager> {
        self.variables.borrow()
    }

    pub(crate) fn variables_mut(&self) -> RefMut<'_, VariableManager> {
        self.variables.borrow_mut()
    }

    /// Write `<name>: <index>` for every named variable.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `writer` fails.
    pub fn write_symbol_table(&self, writer: &mut dyn std::io::Write) -> std::io::Result<()> {
        self.variables.borrow().write_symbol_table(writer)
    }

    #[must_use]
    pub fn statistics(&self) -> Statistics {
        let variables = self.variables.borrow();
        Statistics {
            nodes: self.len(),
            interning_hits: self.interning_hits.get(),
            named_variables: variables.named(),
            auxiliary_variables: variables.count() - variables.named(),
        }
    }

    /// Compile the formula to a CNF problem: flatten it (if enabled in the options),
    /// encode it, and assert the root literal by a unit clause.
    ///
    /// Every call starts a new encoding run over the same nodes: literals and
    /// definitions of earlier calls belong to the clauses of another [`Cnf`], so
    /// they are forgotten and compound nodes get fresh auxiliary variables.
    /// Atoms keep their indices.
    ///
    /// # Errors
    ///
    /// Returns an error if the formula contains a malformed node.
    #[instrument(skip(self))]
    pub fn to_cnf(&self, root: FormulaId) -> Result<Cnf> {
        self.for_each_node_mut(Formula::clear_memos);

        let root = if self.options.flatten {
            self.flatten(root)?
        } else {
            root
        };

        let mut clauses = ClauseSet::new();
        let literal = self.transform(root, &mut clauses)?;
        clauses.push(Clause::unit(literal));

        let variables = self.variables.borrow().count();
        tracing::debug!(variables, clauses = clauses.len(), "compiled");
        Ok(Cnf::new(variables, clauses))
    }

    /// Evaluate the formula under the standard two-valued semantics.
    /// Returns `None` if `assignment` does not assign some atom of the formula.
    pub fn evaluate(&self, id: FormulaId, assignment: impl Fn(&str) -> Option<bool>) -> Option<bool> {
        self.evaluate_with(id, &assignment, &mut FxHashMap::default())
    }

    /// Evaluate the formula under the named variables of a CNF model.
    #[must_use]
    pub fn evaluate_model(&self, id: FormulaId, model: &Model) -> Option<bool> {
        let variables = self.variables.borrow();
        self.evaluate(id, |label| {
            variables.index(label).and_then(|idx| model.value(idx))
        })
    }

    fn evaluate_with(
        &self,
        id: FormulaId,
        assignment: &impl Fn(&str) -> Option<bool>,
        cache: &mut FxHashMap<FormulaId, bool>,
    ) -> Option<bool> {
        if let Some(value) = cache.get(&id) {
            return Some(*value);
        }

        let kind = self.kind(id);
        let value = match &kind {
            FormulaKind::Atom(label) => assignment(label)?,
            FormulaKind::Not(operand) => !self.evaluate_with(*operand, assignment, cache)?,
            FormulaKind::Binary(..) | FormulaKind::Nary(..) => {
                let values = kind
                    .operands()
                    .iter()
                    .map(|operand| self.evaluate_with(*operand, assignment, cache))
                    .collect::<Option<Vec<bool>>>()?;

                match (kind.op_type(), values.as_slice()) {
                    (OpType::And, _) => values.iter().all(|value| *value),
                    (OpType::Or, _) => values.iter().any(|value| *value),
                    (OpType::Imp, [fst, snd]) => !fst || *snd,
                    (OpType::Iff, [fst, snd]) => fst == snd,
                    (op, _) => unreachable!("{op} node with {} operands", values.len()),
                }
            }
        };

        cache.insert(id, value);
        Some(value)
    }

    /// Render the formula fully parenthesised, e.g. `((! a) & (b | c))`.
    #[must_use]
    pub fn display(&self, id: FormulaId) -> FormulaDisplay<'_> {
        FormulaDisplay { manager: self, id }
    }

    fn fmt_formula(&self, id: FormulaId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![Piece::Formula(id)];

        while let Some(piece) = stack.pop() {
            let id = match piece {
                Piece::Formula(id) => id,
                Piece::Separator(op) => {
                    write!(f, " {op} ")?;
                    continue;
                }
                Piece::Close => {
                    write!(f, ")")?;
                    continue;
                }
            };

            let kind = self.kind(id);
            match &kind {
                FormulaKind::Atom(label) => write!(f, "{label}")?,
                FormulaKind::Not(operand) => {
                    write!(f, "({} ", OpType::Not)?;
                    stack.push(Piece::Close);
                    stack.push(Piece::Formula(*operand));
                }
                FormulaKind::Binary(op, ..) | FormulaKind::Nary(op, ..) => {
                    write!(f, "(")?;
                    stack.push(Piece::Close);
                    for (position, operand) in kind.operands().iter().enumerate().rev() {
                        stack.push(Piece::Formula(*operand));
                        if position > 0 {
                            stack.push(Piece::Separator(*op));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

enum Piece {
    Formula(FormulaId),
    Separator(OpType),
    Close,
}

impl Default for FormulaManager {
    fn default() -> Self {
        FormulaManager::new(CnfOptions::default())
    }
}

/// Displayable view of a formula, see [`FormulaManager::display`].
pub struct FormulaDisplay<'a> {
    manager: &'a FormulaManager,
    id: FormulaId,
}

impl Display for FormulaDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.manager.fmt_formula(self.id, f)
    }
}
