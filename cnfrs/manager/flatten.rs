//! Collapsing chains of associative operators into n-ary nodes.
//!
//! `(a & b) & c` becomes `(a & b & c)`, which the encoder then defines with a
//! single auxiliary variable instead of two. A nested node is inlined into its
//! parent only if it has the same operator and no other parent in the formula;
//! shared subformulas stay separate nodes so that they are still encoded once.
use rustc_hash::FxHashMap;
use tracing::instrument;

use crate::{
    error::{CnfError, Result},
    formula::{FormulaId, FormulaKind, OpType},
    manager::FormulaManager,
};

#[derive(Debug, Clone)]
enum Frame {
    Enter(FormulaId),
    // Node together with the operands it is rebuilt from.
    Exit(FormulaId, Vec<FormulaId>),
}

impl FormulaManager {
    /// Flatten the formula rooted at `root` and return the flattened root.
    ///
    /// Interned nodes are never modified; flattened nodes are built through the
    /// manager, so a node whose operands did not change flattens to itself.
    /// Results of an earlier call are discarded since whether a node may be
    /// inlined depends on the sharing below `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if a malformed node is encountered.
    #[instrument(skip(self))]
    pub fn flatten(&self, root: FormulaId) -> Result<FormulaId> {
        self.for_each_node_mut(|node| node.flattened = None);

        let owners = self.owners(root);
        let mut stack = vec![Frame::Enter(root)];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(id) => self.visit(id, &owners, &mut stack),
                Frame::Exit(id, operands) => self.rebuild(id, &operands)?,
            }
        }

        let flattened = self.flattened(root)?;
        tracing::debug!(
            root = root.0,
            flattened = flattened.0,
            nodes = self.len(),
            "flattened"
        );
        Ok(flattened)
    }

    /// Count parents of every node reachable from `root`, once per operand
    /// position. The root is owned by the caller.
    fn owners(&self, root: FormulaId) -> FxHashMap<FormulaId, usize> {
        let mut owners = FxHashMap::default();
        owners.insert(root, 1);

        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            for operand in self.operands(id) {
                let count = owners.entry(operand).or_insert(0);
                *count += 1;
                if *count == 1 {
                    stack.push(operand);
                }
            }
        }

        owners
    }

    fn flattened(&self, id: FormulaId) -> Result<FormulaId> {
        self.node(id, |node| node.flattened)
            .ok_or_else(|| CnfError::InvariantViolation(format!("{id} has not been flattened yet")))
    }

    fn visit(&self, id: FormulaId, owners: &FxHashMap<FormulaId, usize>, stack: &mut Vec<Frame>) {
        if self.node(id, |node| node.flattened.is_some()) {
            return;
        }

        let operands = match self.kind(id) {
            FormulaKind::Atom(..) | FormulaKind::Nary(..) => {
                self.node_mut(id, |node| node.flattened = Some(id));
                return;
            }
            // Negation starts a new chain.
            FormulaKind::Not(operand) => vec![operand],
            FormulaKind::Binary(op, [fst, snd]) => self.chain(op, fst, snd, owners),
        };

        let enter: Vec<Frame> = operands.iter().rev().map(|operand| Frame::Enter(*operand)).collect();
        stack.push(Frame::Exit(id, operands));
        stack.extend(enter);
    }

    /// Operands of a node with operator `op` and operands `fst` and `snd`
    /// once every nested node that can be inlined is.
    fn chain(
        &self,
        op: OpType,
        fst: FormulaId,
        snd: FormulaId,
        owners: &FxHashMap<FormulaId, usize>,
    ) -> Vec<FormulaId> {
        let mut operands = Vec::new();
        let mut pending = vec![snd, fst];

        while let Some(id) = pending.pop() {
            if let FormulaKind::Binary(child_op, [child_fst, child_snd]) = self.kind(id) {
                if child_op == op && op.is_associative() && owners.get(&id) == Some(&1) {
                    tracing::trace!(id = id.0, "inlining into parent");
                    pending.push(child_snd);
                    pending.push(child_fst);
                    continue;
                }
            }
            operands.push(id);
        }

        operands
    }

    fn rebuild(&self, id: FormulaId, operands: &[FormulaId]) -> Result<()> {
        if self.node(id, |node| node.flattened.is_some()) {
            return Ok(());
        }

        let operands = operands
            .iter()
            .map(|operand| self.flattened(*operand))
            .collect::<Result<Vec<_>>>()?;

        let flattened = match self.kind(id) {
            FormulaKind::Atom(..) | FormulaKind::Nary(..) => id,
            FormulaKind::Not(operand) => match operands[..] {
                [new] if new == operand => id,
                [new] => self.not(new),
                _ => return Err(rebuild_error(id, operands.len())),
            },
            FormulaKind::Binary(op, [fst, snd]) => {
                if operands.len() > 2 {
                    self.nary(op, operands)?
                } else if let [new_fst, new_snd] = operands[..] {
                    if new_fst == fst && new_snd == snd {
                        id
                    } else {
                        self.binary(op, new_fst, new_snd)?
                    }
                } else {
                    return Err(rebuild_error(id, operands.len()));
                }
            }
        };

        self.node_mut(id, |node| node.flattened = Some(flattened));
        self.node_mut(flattened, |node| {
            node.flattened.get_or_insert(flattened);
        });

        Ok(())
    }
}

fn rebuild_error(id: FormulaId, operands: usize) -> CnfError {
    CnfError::InvariantViolation(format!("flattening {id} produced {operands} operands"))
}
