//! DIMACS module responsible for writing CNF problem files.
use crate::cnf::{ClauseSet, Model};

/// CNF problem instance: the clause set together with the number
/// of variables its literals range over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cnf {
    variables: usize,
    clauses: ClauseSet,
}

impl Cnf {
    #[must_use]
    pub fn new(variables: usize, clauses: ClauseSet) -> Cnf {
        Cnf { variables, clauses }
    }

    #[must_use]
    pub fn variables(&self) -> usize {
        self.variables
    }

    #[must_use]
    pub fn clauses(&self) -> &ClauseSet {
        &self.clauses
    }

    #[must_use]
    pub fn is_satisfied_by(&self, model: &Model) -> bool {
        self.clauses.is_satisfied_by(model)
    }

    /// Write the problem in DIMACS format: the problem line
    /// `p cnf VARIABLES CLAUSES` followed by one clause per line, each
    /// terminated by `0`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `writer` fails.
    pub fn write_dimacs(&self, writer: &mut dyn std::io::Write) -> std::io::Result<()> {
        writeln!(writer, "p cnf {} {}", self.variables, self.clauses.len())?;

        for clause in &self.clauses {
            for literal in clause.literals() {
                write!(writer, "{literal} ")?;
            }
            writeln!(writer, "0")?;
        }

        Ok(())
    }

    /// Render the problem to a DIMACS string.
    #[must_use]
    pub fn to_dimacs(&self) -> String {
        let mut buffer = Vec::new();
        self.write_dimacs(&mut buffer)
            .expect("writing to a vector cannot fail");
        String::from_utf8(buffer).expect("DIMACS output is ASCII")
    }
}
