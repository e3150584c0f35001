//! # Compiler of propositional formulas to conjunctive normal form.
//!
//! Build formulas over named atoms with `!`, `&`, `|`, `=>`, and `<=>`, and
//! compile them to an equisatisfiable CNF suitable for SAT solvers, written in
//! [DIMACS](https://www21.in.tum.de/~lammich/2015_SS_Seminar_SAT/resources/dimacs-cnf.pdf) format.
//!
//! The compiler:
//! * hash-conses formula nodes, so structurally identical subformulas are a single node,
//! * optionally flattens chains of `&` and `|` into n-ary nodes,
//! * encodes the formula by the Tseitin transformation with one auxiliary variable
//!   per distinct compound subformula, so the output is linear in the size of the formula DAG.
//!
//! The following snippet compiles `(a & b) | !c` and prints the DIMACS problem
//! together with the indices assigned to the atoms.
//!
//! ```rust
//! use cnfrs::manager::{options::CnfOptions, FormulaManager};
//!
//! let manager = FormulaManager::new(CnfOptions::default());
//!
//! let a = manager.atom("a");
//! let b = manager.atom("b");
//! let c = manager.atom("c");
//! let formula = manager.or(manager.and(a, b), manager.not(c));
//!
//! let cnf = manager.to_cnf(formula).unwrap();
//! print!("{}", cnf.to_dimacs());
//!
//! for (label, idx) in manager.variables().variables() {
//!     println!("{label}: {idx}");
//! }
//! ```
//!
//! Formulas can also be parsed from text:
//!
//! ```rust
//! use cnfrs::{manager::FormulaManager, parser::parse};
//!
//! let manager = FormulaManager::default();
//! let formula = parse(&manager, "a & b & c => d").unwrap();
//! assert_eq!(manager.display(formula).to_string(), "(((a & b) & c) => d)");
//!
//! let cnf = manager.to_cnf(formula).unwrap();
//! // Atoms a, b, c, d and one auxiliary variable for each of `&` and `=>`.
//! assert_eq!(cnf.variables(), 6);
//! ```
//!
//! ---
//!
//! Main methods are:
//!
//! * [`crate::manager::FormulaManager::atom`], [`crate::manager::FormulaManager::not`],
//!   [`crate::manager::FormulaManager::and`], [`crate::manager::FormulaManager::or`],
//!   [`crate::manager::FormulaManager::imp`], [`crate::manager::FormulaManager::iff`] -- build formulas
//! * [`crate::manager::FormulaManager::flatten`] -- collapse associative chains
//! * [`crate::manager::FormulaManager::transform`] -- Tseitin encoding of a formula
//! * [`crate::manager::FormulaManager::to_cnf`] -- the whole pipeline
//! * [`crate::manager::FormulaManager::reset`] -- start a new run

pub mod cnf;
pub mod error;
pub mod formula;
/// Variables, polarities, and literals.
pub mod literal;
pub mod manager;
pub mod parser;
