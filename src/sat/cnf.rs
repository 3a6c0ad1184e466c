#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! The immutable clause database.
//!
//! A `Cnf` maps clause ids `[0, C)` to literal sequences. It is built once
//! (by the DIMACS loader or the Sudoku encoder) and never mutated; the
//! search works entirely on indices into it. Empty clauses and tautologies
//! are kept: the formula store turns an empty clause into an immediate
//! conflict, and a tautology simply leaves the active set the first time
//! one of its sides becomes true.

use crate::sat::clause::Clause;
use crate::sat::literal::{Literal, PackedLiteral};
use crate::sat::solver::Solutions;
use std::fmt::Display;
use std::num::NonZeroI32;
use std::ops::Index;

/// A formula in conjunctive normal form: the read-only clause table plus
/// the declared variable count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf<L: Literal = PackedLiteral> {
    clauses: Vec<Clause<L>>,
    /// The declared number of variables `V`; valid ids are `1..=V`.
    num_vars: usize,
}

impl<L: Literal> Cnf<L> {
    /// Builds a database from DIMACS clauses, inferring `V` from the
    /// largest variable mentioned.
    #[must_use]
    pub fn new(clauses: Vec<Vec<i32>>) -> Self {
        let num_vars = clauses
            .iter()
            .flatten()
            .map(|l| l.unsigned_abs() as usize)
            .max()
            .unwrap_or(0);
        Self::with_num_vars(clauses, num_vars)
    }

    /// Builds a database with an explicit declared variable count, as the
    /// loader does from the `p cnf` header. `num_vars` may exceed the
    /// largest variable actually mentioned.
    #[must_use]
    pub fn with_num_vars(clauses: Vec<Vec<i32>>, num_vars: usize) -> Self {
        Self {
            clauses: clauses.iter().map(|c| Clause::from_dimacs(c)).collect(),
            num_vars,
        }
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// The number of clauses `C`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Clause<L>> {
        self.clauses.iter()
    }

    /// True iff `solutions` satisfies every clause in the database.
    ///
    /// This re-checks the model against the original input, independent of
    /// anything the search did; the driver tests and the CLI `--verify`
    /// flag rest on it.
    #[must_use]
    pub fn verify(&self, solutions: &Solutions) -> bool {
        self.iter().all(|clause| {
            clause
                .iter()
                .any(|&lit| NonZeroI32::new(lit.to_dimacs()).is_some_and(|l| solutions.check(l)))
        })
    }
}

impl<L: Literal> Index<usize> for Cnf<L> {
    type Output = Clause<L>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.clauses[index]
    }
}

impl<L: Literal> From<Vec<Vec<i32>>> for Cnf<L> {
    fn from(clauses: Vec<Vec<i32>>) -> Self {
        Self::new(clauses)
    }
}

impl<L: Literal> Display for Cnf<L> {
    /// DIMACS text form: the `p cnf` header followed by one clause per
    /// line. This is the exporter side of the loader: `parse_dimacs_text`
    /// of the output reproduces the database.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_vars, self.clauses.len())?;
        for clause in &self.clauses {
            writeln!(f, "{clause}")?;
        }
        Ok(())
    }
}
