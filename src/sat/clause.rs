#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! A clause: a disjunction of literals, identified in the database by a
//! small integer id.
//!
//! Clauses are immutable once loaded. Literal order is fixed at load time
//! so that the left-to-right scanning order of propagation is stable.
//! Duplicate literals are kept, and complementary literals within a clause
//! are loaded as-is (the clause is then a tautology and falls out of the
//! active set as soon as one side becomes true).

use crate::sat::literal::{Literal, PackedLiteral};
use smallvec::SmallVec;
use std::fmt::Display;
use std::ops::Index;

/// Inline capacity for clause storage. Sudoku clauses are at most 9
/// literals, and the overwhelming majority are binary, so 8 inline slots
/// keep nearly every clause off the heap.
type Literals<L> = SmallVec<[L; 8]>;

/// A disjunction of literals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Clause<L: Literal = PackedLiteral> {
    literals: Literals<L>,
}

impl<L: Literal> Clause<L> {
    /// Builds a clause from DIMACS literals, preserving their order.
    ///
    /// The slice must not contain the terminating 0; the loader strips it.
    #[must_use]
    pub fn from_dimacs(codes: &[i32]) -> Self {
        codes.iter().map(|&c| L::from_dimacs(c)).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// A clause with exactly one literal. Unit clauses seed the pending
    /// set at load time.
    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.literals.len() == 1
    }

    /// True iff the clause contains some literal and its negation.
    #[must_use]
    pub fn is_tautology(&self) -> bool {
        self.literals
            .iter()
            .enumerate()
            .any(|(i, &l)| self.literals[i + 1..].contains(&l.negated()))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, L> {
        self.literals.iter()
    }
}

impl<L: Literal> Index<usize> for Clause<L> {
    type Output = L;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl<L: Literal> AsRef<[L]> for Clause<L> {
    fn as_ref(&self) -> &[L] {
        &self.literals
    }
}

impl<L: Literal> FromIterator<L> for Clause<L> {
    fn from_iter<I: IntoIterator<Item = L>>(iter: I) -> Self {
        Self {
            literals: iter.into_iter().collect(),
        }
    }
}

impl<'a, L: Literal> IntoIterator for &'a Clause<L> {
    type Item = &'a L;
    type IntoIter = std::slice::Iter<'a, L>;

    fn into_iter(self) -> Self::IntoIter {
        self.literals.iter()
    }
}

impl<L: Literal> From<Vec<i32>> for Clause<L> {
    fn from(codes: Vec<i32>) -> Self {
        Self::from_dimacs(&codes)
    }
}

impl<L: Literal> Display for Clause<L> {
    /// DIMACS form, terminator included: `1 -2 3 0`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for lit in &self.literals {
            write!(f, "{} ", lit.to_dimacs())?;
        }
        write!(f, "0")
    }
}
