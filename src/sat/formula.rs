#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! The formula store: the mutable search state wrapped around the
//! immutable clause database.
//!
//! Alongside the database a `Formula` tracks:
//! - the assignment vector,
//! - the active-clause set: ids of clauses not yet satisfied by the
//!   current partial assignment,
//! - the pending-unit set: literals forced but not yet propagated, kept in
//!   a `BTreeSet` over their signed DIMACS codes so propagation always
//!   consumes the smallest literal first and the search is reproducible,
//! - the snapshot stack driving `undo` (one snapshot per decision),
//! - the conflict flag.
//!
//! The invariants the engine maintains between decisions:
//! 1. Every active clause has at least one literal that is unassigned.
//! 2. A clause with a true literal is never active.
//! 3. Popping one snapshot restores the assignment and the active set to
//!    their exact pre-decision states.
//! 4. The pending set is empty whenever the driver observes the formula.
//! 5. The conflict flag is set iff propagation found a falsified clause or
//!    a contradiction in the pending set.

use crate::sat::assignment::{Assignment, VecAssignment};
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::errors::SolverError;
use crate::sat::literal::{Literal, PackedLiteral};
use crate::sat::propagation::Snapshot;
use crate::sat::solver::{Model, Solutions};
use std::collections::BTreeSet;

/// The search state over a fixed clause database.
#[derive(Debug, Clone)]
pub struct Formula<L: Literal = PackedLiteral, A: Assignment = VecAssignment> {
    pub(crate) cnf: Cnf<L>,
    pub(crate) assignment: A,
    pub(crate) active: Vec<usize>,
    pub(crate) pending: BTreeSet<i32>,
    pub(crate) snapshots: Vec<Snapshot>,
    pub(crate) conflict: bool,
    pub(crate) propagated: usize,
}

impl<L: Literal, A: Assignment> Formula<L, A> {
    /// Wraps a clause database in fresh search state: every variable
    /// unassigned, every clause active, every input unit clause's literal
    /// pending. An empty input clause is unsatisfiable outright and sets
    /// the conflict flag before any search begins.
    #[must_use]
    pub fn new(cnf: Cnf<L>) -> Self {
        let assignment = A::new(cnf.num_vars());
        let active = (0..cnf.len()).collect();
        let pending = cnf
            .iter()
            .filter(|c| c.is_unit())
            .map(|c| c[0].to_dimacs())
            .collect();
        let conflict = cnf.iter().any(Clause::is_empty);

        Self {
            cnf,
            assignment,
            active,
            pending,
            snapshots: Vec::new(),
            conflict,
            propagated: 0,
        }
    }

    /// Parses DIMACS text and wraps it in fresh search state.
    ///
    /// # Errors
    ///
    /// `SolverError::MalformedInput` from the parser; no formula is
    /// constructed on failure.
    pub fn load(text: &str) -> Result<Self, SolverError> {
        Ok(Self::new(crate::sat::dimacs::parse_dimacs_text(text)?))
    }

    /// True iff every clause is satisfied by the current assignment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// True iff propagation found a contradiction since the last `undo`.
    #[must_use]
    pub fn has_conflict(&self) -> bool {
        self.conflict
    }

    /// Read-only view of the assignment vector.
    pub fn assignment(&self) -> &A {
        &self.assignment
    }

    /// The ids of the clauses not yet satisfied.
    #[must_use]
    pub fn active_clauses(&self) -> &[usize] {
        &self.active
    }

    /// The underlying clause database.
    pub fn cnf(&self) -> &Cnf<L> {
        &self.cnf
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.cnf.num_vars()
    }

    /// The current decision level: the number of snapshots above the base
    /// state.
    #[must_use]
    pub fn decision_level(&self) -> usize {
        self.snapshots.len()
    }

    /// Total variable assignments made by propagation so far. Monotone; it
    /// is not rolled back by `undo`.
    #[must_use]
    pub fn propagation_count(&self) -> usize {
        self.propagated
    }

    /// The current model as a set of satisfied literals.
    #[must_use]
    pub fn solutions(&self) -> Solutions {
        self.assignment.solutions()
    }

    /// The current assignment as a printable `Variable <v> Value <x>`
    /// listing.
    #[must_use]
    pub fn model(&self) -> Model {
        Model::new(&self.assignment)
    }

    /// Validates the state invariants above. Intended for tests and debug
    /// assertions; the engine never needs it on the happy path.
    ///
    /// # Errors
    ///
    /// `SolverError::InvariantViolation` naming the broken invariant.
    pub fn check_invariants(&self) -> Result<(), SolverError> {
        if self.conflict {
            // Invariant 5: a conflict must be witnessed by a falsified
            // active clause, a literal forced both ways (one side pending,
            // the other unit in an active clause), or a pending literal
            // that contradicts the assignment.
            let falsified = self.active.iter().any(|&id| {
                self.cnf[id]
                    .iter()
                    .all(|&l| self.assignment.literal_value(l) == Some(false))
            });
            let forced_both_ways = self.active.iter().any(|&id| {
                let mut unassigned = None;
                let mut open = 0;
                for &l in &self.cnf[id] {
                    match self.assignment.literal_value(l) {
                        Some(true) => return false,
                        Some(false) => {}
                        None => {
                            open += 1;
                            unassigned = Some(l);
                        }
                    }
                }
                open == 1 && unassigned.is_some_and(|l| self.pending.contains(&-l.to_dimacs()))
            });
            let pending_contradiction = self.pending.iter().any(|&code| {
                self.pending.contains(&-code)
                    || self
                        .assignment
                        .literal_value(L::from_dimacs(code))
                        .is_some_and(|v| !v)
            });
            if !falsified && !forced_both_ways && !pending_contradiction {
                return Err(SolverError::InvariantViolation(
                    "conflict flag set with no witnessing clause or pending contradiction",
                ));
            }
            return Ok(());
        }

        // The base state may still hold the unit literals seeded by the
        // loader; after any decision the set must have been drained.
        if !self.pending.is_empty() && !self.snapshots.is_empty() {
            return Err(SolverError::InvariantViolation(
                "pending-unit set non-empty outside propagation",
            ));
        }
        for &id in &self.active {
            let clause = &self.cnf[id];
            if clause
                .iter()
                .any(|&l| self.assignment.literal_value(l) == Some(true))
            {
                return Err(SolverError::InvariantViolation(
                    "satisfied clause left in the active set",
                ));
            }
            if !clause.is_empty()
                && clause
                    .iter()
                    .all(|&l| self.assignment.literal_value(l) == Some(false))
            {
                return Err(SolverError::InvariantViolation(
                    "falsified clause in the active set without a conflict",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::dimacs::parse_dimacs_text;

    type TestFormula = Formula<PackedLiteral, VecAssignment>;

    fn formula(text: &str) -> TestFormula {
        Formula::new(parse_dimacs_text(text).unwrap())
    }

    #[test]
    fn test_new_state() {
        let f = formula("p cnf 3 3\n1 2 0\n-1 3 0\n-2 -3 0\n");
        assert!(!f.is_empty());
        assert!(!f.has_conflict());
        assert_eq!(f.active_clauses(), &[0, 1, 2]);
        assert_eq!(f.decision_level(), 0);
        assert!(f.pending.is_empty());
        assert!(f.assignment().unassigned().eq(1_u32..=3));
        f.check_invariants().unwrap();
    }

    #[test]
    fn test_unit_clauses_seed_pending() {
        let f = formula("p cnf 3 3\n2 0\n-3 0\n1 2 0\n");
        assert_eq!(
            f.pending.iter().copied().collect::<Vec<_>>(),
            vec![-3, 2]
        );
    }

    #[test]
    fn test_empty_clause_is_immediate_conflict() {
        let f = formula("p cnf 1 2\n1 0\n0\n");
        assert!(f.has_conflict());
        f.check_invariants().unwrap();
    }

    #[test]
    fn test_no_clauses_is_already_satisfied() {
        let f = formula("p cnf 0 0\n");
        assert!(f.is_empty());
        assert!(!f.has_conflict());
    }

    #[test]
    fn test_load_rejects_malformed_input() {
        assert!(TestFormula::load("p cnf 1 1\n1 0\n").is_ok());
        assert!(matches!(
            TestFormula::load("p cnf 1 1\n2 0\n"),
            Err(SolverError::MalformedInput { .. })
        ));
    }
}
