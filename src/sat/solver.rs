//! The public solving surface: the `Solver` trait, the `Solutions` model
//! view handed to callers on SAT, and the human-readable `Model` listing.

use crate::sat::assignment::{Assignment, VarState, VecAssignment};
use crate::sat::cnf::Cnf;
use crate::sat::errors::SolverError;
use crate::sat::literal::{Literal, PackedLiteral, Variable};
use itertools::Itertools;
use rustc_hash::FxHashSet;
use std::fmt::Display;
use std::num::NonZeroI32;

/// A satisfying assignment, stored as the set of DIMACS literals that are
/// true under it. Don't-care variables (unassigned in a satisfying partial
/// assignment) appear with neither polarity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Solutions(FxHashSet<i32>);

impl Solutions {
    /// Builds a model from a slice of satisfied DIMACS literals.
    #[must_use]
    pub fn new(literals: &[i32]) -> Self {
        Self(literals.iter().copied().filter(|&l| l != 0).collect())
    }

    pub fn add(&mut self, literal: NonZeroI32) {
        self.0.insert(literal.get());
    }

    /// True iff `literal` is satisfied by this model.
    #[must_use]
    pub fn check(&self, literal: NonZeroI32) -> bool {
        self.0.contains(&literal.get())
    }

    /// The truth value the model gives to `var`, if any.
    #[must_use]
    pub fn var_value(&self, var: Variable) -> Option<bool> {
        #[allow(clippy::cast_possible_wrap)]
        let code = var as i32;
        if self.0.contains(&code) {
            Some(true)
        } else if self.0.contains(&-code) {
            Some(false)
        } else {
            None
        }
    }

    /// The satisfied literals in ascending variable order.
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.iter().copied().sorted_by_key(|l| l.unsigned_abs())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The full assignment listing: one `Variable <v> Value <0|1|-1>` line per
/// variable, in ascending order. `-1` marks an unassigned (don't-care)
/// variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model(Vec<VarState>);

impl Model {
    /// Snapshots the current assignment into a printable model.
    #[must_use]
    pub fn new<A: Assignment>(assignment: &A) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let num_vars = assignment.num_vars() as Variable;
        Self((1..=num_vars).map(|v| assignment.state(v)).collect())
    }

    /// The printed value of a variable: 1 true, 0 false, -1 unassigned.
    #[must_use]
    pub fn value(&self, var: Variable) -> i32 {
        match self.0[var as usize - 1] {
            VarState::Assigned(true) => 1,
            VarState::Assigned(false) => 0,
            VarState::Unassigned => -1,
        }
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.0.len()
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        #[allow(clippy::cast_possible_truncation)]
        for var in 1..=self.0.len() as Variable {
            writeln!(f, "Variable {} Value {}", var, self.value(var))?;
        }
        Ok(())
    }
}

/// Counters collected while solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolutionStats {
    /// Number of `decide` calls made by the driver (both polarities count).
    pub decisions: usize,
    /// Number of conflicts hit during propagation.
    pub conflicts: usize,
    /// Number of variable assignments made by unit propagation.
    pub propagations: usize,
    /// Deepest decision level reached.
    pub max_depth: usize,
}

/// A complete SAT decision procedure over a fixed CNF.
pub trait Solver<L: Literal = PackedLiteral, A: Assignment = VecAssignment>: Sized {
    /// Builds the solver around `cnf`. The clause database is frozen from
    /// here on.
    fn new(cnf: Cnf<L>) -> Self;

    /// Decides satisfiability. `Ok(Some(model))` on SAT, `Ok(None)` on
    /// UNSAT.
    ///
    /// # Errors
    ///
    /// Propagates `SolverError` from the branching heuristic; with the
    /// driver protocol of this crate that path is unreachable.
    fn solve(&mut self) -> Result<Option<Solutions>, SolverError>;

    /// The current model. Meaningful after `solve` returned `Ok(Some(_))`.
    fn solutions(&self) -> Solutions;

    /// Search counters.
    fn stats(&self) -> SolutionStats;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::assignment::VecAssignment;

    #[test]
    fn test_solutions_check() {
        let s = Solutions::new(&[1, -2, 4]);
        assert!(s.check(NonZeroI32::new(1).unwrap()));
        assert!(s.check(NonZeroI32::new(-2).unwrap()));
        assert!(!s.check(NonZeroI32::new(2).unwrap()));
        assert!(!s.check(NonZeroI32::new(3).unwrap()));

        assert_eq!(s.var_value(1), Some(true));
        assert_eq!(s.var_value(2), Some(false));
        assert_eq!(s.var_value(3), None);
    }

    #[test]
    fn test_solutions_iter_sorted() {
        let s = Solutions::new(&[4, -2, 1]);
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![1, -2, 4]);
    }

    #[test]
    fn test_model_listing() {
        let mut a = VecAssignment::new(3);
        a.set(1, true);
        a.set(3, false);
        let model = Model::new(&a);

        assert_eq!(model.value(1), 1);
        assert_eq!(model.value(2), -1);
        assert_eq!(model.value(3), 0);
        assert_eq!(
            model.to_string(),
            "Variable 1 Value 1\nVariable 2 Value -1\nVariable 3 Value 0\n"
        );
    }
}
