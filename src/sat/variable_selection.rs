#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Branch literal selection.
//!
//! The serious strategy is Jeroslow-Wang: literals are scored by
//! `sum(2^-k)` over the active clauses containing them, where `k` is the
//! clause's count of currently unassigned literals. Short clauses weigh
//! heavily, so the search gravitates towards literals that are close to
//! being forced. Scores are recomputed from scratch at every call in two
//! phases: accumulate everything, then scan once for the maximum. The
//! combined score `score(+v) + score(-v)` picks the variable; the larger
//! side picks the polarity.

use crate::sat::assignment::Assignment;
use crate::sat::errors::SolverError;
use crate::sat::formula::Formula;
use crate::sat::literal::{Literal, Variable};
use ordered_float::OrderedFloat;
use std::fmt::Debug;
use std::marker::PhantomData;

/// Chooses the next branch literal for the search driver.
pub trait VariableSelection<L: Literal>: Debug + Clone {
    fn new(num_vars: usize) -> Self;

    /// The literal to branch on next.
    ///
    /// # Errors
    ///
    /// `SolverError::NoUnassignedVariable` if every variable is assigned.
    /// The driver checks `is_empty` before branching, so it never observes
    /// this.
    fn select<A: Assignment>(&mut self, formula: &Formula<L, A>) -> Result<L, SolverError>;
}

/// `2^-k` for `k <= 10`. Sudoku clauses have at most 9 literals, so the
/// table covers the hot path; longer clauses fall back to `powi`.
const INVERSE_POWERS_OF_TWO: [f64; 11] = [
    1.0,
    0.5,
    0.25,
    0.125,
    0.062_5,
    0.031_25,
    0.015_625,
    0.007_812_5,
    0.003_906_25,
    0.001_953_125,
    0.000_976_562_5,
];

fn weight(unassigned: usize) -> f64 {
    INVERSE_POWERS_OF_TWO
        .get(unassigned)
        .copied()
        .unwrap_or_else(|| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let exponent = unassigned as i32;
            2.0_f64.powi(-exponent)
        })
}

/// The Jeroslow-Wang heuristic. Holds the per-polarity score tables as
/// scratch space; their contents are transient per call.
#[derive(Debug, Clone, Default)]
pub struct JeroslowWang {
    positive: Vec<f64>,
    negative: Vec<f64>,
}

impl<L: Literal> VariableSelection<L> for JeroslowWang {
    fn new(num_vars: usize) -> Self {
        Self {
            positive: vec![0.0; num_vars + 1],
            negative: vec![0.0; num_vars + 1],
        }
    }

    fn select<A: Assignment>(&mut self, formula: &Formula<L, A>) -> Result<L, SolverError> {
        let num_vars = formula.num_vars();
        self.positive.clear();
        self.positive.resize(num_vars + 1, 0.0);
        self.negative.clear();
        self.negative.resize(num_vars + 1, 0.0);

        let assignment = formula.assignment();

        // Phase one: accumulate every score.
        for &id in formula.active_clauses() {
            let clause = &formula.cnf()[id];
            let unassigned = clause
                .iter()
                .filter(|&&l| !assignment.is_assigned(l.variable()))
                .count();
            if unassigned == 0 {
                continue;
            }
            let w = weight(unassigned);
            for &lit in clause {
                if assignment.is_assigned(lit.variable()) {
                    continue;
                }
                let var = lit.variable() as usize;
                if lit.polarity() {
                    self.positive[var] += w;
                } else {
                    self.negative[var] += w;
                }
            }
        }

        // Phase two: a single ascending scan for the best combined score.
        // Strict comparison keeps the smallest index on ties.
        let mut best: Option<Variable> = None;
        let mut best_score = OrderedFloat(f64::MIN);
        #[allow(clippy::cast_possible_truncation)]
        for var in 1..=num_vars as Variable {
            if assignment.is_assigned(var) {
                continue;
            }
            let combined = OrderedFloat(self.positive[var as usize] + self.negative[var as usize]);
            if combined > best_score {
                best = Some(var);
                best_score = combined;
            }
        }

        let var = best.ok_or(SolverError::NoUnassignedVariable)?;
        let polarity = self.positive[var as usize] >= self.negative[var as usize];
        Ok(L::new(var, polarity))
    }
}

/// Picks the lowest-numbered unassigned variable, positive polarity.
/// Useful as a predictable baseline in tests and from the CLI.
#[derive(Debug, Clone, Default)]
pub struct FirstUnassigned(PhantomData<()>);

impl<L: Literal> VariableSelection<L> for FirstUnassigned {
    fn new(_num_vars: usize) -> Self {
        Self(PhantomData)
    }

    fn select<A: Assignment>(&mut self, formula: &Formula<L, A>) -> Result<L, SolverError> {
        formula
            .assignment()
            .unassigned()
            .next()
            .map(|var| L::new(var, true))
            .ok_or(SolverError::NoUnassignedVariable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::assignment::VecAssignment;
    use crate::sat::dimacs::parse_dimacs_text;
    use crate::sat::literal::PackedLiteral;

    type TestFormula = Formula<PackedLiteral, VecAssignment>;

    fn formula(text: &str) -> TestFormula {
        Formula::new(parse_dimacs_text(text).unwrap())
    }

    fn select(f: &TestFormula) -> PackedLiteral {
        let mut jw: JeroslowWang = VariableSelection::<PackedLiteral>::new(f.num_vars());
        jw.select(f).unwrap()
    }

    #[test]
    fn test_weight_table_matches_powers() {
        for k in 0..=10 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let exact = 2.0_f64.powi(-(k as i32));
            assert!((weight(k) - exact).abs() < f64::EPSILON * 4.0, "k = {k}");
        }
        assert!((weight(11) - 2.0_f64.powi(-11)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_short_clauses_dominate() {
        // Variable 1 sits in a binary clause, variable 3 only in a long
        // one; 2^-2 beats 2^-4 no matter how often 3 occurs there.
        let f = formula("p cnf 6 2\n1 2 0\n3 4 5 6 0\n");
        assert_eq!(select(&f).to_dimacs(), 1);
    }

    #[test]
    fn test_combined_score_picks_variable() {
        // Variable 1 appears with both polarities: combined weight 0.5.
        // Everything else reaches at most 0.25.
        let f = formula("p cnf 3 2\n1 2 0\n-1 3 0\n");
        assert_eq!(select(&f).to_dimacs(), 1);
    }

    #[test]
    fn test_negative_polarity_chosen() {
        let f = formula("p cnf 3 2\n-1 2 0\n-1 3 0\n");
        assert_eq!(select(&f).to_dimacs(), -1);
    }

    #[test]
    fn test_tie_breaks_smallest_variable_positive() {
        // Variables 1 and 2 have identical scores; 1 wins. Its positive
        // and negative scores are equal too; positive wins.
        let f = formula("p cnf 2 2\n1 2 0\n-1 -2 0\n");
        assert_eq!(select(&f).to_dimacs(), 1);
    }

    #[test]
    fn test_two_phase_maximum() {
        // A running maximum taken during accumulation would compare
        // against stale partial sums. Variable 2 overtakes variable 1
        // only once the final clause is counted, so the winner must be
        // chosen after all scores are in.
        let f = formula("p cnf 3 3\n1 2 0\n-1 3 0\n2 3 0\n");
        // pos(1) = 0.25, neg(1) = 0.25 -> 0.5
        // pos(2) = 0.25 + 0.25 = 0.5, neg(2) = 0 -> 0.5
        // tie at 0.5 -> smallest index 1; now confirm 2 wins outright once
        // it gains another short clause.
        assert_eq!(select(&f).to_dimacs(), 1);

        let f = formula("p cnf 3 4\n1 2 0\n-1 3 0\n2 3 0\n2 3 0\n");
        // pos(2) = 0.75 > combined(1) = 0.5.
        assert_eq!(select(&f).to_dimacs(), 2);
    }

    #[test]
    fn test_scores_follow_assignments() {
        let mut f = formula("p cnf 3 3\n1 2 0\n1 3 0\n2 3 0\n");
        assert_eq!(select(&f).to_dimacs(), 1);

        // With 1 assigned false, both its clauses shrink to units on 2 and
        // 3; propagation satisfies everything, so selection afterwards has
        // nothing to rank.
        f.decide(PackedLiteral::from_dimacs(-1));
        assert!(f.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let f = formula("p cnf 4 3\n1 -2 0\n-3 4 0\n2 3 0\n");
        let mut jw: JeroslowWang = VariableSelection::<PackedLiteral>::new(f.num_vars());
        let first = jw.select(&f).unwrap();
        for _ in 0..10 {
            assert_eq!(jw.select(&f).unwrap(), first);
        }
    }

    #[test]
    fn test_no_unassigned_variable() {
        let mut f = formula("p cnf 1 1\n1 0\n");
        f.decide(PackedLiteral::from_dimacs(1));
        assert!(f.is_empty());

        let mut jw: JeroslowWang = VariableSelection::<PackedLiteral>::new(f.num_vars());
        assert_eq!(
            jw.select(&f),
            Err(SolverError::NoUnassignedVariable)
        );
    }

    #[test]
    fn test_first_unassigned() {
        let mut f = formula("p cnf 3 1\n2 3 0\n");
        let mut fu: FirstUnassigned = VariableSelection::<PackedLiteral>::new(f.num_vars());
        assert_eq!(fu.select(&f).unwrap().to_dimacs(), 1);

        f.decide(PackedLiteral::from_dimacs(1));
        assert_eq!(fu.select(&f).unwrap().to_dimacs(), 2);
    }
}
