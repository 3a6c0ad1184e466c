#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! The recursive DPLL search driver.
//!
//! The driver owns nothing clever: it asks the heuristic for a literal,
//! hands it to the propagation engine, and recurses. On failure it undoes
//! the decision and flips to the literal's negation; if that fails too the
//! subtree is unsatisfiable. It never inspects clauses directly; every
//! state change goes through `decide` and `undo`.
//!
//! The recursion depth is bounded by the variable count (729 for the
//! Sudoku encoding), well within the default stack.

use crate::sat::assignment::{Assignment, VecAssignment};
use crate::sat::cnf::Cnf;
use crate::sat::errors::SolverError;
use crate::sat::formula::Formula;
use crate::sat::literal::{Literal, PackedLiteral};
use crate::sat::solver::{SolutionStats, Solutions, Solver};
use crate::sat::variable_selection::{JeroslowWang, VariableSelection};
use log::debug;

/// A DPLL solver: the formula store plus a branching heuristic and search
/// counters.
#[derive(Debug, Clone)]
pub struct Dpll<
    L: Literal = PackedLiteral,
    A: Assignment = VecAssignment,
    V: VariableSelection<L> = JeroslowWang,
> {
    /// The search state. Public so callers can inspect the assignment or
    /// run the invariant validator after solving.
    pub formula: Formula<L, A>,
    selector: V,
    decisions: usize,
    conflicts: usize,
    max_depth: usize,
}

impl<L: Literal, A: Assignment, V: VariableSelection<L>> Solver<L, A> for Dpll<L, A, V> {
    fn new(cnf: Cnf<L>) -> Self {
        let selector = V::new(cnf.num_vars());
        Self {
            formula: Formula::new(cnf),
            selector,
            decisions: 0,
            conflicts: 0,
            max_depth: 0,
        }
    }

    fn solve(&mut self) -> Result<Option<Solutions>, SolverError> {
        let satisfiable = self.search()?;
        debug!(
            "search finished: {} after {} decisions, {} conflicts",
            if satisfiable { "SAT" } else { "UNSAT" },
            self.decisions,
            self.conflicts
        );
        Ok(satisfiable.then(|| self.formula.solutions()))
    }

    fn solutions(&self) -> Solutions {
        self.formula.solutions()
    }

    fn stats(&self) -> SolutionStats {
        SolutionStats {
            decisions: self.decisions,
            conflicts: self.conflicts,
            propagations: self.formula.propagation_count(),
            max_depth: self.max_depth,
        }
    }
}

impl<L: Literal, A: Assignment, V: VariableSelection<L>> Dpll<L, A, V> {
    /// The recursive decide / propagate / backtrack procedure.
    fn search(&mut self) -> Result<bool, SolverError> {
        if self.formula.is_empty() {
            return Ok(true);
        }
        if self.formula.has_conflict() {
            self.conflicts += 1;
            return Ok(false);
        }

        let lit = self.selector.select(&self.formula)?;

        if self.branch(lit)? {
            return Ok(true);
        }
        if self.branch(lit.negated())? {
            return Ok(true);
        }
        Ok(false)
    }

    /// Tries one polarity of a decision; undoes it on failure.
    fn branch(&mut self, lit: L) -> Result<bool, SolverError> {
        self.decisions += 1;
        self.formula.decide(lit);
        self.max_depth = self.max_depth.max(self.formula.decision_level());

        if self.search()? {
            return Ok(true);
        }
        self.formula.undo();
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::dimacs::parse_dimacs_text;
    use crate::sat::variable_selection::FirstUnassigned;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    type TestSolver = Dpll<PackedLiteral, VecAssignment, JeroslowWang>;

    fn solve(text: &str) -> (Option<Solutions>, TestSolver) {
        let cnf = parse_dimacs_text(text).unwrap();
        let mut solver = TestSolver::new(cnf);
        let result = solver.solve().unwrap();
        (result, solver)
    }

    #[test]
    fn test_single_unit_clause_sat() {
        let (result, _) = solve("p cnf 1 1\n1 0\n");
        let solutions = result.unwrap();
        assert_eq!(solutions.var_value(1), Some(true));
    }

    #[test]
    fn test_contradicting_units_unsat() {
        let (result, solver) = solve("p cnf 1 2\n1 0\n-1 0\n");
        assert!(result.is_none());
        // The contradiction surfaces while draining the initial units, so
        // the search never recurses past the first decision level.
        assert!(solver.stats().max_depth <= 1);
        assert!(solver.stats().decisions <= 2);
    }

    #[test]
    fn test_three_clause_sat_verified() {
        let text = "p cnf 3 3\n1 2 0\n-1 3 0\n-2 -3 0\n";
        let cnf: Cnf<PackedLiteral> = parse_dimacs_text(text).unwrap();
        let (result, _) = solve(text);
        assert!(cnf.verify(&result.unwrap()));
    }

    #[test]
    fn test_pigeonhole_three_into_two_unsat() {
        // Pigeon i in hole j is variable 2(i-1)+j: three "somewhere"
        // clauses, then no two pigeons share a hole.
        let text = "p cnf 6 9\n\
                    1 2 0\n3 4 0\n5 6 0\n\
                    -1 -3 0\n-1 -5 0\n-3 -5 0\n\
                    -2 -4 0\n-2 -6 0\n-4 -6 0\n";
        let (result, _) = solve(text);
        assert!(result.is_none());
    }

    #[test]
    fn test_empty_clause_unsat() {
        let (result, _) = solve("p cnf 1 1\n0\n");
        assert!(result.is_none());
    }

    #[test]
    fn test_no_clauses_sat() {
        let (result, _) = solve("p cnf 0 0\n");
        assert!(result.is_some());
    }

    #[test]
    fn test_conflict_added_to_satisfiable_formula() {
        // The base formula is satisfiable; pinning both polarities of 3
        // must flip the verdict without a deep search.
        let (result, _) = solve("p cnf 3 2\n1 2 0\n-1 3 0\n");
        assert!(result.is_some());

        let (result, solver) = solve("p cnf 3 4\n1 2 0\n-1 3 0\n3 0\n-3 0\n");
        assert!(result.is_none());
        assert!(solver.stats().max_depth <= 1);
    }

    #[test]
    fn test_solution_satisfies_original_clauses() {
        let text = "p cnf 5 6\n1 -2 0\n2 -3 0\n3 -4 0\n4 -5 0\n5 1 0\n-1 -3 -5 0\n";
        let cnf: Cnf<PackedLiteral> = parse_dimacs_text(text).unwrap();
        let (result, solver) = solve(text);
        if let Some(solutions) = result {
            assert!(cnf.verify(&solutions));
        }
        solver.formula.check_invariants().unwrap();
    }

    #[test]
    fn test_first_unassigned_selector_agrees() {
        let text = "p cnf 4 4\n1 2 0\n-2 3 0\n-3 -4 0\n2 4 0\n";
        let cnf: Cnf<PackedLiteral> = parse_dimacs_text(text).unwrap();

        let mut jw = TestSolver::new(cnf.clone());
        let mut fu: Dpll<PackedLiteral, VecAssignment, FirstUnassigned> = Solver::new(cnf.clone());

        let jw_result = jw.solve().unwrap();
        let fu_result = fu.solve().unwrap();
        assert_eq!(jw_result.is_some(), fu_result.is_some());
        if let Some(s) = jw_result {
            assert!(cnf.verify(&s));
        }
        if let Some(s) = fu_result {
            assert!(cnf.verify(&s));
        }
    }

    /// Truth-table satisfiability for formulas small enough to enumerate.
    fn brute_force_sat(clauses: &[Vec<i32>], num_vars: usize) -> bool {
        (0_u32..1 << num_vars).any(|mask| {
            clauses.iter().all(|clause| {
                clause.iter().any(|&code| {
                    let var = code.unsigned_abs() as usize;
                    let value = mask & (1 << (var - 1)) != 0;
                    if code > 0 {
                        value
                    } else {
                        !value
                    }
                })
            })
        })
    }

    #[test]
    fn test_completeness_against_brute_force() {
        let mut rng = StdRng::seed_from_u64(0x5a7_0001);

        for round in 0..300 {
            let num_vars = rng.gen_range(1..=6);
            let num_clauses = rng.gen_range(1..=12);
            let clauses: Vec<Vec<i32>> = (0..num_clauses)
                .map(|_| {
                    let len = rng.gen_range(1..=3);
                    (0..len)
                        .map(|_| {
                            let var = rng.gen_range(1..=num_vars) as i32;
                            if rng.gen_bool(0.5) {
                                var
                            } else {
                                -var
                            }
                        })
                        .collect()
                })
                .collect();

            let expected = brute_force_sat(&clauses, num_vars);
            let cnf: Cnf<PackedLiteral> = Cnf::with_num_vars(clauses.clone(), num_vars);
            let mut solver = TestSolver::new(cnf.clone());
            let result = solver.solve().unwrap();

            assert_eq!(
                result.is_some(),
                expected,
                "verdict mismatch on round {round}: {clauses:?}"
            );
            if let Some(solutions) = result {
                assert!(
                    cnf.verify(&solutions),
                    "model fails verification on round {round}: {clauses:?}"
                );
            }
        }
    }
}
