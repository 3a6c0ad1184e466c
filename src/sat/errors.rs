//! Error types surfaced by the SAT engine.
//!
//! Conflicts discovered during propagation are *not* errors; they are
//! ordinary formula state queried through `Formula::has_conflict`. The
//! variants here cover bad input and misuse of the engine's API.

use thiserror::Error;

/// Errors produced by the loader, the heuristic, or the invariant checker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// The DIMACS input was syntactically invalid or inconsistent with its
    /// `p cnf` header. No formula is constructed.
    #[error("malformed input at line {line}: {reason}")]
    MalformedInput {
        /// 1-based line number of the offending input line.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// An internal invariant of the formula state failed. Indicates a
    /// programming error in the caller or the engine, never bad input.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(&'static str),

    /// The branching heuristic was asked for a literal on a fully assigned
    /// formula. The search driver checks `is_empty` first, so reaching this
    /// means the driver protocol was not followed.
    #[error("no unassigned variable to branch on")]
    NoUnassignedVariable,
}

impl SolverError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            line,
            reason: reason.into(),
        }
    }
}
