#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! A Sudoku solver built by reduction to Boolean satisfiability.
//!
//! The `sat` module is a complete DPLL decision procedure over CNF
//! formulas; the `sudoku` module encodes 9x9 puzzles into CNF and decodes
//! satisfying assignments back into grids.

/// The `sat` module implements the SAT engine: clause database, unit
/// propagation with snapshot-based undo, Jeroslow-Wang branching, and the
/// recursive DPLL driver.
pub mod sat;

/// The `sudoku` module implements the Sudoku frontend: the puzzle <->
/// CNF encoding and the solution decoder.
pub mod sudoku;
