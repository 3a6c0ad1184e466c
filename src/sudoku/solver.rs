//! The Sudoku frontend: encoding 9x9 puzzles into CNF and decoding
//! satisfying assignments back into grids.
//!
//! A cell proposition "row `r`, column `c` holds digit `d`" is the SAT
//! variable `100r + 10c + d`, so variable ids are the three-digit numbers
//! whose decimal digits are all in `1..=9`. The SAT engine treats them as
//! opaque ids below 1000; the bijection lives entirely in [`CellVar`].
//!
//! The structural encoding emits an exactly-one group (one 9-ary at-least
//! clause plus 36 pairwise at-most binaries) for each of the 324
//! constraints: every cell holds a digit, every row, column and box holds
//! each digit. That is 324 * 37 = 11988 clauses for every puzzle; the
//! givens add one unit clause each.

use crate::sat::assignment::MapAssignment;
use crate::sat::cnf::Cnf;
use crate::sat::dpll::Dpll;
use crate::sat::errors::SolverError;
use crate::sat::literal::{Literal, PackedLiteral};
use crate::sat::solver::{Solutions, Solver};
use itertools::Itertools;
use std::fmt::Display;
use std::num::NonZeroI32;
use std::path::Path;
use thiserror::Error;

/// Side length of the grid.
const SIZE: usize = 9;
/// Side length of a box.
const BLOCK: usize = 3;
/// The declared variable count of the emitted DIMACS header. Cell codes
/// top out at 999; the ids with a zero digit are simply never used.
pub const NUM_VARS: usize = 999;

/// Errors from puzzle parsing and cell-coordinate validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SudokuError {
    /// A row, column, or digit outside `1..=9`.
    #[error("cell out of range: row {row}, column {col}, digit {digit}")]
    CellOutOfRange {
        row: usize,
        col: usize,
        digit: usize,
    },

    /// The puzzle text was not a valid 9x9 grid.
    #[error("invalid puzzle at line {line}: {reason}")]
    InvalidPuzzle { line: usize, reason: String },

    /// The puzzle file could not be read.
    #[error("cannot read puzzle: {0}")]
    Io(String),
}

/// One cell proposition: row `r` and column `c` hold digit `d`.
///
/// The struct is the explicit bijection between grid coordinates and SAT
/// variable ids; both directions are bounds-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellVar {
    row: usize,
    col: usize,
    digit: usize,
}

impl CellVar {
    /// Builds a cell proposition, rejecting any component outside `1..=9`.
    ///
    /// # Errors
    ///
    /// `SudokuError::CellOutOfRange`.
    pub fn new(row: usize, col: usize, digit: usize) -> Result<Self, SudokuError> {
        if [row, col, digit].iter().all(|&x| (1..=SIZE).contains(&x)) {
            Ok(Self { row, col, digit })
        } else {
            Err(SudokuError::CellOutOfRange { row, col, digit })
        }
    }

    #[must_use]
    pub const fn row(self) -> usize {
        self.row
    }

    #[must_use]
    pub const fn col(self) -> usize {
        self.col
    }

    #[must_use]
    pub const fn digit(self) -> usize {
        self.digit
    }

    /// The SAT variable id `100r + 10c + d`.
    #[must_use]
    pub fn code(self) -> NonZeroI32 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let code = (100 * self.row + 10 * self.col + self.digit) as i32;
        NonZeroI32::new(code).expect("cell codes start at 111")
    }

    /// Inverts `code`: splits a variable id into its decimal digits and
    /// rejects anything that is not a valid cell proposition (a component
    /// of zero, or an id outside three digits).
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        if !(111..=999).contains(&code) {
            return None;
        }
        let code = code as usize;
        let (row, col, digit) = (code / 100, (code / 10) % 10, code % 10);
        if col == 0 || digit == 0 {
            return None;
        }
        Some(Self { row, col, digit })
    }
}

/// A 9x9 grid of digits; 0 marks an empty cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board(Vec<Vec<usize>>);

impl Board {
    /// Validates a 9x9 grid of values in `0..=9`.
    ///
    /// # Errors
    ///
    /// `SudokuError::InvalidPuzzle` on wrong dimensions or cell values.
    pub fn new(rows: Vec<Vec<usize>>) -> Result<Self, SudokuError> {
        if rows.len() != SIZE {
            return Err(SudokuError::InvalidPuzzle {
                line: rows.len(),
                reason: format!("expected {SIZE} rows, found {}", rows.len()),
            });
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != SIZE {
                return Err(SudokuError::InvalidPuzzle {
                    line: i + 1,
                    reason: format!("expected {SIZE} values, found {}", row.len()),
                });
            }
            if let Some(&bad) = row.iter().find(|&&v| v > SIZE) {
                return Err(SudokuError::InvalidPuzzle {
                    line: i + 1,
                    reason: format!("digit {bad} exceeds {SIZE}"),
                });
            }
        }
        Ok(Self(rows))
    }

    /// The digit at 1-based coordinates, 0 for an empty cell.
    #[must_use]
    pub fn digit(&self, row: usize, col: usize) -> usize {
        self.0[row - 1][col - 1]
    }

    /// Iterates `(row, col, digit)` over the filled cells, 1-based.
    pub fn givens(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.0.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &d)| d != 0)
                .map(move |(c, &d)| (r + 1, c + 1, d))
        })
    }

    /// True iff the grid is completely filled and every row, column, and
    /// box holds each digit exactly once.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        let complete = |cells: &[usize]| -> bool {
            let mut sorted = cells.to_vec();
            sorted.sort_unstable();
            sorted == (1..=SIZE).collect_vec()
        };

        let rows_ok = self.0.iter().all(|row| complete(row));
        let cols_ok = (0..SIZE).all(|c| complete(&(0..SIZE).map(|r| self.0[r][c]).collect_vec()));
        let boxes_ok = (0..SIZE).all(|b| {
            let (br, bc) = (b / BLOCK * BLOCK, b % BLOCK * BLOCK);
            complete(
                &(0..SIZE)
                    .map(|i| self.0[br + i / BLOCK][bc + i % BLOCK])
                    .collect_vec(),
            )
        });
        rows_ok && cols_ok && boxes_ok
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.0 {
            writeln!(f, "{}", row.iter().map(ToString::to_string).join(" "))?;
        }
        Ok(())
    }
}

impl TryFrom<Vec<Vec<usize>>> for Board {
    type Error = SudokuError;

    fn try_from(rows: Vec<Vec<usize>>) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

impl From<Board> for Vec<Vec<usize>> {
    fn from(board: Board) -> Self {
        board.0
    }
}

/// A classic puzzle with a unique solution. 0 marks an empty cell.
pub const EXAMPLE_PUZZLE: [[usize; 9]; 9] = [
    [5, 3, 0, 0, 7, 0, 0, 0, 0],
    [6, 0, 0, 1, 9, 5, 0, 0, 0],
    [0, 9, 8, 0, 0, 0, 0, 6, 0],
    [8, 0, 0, 0, 6, 0, 0, 0, 3],
    [4, 0, 0, 8, 0, 3, 0, 0, 1],
    [7, 0, 0, 0, 2, 0, 0, 0, 6],
    [0, 6, 0, 0, 0, 0, 2, 8, 0],
    [0, 0, 0, 4, 1, 9, 0, 0, 5],
    [0, 0, 0, 0, 8, 0, 0, 7, 9],
];

/// The unique solution of [`EXAMPLE_PUZZLE`].
pub const EXAMPLE_SOLUTION: [[usize; 9]; 9] = [
    [5, 3, 4, 6, 7, 8, 9, 1, 2],
    [6, 7, 2, 1, 9, 5, 3, 4, 8],
    [1, 9, 8, 3, 4, 2, 5, 6, 7],
    [8, 5, 9, 7, 6, 1, 4, 2, 3],
    [4, 2, 6, 8, 5, 3, 7, 9, 1],
    [7, 1, 3, 9, 2, 4, 8, 5, 6],
    [9, 6, 1, 5, 3, 7, 2, 8, 4],
    [2, 8, 7, 4, 1, 9, 6, 3, 5],
    [3, 4, 5, 2, 8, 6, 1, 7, 9],
];

/// A Sudoku puzzle awaiting solving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sudoku {
    /// The given grid.
    pub board: Board,
}

impl Sudoku {
    #[must_use]
    pub const fn new(board: Board) -> Self {
        Self { board }
    }

    /// Parses a puzzle from text: nine rows of nine whitespace-separated
    /// digits, 0 for an empty cell. Lines starting with `c` are comments.
    ///
    /// # Errors
    ///
    /// `SudokuError::InvalidPuzzle` on anything else.
    pub fn from_text(text: &str) -> Result<Self, SudokuError> {
        let mut rows = Vec::with_capacity(SIZE);
        for (idx, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('c') {
                continue;
            }
            let row: Vec<usize> = trimmed
                .split_whitespace()
                .map(|token| {
                    token.parse::<usize>().map_err(|_| SudokuError::InvalidPuzzle {
                        line: idx + 1,
                        reason: format!("invalid digit `{token}`"),
                    })
                })
                .collect::<Result<_, _>>()?;
            if row.len() != SIZE {
                return Err(SudokuError::InvalidPuzzle {
                    line: idx + 1,
                    reason: format!("expected {SIZE} values, found {}", row.len()),
                });
            }
            rows.push(row);
        }
        Ok(Self::new(Board::new(rows)?))
    }

    /// Parses a puzzle file.
    ///
    /// # Errors
    ///
    /// `SudokuError::Io` if the file cannot be read, otherwise as
    /// [`Sudoku::from_text`].
    pub fn from_file(path: &Path) -> Result<Self, SudokuError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SudokuError::Io(format!("{}: {e}", path.display())))?;
        Self::from_text(&text)
    }

    /// Encodes the puzzle as CNF: the 11988 structural clauses shared by
    /// every puzzle plus one unit clause per given.
    #[must_use]
    pub fn to_cnf<L: Literal>(&self) -> Cnf<L> {
        let clauses: Vec<Vec<i32>> = generate_cell_clauses()
            .into_iter()
            .chain(generate_row_clauses())
            .chain(generate_col_clauses())
            .chain(generate_block_clauses())
            .chain(generate_given_clauses(&self.board))
            .collect();

        Cnf::with_num_vars(clauses, NUM_VARS)
    }

    /// Reads the solved grid out of a satisfying assignment. Returns the
    /// board by value; don't-care variables leave their cells empty.
    #[must_use]
    pub fn decode(&self, solutions: &Solutions) -> Board {
        let mut rows = vec![vec![0; SIZE]; SIZE];
        for row in 1..=SIZE {
            for col in 1..=SIZE {
                for digit in 1..=SIZE {
                    let var = CellVar { row, col, digit };
                    if solutions.check(var.code()) {
                        rows[row - 1][col - 1] = digit;
                    }
                }
            }
        }
        Board(rows)
    }

    /// Encodes, solves, and decodes in one step. `Ok(None)` means the
    /// puzzle has no solution.
    ///
    /// # Errors
    ///
    /// Propagates `SolverError` from the engine.
    pub fn solve(&self) -> Result<Option<Board>, SolverError> {
        let cnf: Cnf<PackedLiteral> = self.to_cnf();
        let mut solver: Dpll<PackedLiteral, MapAssignment> = Solver::new(cnf);
        Ok(solver.solve()?.map(|solutions| self.decode(&solutions)))
    }
}

impl Display for Sudoku {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board)
    }
}

/// One exactly-one constraint group: at least one of `vars` holds, and no
/// two hold together.
fn exactly_one(vars: &[CellVar]) -> Vec<Vec<i32>> {
    let mut clauses = Vec::with_capacity(1 + vars.len() * (vars.len() - 1) / 2);
    clauses.push(vars.iter().map(|v| v.code().get()).collect());
    for (i, a) in vars.iter().enumerate() {
        for b in &vars[i + 1..] {
            clauses.push(vec![-a.code().get(), -b.code().get()]);
        }
    }
    clauses
}

/// Each cell holds exactly one digit.
fn generate_cell_clauses() -> Vec<Vec<i32>> {
    let mut clauses = Vec::new();
    for row in 1..=SIZE {
        for col in 1..=SIZE {
            let group = (1..=SIZE)
                .map(|digit| CellVar { row, col, digit })
                .collect_vec();
            clauses.extend(exactly_one(&group));
        }
    }
    clauses
}

/// Each row holds each digit exactly once.
fn generate_row_clauses() -> Vec<Vec<i32>> {
    let mut clauses = Vec::new();
    for digit in 1..=SIZE {
        for row in 1..=SIZE {
            let group = (1..=SIZE)
                .map(|col| CellVar { row, col, digit })
                .collect_vec();
            clauses.extend(exactly_one(&group));
        }
    }
    clauses
}

/// Each column holds each digit exactly once.
fn generate_col_clauses() -> Vec<Vec<i32>> {
    let mut clauses = Vec::new();
    for digit in 1..=SIZE {
        for col in 1..=SIZE {
            let group = (1..=SIZE)
                .map(|row| CellVar { row, col, digit })
                .collect_vec();
            clauses.extend(exactly_one(&group));
        }
    }
    clauses
}

/// Each 3x3 box holds each digit exactly once.
fn generate_block_clauses() -> Vec<Vec<i32>> {
    let mut clauses = Vec::new();
    for digit in 1..=SIZE {
        for block_row in (0..SIZE).step_by(BLOCK) {
            for block_col in (0..SIZE).step_by(BLOCK) {
                let group = (0..BLOCK)
                    .cartesian_product(0..BLOCK)
                    .map(|(r, c)| CellVar {
                        row: block_row + r + 1,
                        col: block_col + c + 1,
                        digit,
                    })
                    .collect_vec();
                clauses.extend(exactly_one(&group));
            }
        }
    }
    clauses
}

/// One unit clause per filled cell.
fn generate_given_clauses(board: &Board) -> Vec<Vec<i32>> {
    board
        .givens()
        .map(|(row, col, digit)| vec![CellVar { row, col, digit }.code().get()])
        .collect()
}
