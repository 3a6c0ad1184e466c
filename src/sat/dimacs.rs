#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! A strict parser for the DIMACS CNF format.
//!
//! The format:
//! - Lines beginning with `c` are comments and ignored.
//! - `p cnf <varCount> <clauseCount>` declares the problem and must precede
//!   every clause.
//! - Every other non-empty line is one clause: whitespace-separated signed
//!   integers terminated by a mandatory `0`.
//! - A `%` line ends the data (some benchmark suites append one).
//!
//! The declared variable count is authoritative: literals outside
//! `[-V, V] \ {0}` are rejected. Exactly `clauseCount` clauses must appear;
//! anything after the final clause is ignored. All violations surface as
//! [`SolverError::MalformedInput`] and no formula is constructed.

use crate::sat::cnf::Cnf;
use crate::sat::errors::SolverError;
use crate::sat::literal::Literal;
use log::debug;
use std::io::{self, BufRead};
use std::path::Path;

/// Parses DIMACS text held in memory.
///
/// # Errors
///
/// `SolverError::MalformedInput` on any syntactic or count violation.
pub fn parse_dimacs_text<L: Literal>(text: &str) -> Result<Cnf<L>, SolverError> {
    parse_dimacs(io::Cursor::new(text))
}

/// Parses DIMACS data from any buffered reader.
///
/// # Errors
///
/// `SolverError::MalformedInput` on read failures, a missing or malformed
/// problem line, non-integer tokens, out-of-range literals, a missing
/// clause terminator, or a clause count that disagrees with the header.
pub fn parse_dimacs<R: BufRead, L: Literal>(reader: R) -> Result<Cnf<L>, SolverError> {
    let mut header: Option<(usize, usize)> = None;
    let mut clauses: Vec<Vec<i32>> = Vec::new();
    let mut last_line = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        last_line = line_no;
        let line =
            line.map_err(|e| SolverError::malformed(line_no, format!("read failed: {e}")))?;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('c') {
            continue;
        }
        if trimmed.starts_with('%') {
            break;
        }
        if trimmed.starts_with('p') {
            if header.is_some() {
                return Err(SolverError::malformed(line_no, "duplicate problem line"));
            }
            header = Some(parse_header(trimmed, line_no)?);
            continue;
        }

        let Some((num_vars, num_clauses)) = header else {
            return Err(SolverError::malformed(
                line_no,
                "clause before the problem line",
            ));
        };
        if clauses.len() == num_clauses {
            // Everything after the declared clause count is ignored.
            break;
        }
        clauses.push(parse_clause(trimmed, line_no, num_vars)?);
    }

    let (num_vars, num_clauses) = header
        .ok_or_else(|| SolverError::malformed(last_line, "no `p cnf` problem line found"))?;
    if clauses.len() != num_clauses {
        return Err(SolverError::malformed(
            last_line,
            format!(
                "problem line declares {num_clauses} clauses but {} were found",
                clauses.len()
            ),
        ));
    }

    debug!("parsed {num_clauses} clauses over {num_vars} variables");
    Ok(Cnf::with_num_vars(clauses, num_vars))
}

/// Parses a DIMACS CNF file from disk.
///
/// # Errors
///
/// I/O errors from opening or reading the file; parse failures are wrapped
/// as `io::ErrorKind::InvalidData`.
pub fn parse_file<L: Literal>(path: &Path) -> io::Result<Cnf<L>> {
    let file = std::fs::File::open(path)?;
    let reader = io::BufReader::new(file);
    parse_dimacs(reader).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{}: {e}", path.display()),
        )
    })
}

fn parse_header(line: &str, line_no: usize) -> Result<(usize, usize), SolverError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let [p, cnf, vars, clauses] = parts.as_slice() else {
        return Err(SolverError::malformed(
            line_no,
            "expected `p cnf <varCount> <clauseCount>`",
        ));
    };
    if *p != "p" || *cnf != "cnf" {
        return Err(SolverError::malformed(
            line_no,
            format!("unknown problem type `{p} {cnf}`, expected `p cnf`"),
        ));
    }
    let num_vars = vars
        .parse::<usize>()
        .map_err(|_| SolverError::malformed(line_no, format!("invalid variable count `{vars}`")))?;
    let num_clauses = clauses.parse::<usize>().map_err(|_| {
        SolverError::malformed(line_no, format!("invalid clause count `{clauses}`"))
    })?;
    Ok((num_vars, num_clauses))
}

fn parse_clause(line: &str, line_no: usize, num_vars: usize) -> Result<Vec<i32>, SolverError> {
    let mut literals = Vec::new();
    let mut tokens = line.split_whitespace();

    while let Some(token) = tokens.next() {
        let code = token.parse::<i32>().map_err(|_| {
            SolverError::malformed(line_no, format!("invalid literal `{token}`"))
        })?;
        if code == 0 {
            if let Some(extra) = tokens.next() {
                return Err(SolverError::malformed(
                    line_no,
                    format!("literal `{extra}` after the clause terminator"),
                ));
            }
            return Ok(literals);
        }
        if code.unsigned_abs() as usize > num_vars {
            return Err(SolverError::malformed(
                line_no,
                format!("literal {code} out of range for {num_vars} variables"),
            ));
        }
        literals.push(code);
    }

    Err(SolverError::malformed(line_no, "missing clause terminator"))
}
