//! The command-line interface: argument parsing and the solve-and-report
//! plumbing around the library.

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use log::info;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use sudoku_sat::sat::assignment::{Assignment, MapAssignment, VecAssignment};
use sudoku_sat::sat::cnf::Cnf;
use sudoku_sat::sat::dimacs::{parse_dimacs_text, parse_file};
use sudoku_sat::sat::dpll::Dpll;
use sudoku_sat::sat::literal::PackedLiteral;
use sudoku_sat::sat::solver::{Model, SolutionStats, Solutions, Solver};
use sudoku_sat::sat::variable_selection::{FirstUnassigned, JeroslowWang, VariableSelection};
use sudoku_sat::sudoku::solver::Sudoku;

/// Defines the command-line interface for the solver.
#[derive(Parser, Debug)]
#[command(name = "sudoku_sat", version, about = "A Sudoku solver built on a DPLL SAT engine")]
pub(crate) struct Cli {
    /// Input to solve when no subcommand is given: a `.sudoku` puzzle or a
    /// DIMACS `.cnf` file, told apart by extension.
    pub input: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub common: CommonOptions,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a CNF file in DIMACS format.
    File {
        /// Path to the DIMACS .cnf file.
        #[arg(long)]
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a CNF formula provided as plain text.
    Text {
        /// Literal CNF input (e.g. "p cnf 2 2\n1 -2 0\n2 0").
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a Sudoku puzzle: nine rows of nine digits, 0 for empty.
    Sudoku {
        /// Path to the puzzle file.
        #[arg(long)]
        path: PathBuf,

        /// Also write the generated DIMACS encoding next to the puzzle.
        #[arg(short, long, default_value_t = false)]
        export_dimacs: bool,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every .cnf and .sudoku file under a directory.
    Dir {
        /// Directory to scan recursively.
        #[arg(long)]
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Options shared by every solving subcommand.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct CommonOptions {
    /// Print the parsed formula and other debug output.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Re-check the model against the original clauses after solving.
    #[arg(short, long, default_value_t = true)]
    pub(crate) verify: bool,

    /// Print search statistics after solving.
    #[arg(short, long, default_value_t = true)]
    pub(crate) stats: bool,

    /// Print the satisfying assignment, one variable per line.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,

    /// The branching heuristic.
    #[arg(long, value_enum, default_value_t = SelectorChoice::JeroslowWang)]
    pub(crate) variable_selection: SelectorChoice,
}

#[derive(ValueEnum, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectorChoice {
    #[default]
    JeroslowWang,
    FirstUnassigned,
}

/// What the process should report through its exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Sat,
    Unsat,
}

pub(crate) fn run(cli: Cli) -> Result<Outcome, String> {
    match cli.command {
        Some(Commands::File { path, common }) => solve_cnf_file(&path, &common),
        Some(Commands::Text { input, common }) => {
            let cnf = parse_dimacs_text(&input).map_err(|e| e.to_string())?;
            solve_and_report(&cnf, &common, None)
        }
        Some(Commands::Sudoku {
            path,
            export_dimacs,
            common,
        }) => solve_sudoku(&path, export_dimacs, &common),
        Some(Commands::Dir { path, common }) => solve_dir(&path, &common),
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "sudoku_sat",
                &mut std::io::stdout(),
            );
            Ok(Outcome::Sat)
        }
        None => match cli.input {
            Some(path) if path.extension().is_some_and(|ext| ext == "sudoku") => {
                solve_sudoku(&path, false, &cli.common)
            }
            Some(path) => solve_cnf_file(&path, &cli.common),
            None => Err("no input given; see --help".to_string()),
        },
    }
}

fn solve_cnf_file(path: &Path, common: &CommonOptions) -> Result<Outcome, String> {
    println!("Solving: {}", path.display());
    let parse_start = Instant::now();
    let cnf = parse_file(path).map_err(|e| e.to_string())?;
    info!("parsed {} in {:?}", path.display(), parse_start.elapsed());
    solve_and_report(&cnf, common, Some(path))
}

fn solve_sudoku(path: &Path, export_dimacs: bool, common: &CommonOptions) -> Result<Outcome, String> {
    let sudoku = Sudoku::from_file(path).map_err(|e| e.to_string())?;
    println!("Puzzle:\n{sudoku}");

    let cnf: Cnf<PackedLiteral> = sudoku.to_cnf();
    if export_dimacs {
        let out = path.with_extension("cnf");
        std::fs::write(&out, cnf.to_string()).map_err(|e| e.to_string())?;
        println!("Wrote DIMACS encoding to {}", out.display());
    }

    let (solutions, model, elapsed, stats) = dispatch::<MapAssignment>(&cnf, common)?;
    report(&cnf, common, solutions.as_ref(), &model, elapsed, stats)?;

    match solutions {
        Some(solutions) => {
            println!("{}", sudoku.decode(&solutions));
            Ok(Outcome::Sat)
        }
        None => {
            println!("There is no solution for this puzzle.");
            Ok(Outcome::Unsat)
        }
    }
}

fn solve_dir(path: &Path, common: &CommonOptions) -> Result<Outcome, String> {
    if !path.is_dir() {
        return Err(format!("not a directory: {}", path.display()));
    }

    for entry in walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
    {
        let file_path = entry.path();
        if !file_path.is_file() {
            continue;
        }
        match file_path.extension().and_then(|e| e.to_str()) {
            Some("sudoku") => {
                solve_sudoku(file_path, false, common)?;
            }
            Some("cnf") => {
                solve_cnf_file(file_path, common)?;
            }
            _ => {
                eprintln!("Skipping non-CNF file: {}", file_path.display());
            }
        }
        println!();
    }

    Ok(Outcome::Sat)
}

fn solve_and_report(
    cnf: &Cnf<PackedLiteral>,
    common: &CommonOptions,
    label: Option<&Path>,
) -> Result<Outcome, String> {
    if common.debug {
        if let Some(label) = label {
            println!("Problem: {}", label.display());
        }
        println!("CNF:\n{cnf}");
    }

    let (solutions, model, elapsed, stats) = dispatch::<VecAssignment>(cnf, common)?;
    report(cnf, common, solutions.as_ref(), &model, elapsed, stats)?;

    Ok(if solutions.is_some() {
        Outcome::Sat
    } else {
        Outcome::Unsat
    })
}

/// Runs the solver with the configured heuristic over the chosen
/// assignment backend.
fn dispatch<A: Assignment>(
    cnf: &Cnf<PackedLiteral>,
    common: &CommonOptions,
) -> Result<(Option<Solutions>, Model, Duration, SolutionStats), String> {
    match common.variable_selection {
        SelectorChoice::JeroslowWang => solve_with::<A, JeroslowWang>(cnf),
        SelectorChoice::FirstUnassigned => solve_with::<A, FirstUnassigned>(cnf),
    }
}

fn solve_with<A: Assignment, V: VariableSelection<PackedLiteral>>(
    cnf: &Cnf<PackedLiteral>,
) -> Result<(Option<Solutions>, Model, Duration, SolutionStats), String> {
    let start = Instant::now();
    let mut solver: Dpll<PackedLiteral, A, V> = Solver::new(cnf.clone());
    let solutions = solver.solve().map_err(|e| e.to_string())?;
    let elapsed = start.elapsed();
    Ok((solutions, solver.formula.model(), elapsed, solver.stats()))
}

fn report(
    cnf: &Cnf<PackedLiteral>,
    common: &CommonOptions,
    solutions: Option<&Solutions>,
    model: &Model,
    elapsed: Duration,
    stats: SolutionStats,
) -> Result<(), String> {
    match solutions {
        Some(solutions) => {
            println!("Formula is satisfiable");
            if common.verify {
                if !cnf.verify(solutions) {
                    return Err("solution failed verification".to_string());
                }
                println!("Verified: true");
            }
            if common.print_solution {
                print!("{model}");
            }
        }
        None => println!("Formula is unsatisfiable"),
    }

    if common.stats {
        print_stats(cnf, elapsed, stats);
    }
    Ok(())
}

fn stat_line(label: &str, value: impl Display) {
    println!("|  {label:<24} {value:>14}  |");
}

fn print_stats(cnf: &Cnf<PackedLiteral>, elapsed: Duration, stats: SolutionStats) {
    println!("+{}+", "-".repeat(43));
    stat_line("variables", cnf.num_vars());
    stat_line("clauses", cnf.len());
    stat_line("decisions", stats.decisions);
    stat_line("conflicts", stats.conflicts);
    stat_line("propagations", stats.propagations);
    stat_line("max depth", stats.max_depth);
    stat_line("time", format!("{elapsed:.2?}"));
    println!("+{}+", "-".repeat(43));
}
