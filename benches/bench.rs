use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use sudoku_sat::sat::assignment::{MapAssignment, VecAssignment};
use sudoku_sat::sat::cnf::Cnf;
use sudoku_sat::sat::dimacs::parse_dimacs_text;
use sudoku_sat::sat::dpll::Dpll;
use sudoku_sat::sat::literal::PackedLiteral;
use sudoku_sat::sat::solver::Solver;
use sudoku_sat::sudoku::solver::{Board, Sudoku, EXAMPLE_PUZZLE};

fn bench_sudoku(c: &mut Criterion) {
    let board = Board::new(EXAMPLE_PUZZLE.iter().map(|r| r.to_vec()).collect()).unwrap();
    let sudoku = Sudoku::new(board);
    let cnf: Cnf<PackedLiteral> = sudoku.to_cnf();

    c.bench_function("sudoku - vec assignment", |b| {
        b.iter(|| {
            let mut solver: Dpll<PackedLiteral, VecAssignment> = Solver::new(cnf.clone());
            black_box(solver.solve().unwrap());
        })
    });

    c.bench_function("sudoku - map assignment", |b| {
        b.iter(|| {
            let mut solver: Dpll<PackedLiteral, MapAssignment> = Solver::new(cnf.clone());
            black_box(solver.solve().unwrap());
        })
    });
}

fn bench_pigeonhole(c: &mut Criterion) {
    let text = "p cnf 6 9\n\
                1 2 0\n3 4 0\n5 6 0\n\
                -1 -3 0\n-1 -5 0\n-3 -5 0\n\
                -2 -4 0\n-2 -6 0\n-4 -6 0\n";
    let cnf: Cnf<PackedLiteral> = parse_dimacs_text(text).unwrap();

    c.bench_function("pigeonhole 3 into 2", |b| {
        b.iter(|| {
            let mut solver: Dpll<PackedLiteral, VecAssignment> = Solver::new(cnf.clone());
            black_box(solver.solve().unwrap());
        })
    });
}

criterion_group!(benches, bench_sudoku, bench_pigeonhole);
criterion_main!(benches);
