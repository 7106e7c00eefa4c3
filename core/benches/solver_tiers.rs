use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use minefield_core::*;

/// Boards right after the first open, when the oracle has the most work left.
fn opened_boards() -> Vec<(&'static str, BoardState)> {
    [
        ("beginner", Difficulty::Beginner),
        ("intermediate", Difficulty::Intermediate),
        ("expert", Difficulty::Expert),
    ]
    .into_iter()
    .map(|(name, difficulty)| {
        let config = difficulty
            .config()
            .expect("presets are valid")
            .with_seed(0xdec0de);
        let mut board = BoardState::new(config);
        open(&mut board, config.total_cells() as usize / 2).expect("first open succeeds");
        (name, board)
    })
    .collect()
}

fn deduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("solver_deduce");
    let oracle = SolverOracle::default();
    for (name, board) in opened_boards() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &board, |b, board| {
            b.iter(|| oracle.deduce(black_box(board)))
        });
    }
    group.finish();
}

fn deduce_with_mine_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("solver_deduce_global");
    let oracle = SolverOracle::new(AnalysisConfig {
        mine_count_usage: MineCountUsage::UseIfKnown,
        ..AnalysisConfig::default()
    });
    for (name, board) in opened_boards() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &board, |b, board| {
            b.iter(|| oracle.deduce(black_box(board)))
        });
    }
    group.finish();
}

fn assisted_play(c: &mut Criterion) {
    let mut group = c.benchmark_group("solver_assist");
    let assistant = FlagAssistant::new(AssistOptions {
        auto_flag: true,
        auto_open: true,
        ..AssistOptions::default()
    });
    for (name, board) in opened_boards() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &board, |b, board| {
            b.iter(|| {
                let mut board = board.clone();
                assistant.assist(&mut board)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, deduce, deduce_with_mine_count, assisted_play);
criterion_main!(benches);
