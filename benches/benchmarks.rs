use criterion::{black_box, criterion_group, criterion_main, Criterion};
use chess_rules::board::Board;
use chess_rules::fen::STARTING_POSITION_FEN;
use chess_rules::movegen::all_legal_moves;
use chess_rules::perft::perft;

const KIWIPETE_FEN: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";


pub fn bench_legal_moves_from_start(c: &mut Criterion) {
    let bo = Board::new();
    c.bench_function("get legal moves from start", |b| {
        b.iter(|| all_legal_moves(black_box(&bo)))
    });
}

pub fn bench_legal_moves_from_kiwipete(c: &mut Criterion) {
    let bo = Board::from_fen(KIWIPETE_FEN).unwrap();
    c.bench_function("get legal moves from kiwipete", |b| {
        b.iter(|| all_legal_moves(black_box(&bo)))
    });
}

pub fn bench_fen_round_trip(c: &mut Criterion) {
    c.bench_function("parse and serialize fen", |b| {
        b.iter(|| Board::from_fen(black_box(KIWIPETE_FEN)).map(|bo| bo.to_fen()))
    });
    c.bench_function("parse starting fen", |b| {
        b.iter(|| Board::from_fen(black_box(STARTING_POSITION_FEN)))
    });
}

pub fn bench_perft_3(c: &mut Criterion) {
    let mut group = c.benchmark_group("flat-sampling");
    group.sample_size(10);

    let bo = Board::new();
    group.bench_function("perft from start 3 ply", |b| {
        b.iter(|| perft(black_box(&bo), black_box(3)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_legal_moves_from_start,
    bench_legal_moves_from_kiwipete,
    bench_fen_round_trip,
    bench_perft_3,
);
criterion_main!(benches);
