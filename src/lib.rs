pub mod types;
pub mod fen;
pub mod board;
pub mod check;
pub mod movegen;
pub mod game;
pub mod perft;
