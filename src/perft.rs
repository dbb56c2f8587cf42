use rayon::prelude::*;

use crate::board::{Applied, Board, BoardError};
use crate::movegen::all_legal_moves;
use crate::types::{Move, Position, PIECES_CAN_PROMOTE_TO};

/// Count the leaf nodes of the legal move tree `depth` plies deep.
///
/// A promotion counts once per piece it can promote to.
pub fn perft(board: &Board, depth: u8) -> Result<u64, BoardError> {
    if depth == 0 {
        return Ok(1);
    }

    let mut nodes = 0;
    for (from, to) in all_legal_moves(board)? {
        for (_, child) in play_out(board, from, to)? {
            nodes += perft(&child, depth - 1)?;
        }
    }
    Ok(nodes)
}

/// Node count below each root move, sorted by the move's long algebraic form.
/// Root moves are searched in parallel. Depth 0 has no root moves to divide by.
pub fn perft_divide(board: &Board, depth: u8) -> Result<Vec<(String, u64)>, BoardError> {
    if depth == 0 {
        return Ok(Vec::new());
    }
    let root_moves = all_legal_moves(board)?;
    let per_move: Vec<Vec<(String, u64)>> = root_moves
        .par_iter()
        .map(|&(from, to)| {
            play_out(board, from, to)?
                .into_iter()
                .map(|(m, child)| -> Result<(String, u64), BoardError> {
                    let nodes = perft(&child, depth - 1)?;
                    Ok((m.to_long_algebraic(), nodes))
                })
                .collect::<Result<Vec<_>, BoardError>>()
        })
        .collect::<Result<_, _>>()?;

    let mut divided: Vec<(String, u64)> = per_move.into_iter().flatten().collect();
    divided.sort();
    Ok(divided)
}

// every board that can follow from playing `from` -> `to`, one per promotion choice
fn play_out(
    board: &Board,
    from: Position,
    to: Position,
) -> Result<Vec<(Move, Board)>, BoardError> {
    let mut next = board.clone();
    match next.apply_move(from, to)? {
        Applied::Completed(m) => Ok(vec![(m, next)]),
        Applied::AwaitingPromotion(_) => PIECES_CAN_PROMOTE_TO
            .iter()
            .map(|&piece_type| -> Result<(Move, Board), BoardError> {
                let mut promoted = next.clone();
                let m = promoted.complete_promotion(piece_type)?;
                Ok((m, promoted))
            })
            .collect(),
    }
}
