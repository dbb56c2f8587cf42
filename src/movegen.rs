use std::iter;

use crate::board::{Board, BoardError};
use crate::check::is_in_check;
use crate::types::*;

// (rank, file) steps
pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];
pub const KING_DIRECTIONS: [(i8, i8); 8] = QUEEN_DIRECTIONS;
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// Squares from `from` (exclusive) outward in `direction`, at most `limit` of them
fn walk(
    from: Position,
    direction: (i8, i8),
    limit: Option<usize>,
) -> impl Iterator<Item = Position> {
    let (by_rank, by_file) = direction;
    iter::successors(from.offset(by_rank, by_file), move |p| {
        p.offset(by_rank, by_file)
    })
    .take(limit.unwrap_or(usize::MAX))
}

/// Squares a piece of `color` on `from` can reach along `direction`: empty squares up to
/// the first occupied one, which is included only if it holds an enemy piece.
pub fn cast_ray(
    board: &Board,
    from: Position,
    color: Color,
    direction: (i8, i8),
    limit: Option<usize>,
) -> Vec<Position> {
    let mut squares = Vec::new();
    for position in walk(from, direction, limit) {
        match board.piece_at(position) {
            None => squares.push(position),
            Some(piece) => {
                if piece.color != color {
                    squares.push(position);
                }
                break;
            }
        }
    }
    squares
}

/// The first occupied square along `direction` and the piece on it
pub fn first_piece_along(
    board: &Board,
    from: Position,
    direction: (i8, i8),
    limit: Option<usize>,
) -> Option<(Position, Piece)> {
    walk(from, direction, limit)
        .find_map(|position| board.piece_at(position).map(|piece| (position, piece)))
}

/// Destinations for the piece on `position` ignoring whether its own king is left in
/// check. Castling squares are included, and those are already fully validated.
pub fn pseudo_legal_moves(board: &Board, position: Position) -> Vec<Position> {
    let Some(piece) = board.piece_at(position) else {
        return Vec::new();
    };
    let mut moves = piece_moves(board, position, piece);
    moves.extend(castling_moves(board, position));
    moves
}

/// Destinations for the piece on `position` that don't leave its own king in check.
/// Empty if the square is empty.
pub fn legal_moves(board: &Board, position: Position) -> Result<Vec<Position>, BoardError> {
    let Some(piece) = board.piece_at(position) else {
        return Ok(Vec::new());
    };

    let mut moves = Vec::new();
    for to in piece_moves(board, position, piece) {
        let simulated = board.simulate_move(position, to);
        if !is_in_check(&simulated, piece.color)?.in_check {
            moves.push(to);
        }
    }
    moves.extend(castling_moves(board, position));
    Ok(moves)
}

/// Every legal (from, to) pair for the side to move
pub fn all_legal_moves(board: &Board) -> Result<Vec<(Position, Position)>, BoardError> {
    let color = board.active_color();
    let mut moves = Vec::new();
    for (from, piece) in board.pieces() {
        if piece.color != color {
            continue;
        }
        for to in legal_moves(board, from)? {
            moves.push((from, to));
        }
    }
    Ok(moves)
}

// everything but castling
fn piece_moves(board: &Board, from: Position, piece: Piece) -> Vec<Position> {
    let (directions, limit): (&[(i8, i8)], Option<usize>) = match piece.piece_type {
        PieceType::Pawn => return pawn_moves(board, from, piece.color),
        PieceType::Rook => (&ROOK_DIRECTIONS[..], None),
        PieceType::Bishop => (&BISHOP_DIRECTIONS[..], None),
        PieceType::Queen => (&QUEEN_DIRECTIONS[..], None),
        PieceType::Knight => (&KNIGHT_OFFSETS[..], Some(1)),
        PieceType::King => (&KING_DIRECTIONS[..], Some(1)),
    };
    directions
        .iter()
        .flat_map(|&direction| cast_ray(board, from, piece.color, direction, limit))
        .collect()
}

fn pawn_moves(board: &Board, from: Position, color: Color) -> Vec<Position> {
    let direction = color.pawn_direction();
    let is_empty = |p: &Position| board.piece_at(*p).is_none();
    let mut moves = Vec::new();

    if let Some(one_step) = from.offset(direction, 0).filter(is_empty) {
        moves.push(one_step);
        if from.rank == color.pawn_starting_rank() {
            if let Some(two_step) = one_step.offset(direction, 0).filter(is_empty) {
                moves.push(two_step);
            }
        }
    }

    for file_step in [-1, 1] {
        let Some(target) = from.offset(direction, file_step) else {
            continue;
        };
        match board.piece_at(target) {
            Some(piece) if piece.color != color => moves.push(target),
            // only a target left by the opponent's double push can be taken en passant
            None if board.en_passant_target() == Some(target)
                && target.rank == color.en_passant_capture_rank() =>
            {
                moves.push(target)
            }
            _ => {}
        }
    }
    moves
}

/// Castling destinations for the king on `position`, kingside first.
///
/// Only the side to move can castle, and only with its king and rook on their home
/// squares, the right retained, the squares between them empty, and the king not in
/// check on its own square, the square it passes and the destination.
pub fn castling_moves(board: &Board, position: Position) -> Vec<Position> {
    let Some(king) = board.piece_at(position) else {
        return Vec::new();
    };
    let color = king.color;
    if king.piece_type != PieceType::King
        || color != board.active_color()
        || position != Position::new(color.home_rank(), File::E)
        || !is_safe(board, color)
    {
        return Vec::new();
    }

    CastlingSide::ALL
        .into_iter()
        .filter(|side| can_castle(board, position, color, *side))
        .map(|side| Position::new(position.rank, side.king_destination_file()))
        .collect()
}

fn can_castle(board: &Board, king: Position, color: Color, side: CastlingSide) -> bool {
    let rank = king.rank;
    if !board.castling_rights().get(color, side) {
        return false;
    }
    if board.piece_at(Position::new(rank, side.rook_home_file()))
        != Some(Piece::new(color, PieceType::Rook))
    {
        return false;
    }
    if side
        .between_files()
        .iter()
        .any(|&file| board.piece_at(Position::new(rank, file)).is_some())
    {
        return false;
    }

    // step the king towards its destination one square at a time
    let mut simulated = board.clone();
    let mut at = king;
    for _ in 0..2 {
        let Some(next) = at.offset(0, side.direction()) else {
            return false;
        };
        simulated = simulated.simulate_move(at, next);
        at = next;
        if !is_safe(&simulated, color) {
            return false;
        }
    }
    true
}

// a board we can't evaluate counts as unsafe
fn is_safe(board: &Board, color: Color) -> bool {
    is_in_check(board, color).is_ok_and(|result| !result.in_check)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pos(s: &str) -> Position {
        Position::from_algebraic(s).unwrap()
    }

    fn positions(squares: &[&str]) -> Vec<Position> {
        squares.iter().map(|s| pos(s)).collect()
    }

    fn legal(fen: &str, from: &str) -> Vec<Position> {
        legal_moves(&Board::from_fen(fen).unwrap(), pos(from)).unwrap()
    }

    #[test]
    fn test_starting_pawn_moves() {
        let b = Board::new();
        let moves = legal_moves(&b, pos("e2")).unwrap();
        assert_eq!(moves, positions(&["e3", "e4"]));
        assert!(!moves.contains(&pos("e5")));
    }

    #[test]
    fn test_starting_position_move_count() {
        let b = Board::new();
        assert_eq!(all_legal_moves(&b).unwrap().len(), 20);
        assert_eq!(legal_moves(&b, pos("b1")).unwrap(), positions(&["c3", "a3"]));
        assert!(legal_moves(&b, pos("e1")).unwrap().is_empty());
        assert!(legal_moves(&b, pos("e4")).unwrap().is_empty());
    }

    #[test]
    fn test_no_castling_from_start() {
        let b = Board::new();
        assert!(castling_moves(&b, pos("e1")).is_empty());
        let mut b = Board::new();
        b.active_color = Color::Black;
        assert!(castling_moves(&b, pos("e8")).is_empty());
    }

    #[test]
    fn test_blocked_pawn() {
        // . . . . ♚ . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . ♟︎ . . .
        // . . . . ♙ . . .
        // . . . . ♔ . . .
        assert!(legal("4k3/8/8/8/8/4p3/4P3/4K3 w - - 0 1", "e2").is_empty());
        // blocked two squares ahead, the single step is still there
        assert_eq!(legal("4k3/8/8/8/4p3/8/4P3/4K3 w - - 0 1", "e2"), positions(&["e3"]));
    }

    #[test]
    fn test_pawn_captures() {
        assert_eq!(
            legal("4k3/8/8/3r1n2/4P3/8/8/4K3 w - - 0 1", "e4"),
            positions(&["e5", "d5", "f5"])
        );
        // black pawns go down the board
        assert_eq!(
            legal("4k3/8/8/4p3/3N1B2/8/8/4K3 b - - 0 1", "e5"),
            positions(&["e4", "d4", "f4"])
        );
        // own pieces can't be captured
        assert_eq!(legal("4k3/8/8/3R4/4P3/8/8/4K3 w - - 0 1", "e4"), positions(&["e5"]));
    }

    #[test]
    fn test_en_passant_candidate() {
        assert_eq!(
            legal("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2", "e5"),
            positions(&["e6", "d6"])
        );
    }

    #[test]
    fn test_en_passant_target_of_own_color_ignored() {
        // d3 is on the e2 pawn's capture diagonal, but only black could take there
        assert_eq!(
            legal("4k3/8/8/8/3P4/8/4P3/4K3 w - d3 0 1", "e2"),
            positions(&["e3", "e4"])
        );
    }

    #[test]
    fn test_en_passant_exposing_king_filtered() {
        // taking on d6 would clear the whole fifth rank between the rook and the king
        // ♔ . . ♟︎ ♙ . . ♜
        assert_eq!(
            legal("8/8/8/K2pP2r/8/8/8/4k3 w - d6 0 2", "e5"),
            positions(&["e6"])
        );
    }

    #[test]
    fn test_sliding_pieces_stop_at_pieces() {
        let b = Board::from_fen("4k3/8/8/8/1p6/8/3R4/4K3 w - - 0 1").unwrap();
        assert_eq!(
            pseudo_legal_moves(&b, pos("d2")),
            positions(&["d3", "d4", "d5", "d6", "d7", "d8", "d1", "e2", "f2", "g2", "h2", "c2", "b2", "a2"])
        );
        let b = Board::from_fen("4k3/8/8/8/1p6/8/3B4/4K3 w - - 0 1").unwrap();
        assert_eq!(
            pseudo_legal_moves(&b, pos("d2")),
            positions(&["e3", "f4", "g5", "h6", "c3", "b4", "c1"])
        );
    }

    #[test]
    fn test_pinned_piece_filtered() {
        // . . . . ♜ . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . ♗ . . .
        // . . . . ♔ . . .
        let fen = "4r3/8/8/8/8/8/4B3/4K3 w - - 0 1";
        let b = Board::from_fen(fen).unwrap();
        assert!(!pseudo_legal_moves(&b, pos("e2")).is_empty());
        assert!(legal(fen, "e2").is_empty());

        // a pinned rook may still slide along the pin
        assert_eq!(
            legal("4r3/8/8/8/8/8/4R3/4K3 w - - 0 1", "e2"),
            positions(&["e3", "e4", "e5", "e6", "e7", "e8"])
        );
    }

    #[test]
    fn test_king_cannot_step_into_check() {
        assert_eq!(
            legal("4k3/8/8/8/8/8/8/3rK3 w - - 0 1", "e1"),
            positions(&["e2", "d1", "f2"])
        );
    }

    #[test]
    fn test_must_resolve_check() {
        // step off the first rank or block on f1
        let b = Board::from_fen("4k3/8/8/8/8/8/3N4/4K2r w - - 0 1").unwrap();
        let moves = all_legal_moves(&b).unwrap();
        assert_eq!(
            moves,
            vec![
                (pos("e1"), pos("e2")),
                (pos("e1"), pos("f2")),
                (pos("d2"), pos("f1")),
            ]
        );
    }

    #[test]
    fn test_legal_moves_without_king_errors() {
        let b = Board::from_fen("8/8/8/8/8/8/4R3/8 w - - 0 1").unwrap();
        assert_eq!(
            legal_moves(&b, pos("e2")),
            Err(BoardError::KingNotFound(Color::White))
        );
    }

    // Castling

    #[test]
    fn white_can_castle_both_sides_when_clear() {
        let b = Board::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        assert_eq!(castling_moves(&b, pos("e1")), positions(&["g1", "c1"]));
        let moves = legal_moves(&b, pos("e1")).unwrap();
        assert_eq!(moves, positions(&["f1", "d1", "g1", "c1"]));
    }

    #[test]
    fn black_can_castle_both_sides_when_clear() {
        let b = Board::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R b KQkq - 0 1").unwrap();
        assert_eq!(castling_moves(&b, pos("e8")), positions(&["g8", "c8"]));
        // not white's turn
        assert!(castling_moves(&b, pos("e1")).is_empty());
    }

    #[test]
    fn castling_needs_the_right() {
        let b = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w Kkq - 0 1").unwrap();
        assert_eq!(castling_moves(&b, pos("e1")), positions(&["g1"]));
        let b = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w Q - 0 1").unwrap();
        assert_eq!(castling_moves(&b, pos("e1")), positions(&["c1"]));
    }

    #[test]
    fn castling_needs_empty_squares_between() {
        let b = Board::from_fen("r3k2r/8/8/8/8/8/8/R2QK2R w KQkq - 0 1").unwrap();
        assert_eq!(castling_moves(&b, pos("e1")), positions(&["g1"]));
        // b1 isn't crossed by the king but still has to be empty
        let b = Board::from_fen("r3k2r/8/8/8/8/8/8/RN2K1NR w KQkq - 0 1").unwrap();
        assert!(castling_moves(&b, pos("e1")).is_empty());
    }

    #[test]
    fn castling_needs_the_rook() {
        let b = Board::from_fen("r3k2r/8/8/8/8/8/8/4K2R w KQkq - 0 1").unwrap();
        assert_eq!(castling_moves(&b, pos("e1")), positions(&["g1"]));
    }

    #[test]
    fn white_cannot_castle_queenside_through_check_d1_attacked() {
        // Black rook on d8 attacks d1, kingside stays available
        let b = Board::from_fen("2kr3r/1p2qp1p/p3bp2/2p1n2Q/4P3/1N2P3/PPP1B1PP/R3K2R w KQ - 5 17")
            .unwrap();
        assert_eq!(castling_moves(&b, pos("e1")), positions(&["g1"]));
    }

    #[test]
    fn white_cannot_castle_kingside_through_check_f1_attacked() {
        // Black bishop on c4 attacks f1
        let b = Board::from_fen("r3k2r/pppppppp/8/8/2b5/8/PPPP1PPP/R3K2R w KQkq - 0 1").unwrap();
        assert_eq!(castling_moves(&b, pos("e1")), positions(&["c1"]));
    }

    #[test]
    fn black_cannot_castle_queenside_through_check_d8_attacked() {
        let b = Board::from_fen("r3k2r/ppp1pppp/8/8/8/8/PPP1PPPP/3RK2R b Kkq - 0 1").unwrap();
        assert_eq!(castling_moves(&b, pos("e8")), positions(&["g8"]));
    }

    #[test]
    fn black_cannot_castle_kingside_through_check_f8_attacked() {
        let b = Board::from_fen("r3k2r/pppp2pp/8/2B5/8/8/PPPPPPPP/R3K2R b KQkq - 0 1").unwrap();
        assert_eq!(castling_moves(&b, pos("e8")), positions(&["c8"]));
    }

    #[test]
    fn white_cannot_castle_while_in_check() {
        let b = Board::from_fen("4r2k/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        assert!(castling_moves(&b, pos("e1")).is_empty());
        assert!(!legal_moves(&b, pos("e1")).unwrap().contains(&pos("g1")));
    }

    #[test]
    fn white_cannot_castle_into_check() {
        let b = Board::from_fen("6rk/8/8/8/8/8/PPPPPP1P/R3K2R w KQ - 0 1").unwrap();
        assert_eq!(castling_moves(&b, pos("e1")), positions(&["c1"]));
        let b = Board::from_fen("2r4k/8/8/8/8/8/PP1PPPPP/R3K2R w KQ - 0 1").unwrap();
        assert_eq!(castling_moves(&b, pos("e1")), positions(&["g1"]));
    }

    #[test]
    fn white_can_castle_queenside_when_b1_attacked() {
        // only the king's path matters, the rook may cross an attacked square
        let b = Board::from_fen("1r5k/8/8/8/8/8/P1PPPPPP/R3K2R w KQ - 0 1").unwrap();
        assert_eq!(castling_moves(&b, pos("e1")), positions(&["g1", "c1"]));
    }
}
