use itertools::Itertools;

use crate::board::{Board, BoardError};
use crate::movegen::{
    first_piece_along, BISHOP_DIRECTIONS, KING_DIRECTIONS, KNIGHT_OFFSETS, ROOK_DIRECTIONS,
};
use crate::types::{Color, PieceType, Position};

/// Whether the king of `color` is attacked, and from where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub color: Color,
    pub in_check: bool,
    pub king: Position,
    /// Squares of the enemy pieces attacking the king, in the order they were found
    pub attacking_pieces: Vec<Position>,
}

/// Look outward from the king of `color` along every line an attacker could use and
/// collect the enemy pieces found there.
///
/// Fails when `color` doesn't have exactly one king on the board.
pub fn is_in_check(board: &Board, color: Color) -> Result<CheckResult, BoardError> {
    let king = board.find_king(color)?;
    let pawn_attacks: [(i8, i8); 2] = [
        (color.pawn_direction(), -1),
        (color.pawn_direction(), 1),
    ];

    // (directions, max distance, pieces that attack along them)
    let lines: [(&[(i8, i8)], Option<usize>, &[PieceType]); 5] = [
        (
            &ROOK_DIRECTIONS,
            None,
            &[PieceType::Rook, PieceType::Queen],
        ),
        (
            &BISHOP_DIRECTIONS,
            None,
            &[PieceType::Bishop, PieceType::Queen],
        ),
        (&KNIGHT_OFFSETS, Some(1), &[PieceType::Knight]),
        (&KING_DIRECTIONS, Some(1), &[PieceType::King]),
        (&pawn_attacks, Some(1), &[PieceType::Pawn]),
    ];

    let attacking_pieces: Vec<Position> = lines
        .iter()
        .flat_map(|(directions, limit, attackers)| {
            directions.iter().filter_map(move |&direction| {
                let (position, piece) = first_piece_along(board, king, direction, *limit)?;
                (piece.color != color && attackers.contains(&piece.piece_type))
                    .then_some(position)
            })
        })
        .unique()
        .collect();

    Ok(CheckResult {
        color,
        in_check: !attacking_pieces.is_empty(),
        king,
        attacking_pieces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pos(s: &str) -> Position {
        Position::from_algebraic(s).unwrap()
    }

    fn check(fen: &str, color: Color) -> CheckResult {
        is_in_check(&Board::from_fen(fen).unwrap(), color).unwrap()
    }

    #[test]
    fn test_starting_position_not_in_check() {
        let b = Board::new();
        for color in [Color::White, Color::Black] {
            let result = is_in_check(&b, color).unwrap();
            assert!(!result.in_check);
            assert!(result.attacking_pieces.is_empty());
        }
    }

    #[test]
    fn test_rook_gives_check() {
        // . . . . ♜ . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . ♔ . . .
        let result = check("4r3/8/8/8/8/8/8/4K3 w - - 0 1", Color::White);
        assert_eq!(
            result,
            CheckResult {
                color: Color::White,
                in_check: true,
                king: pos("e1"),
                attacking_pieces: vec![pos("e8")],
            }
        );
    }

    #[test]
    fn test_blocked_rook_no_check() {
        let result = check("4r3/8/8/8/4P3/8/8/4K3 w - - 0 1", Color::White);
        assert!(!result.in_check);
        // own piece blocking works the same as an enemy one that can't attack
        let result = check("4r3/8/8/8/4n3/8/8/4K3 w - - 0 1", Color::White);
        assert!(!result.in_check);
    }

    #[test]
    fn test_diagonal_attackers() {
        let result = check("8/8/8/8/q7/8/8/4K3 w - - 0 1", Color::White);
        assert!(!result.in_check);
        let result = check("8/8/8/q7/8/8/8/4K3 w - - 0 1", Color::White);
        assert_eq!(result.attacking_pieces, vec![pos("a5")]);
        let result = check("8/8/8/8/1b6/8/8/4K3 w - - 0 1", Color::White);
        assert_eq!(result.attacking_pieces, vec![pos("b4")]);
        // a bishop can't attack along a rank
        let result = check("8/8/8/8/8/8/8/4K2b w - - 0 1", Color::White);
        assert!(!result.in_check);
    }

    #[test]
    fn test_knight_check() {
        let result = check("8/8/8/8/8/5n2/8/4K3 w - - 0 1", Color::White);
        assert_eq!(result.attacking_pieces, vec![pos("f3")]);
        let result = check("8/8/8/8/8/4n3/8/4K3 w - - 0 1", Color::White);
        assert!(!result.in_check);
    }

    #[test]
    fn test_pawn_check_direction() {
        // black pawn in front of the white king attacks diagonally down
        let result = check("8/8/8/8/8/8/3p4/4K3 w - - 0 1", Color::White);
        assert_eq!(result.attacking_pieces, vec![pos("d2")]);
        // black pawn behind the white king does not
        let result = check("8/8/8/8/8/4K3/3p4/8 w - - 0 1", Color::White);
        assert!(!result.in_check);
        // white pawn attacking the black king
        let result = check("8/8/8/4k3/5P2/8/8/8 b - - 0 1", Color::Black);
        assert_eq!(result.attacking_pieces, vec![pos("f4")]);
    }

    #[test]
    fn test_double_check() {
        let result = check("4r3/8/8/8/8/5n2/8/4K3 w - - 0 1", Color::White);
        assert_eq!(result.attacking_pieces, vec![pos("e8"), pos("f3")]);
    }

    #[test]
    fn test_missing_king_errors() {
        let b = Board::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(
            is_in_check(&b, Color::Black),
            Err(BoardError::KingNotFound(Color::Black))
        );
    }
}
