use std::error::Error;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use once_cell::sync::Lazy;

use crate::check::{self, CheckResult};
use crate::fen::{self, FenError};
use crate::movegen;
use crate::types::*;

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

static STARTING_BOARD: Lazy<Board> = Lazy::new(|| {
    let mut squares = Squares::empty();
    for (file, piece_type) in File::ALL.into_iter().zip(BACK_RANK) {
        for color in [Color::White, Color::Black] {
            squares[Position::new(color.home_rank(), file)] = Some(Piece::new(color, piece_type));
            squares[Position::new(color.pawn_starting_rank(), file)] =
                Some(Piece::new(color, PieceType::Pawn));
        }
    }
    Board {
        squares,
        active_color: Color::White,
        castling_rights: CastlingRights::all(),
        en_passant_target: None,
        halfmove_clock: 0,
        fullmove_clock: 1,
        pending_promotion: None,
    }
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    NoPieceAt(Position),
    KingNotFound(Color),
    MultipleKings(Color),
    /// The pawn on this square must be promoted before anything else moves
    PromotionPending(Position),
    NoPromotionPending,
    InvalidPromotion(PieceType),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::NoPieceAt(position) => write!(f, "no piece at {position}"),
            BoardError::KingNotFound(color) => write!(f, "no {color} king on the board"),
            BoardError::MultipleKings(color) => write!(f, "more than one {color} king on the board"),
            BoardError::PromotionPending(position) => {
                write!(f, "the pawn on {position} is waiting for a promotion piece")
            }
            BoardError::NoPromotionPending => write!(f, "no promotion is pending"),
            BoardError::InvalidPromotion(piece_type) => {
                write!(f, "cannot promote to {}", piece_type.to_human())
            }
        }
    }
}

impl Error for BoardError {}

/// The 64 squares, addressed by `Position`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Squares([Option<Piece>; 64]);

impl Squares {
    pub fn empty() -> Self {
        Squares([None; 64])
    }

    pub fn set(&mut self, position: Position, piece: Option<Piece>) {
        self[position] = piece;
    }

    pub fn take(&mut self, position: Position) -> Option<Piece> {
        self[position].take()
    }

    /// Occupied squares, rank 1 to 8 and file a to h
    pub fn iter(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(|position| self[position].map(|piece| (position, piece)))
    }
}

impl Index<Position> for Squares {
    type Output = Option<Piece>;

    fn index(&self, position: Position) -> &Self::Output {
        &self.0[position.index()]
    }
}

impl IndexMut<Position> for Squares {
    fn index_mut(&mut self, position: Position) -> &mut Self::Output {
        &mut self.0[position.index()]
    }
}

/// A pawn that reached the far rank and is waiting for the promotion piece.
/// The pawn has already left the board and `at` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPromotion {
    pub pawn: Piece,
    pub from: Position,
    pub at: Position,
    pub captured: Option<Piece>,
}

/// Result of `Board::apply_move`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Completed(Move),
    AwaitingPromotion(PendingPromotion),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub(crate) squares: Squares,
    // who's move it is
    pub(crate) active_color: Color,
    pub(crate) castling_rights: CastlingRights,
    pub(crate) en_passant_target: Option<Position>,
    // number of half moves since last capture or pawn advance
    pub(crate) halfmove_clock: u32,
    // number of full moves. Starts at 1, and gets incremented after every black move
    pub(crate) fullmove_clock: u32,
    // set between `apply_move` moving a pawn to the far rank and `complete_promotion`
    pub(crate) pending_promotion: Option<PendingPromotion>,
}

impl Default for Board {
    fn default() -> Self {
        STARTING_BOARD.clone()
    }
}

impl Board {
    /// The standard starting position
    pub fn new() -> Board {
        Board::default()
    }

    pub fn from_fen(fen_string: &str) -> Result<Board, FenError> {
        fen::parse(fen_string)
    }

    pub fn to_fen(&self) -> String {
        fen::serialize(self)
    }

    pub fn piece_at(&self, position: Position) -> Option<Piece> {
        self.squares[position]
    }

    /// All pieces with their squares
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.squares.iter()
    }

    /// Get the color of the side to move
    pub fn active_color(&self) -> Color {
        self.active_color
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    pub fn en_passant_target(&self) -> Option<Position> {
        self.en_passant_target
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_clock(&self) -> u32 {
        self.fullmove_clock
    }

    pub fn pending_promotion(&self) -> Option<PendingPromotion> {
        self.pending_promotion
    }

    /// Square of the single king of `color`
    pub fn find_king(&self, color: Color) -> Result<Position, BoardError> {
        let king = Piece::new(color, PieceType::King);
        let mut kings = self
            .pieces()
            .filter(|(_, piece)| *piece == king)
            .map(|(position, _)| position);
        match (kings.next(), kings.next()) {
            (Some(position), None) => Ok(position),
            (None, _) => Err(BoardError::KingNotFound(color)),
            (Some(_), Some(_)) => Err(BoardError::MultipleKings(color)),
        }
    }

    pub fn is_in_check(&self, color: Color) -> Result<CheckResult, BoardError> {
        check::is_in_check(self, color)
    }

    pub fn legal_moves(&self, position: Position) -> Result<Vec<Position>, BoardError> {
        movegen::legal_moves(self, position)
    }

    /// Copy of the board with the piece on `from` moved to `to`, removing whatever it captures
    /// (including an en passant victim). Castling rights, clocks and turn are left untouched;
    /// this is only meant for asking whether a king would be attacked afterwards.
    pub fn simulate_move(&self, from: Position, to: Position) -> Board {
        let mut board = self.clone();
        let Some(piece) = board.squares.take(from) else {
            return board;
        };
        if piece.piece_type == PieceType::Pawn
            && from.file != to.file
            && board.squares[to].is_none()
            && board.en_passant_target == Some(to)
        {
            if let Some(victim) = to.offset(-piece.color.pawn_direction(), 0) {
                if board.squares[victim]
                    .is_some_and(|p| p.color != piece.color && p.piece_type == PieceType::Pawn)
                {
                    board.squares.take(victim);
                }
            }
        }
        board.squares[to] = Some(piece);
        board
    }

    /// Move the piece on `from` to `to` with all side effects: captures, en passant,
    /// castling rook relocation, castling right and en passant target bookkeeping,
    /// clocks and turn.
    ///
    /// A pawn reaching the far rank is taken off the board and the move is left pending
    /// until `complete_promotion` is called; turn and clocks are not updated until then,
    /// and every other move is refused with `BoardError::PromotionPending`.
    ///
    /// No legality check happens here, see `movegen::legal_moves`.
    pub fn apply_move(&mut self, from: Position, to: Position) -> Result<Applied, BoardError> {
        if let Some(pending) = self.pending_promotion {
            return Err(BoardError::PromotionPending(pending.at));
        }
        let piece = self.squares.take(from).ok_or(BoardError::NoPieceAt(from))?;
        let color = piece.color;
        let is_pawn = piece.piece_type == PieceType::Pawn;
        let mut move_flag = MoveFlag::Regular;

        // whatever stood on the destination is overwritten
        let mut captured = self.squares.take(to);

        if is_pawn
            && from.file != to.file
            && captured.is_none()
            && self.en_passant_target == Some(to)
        {
            if let Some(victim) = to.offset(-color.pawn_direction(), 0) {
                if self.squares[victim]
                    .is_some_and(|p| p.color != color && p.piece_type == PieceType::Pawn)
                {
                    captured = self.squares.take(victim);
                    move_flag = MoveFlag::EnPassantCapture;
                }
            }
        }

        if let Some(captured_piece) = captured {
            if captured_piece.piece_type == PieceType::Rook {
                self.castling_rights
                    .remove_for_rook_square(captured_piece.color, to);
            }
        }

        self.en_passant_target = None;
        if is_pawn && (i16::from(to.rank.value()) - i16::from(from.rank.value())).abs() == 2 {
            if let Some(target) = from.offset(color.pawn_direction(), 0) {
                self.en_passant_target = Some(target);
                move_flag = MoveFlag::DoublePawnPush(target);
            }
        }

        match piece.piece_type {
            PieceType::King => {
                self.castling_rights.clear(color);
                let file_delta = i16::from(to.file.value()) - i16::from(from.file.value());
                if file_delta.abs() == 2 {
                    let side = if file_delta > 0 {
                        CastlingSide::Kingside
                    } else {
                        CastlingSide::Queenside
                    };
                    let rook_from = Position::new(from.rank, side.rook_home_file());
                    let rook_to = Position::new(from.rank, side.rook_destination_file());
                    if let Some(rook) = self.squares.take(rook_from) {
                        self.squares[rook_to] = Some(rook);
                    }
                    move_flag = side.move_flag();
                }
            }
            PieceType::Rook => self.castling_rights.remove_for_rook_square(color, from),
            _ => {}
        }

        if is_pawn && to.rank == color.promotion_rank() {
            let pending = PendingPromotion {
                pawn: piece,
                from,
                at: to,
                captured,
            };
            self.pending_promotion = Some(pending);
            return Ok(Applied::AwaitingPromotion(pending));
        }

        self.squares[to] = Some(piece);
        if is_pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        self.finish_turn();

        Ok(Applied::Completed(Move {
            piece,
            from,
            to,
            captured,
            move_flag,
        }))
    }

    /// Place the chosen piece for the pawn left pending by `apply_move` and finish the turn.
    /// An invalid piece leaves the promotion pending.
    pub fn complete_promotion(&mut self, piece_type: PieceType) -> Result<Move, BoardError> {
        let pending = self
            .pending_promotion
            .ok_or(BoardError::NoPromotionPending)?;
        if !piece_type.can_promote_to() {
            return Err(BoardError::InvalidPromotion(piece_type));
        }

        self.squares[pending.at] = Some(Piece::new(pending.pawn.color, piece_type));
        self.pending_promotion = None;
        self.halfmove_clock = 0;
        self.finish_turn();

        Ok(Move {
            piece: pending.pawn,
            from: pending.from,
            to: pending.at,
            captured: pending.captured,
            move_flag: MoveFlag::Promotion(piece_type),
        })
    }

    fn finish_turn(&mut self) {
        if self.active_color == Color::Black {
            self.fullmove_clock = self.fullmove_clock.saturating_add(1);
        }
        self.active_color = self.active_color.other_color();
    }

    pub fn draw_board(&self) -> String {
        let mut string = String::new();

        for rank in Rank::ALL.into_iter().rev() {
            string.push(rank.to_char());
            for file in File::ALL {
                string.push(' ');
                match self.piece_at(Position::new(rank, file)) {
                    Some(piece) => string.push_str(piece.to_symbol()),
                    None => string.push('.'),
                }
            }
            string.push('\n');
        }
        string.push_str("  a b c d e f g h\n");
        string
    }

    pub fn draw_to_terminal(&self) {
        println!("{}", self.draw_board());
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

impl FromStr for Board {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::from_fen(s)
    }
}
