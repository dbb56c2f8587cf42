use std::error::Error;
use std::fmt;

use chrono::prelude::*;

use crate::board::{Applied, Board, BoardError};
use crate::check::CheckResult;
use crate::fen::{FenError, STARTING_POSITION_FEN};
use crate::movegen;
use crate::types::*;

/// Whether the game is waiting on a promotion choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Regular,
    /// A pawn reached this square and needs a piece before the turn can finish
    AwaitingPromotion(Position),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Not a legal move for the side to move, nothing changed
    Ignored,
    Completed(Move),
    AwaitingPromotion(Position),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    AwaitingPromotion(Position),
    NoPromotionPending,
    InvalidPromotion(PieceType),
    Board(BoardError),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::AwaitingPromotion(at) => {
                write!(f, "the pawn on {at} is waiting for a promotion piece")
            }
            GameError::NoPromotionPending => write!(f, "no promotion is pending"),
            GameError::InvalidPromotion(piece_type) => {
                write!(f, "cannot promote to {}", piece_type.to_human())
            }
            GameError::Board(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GameError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GameError::Board(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BoardError> for GameError {
    fn from(err: BoardError) -> Self {
        GameError::Board(err)
    }
}

pub struct Game {
    board: Board,
    history: Vec<Move>,
    start_fen: String,
    start_fullmove: u32,
    game_start_time: DateTime<Local>,
}

impl Default for Game {
    fn default() -> Self {
        Game::from_board(Board::new())
    }
}

impl Game {
    pub fn new() -> Self {
        Game::default()
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Game::from_board(Board::from_fen(fen)?))
    }

    pub fn from_board(board: Board) -> Self {
        Self {
            start_fen: board.to_fen(),
            start_fullmove: board.fullmove_clock(),
            board,
            history: Vec::new(),
            game_start_time: Local::now(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn mode(&self) -> Mode {
        match self.board.pending_promotion() {
            Some(pending) => Mode::AwaitingPromotion(pending.at),
            None => Mode::Regular,
        }
    }

    /// Completed moves, oldest first
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn current_fen(&self) -> String {
        self.board.to_fen()
    }

    pub fn is_in_check(&self, color: Color) -> Result<CheckResult, GameError> {
        Ok(self.board.is_in_check(color)?)
    }

    /// Legal destinations for the piece on `at`. Empty unless that piece belongs to the
    /// side to move and no promotion is pending.
    pub fn legal_moves(&self, at: Position) -> Result<Vec<Position>, GameError> {
        if self.board.pending_promotion().is_some() {
            return Ok(Vec::new());
        }
        match self.board.piece_at(at) {
            Some(piece) if piece.color == self.board.active_color() => {
                Ok(self.board.legal_moves(at)?)
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Every legal (from, to) pair for the side to move
    pub fn all_legal_moves(&self) -> Result<Vec<(Position, Position)>, GameError> {
        if self.board.pending_promotion().is_some() {
            return Ok(Vec::new());
        }
        Ok(movegen::all_legal_moves(&self.board)?)
    }

    pub fn can_move(&self, from: Position, to: Position) -> bool {
        self.legal_moves(from)
            .is_ok_and(|moves| moves.contains(&to))
    }

    pub fn apply_move(&mut self, from: Position, to: Position) -> Result<MoveOutcome, GameError> {
        if let Some(pending) = self.board.pending_promotion() {
            return Err(GameError::AwaitingPromotion(pending.at));
        }
        if !self.legal_moves(from)?.contains(&to) {
            return Ok(MoveOutcome::Ignored);
        }

        match self.board.apply_move(from, to)? {
            Applied::Completed(m) => {
                self.history.push(m);
                Ok(MoveOutcome::Completed(m))
            }
            Applied::AwaitingPromotion(pending) => Ok(MoveOutcome::AwaitingPromotion(pending.at)),
        }
    }

    /// Finish a pending promotion. An invalid piece leaves the promotion pending.
    pub fn choose_promotion(&mut self, piece_type: PieceType) -> Result<Move, GameError> {
        if self.board.pending_promotion().is_none() {
            return Err(GameError::NoPromotionPending);
        }
        if !piece_type.can_promote_to() {
            return Err(GameError::InvalidPromotion(piece_type));
        }

        let m = self.board.complete_promotion(piece_type)?;
        self.history.push(m);
        Ok(m)
    }

    /// The moves played so far as numbered long algebraic notation under a short header
    pub fn to_move_list(&self) -> String {
        let mut list = String::new();
        list.push_str(&format!(
            "[Date \"{}\"]\n",
            self.game_start_time.format("%Y.%m.%d")
        ));
        if self.start_fen != STARTING_POSITION_FEN {
            list.push_str(&format!("[FEN \"{}\"]\n", self.start_fen));
        }
        list.push('\n');

        let mut move_number = self.start_fullmove;
        for (i, m) in self.history.iter().enumerate() {
            match m.piece.color {
                Color::White => list.push_str(&format!("{move_number}. ")),
                Color::Black if i == 0 => list.push_str(&format!("{move_number}... ")),
                Color::Black => {}
            }
            list.push_str(&m.to_long_algebraic());
            list.push(' ');
            if m.piece.color == Color::Black {
                move_number += 1;
            }
        }
        list.trim_end().to_string()
    }
}
