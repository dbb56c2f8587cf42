//! Forsyth–Edwards Notation.
//!
//! A FEN record holds six space separated fields:
//!
//! 1. Piece placement, rank 8 first and rank 1 last, files a to h within each rank.
//!    White pieces are uppercase (`PNBRQK`), black pieces lowercase. Digits 1 to 8
//!    count empty squares and `/` separates ranks.
//! 2. Active color, `w` or `b`.
//! 3. Castling availability, `-` or any of `K`, `Q`, `k`, `q`.
//! 4. En passant target square in algebraic notation, or `-`.
//! 5. Halfmove clock, half moves since the last capture or pawn advance.
//! 6. Fullmove number, starts at 1 and is incremented after Black's move.

use std::error::Error;
use std::fmt;

use itertools::Itertools;

use crate::board::{Board, Squares};
use crate::types::{CastlingRights, Color, File, Piece, Position, Rank};

pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const FIELD_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    InvalidRankCount(String),
    InvalidRowCount(String),
    ConsecutiveNumbers(String),
    MalformedField(String),
}

/// `FenError` without its detail text, for callers that only care which rule was broken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FenErrorKind {
    InvalidRankCount,
    InvalidRowCount,
    ConsecutiveNumbers,
    MalformedField,
}

impl FenError {
    pub fn kind(&self) -> FenErrorKind {
        match self {
            FenError::InvalidRankCount(_) => FenErrorKind::InvalidRankCount,
            FenError::InvalidRowCount(_) => FenErrorKind::InvalidRowCount,
            FenError::ConsecutiveNumbers(_) => FenErrorKind::ConsecutiveNumbers,
            FenError::MalformedField(_) => FenErrorKind::MalformedField,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            FenError::InvalidRankCount(detail)
            | FenError::InvalidRowCount(detail)
            | FenError::ConsecutiveNumbers(detail)
            | FenError::MalformedField(detail) => detail,
        }
    }
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind() {
            FenErrorKind::InvalidRankCount => "invalid rank count",
            FenErrorKind::InvalidRowCount => "invalid row count",
            FenErrorKind::ConsecutiveNumbers => "consecutive numbers",
            FenErrorKind::MalformedField => "malformed field",
        };
        write!(f, "{kind}: {}", self.detail())
    }
}

impl Error for FenError {}

/// Parse a FEN record into a board.
pub fn parse(fen: &str) -> Result<Board, FenError> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() != FIELD_COUNT {
        return Err(FenError::MalformedField(format!(
            "Fen string must have {FIELD_COUNT} fields, space delimited, found: {}",
            fields.len()
        )));
    }

    let squares = parse_placement(fields[0])?;
    let active_color = parse_active_color(fields[1])?;
    let castling_rights = parse_castling(fields[2])?;
    let en_passant_target = parse_en_passant(fields[3])?;
    // clocks are lenient, anything that isn't a number falls back to the start value
    let halfmove_clock: u32 = fields[4].parse().unwrap_or(0);
    let fullmove_clock: u32 = fields[5].parse().unwrap_or(1);

    Ok(Board {
        squares,
        active_color,
        castling_rights,
        en_passant_target,
        halfmove_clock,
        fullmove_clock,
        pending_promotion: None,
    })
}

// The values here go from:
// Files: a -> h
// Ranks: 8 -> 1
fn parse_placement(placement: &str) -> Result<Squares, FenError> {
    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() != 8 {
        return Err(FenError::InvalidRankCount(format!(
            "Invalid rank count, found: {}, expected: 8",
            rows.len()
        )));
    }

    let mut squares = Squares::empty();
    for (rank, row) in Rank::ALL.into_iter().rev().zip(rows) {
        let mut count: u32 = 0;
        let mut previous_was_number = false;
        for c in row.chars() {
            if let Some(empty) = c.to_digit(10) {
                if !(1..=8).contains(&empty) {
                    return Err(FenError::MalformedField(format!(
                        "Invalid empty square count: {c}"
                    )));
                }
                if previous_was_number {
                    return Err(FenError::ConsecutiveNumbers(format!(
                        "Unexpected consecutive number: {c}"
                    )));
                }
                count += empty;
                previous_was_number = true;
            } else if let Some(piece) = Piece::from_fen_char(c) {
                count += 1;
                // overlong rows are reported once the whole row has been counted
                if let Some(file) = u8::try_from(count).ok().and_then(File::new) {
                    squares.set(Position::new(rank, file), Some(piece));
                }
                previous_was_number = false;
            } else {
                return Err(FenError::MalformedField(format!(
                    "Unexpected char {c} in position string"
                )));
            }
        }
        if count != 8 {
            return Err(FenError::InvalidRowCount(format!(
                "Invalid count for row, got: {count}"
            )));
        }
    }
    Ok(squares)
}

fn parse_active_color(field: &str) -> Result<Color, FenError> {
    let mut chars = field.chars();
    match (chars.next().and_then(Color::from_char), chars.next()) {
        (Some(color), None) => Ok(color),
        _ => Err(FenError::MalformedField(format!(
            "Color string must be either `b` or `w`, found: {field}"
        ))),
    }
}

fn parse_castling(field: &str) -> Result<CastlingRights, FenError> {
    let mut rights = CastlingRights::none();
    if field == "-" {
        return Ok(rights);
    }
    for c in field.chars() {
        match c {
            'K' => rights.white_kingside = true,
            'Q' => rights.white_queenside = true,
            'k' => rights.black_kingside = true,
            'q' => rights.black_queenside = true,
            _ => {
                return Err(FenError::MalformedField(format!(
                    "Unknown castling availability char: {c}"
                )))
            }
        }
    }
    Ok(rights)
}

fn parse_en_passant(field: &str) -> Result<Option<Position>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    Position::from_algebraic(field).map(Some).ok_or_else(|| {
        FenError::MalformedField(format!("Invalid en passant target value: {field}"))
    })
}

/// Write `board` as a FEN record.
pub fn serialize(board: &Board) -> String {
    let placement = Rank::ALL
        .into_iter()
        .rev()
        .map(|rank| serialize_rank(board, rank))
        .join("/");
    let en_passant = board
        .en_passant_target()
        .map_or_else(|| "-".to_string(), |p| p.to_algebraic());
    format!(
        "{} {} {} {} {} {}",
        placement,
        board.active_color().to_char(),
        board.castling_rights(),
        en_passant,
        board.halfmove_clock(),
        board.fullmove_clock(),
    )
}

fn serialize_rank(board: &Board, rank: Rank) -> String {
    let mut row = String::new();
    let mut empty = 0;
    for file in File::ALL {
        match board.piece_at(Position::new(rank, file)) {
            Some(piece) => {
                if empty > 0 {
                    row.push_str(&empty.to_string());
                    empty = 0;
                }
                row.push(piece.to_fen_char());
            }
            None => empty += 1,
        }
    }
    if empty > 0 {
        row.push_str(&empty.to_string());
    }
    row
}
