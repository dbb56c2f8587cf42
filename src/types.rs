use std::error::Error;
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn from_char(c: char) -> Option<Color> {
        match c {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }

    /// Uppercase letters are white, everything else is black
    pub fn from_case(c: char) -> Color {
        if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        }
    }

    pub fn to_char(&self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }

    pub fn other_color(&self) -> Color {
        if *self == Color::White {
            Color::Black
        } else {
            Color::White
        }
    }

    pub fn to_human(&self) -> &str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }

    /// Direction of pawn movement along the ranks
    pub fn pawn_direction(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Rank the king and rooks start on
    pub fn home_rank(&self) -> Rank {
        match self {
            Color::White => Rank::One,
            Color::Black => Rank::Eight,
        }
    }

    /// Starting rank for pawns of given color
    pub fn pawn_starting_rank(&self) -> Rank {
        match self {
            Color::White => Rank::Two,
            Color::Black => Rank::Seven,
        }
    }

    pub fn promotion_rank(&self) -> Rank {
        match self {
            Color::White => Rank::Eight,
            Color::Black => Rank::One,
        }
    }

    /// Rank of the en passant targets a pawn of this color may capture onto
    pub fn en_passant_capture_rank(&self) -> Rank {
        match self {
            Color::White => Rank::Six,
            Color::Black => Rank::Three,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_human())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum PieceType {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl PieceType {
    pub fn from_char(c: char) -> Option<PieceType> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceType::Pawn),
            'r' => Some(PieceType::Rook),
            'n' => Some(PieceType::Knight),
            'b' => Some(PieceType::Bishop),
            'q' => Some(PieceType::Queen),
            'k' => Some(PieceType::King),
            _ => None,
        }
    }

    pub fn can_promote_to(&self) -> bool {
        PIECES_CAN_PROMOTE_TO.contains(self)
    }

    pub fn to_human(&self) -> &str {
        match self {
            Self::Pawn => "pawn",
            Self::Rook => "rook",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Queen => "queen",
            Self::King => "king",
        }
    }

    pub fn to_char(&self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Rook => 'R',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }
}

pub const PIECES_CAN_PROMOTE_TO: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Piece {
    pub color: Color,
    pub piece_type: PieceType,
}

impl Piece {
    pub fn new(color: Color, piece_type: PieceType) -> Self {
        Self { color, piece_type }
    }

    pub fn from_fen_char(c: char) -> Option<Piece> {
        let piece_type = PieceType::from_char(c)?;
        Some(Piece {
            color: Color::from_case(c),
            piece_type,
        })
    }

    pub fn to_fen_char(&self) -> char {
        match self.color {
            Color::White => self.piece_type.to_char(),
            Color::Black => self.piece_type.to_char().to_ascii_lowercase(),
        }
    }

    pub fn to_symbol(&self) -> &str {
        match (self.color, self.piece_type) {
            (Color::White, PieceType::Pawn) => "♙",
            (Color::White, PieceType::Rook) => "♖",
            (Color::White, PieceType::Knight) => "♘",
            (Color::White, PieceType::Bishop) => "♗",
            (Color::White, PieceType::Queen) => "♕",
            (Color::White, PieceType::King) => "♔",
            (Color::Black, PieceType::Pawn) => "♟︎",
            (Color::Black, PieceType::Rook) => "♜",
            (Color::Black, PieceType::Knight) => "♞",
            (Color::Black, PieceType::Bishop) => "♝",
            (Color::Black, PieceType::Queen) => "♛",
            (Color::Black, PieceType::King) => "♚",
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color.to_human(), self.piece_type.to_human())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum Rank {
    One = 1,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
}

impl Rank {
    pub const ALL: [Rank; 8] = [
        Rank::One,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
    ];

    /// Rank from its number, 1 is white's home rank
    pub fn new(value: u8) -> Option<Rank> {
        Self::ALL.get(usize::from(value).checked_sub(1)?).copied()
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn offset(self, by: i8) -> Option<Rank> {
        let value = i16::from(self.value()) + i16::from(by);
        u8::try_from(value).ok().and_then(Rank::new)
    }

    pub fn from_char(c: char) -> Option<Rank> {
        c.to_digit(10)
            .and_then(|d| u8::try_from(d).ok())
            .and_then(Rank::new)
    }

    pub fn to_char(self) -> char {
        (b'0' + self.value()) as char
    }
}

impl Add<i8> for Rank {
    type Output = Option<Rank>;

    fn add(self, rhs: i8) -> Self::Output {
        self.offset(rhs)
    }
}

impl Sub<i8> for Rank {
    type Output = Option<Rank>;

    fn sub(self, rhs: i8) -> Self::Output {
        self.offset(rhs.checked_neg()?)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum File {
    A = 1,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl File {
    pub const ALL: [File; 8] = [
        File::A,
        File::B,
        File::C,
        File::D,
        File::E,
        File::F,
        File::G,
        File::H,
    ];

    /// File from its number, 1 is the a-file
    pub fn new(value: u8) -> Option<File> {
        Self::ALL.get(usize::from(value).checked_sub(1)?).copied()
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn offset(self, by: i8) -> Option<File> {
        let value = i16::from(self.value()) + i16::from(by);
        u8::try_from(value).ok().and_then(File::new)
    }

    pub fn from_char(c: char) -> Option<File> {
        match c {
            'a'..='h' => File::new(c as u8 - b'a' + 1),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        (b'a' + self.value() - 1) as char
    }
}

impl Add<i8> for File {
    type Output = Option<File>;

    fn add(self, rhs: i8) -> Self::Output {
        self.offset(rhs)
    }
}

impl Sub<i8> for File {
    type Output = Option<File>;

    fn sub(self, rhs: i8) -> Self::Output {
        self.offset(rhs.checked_neg()?)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Position {
    pub rank: Rank, // row, 1 is start
    pub file: File, // col, a is start
}

impl Position {
    pub fn new(rank: Rank, file: File) -> Self {
        Self { rank, file }
    }

    pub fn from_rank_file(rank: u8, file: u8) -> Option<Position> {
        Some(Position {
            rank: Rank::new(rank)?,
            file: File::new(file)?,
        })
    }

    /// Parse a square like `e4`, file first then rank
    pub fn from_algebraic(s: &str) -> Option<Position> {
        let mut chars = s.chars();
        let file = File::from_char(chars.next()?)?;
        let rank = Rank::from_char(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Position { rank, file })
    }

    pub fn to_algebraic(&self) -> String {
        format!("{}{}", self.file.to_char(), self.rank.to_char())
    }

    /// New position shifted by the given number of ranks and files, if still on the board
    pub fn offset(&self, by_rank: i8, by_file: i8) -> Option<Position> {
        Some(Position {
            rank: self.rank.offset(by_rank)?,
            file: self.file.offset(by_file)?,
        })
    }

    /// Index into a rank-major 64 square array, a1 is 0 and h8 is 63
    pub fn index(&self) -> usize {
        usize::from(self.rank.value() - 1) * 8 + usize::from(self.file.value() - 1)
    }

    /// All 64 squares, rank 1 to 8 and file a to h within each rank
    pub fn all() -> impl Iterator<Item = Position> {
        Rank::ALL
            .into_iter()
            .flat_map(|rank| File::ALL.into_iter().map(move |file| Position { rank, file }))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file.to_char(), self.rank.to_char())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePositionError(pub String);

impl fmt::Display for ParsePositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "found `{}`, expected a file from `a` to `h` followed by a rank from `1` to `8`",
            self.0
        )
    }
}

impl Error for ParsePositionError {}

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::from_algebraic(s).ok_or_else(|| ParsePositionError(s.to_string()))
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum CastlingSide {
    Kingside,
    Queenside,
}

impl CastlingSide {
    pub const ALL: [CastlingSide; 2] = [CastlingSide::Kingside, CastlingSide::Queenside];

    /// Direction the king travels along its rank
    pub fn direction(&self) -> i8 {
        match self {
            CastlingSide::Kingside => 1,
            CastlingSide::Queenside => -1,
        }
    }

    pub fn rook_home_file(&self) -> File {
        match self {
            CastlingSide::Kingside => File::H,
            CastlingSide::Queenside => File::A,
        }
    }

    pub fn rook_destination_file(&self) -> File {
        match self {
            CastlingSide::Kingside => File::F,
            CastlingSide::Queenside => File::D,
        }
    }

    pub fn king_destination_file(&self) -> File {
        match self {
            CastlingSide::Kingside => File::G,
            CastlingSide::Queenside => File::C,
        }
    }

    /// Files that must be empty between king and rook
    pub fn between_files(&self) -> &'static [File] {
        match self {
            CastlingSide::Kingside => &[File::F, File::G],
            CastlingSide::Queenside => &[File::B, File::C, File::D],
        }
    }

    pub fn move_flag(&self) -> MoveFlag {
        match self {
            CastlingSide::Kingside => MoveFlag::CastleKingside,
            CastlingSide::Queenside => MoveFlag::CastleQueenside,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub fn all() -> Self {
        Self {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn get(&self, color: Color, side: CastlingSide) -> bool {
        match (color, side) {
            (Color::White, CastlingSide::Kingside) => self.white_kingside,
            (Color::White, CastlingSide::Queenside) => self.white_queenside,
            (Color::Black, CastlingSide::Kingside) => self.black_kingside,
            (Color::Black, CastlingSide::Queenside) => self.black_queenside,
        }
    }

    pub fn set(&mut self, color: Color, side: CastlingSide, allowed: bool) {
        let right = match (color, side) {
            (Color::White, CastlingSide::Kingside) => &mut self.white_kingside,
            (Color::White, CastlingSide::Queenside) => &mut self.white_queenside,
            (Color::Black, CastlingSide::Kingside) => &mut self.black_kingside,
            (Color::Black, CastlingSide::Queenside) => &mut self.black_queenside,
        };
        *right = allowed;
    }

    /// Drop both rights of `color`
    pub fn clear(&mut self, color: Color) {
        for side in CastlingSide::ALL {
            self.set(color, side, false);
        }
    }

    /// Drop the right tied to a rook standing (or having stood) on `position`
    pub fn remove_for_rook_square(&mut self, color: Color, position: Position) {
        if position.rank != color.home_rank() {
            return;
        }
        for side in CastlingSide::ALL {
            if position.file == side.rook_home_file() {
                self.set(color, side, false);
            }
        }
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letters = [
            (self.white_kingside, 'K'),
            (self.white_queenside, 'Q'),
            (self.black_kingside, 'k'),
            (self.black_queenside, 'q'),
        ];
        let mut written = false;
        for (allowed, letter) in letters {
            if allowed {
                write!(f, "{letter}")?;
                written = true;
            }
        }
        if !written {
            write!(f, "-")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveFlag {
    Regular,
    CastleKingside,
    CastleQueenside,
    /// Pawn promotion. Contains the piece promoted to
    Promotion(PieceType),
    /// Double pawn push at first pawn move. Contains the en passant square
    DoublePawnPush(Position),
    EnPassantCapture,
}

impl MoveFlag {
    pub fn is_castle(&self) -> bool {
        matches!(self, MoveFlag::CastleKingside | MoveFlag::CastleQueenside)
    }
}

/// A completed move, as recorded in a game history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub piece: Piece,
    pub from: Position,
    pub to: Position,
    pub captured: Option<Piece>,
    pub move_flag: MoveFlag,
}

impl Move {
    pub fn to_human(&self) -> String {
        if self.move_flag.is_castle() {
            let side = match self.move_flag {
                MoveFlag::CastleKingside => "kingside",
                _ => "queenside",
            };
            return format!("{} castles {side}", self.piece.color.to_human());
        }
        let maybe_capture_str = match self.captured {
            Some(p) => format!(" capturing {} {}", p.color.to_human(), p.piece_type.to_human()),
            None => "".to_string(),
        };
        let maybe_promotion_str = match self.move_flag {
            MoveFlag::Promotion(promoted_to_type) => {
                format!(" promoting to {}", promoted_to_type.to_human())
            }
            MoveFlag::EnPassantCapture => " en passant".to_string(),
            _ => "".to_string(),
        };
        format!(
            "{} moves {} from {} to {}{}{}",
            self.piece.color.to_human(),
            self.piece.piece_type.to_human(),
            self.from.to_algebraic(),
            self.to.to_algebraic(),
            maybe_capture_str,
            maybe_promotion_str,
        )
    }

    /// Long algebraic form, e.g. `e2e4` or `e7e8q`
    pub fn to_long_algebraic(&self) -> String {
        let promotion = match self.move_flag {
            MoveFlag::Promotion(piece_type) => {
                piece_type.to_char().to_ascii_lowercase().to_string()
            }
            _ => "".to_string(),
        };
        format!("{}{}{}", self.from, self.to, promotion)
    }
}

/// Split a long algebraic move like `e7e8q` into origin, destination and promotion choice
pub fn parse_long_algebraic(s: &str) -> Option<(Position, Position, Option<PieceType>)> {
    let from = Position::from_algebraic(s.get(0..2)?)?;
    let to = Position::from_algebraic(s.get(2..4)?)?;
    let promotion = match s.get(4..)? {
        "" => None,
        rest => {
            let mut chars = rest.chars();
            let piece_type = PieceType::from_char(chars.next()?)?;
            if chars.next().is_some() {
                return None;
            }
            Some(piece_type)
        }
    };
    Some((from, to, promotion))
}
