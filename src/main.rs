//! Command line front end for inspecting positions
//!
//! Usage: cargo run --release -- --fen "<FEN>" moves e2
//!        cargo run --release -- play e2e4 e7e5 g1f3 --save game.fen
//!        cargo run --release -- perft --depth 4 --divide

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, eyre, WrapErr};
use color_eyre::Result;
use itertools::Itertools;
use rand::prelude::*;

use chess_rules::fen::STARTING_POSITION_FEN;
use chess_rules::game::{Game, MoveOutcome};
use chess_rules::perft::{perft, perft_divide};
use chess_rules::types::{parse_long_algebraic, Color, Position, PIECES_CAN_PROMOTE_TO};

#[derive(Parser, Debug)]
#[command(name = "chess_rules")]
#[command(about = "Parse chess positions, list legal moves and play them out")]
struct Args {
    /// Position to start from, as a FEN record
    #[arg(long, global = true)]
    fen: Option<String>,

    /// Read the starting FEN record from the first non-empty line of this file
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Draw the board after every move
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw the board, print its FEN and report checks
    Show,

    /// List the legal destinations of the piece on a square
    Moves { square: Position },

    /// Play moves in long algebraic notation, e.g. `e2e4` or `e7e8q`
    Play {
        /// Write the final FEN record to this file
        #[arg(long)]
        save: Option<PathBuf>,

        #[arg(required = true)]
        moves: Vec<String>,
    },

    /// Count the leaf nodes of the legal move tree
    Perft {
        #[arg(short, long, default_value_t = 3)]
        depth: u8,

        /// Break the count down by root move
        #[arg(long)]
        divide: bool,
    },

    /// Play random legal moves, printing the FEN after each one
    Random {
        #[arg(long, default_value_t = 20)]
        plies: usize,

        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let fen = load_fen(args.fen.as_deref(), args.file.as_deref())?;
    let mut game = Game::from_fen(&fen).wrap_err_with(|| format!("invalid FEN `{fen}`"))?;
    if args.verbose {
        eprintln!("starting from {}", game.current_fen());
    }

    match args.command {
        Command::Show => show(&game),
        Command::Moves { square } => list_moves(&game, square),
        Command::Play { save, moves } => play(&mut game, &moves, save.as_deref(), args.verbose),
        Command::Perft { depth, divide } => run_perft(&game, depth, divide),
        Command::Random { plies, seed } => random_playout(&mut game, plies, seed, args.verbose),
    }
}

fn load_fen(fen: Option<&str>, file: Option<&Path>) -> Result<String> {
    match (fen, file) {
        (Some(_), Some(_)) => bail!("use either --fen or --file, not both"),
        (Some(fen), None) => Ok(fen.to_string()),
        (None, Some(path)) => {
            let contents = fs::read_to_string(path)
                .wrap_err_with(|| format!("could not read {}", path.display()))?;
            contents
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(str::to_string)
                .ok_or_else(|| eyre!("{} does not contain a FEN record", path.display()))
        }
        (None, None) => Ok(STARTING_POSITION_FEN.to_string()),
    }
}

fn show(game: &Game) -> Result<()> {
    game.board().draw_to_terminal();
    println!("{}", game.current_fen());
    for color in [Color::White, Color::Black] {
        match game.is_in_check(color) {
            Ok(check) if check.in_check => println!(
                "{color} is in check from {}",
                check.attacking_pieces.iter().join(", ")
            ),
            Ok(_) => {}
            Err(err) => eprintln!("warning: {err}"),
        }
    }
    Ok(())
}

fn list_moves(game: &Game, square: Position) -> Result<()> {
    let Some(piece) = game.board().piece_at(square) else {
        bail!("no piece on {square}");
    };
    let moves = game.board().legal_moves(square)?;
    if moves.is_empty() {
        println!("the {piece} on {square} has no legal moves");
    } else {
        println!("{}", moves.iter().join(" "));
    }
    if piece.color != game.board().active_color() {
        eprintln!("warning: it is {}'s turn", game.board().active_color());
    }
    Ok(())
}

fn play(game: &mut Game, moves: &[String], save: Option<&Path>, verbose: bool) -> Result<()> {
    for text in moves {
        let (from, to, promotion) = parse_long_algebraic(text)
            .ok_or_else(|| eyre!("`{text}` is not a move, expected something like e2e4 or e7e8q"))?;

        match game.apply_move(from, to)? {
            MoveOutcome::Ignored => bail!("{text} is not legal in {}", game.current_fen()),
            MoveOutcome::Completed(_) => {
                if promotion.is_some() {
                    eprintln!("warning: {text} is not a promotion, ignoring the piece");
                }
            }
            MoveOutcome::AwaitingPromotion(at) => {
                let Some(piece_type) = promotion else {
                    bail!("{text} promotes on {at}, add the piece to promote to, e.g. {text}q");
                };
                game.choose_promotion(piece_type)
                    .wrap_err_with(|| format!("could not finish {text}"))?;
            }
        }

        if verbose {
            if let Some(m) = game.history().last() {
                println!("{}", m.to_human());
            }
            game.board().draw_to_terminal();
        }
    }

    let fen = game.current_fen();
    println!("{fen}");
    if verbose {
        println!("{}", game.to_move_list());
    }
    if let Some(path) = save {
        fs::write(path, format!("{fen}\n"))
            .wrap_err_with(|| format!("could not write {}", path.display()))?;
    }
    Ok(())
}

fn run_perft(game: &Game, depth: u8, divide: bool) -> Result<()> {
    let now = Instant::now();
    let nodes = if divide && depth > 0 {
        let divided = perft_divide(game.board(), depth)?;
        for (m, nodes) in &divided {
            println!("{m}: {nodes}");
        }
        divided.iter().map(|(_, nodes)| nodes).sum::<u64>()
    } else {
        perft(game.board(), depth)?
    };
    let elapsed = now.elapsed().as_secs_f32();
    println!("Depth {depth}: {nodes} nodes (elapsed: {elapsed:.3}s)");
    Ok(())
}

fn random_playout(game: &mut Game, plies: usize, seed: Option<u64>, verbose: bool) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for _ in 0..plies {
        let moves = game.all_legal_moves()?;
        let Some(&(from, to)) = moves.choose(&mut rng) else {
            println!("no legal moves for {}", game.board().active_color());
            break;
        };
        if let MoveOutcome::AwaitingPromotion(_) = game.apply_move(from, to)? {
            let piece_type = PIECES_CAN_PROMOTE_TO
                .choose(&mut rng)
                .copied()
                .ok_or_else(|| eyre!("no promotion pieces to choose from"))?;
            game.choose_promotion(piece_type)?;
        }

        if verbose {
            game.board().draw_to_terminal();
        }
        println!("{}", game.current_fen());
    }
    Ok(())
}
