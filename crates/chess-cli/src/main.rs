mod config;

use anyhow::{bail, Context, Result};
use chess_core::{Color, Move, Position};
use chess_engine::Board;
use chess_service::{FileStore, MatchId, MatchRecord, MatchService, MoveOutcome};
use clap::{Parser, Subcommand};
use config::ChessConfig;

#[derive(Parser)]
#[command(name = "chess")]
#[command(about = "Play chess matches stored on disk")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new match from the standard position
    New {
        /// Display name of the match
        name: String,
    },
    /// Print the board, seats, side to move and status of a match
    Show {
        id: MatchId,
    },
    /// List the legal moves of the piece on a square
    Moves {
        id: MatchId,
        /// Square in algebraic notation, e.g. e2
        #[arg(value_parser = parse_square)]
        square: Position,
    },
    /// Take the White or Black seat of a match
    Join {
        id: MatchId,
        /// Seat to take
        color: Color,
        /// Player name. Defaults to `player` in chess.toml
        #[arg(long = "as")]
        player: Option<String>,
    },
    /// Give up every seat held in a match
    Leave {
        id: MatchId,
        /// Player name. Defaults to `player` in chess.toml
        #[arg(long = "as")]
        player: Option<String>,
    },
    /// Play a move in UCI notation, e.g. e2e4 or a7a8q
    Move {
        id: MatchId,
        #[arg(value_parser = parse_move)]
        uci: Move,
        /// Player name. Defaults to `player` in chess.toml
        #[arg(long = "as")]
        player: Option<String>,
    },
    /// Resign a match
    Resign {
        id: MatchId,
        /// Player name. Defaults to `player` in chess.toml
        #[arg(long = "as")]
        player: Option<String>,
    },
    /// List all stored matches
    List,
}

fn parse_square(s: &str) -> Result<Position, String> {
    Position::from_algebraic(s).ok_or_else(|| format!("invalid square: {}", s))
}

fn parse_move(s: &str) -> Result<Move, String> {
    Move::from_uci(s).ok_or_else(|| format!("invalid move: {}", s))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ChessConfig::load().context("Failed to load chess.toml")?;

    tracing_subscriber::fmt()
        .with_max_level(config.level()?)
        .with_writer(std::io::stderr)
        .init();

    let store = FileStore::open(&config.data_dir)
        .with_context(|| format!("Failed to open {}", config.data_dir.display()))?;
    let service = MatchService::new(store);

    run(&service, cli.command, config.player.as_deref())
}

/// Picks the `--as` name, falling back to the configured player.
fn identity(player: Option<String>, default_player: Option<&str>) -> Result<String> {
    match player.or_else(|| default_player.map(str::to_string)) {
        Some(name) => Ok(name),
        None => bail!("no player given: pass --as <name> or set `player` in chess.toml"),
    }
}

fn run(
    service: &MatchService<FileStore>,
    command: Commands,
    default_player: Option<&str>,
) -> Result<()> {
    match command {
        Commands::New { name } => {
            let record = service.create_match(&name)?;
            println!("Created match {} ({})", record.id, record.name);
        }
        Commands::Show { id } => {
            let record = service.load(id)?;
            print!("{}", render_board(record.game.board()));
            println!("FEN: {}", record.game.to_fen());
            for color in Color::ALL {
                println!("{}: {}", color, record.seat(color).unwrap_or("(open)"));
            }
            println!("Status: {}", describe(&record));
        }
        Commands::Moves { id, square } => {
            let moves = service.valid_moves(id, square)?;
            if moves.is_empty() {
                println!("No legal moves from {}", square);
            } else {
                let list: Vec<String> = moves.iter().map(|m| m.to_uci()).collect();
                println!("{}", list.join(" "));
            }
        }
        Commands::Join { id, color, player } => {
            let player = identity(player, default_player)?;
            service
                .join(id, color, &player)
                .with_context(|| format!("{} cannot join as {}", player, color))?;
            println!("{} joined match {} as {}", player, id, color);
        }
        Commands::Leave { id, player } => {
            let player = identity(player, default_player)?;
            service.leave(id, &player)?;
            println!("{} left match {}", player, id);
        }
        Commands::Move { id, uci, player } => {
            let player = identity(player, default_player)?;
            let outcome = service
                .make_move(id, &player, uci)
                .with_context(|| format!("{} cannot play {}", player, uci))?;
            match outcome {
                MoveOutcome::Continue => println!("{} played {}", player, uci),
                MoveOutcome::Check(color) => {
                    println!("{} played {}, {} is in check", player, uci, color)
                }
                MoveOutcome::Checkmate { winner } => {
                    println!("{} played {}, checkmate, {} wins", player, uci, winner)
                }
                MoveOutcome::Stalemate => println!("{} played {}, stalemate", player, uci),
            }
        }
        Commands::Resign { id, player } => {
            let player = identity(player, default_player)?;
            let record = service.resign(id, &player)?;
            println!("{} ({})", player, describe(&record));
        }
        Commands::List => {
            let records = service.list()?;
            if records.is_empty() {
                println!("No matches");
            }
            for record in records {
                println!("{:>4}  {:<20} {}", record.id, record.name, describe(&record));
            }
        }
    }
    Ok(())
}

fn describe(record: &MatchRecord) -> String {
    if let Some(loser) = record.resigned {
        return format!("{} resigned, {} wins", loser, loser.opposite());
    }
    let status = record.game.status();
    if status.is_over() {
        status.to_string()
    } else {
        format!("{} to move, {}", record.game.team_turn(), status)
    }
}

/// Renders the board with row 8 at the top, FEN letters for pieces.
fn render_board(board: &Board) -> String {
    let mut out = String::new();
    for row in (1..=8).rev() {
        out.push_str(&format!("{} ", row));
        for column in 1..=8 {
            let c = board
                .piece_at(Position::new(row, column))
                .map_or('.', |p| p.to_fen_char());
            out.push(' ');
            out.push(c);
        }
        out.push('\n');
    }
    out.push_str("   a b c d e f g h\n");
    out
}
