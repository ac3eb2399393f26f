//! Terminal front-end for the skill-augmented Gomoku engine
//!
//! A thin collaborator around the core: renders the board as text, prints
//! status lines and sound cues, and forwards stdin commands into the
//! session.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use gomoku_duel::board::BOARD_SIZE;
use gomoku_duel::{
    AiEngine, Collaborator, GameSession, MatchState, NullCollaborator, OpponentConfig, Pos,
    Severity, SkillKind, SoundCue, Stone,
};

/// Skill-augmented Gomoku against a tiered AI
#[derive(Parser)]
#[command(name = "gomoku_duel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play interactively against an opponent from the roster
    Play {
        /// Opponent name: novice, vanguard, or warlord
        #[arg(default_value = "novice")]
        opponent: String,
    },
    /// Watch two engines fight a scripted exhibition match
    Demo,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Play { opponent }) => play(&opponent),
        Some(Commands::Demo) | None => {
            run_demo();
            Ok(())
        }
    }
}

/// Collaborator that narrates the match on stdout.
#[derive(Default)]
struct TerminalCollaborator;

impl Collaborator for TerminalCollaborator {
    fn sound(&mut self, cue: SoundCue) {
        let name = match cue {
            SoundCue::RemoveStone => "remove-stone",
            SoundCue::Freeze => "freeze",
            SoundCue::BreakArea => "break-area",
            SoundCue::RestoreArea => "restore-area",
            SoundCue::RelocateStone => "relocate-stone",
            SoundCue::Entrance => "entrance",
        };
        println!("  [cue: {name}]");
    }

    fn message(&mut self, text: &str, severity: Severity) {
        let tag = match severity {
            Severity::Info => "info",
            Severity::Warning => "warn",
            Severity::Error => "err ",
            Severity::Success => "ok  ",
        };
        println!("  [{tag}] {text}");
    }

    fn game_over(&mut self, winner: Stone) {
        let side = if winner == Stone::Black { "Black" } else { "White" };
        println!("  === {side} wins ===");
    }
}

fn render(state: &MatchState) {
    print!("   ");
    for col in 0..BOARD_SIZE {
        print!("{:>2}", col % 10);
    }
    println!();
    for row in 0..BOARD_SIZE as u8 {
        print!("{:>2} ", row);
        for col in 0..BOARD_SIZE as u8 {
            let pos = Pos::new(row, col);
            let glyph = if state.board().is_broken(pos) {
                " #"
            } else if state.board().is_blocked(pos) {
                " !"
            } else {
                match state.board().get(pos) {
                    Stone::Black => " X",
                    Stone::White => " O",
                    Stone::Empty => " .",
                }
            };
            print!("{glyph}");
        }
        println!();
    }
}

fn find_opponent(name: &str) -> Result<OpponentConfig> {
    OpponentConfig::roster()
        .into_iter()
        .find(|o| o.name.eq_ignore_ascii_case(name))
        .map_or_else(|| bail!("unknown opponent '{name}' (novice, vanguard, warlord)"), Ok)
}

fn play(opponent_name: &str) -> Result<()> {
    let opponent = find_opponent(opponent_name)?;
    let mut session = GameSession::new(TerminalCollaborator);
    session.start_match(&opponent);

    println!("You are Black (X). Commands:");
    println!("  <row> <col>      place a stone (or supply a skill target)");
    println!("  skill <1-5>      1 remove, 2 freeze, 3 break, 4 restore, 5 relocate");
    println!("  cancel           abort target selection");
    println!("  quit");
    render(session.state());

    let stdin = io::stdin();
    loop {
        if session.state().is_over() {
            break;
        }
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = stdin.lock().lines().next() else {
            break;
        };
        let line = line?;
        let parts: Vec<&str> = line.split_whitespace().collect();

        match parts.as_slice() {
            ["quit"] | ["q"] => break,
            ["cancel"] => session.cancel_skill(),
            ["skill", n] => {
                let kind = match *n {
                    "1" => SkillKind::RemoveStone,
                    "2" => SkillKind::FreezeOpponent,
                    "3" => SkillKind::BreakArea,
                    "4" => SkillKind::RestoreArea,
                    "5" => SkillKind::RelocateStone,
                    _ => {
                        println!("  [err ] pick a skill 1-5");
                        continue;
                    }
                };
                let _ = session.invoke_skill(kind);
            }
            [row, col] => {
                let (Ok(row), Ok(col)) = (row.parse::<i32>(), col.parse::<i32>()) else {
                    println!("  [err ] expected: <row> <col>");
                    continue;
                };
                let _ = session.attempt_placement(row, col);
                render(session.state());
            }
            [] => {}
            _ => println!("  [err ] unrecognized command"),
        }
    }

    render(session.state());
    Ok(())
}

/// Exhibition match: a casual engine commands Black against the full
/// search tier as White.
fn run_demo() {
    println!("gomoku_duel exhibition: Novice (Black) vs Warlord (White)\n");

    let black_config = OpponentConfig::novice();
    let white_config = OpponentConfig::warlord();

    let mut state = MatchState::new();
    state.setup_skills(&black_config.skills, &white_config.skills);

    let mut black = AiEngine::with_seed(&black_config, Stone::Black, 2024);
    let mut white = AiEngine::with_seed(&white_config, Stone::White, 2024);
    let mut out = NullCollaborator;

    let mut moves = 0;
    while !state.is_over() && moves < 120 {
        match state.current_player() {
            Stone::Black => black.take_turn(&mut state, &mut out),
            _ => white.take_turn(&mut state, &mut out),
        }
        moves += 1;
    }

    render(&state);
    match state.winner() {
        Some(Stone::Black) => println!("\nNovice takes it."),
        Some(Stone::White) => println!("\nThe Warlord prevails."),
        _ => println!("\nNo winner after {moves} turns."),
    }
}
