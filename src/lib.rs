//! Skill-augmented Gomoku match engine
//!
//! A five-in-a-row match engine on a 15x15 board, extended with five
//! cooldown-gated skills that mutate board state outside the normal move
//! rules, and a tiered computer opponent that plays the augmented game:
//! - Remove an opponent stone (the cell stays blocked for 2 turns)
//! - Freeze the opponent for two consecutive own placements
//! - Break a 3x3 area out of play permanently
//! - Restore every broken cell at the cost of two own stones
//! - Relocate an opponent stone
//!
//! # Architecture
//!
//! - [`board`]: grid, bitboards, and the broken/blocked restriction sets
//! - [`rules`]: the five-in-a-row win condition
//! - [`eval`]: the direction score table and line heuristics
//! - [`search`]: threat detection and the bounded alpha-beta minimax
//! - [`skills`]: the closed skill catalog and its atomic resolver
//! - [`match_state`]: turn ownership, cooldown clock, extra-turn effect
//! - [`engine`]: the tiered AI decision pipeline
//! - [`session`]: the collaborator-facing controller
//!
//! Rendering, audio and input are external collaborators: the core fires
//! one-way notifications through [`notify::Collaborator`] and never waits
//! for them.
//!
//! # Quick start
//!
//! ```
//! use gomoku_duel::{GameSession, NullCollaborator, OpponentConfig};
//!
//! let mut session = GameSession::new(NullCollaborator);
//! session.start_match_seeded(&OpponentConfig::novice(), 42);
//!
//! // Human plays Black; the AI answers within the same call
//! session.attempt_placement(7, 7).unwrap();
//! assert_eq!(session.state().turn_count(), 2);
//! assert_eq!(session.state().current_player(), gomoku_duel::Stone::Black);
//! ```

pub mod board;
pub mod engine;
pub mod error;
pub mod eval;
pub mod match_state;
pub mod notify;
pub mod roster;
pub mod rules;
pub mod search;
pub mod session;
pub mod skills;

// Re-export commonly used types for convenience
pub use board::{Board, Pos, Stone, BOARD_SIZE};
pub use engine::AiEngine;
pub use error::GameError;
pub use match_state::MatchState;
pub use notify::{Collaborator, NullCollaborator, Severity, SoundCue};
pub use roster::{AiTier, OpponentConfig};
pub use session::GameSession;
pub use skills::SkillKind;
