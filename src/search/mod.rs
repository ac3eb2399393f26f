//! Search module for the AI
//!
//! Contains:
//! - Active-run detection (threes/fours with playable ends) and
//!   multi-threat classification used by both placement and skill policy
//! - Candidate ranking and the depth-limited alpha-beta minimax used by
//!   the hardest opponent tier

pub mod minimax;
pub mod threat;

pub use minimax::{candidate_moves, Candidate, SearchOutcome, Searcher, MAX_CANDIDATES};
pub use threat::{
    detect_multiple_threats, find_active_four, find_active_three, ActiveRun, ThreatCell,
    ThreatClass,
};
