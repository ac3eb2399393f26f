//! Match state machine
//!
//! Owns the board, turn ownership, the has-acted and skip-turn flags,
//! both sides' skill cooldowns, and the extra-turn ("freeze") effect.
//! [`MatchState::advance_turn`] is the single synchronization point for
//! every time-based counter — blocked-cell timers and skill cooldowns
//! tick there and nowhere else, exactly once per completed turn.

use crate::board::{Board, Pos, Stone};
use crate::error::GameError;
use crate::rules;
use crate::search::threat::ActiveRun;
use crate::skills::{SkillInstance, SkillKind};

/// Why a freeze was granted; steers the forced placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintReason {
    /// Extend an own run toward five
    Attack,
    /// Shut down an opponent run
    Defense,
}

/// Strategy hint attached to an AI-held extra-turn effect.
///
/// The run's end cells are consumed front-first by the forced placements.
#[derive(Debug, Clone)]
pub struct MoveHint {
    pub reason: HintReason,
    pub run: ActiveRun,
}

/// The extra-turn ("freeze") effect state machine.
///
/// `Inactive` -> `Active { remaining: 2 }` when granted; each placement by
/// the holder decrements `remaining`; after the final placement the effect
/// clears and the turn advances exactly once.
#[derive(Debug, Clone, Default)]
pub enum ExtraTurn {
    #[default]
    Inactive,
    Active {
        remaining: u8,
        hint: Option<MoveHint>,
    },
}

impl ExtraTurn {
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, ExtraTurn::Active { .. })
    }

    #[inline]
    pub fn remaining(&self) -> u8 {
        match self {
            ExtraTurn::Active { remaining, .. } => *remaining,
            ExtraTurn::Inactive => 0,
        }
    }

    #[inline]
    pub fn hint(&self) -> Option<&MoveHint> {
        match self {
            ExtraTurn::Active { hint, .. } => hint.as_ref(),
            ExtraTurn::Inactive => None,
        }
    }
}

/// Full state of a running match.
#[derive(Debug, Clone)]
pub struct MatchState {
    board: Board,
    current_player: Stone,
    turn_count: u32,
    game_over: bool,
    winner: Option<Stone>,
    has_acted: bool,
    skip_next_turn: bool,
    extra_turn: ExtraTurn,
    black_skills: Vec<SkillInstance>,
    white_skills: Vec<SkillInstance>,
}

impl MatchState {
    /// Fresh match: empty board, Black to move.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_player: Stone::Black,
            turn_count: 0,
            game_over: false,
            winner: None,
            has_acted: false,
            skip_next_turn: false,
            extra_turn: ExtraTurn::Inactive,
            black_skills: Vec::new(),
            white_skills: Vec::new(),
        }
    }

    /// Instantiate both sides' skills from their rosters. Called once at
    /// match start; instances are never recreated mid-match.
    pub fn setup_skills(&mut self, black: &[SkillKind], white: &[SkillKind]) {
        self.black_skills = black
            .iter()
            .map(|&kind| SkillInstance::new(kind, Stone::Black))
            .collect();
        self.white_skills = white
            .iter()
            .map(|&kind| SkillInstance::new(kind, Stone::White))
            .collect();
    }

    // ---- accessors ----------------------------------------------------

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Board access for skill resolution and placement internals.
    #[inline]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[inline]
    pub fn current_player(&self) -> Stone {
        self.current_player
    }

    #[inline]
    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.game_over
    }

    #[inline]
    pub fn winner(&self) -> Option<Stone> {
        self.winner
    }

    #[inline]
    pub fn has_acted(&self) -> bool {
        self.has_acted
    }

    #[inline]
    pub fn extra_turn(&self) -> &ExtraTurn {
        &self.extra_turn
    }

    pub fn skills(&self, owner: Stone) -> &[SkillInstance] {
        match owner {
            Stone::Black => &self.black_skills,
            _ => &self.white_skills,
        }
    }

    pub fn skill_mut(&mut self, owner: Stone, kind: SkillKind) -> Option<&mut SkillInstance> {
        let skills = match owner {
            Stone::Black => &mut self.black_skills,
            _ => &mut self.white_skills,
        };
        skills.iter_mut().find(|s| s.kind == kind)
    }

    // ---- placement ----------------------------------------------------

    /// Pure legality check for a placement. False on out-of-bounds,
    /// occupied, broken, or temporarily blocked cells.
    #[inline]
    pub fn is_legal_placement(&self, row: i32, col: i32) -> bool {
        self.board.is_legal_at(row, col)
    }

    /// Apply a placement iff legal. Checks neither win nor turn — the
    /// caller sequences those.
    pub fn place(&mut self, row: i32, col: i32, player: Stone) -> bool {
        if !self.is_legal_placement(row, col) {
            return false;
        }
        let pos = Pos::new(row as u8, col as u8);
        self.board.place_stone(pos, player);
        true
    }

    /// Did the stone just placed at `pos` complete five in a row?
    #[inline]
    pub fn check_win(&self, pos: Pos, player: Stone) -> bool {
        rules::check_win(&self.board, pos, player)
    }

    /// End the match with a winner.
    pub fn declare_winner(&mut self, player: Stone) {
        self.game_over = true;
        self.winner = Some(player);
    }

    /// Mark the current player as having acted (placed or used a skill).
    #[inline]
    pub fn mark_acted(&mut self) {
        self.has_acted = true;
    }

    /// Queue a one-turn skip of the opponent: the next `advance_turn`
    /// keeps the current player instead of flipping.
    pub fn skip_opponent(&mut self) {
        self.skip_next_turn = true;
    }

    // ---- the turn clock -----------------------------------------------

    /// Advance to the next turn. The single synchronization point for all
    /// time-based effects: blocked-cell timers and every skill cooldown on
    /// both sides decrement here; the player flips unless a skip was
    /// queued; the has-acted flag resets.
    ///
    /// Must run exactly once per completed turn, including the turn a
    /// whole extra-turn chain consumed — never while the chain is live.
    pub fn advance_turn(&mut self) {
        debug_assert!(
            !self.extra_turn.is_active(),
            "advance_turn during a live extra-turn chain"
        );

        self.turn_count += 1;
        self.board.tick_blocked();

        for skill in self.black_skills.iter_mut().chain(self.white_skills.iter_mut()) {
            skill.tick();
        }

        if self.skip_next_turn {
            self.skip_next_turn = false;
        } else {
            self.current_player = self.current_player.opponent();
        }

        self.has_acted = false;
    }

    // ---- extra-turn effect --------------------------------------------

    /// Grant the extra-turn effect to the current player: two consecutive
    /// placements while the opponent is skipped.
    pub fn arm_extra_turn(&mut self) {
        self.extra_turn = ExtraTurn::Active {
            remaining: 2,
            hint: None,
        };
    }

    /// Attach a strategy hint to a live extra-turn effect.
    pub fn set_extra_turn_hint(&mut self, new_hint: MoveHint) {
        if let ExtraTurn::Active { hint, .. } = &mut self.extra_turn {
            *hint = Some(new_hint);
        }
    }

    /// Consume one forced placement from the chain. Returns the number of
    /// placements still owed; at 0 the effect has cleared and the caller
    /// must advance the turn.
    pub fn consume_extra_move(&mut self) -> u8 {
        let ExtraTurn::Active { remaining, .. } = &mut self.extra_turn else {
            debug_assert!(false, "consume_extra_move with no live effect");
            return 0;
        };
        *remaining -= 1;
        let left = *remaining;
        if left == 0 {
            self.extra_turn = ExtraTurn::Inactive;
        }
        left
    }

    /// Drop the effect without consuming it (match ended mid-chain).
    pub fn clear_extra_turn(&mut self) {
        self.extra_turn = ExtraTurn::Inactive;
    }

    // ---- skill gating -------------------------------------------------

    /// Check every usability condition for a skill: the match is live, it
    /// is the owner's turn, the owner has not acted, the skill is on the
    /// roster and off cooldown.
    pub fn skill_usable(&self, owner: Stone, kind: SkillKind) -> Result<(), GameError> {
        if self.game_over {
            return Err(GameError::MatchOver);
        }
        if self.current_player != owner {
            return Err(GameError::NotYourTurn);
        }
        if self.has_acted {
            return Err(GameError::AlreadyActed);
        }
        let Some(skill) = self.skills(owner).iter().find(|s| s.kind == kind) else {
            return Err(GameError::SkillNotOwned);
        };
        if !skill.is_ready() {
            return Err(GameError::SkillOnCooldown);
        }
        Ok(())
    }

    /// Kinds currently usable by `owner`, excluding the freeze (which the
    /// policy layer schedules separately).
    pub fn usable_non_freeze_skills(&self, owner: Stone) -> Vec<SkillKind> {
        self.skills(owner)
            .iter()
            .filter(|s| s.kind != SkillKind::FreezeOpponent)
            .filter(|s| self.skill_usable(owner, s.kind).is_ok())
            .map(|s| s.kind)
            .collect()
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}
