//! Game session: the collaborator-facing controller
//!
//! Accepts the five inbound calls — start a match, attempt a placement,
//! invoke a skill, supply a target, cancel — validates them against the
//! match state, and drives the AI turn synchronously whenever a completed
//! human action hands the turn over. Every rejection is surfaced both as
//! a returned [`GameError`] and a `message(..., Error)` notification;
//! none of them mutate state.

use crate::board::{Pos, Stone};
use crate::engine::AiEngine;
use crate::error::GameError;
use crate::match_state::MatchState;
use crate::notify::{Collaborator, Severity, SoundCue};
use crate::roster::OpponentConfig;
use crate::skills::{resolve, SkillKind, SkillOutcome, TargetKind};

/// Transient state while the human picks targets for a skill.
///
/// Created when a targeted skill is invoked, destroyed on resolution or
/// cancellation. Never survives a turn.
#[derive(Debug)]
struct TargetSelection {
    skill: SkillKind,
    targets: Vec<Pos>,
}

/// A running match between the human (Black, moves first) and a
/// configured AI opponent (White).
pub struct GameSession<C: Collaborator> {
    state: MatchState,
    engine: Option<AiEngine>,
    selection: Option<TargetSelection>,
    collaborator: C,
}

/// The human always commands Black.
const HUMAN: Stone = Stone::Black;

impl<C: Collaborator> GameSession<C> {
    pub fn new(collaborator: C) -> Self {
        Self {
            state: MatchState::new(),
            engine: None,
            selection: None,
            collaborator,
        }
    }

    /// Read access for front-ends that render the match.
    #[inline]
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut MatchState {
        &mut self.state
    }

    #[inline]
    pub fn collaborator(&self) -> &C {
        &self.collaborator
    }

    #[inline]
    pub fn is_selecting_targets(&self) -> bool {
        self.selection.is_some()
    }

    /// Start (or restart) a match against the given opponent. The human
    /// side always receives the full five-skill catalog.
    pub fn start_match(&mut self, opponent: &OpponentConfig) {
        self.start_with_engine(opponent, AiEngine::new(opponent, Stone::White));
    }

    /// Deterministic variant for tests and replays.
    pub fn start_match_seeded(&mut self, opponent: &OpponentConfig, seed: u64) {
        self.start_with_engine(opponent, AiEngine::with_seed(opponent, Stone::White, seed));
    }

    fn start_with_engine(&mut self, opponent: &OpponentConfig, engine: AiEngine) {
        self.state = MatchState::new();
        self.state.setup_skills(&SkillKind::ALL, &opponent.skills);
        self.engine = Some(engine);
        self.selection = None;

        if opponent.fanfare {
            self.collaborator.sound(SoundCue::Entrance);
            self.collaborator.message(
                &format!("{} has entered. Expect near-perfect play", opponent.name),
                Severity::Warning,
            );
        } else {
            self.collaborator
                .message(&format!("Match started against {}", opponent.name), Severity::Info);
        }
        self.collaborator.board_changed();
    }

    /// Human placement. During target selection the coordinates are
    /// routed to the selection instead, mirroring a board click.
    pub fn attempt_placement(&mut self, row: i32, col: i32) -> Result<(), GameError> {
        if self.selection.is_some() {
            return self.supply_target(row, col);
        }

        if self.state.is_over() {
            return self.reject(GameError::MatchOver);
        }
        if self.state.current_player() != HUMAN {
            return self.reject(GameError::NotYourTurn);
        }
        if !self.state.extra_turn().is_active() && self.state.has_acted() {
            return self.reject(GameError::AlreadyActed);
        }
        if !self.state.is_legal_placement(row, col) {
            let err = self.placement_error(row, col);
            return self.reject(err);
        }

        self.state.place(row, col, HUMAN);
        let pos = Pos::new(row as u8, col as u8);
        self.collaborator.board_changed();

        if self.state.check_win(pos, HUMAN) {
            self.state.clear_extra_turn();
            self.state.declare_winner(HUMAN);
            self.collaborator.message("Victory is yours", Severity::Success);
            self.collaborator.game_over(HUMAN);
            return Ok(());
        }

        if self.state.extra_turn().is_active() {
            let remaining = self.state.consume_extra_move();
            if remaining == 0 {
                self.state.advance_turn();
                self.run_ai_turn();
            } else {
                self.collaborator.message(
                    &format!("Freeze active: {} more placement", remaining),
                    Severity::Info,
                );
            }
        } else {
            self.state.mark_acted();
            self.state.advance_turn();
            self.run_ai_turn();
        }

        Ok(())
    }

    /// Invoke one of the human's skills. Targeted skills open a target
    /// selection session; the freeze resolves immediately.
    pub fn invoke_skill(&mut self, kind: SkillKind) -> Result<(), GameError> {
        if self.state.extra_turn().is_active() {
            // Forced placements are pending; this is not a fresh skill window
            return self.reject(GameError::AlreadyActed);
        }
        if let Err(err) = self.state.skill_usable(HUMAN, kind) {
            return self.reject(err);
        }

        if kind.spec().target_count == 0 {
            match resolve(&mut self.state, HUMAN, kind, &[]) {
                Ok(SkillOutcome::ExtraTurnArmed) => {
                    self.collaborator.sound(kind.sound_cue());
                    self.collaborator.message(
                        "Freeze! The opponent is skipped; place two stones",
                        Severity::Success,
                    );
                    Ok(())
                }
                Ok(SkillOutcome::TurnEnded) => {
                    // No untargeted skill ends the turn today, but the
                    // contract allows it.
                    self.collaborator.sound(kind.sound_cue());
                    self.collaborator.board_changed();
                    self.run_ai_turn();
                    Ok(())
                }
                Err(err) => self.reject(err),
            }
        } else {
            self.selection = Some(TargetSelection {
                skill: kind,
                targets: Vec::new(),
            });
            self.collaborator
                .message(selection_hint(kind), Severity::Info);
            Ok(())
        }
    }

    /// Feed one target coordinate into the open selection session.
    pub fn supply_target(&mut self, row: i32, col: i32) -> Result<(), GameError> {
        let Some(selection) = &self.selection else {
            return self.reject(GameError::NoTargetSelection);
        };
        let kind = selection.skill;

        let Some(pos) = Pos::checked(row, col) else {
            return self.reject(GameError::OutOfBounds);
        };

        let board = self.state.board();
        let enemy = HUMAN.opponent();

        match kind.spec().target_kind {
            TargetKind::OpponentStone => {
                if board.get(pos) != enemy {
                    return self.reject(GameError::InvalidTarget("pick an opponent stone"));
                }
                self.push_target(pos)
            }
            TargetKind::AreaCenter => self.push_target(pos),
            TargetKind::OwnStonePair => {
                if board.get(pos) != HUMAN {
                    return self.reject(GameError::InvalidTarget("pick one of your own stones"));
                }
                if selection.targets.contains(&pos) {
                    return self.reject(GameError::InvalidTarget("pick two different stones"));
                }
                self.push_target(pos)
            }
            TargetKind::OpponentStoneThenEmpty => {
                if selection.targets.is_empty() {
                    if board.get(pos) != enemy {
                        return self.reject(GameError::InvalidTarget("pick an opponent stone"));
                    }
                } else if !board.is_legal(pos) {
                    return self.reject(GameError::InvalidTarget("destination is not playable"));
                }
                self.push_target(pos)
            }
            TargetKind::None => self.reject(GameError::NoTargetSelection),
        }
    }

    /// Record a validated target; resolve once the expected count is in.
    fn push_target(&mut self, pos: Pos) -> Result<(), GameError> {
        let selection = self.selection.as_mut().expect("checked by caller");
        selection.targets.push(pos);
        let kind = selection.skill;

        if selection.targets.len() < kind.spec().target_count {
            self.collaborator
                .message("Target marked; pick the next one", Severity::Info);
            return Ok(());
        }

        let targets = std::mem::take(&mut selection.targets);
        self.selection = None;

        match resolve(&mut self.state, HUMAN, kind, &targets) {
            Ok(_) => {
                self.collaborator.sound(kind.sound_cue());
                self.collaborator.message(
                    &format!("{} resolved!", kind.spec().name),
                    Severity::Success,
                );
                self.collaborator.board_changed();
                self.run_ai_turn();
                Ok(())
            }
            Err(err) => {
                // e.g. RestoreArea with an empty broken set
                self.reject(err)
            }
        }
    }

    /// Destroy the target selection session, leaving state untouched.
    pub fn cancel_skill(&mut self) {
        if self.selection.take().is_some() {
            self.collaborator
                .message("Target selection cancelled", Severity::Info);
        }
    }

    /// Let the AI act whenever the turn now belongs to it.
    fn run_ai_turn(&mut self) {
        if self.state.is_over() || self.state.current_player() == HUMAN {
            return;
        }
        if let Some(engine) = self.engine.as_mut() {
            engine.take_turn(&mut self.state, &mut self.collaborator);
        }
    }

    /// Decompose an illegal placement into its specific rejection.
    fn placement_error(&self, row: i32, col: i32) -> GameError {
        let Some(pos) = Pos::checked(row, col) else {
            return GameError::OutOfBounds;
        };
        if !self.state.board().is_empty(pos) {
            GameError::Occupied
        } else if self.state.board().is_broken(pos) {
            GameError::CellBroken
        } else {
            GameError::CellBlocked
        }
    }

    /// Notify and return the rejection. Never mutates match state.
    fn reject(&mut self, err: GameError) -> Result<(), GameError> {
        self.collaborator.message(&err.to_string(), Severity::Error);
        Err(err)
    }
}

/// Target-picking instructions per skill.
fn selection_hint(kind: SkillKind) -> &'static str {
    match kind {
        SkillKind::RemoveStone => "Pick the opponent stone to remove",
        SkillKind::BreakArea => "Pick the center of the 3x3 area to break",
        SkillKind::RestoreArea => "Pick two of your own stones to sacrifice",
        SkillKind::RelocateStone => "Pick an opponent stone, then its new cell",
        SkillKind::FreezeOpponent => "No target needed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::recording::RecordingCollaborator;
    use crate::roster::AiTier;

    fn session_vs(config: &OpponentConfig) -> GameSession<RecordingCollaborator> {
        let mut session = GameSession::new(RecordingCollaborator::default());
        session.start_match_seeded(config, 99);
        session
    }

    fn passive_opponent() -> OpponentConfig {
        // Casual tier with no skills keeps AI behavior simple in tests
        OpponentConfig {
            name: "Training Partner",
            tier: AiTier::Casual,
            skills: vec![],
            fanfare: false,
        }
    }

    #[test]
    fn test_placement_then_ai_reply() {
        let mut session = session_vs(&passive_opponent());
        session.attempt_placement(7, 7).unwrap();

        assert_eq!(session.state().board().stone_count(), 2, "AI replied");
        assert_eq!(session.state().current_player(), Stone::Black);
        assert_eq!(session.state().turn_count(), 2);
    }

    #[test]
    fn test_illegal_placement_reports_error() {
        let mut session = session_vs(&passive_opponent());
        session.attempt_placement(7, 7).unwrap();

        let result = session.attempt_placement(7, 7);
        assert_eq!(result, Err(GameError::Occupied));
        assert!(session
            .collaborator()
            .messages
            .iter()
            .any(|(_, sev)| *sev == Severity::Error));
    }

    #[test]
    fn test_out_of_bounds_placement() {
        let mut session = session_vs(&passive_opponent());
        assert_eq!(session.attempt_placement(-1, 3), Err(GameError::OutOfBounds));
        assert_eq!(session.attempt_placement(3, 15), Err(GameError::OutOfBounds));
    }

    #[test]
    fn test_remove_stone_selection_flow() {
        let mut session = session_vs(&passive_opponent());
        session.attempt_placement(7, 7).unwrap();

        let enemy_pos = session
            .state()
            .board()
            .stones(Stone::White)
            .unwrap()
            .iter_ones()
            .next()
            .expect("AI placed a stone");

        session.invoke_skill(SkillKind::RemoveStone).unwrap();
        assert!(session.is_selecting_targets());

        // Wrong target: an empty cell
        let empty = (0..15u8)
            .flat_map(|r| (0..15u8).map(move |c| Pos::new(r, c)))
            .find(|&p| session.state().board().get(p) == Stone::Empty)
            .unwrap();
        let result = session.supply_target(i32::from(empty.row), i32::from(empty.col));
        assert!(result.is_err());
        assert!(session.is_selecting_targets(), "selection survives a bad pick");

        // Right target: the AI stone
        session
            .supply_target(i32::from(enemy_pos.row), i32::from(enemy_pos.col))
            .unwrap();
        assert!(!session.is_selecting_targets());
        assert_eq!(session.state().board().get(enemy_pos), Stone::Empty);
        assert!(session
            .collaborator()
            .sounds
            .contains(&SoundCue::RemoveStone));
    }

    #[test]
    fn test_placement_routes_to_selection() {
        let mut session = session_vs(&passive_opponent());
        session.attempt_placement(7, 7).unwrap();

        let enemy_pos = session
            .state()
            .board()
            .stones(Stone::White)
            .unwrap()
            .iter_ones()
            .next()
            .unwrap();

        session.invoke_skill(SkillKind::RemoveStone).unwrap();
        // A "board click" while selecting targets feeds the selection
        session
            .attempt_placement(i32::from(enemy_pos.row), i32::from(enemy_pos.col))
            .unwrap();
        assert_eq!(session.state().board().get(enemy_pos), Stone::Empty);
    }

    #[test]
    fn test_cancel_skill() {
        let mut session = session_vs(&passive_opponent());
        session.invoke_skill(SkillKind::BreakArea).unwrap();
        assert!(session.is_selecting_targets());

        session.cancel_skill();
        assert!(!session.is_selecting_targets());
        assert_eq!(
            session.supply_target(7, 7),
            Err(GameError::NoTargetSelection)
        );
    }

    #[test]
    fn test_freeze_grants_two_placements_one_advance() {
        let mut session = session_vs(&passive_opponent());
        session.invoke_skill(SkillKind::FreezeOpponent).unwrap();
        assert!(session.state().extra_turn().is_active());

        let turn_before = session.state().turn_count();
        session.attempt_placement(7, 7).unwrap();
        assert!(
            session.state().extra_turn().is_active(),
            "one placement still owed"
        );
        assert_eq!(session.state().turn_count(), turn_before, "no advance yet");

        session.attempt_placement(8, 8).unwrap();
        assert!(!session.state().extra_turn().is_active());
        // Exactly one advance for the chain, plus the AI's own turn
        assert_eq!(session.state().turn_count(), turn_before + 2);
        assert_eq!(session.state().current_player(), Stone::Black);
    }

    #[test]
    fn test_skill_invoke_rejected_during_freeze_chain() {
        let mut session = session_vs(&passive_opponent());
        session.invoke_skill(SkillKind::FreezeOpponent).unwrap();

        let result = session.invoke_skill(SkillKind::BreakArea);
        assert_eq!(result, Err(GameError::AlreadyActed));
    }

    #[test]
    fn test_restore_without_broken_area_rejected() {
        let mut session = session_vs(&passive_opponent());
        session.attempt_placement(0, 0).unwrap();
        // Second human stone on whatever cell is still free (the AI reply
        // lands at an unknown spot)
        let second = (0..15u8)
            .flat_map(|r| (0..15u8).map(move |c| Pos::new(r, c)))
            .find(|&p| session.state().board().is_legal(p))
            .unwrap();
        session
            .attempt_placement(i32::from(second.row), i32::from(second.col))
            .unwrap();

        let own: Vec<Pos> = session
            .state()
            .board()
            .stones(Stone::Black)
            .unwrap()
            .iter_ones()
            .take(2)
            .collect();

        session.invoke_skill(SkillKind::RestoreArea).unwrap();
        session
            .supply_target(i32::from(own[0].row), i32::from(own[0].col))
            .unwrap();
        let result = session.supply_target(i32::from(own[1].row), i32::from(own[1].col));
        assert_eq!(result, Err(GameError::NothingToRestore));
        assert!(!session.is_selecting_targets());
        assert_eq!(
            session.state().board().get(own[0]),
            Stone::Black,
            "rejection leaves the stones alone"
        );
    }

    #[test]
    fn test_break_area_via_session() {
        let mut session = session_vs(&passive_opponent());
        session.attempt_placement(7, 7).unwrap();

        session.invoke_skill(SkillKind::BreakArea).unwrap();
        session.supply_target(2, 2).unwrap();
        assert_eq!(session.state().board().broken_count(), 9);
        assert!(!session.state().is_legal_placement(1, 1));

        // The cooldown gate holds until 20 turn advances have passed
        assert_eq!(
            session.state().skill_usable(Stone::Black, SkillKind::BreakArea),
            Err(GameError::SkillOnCooldown)
        );
    }

    #[test]
    fn test_relocate_selection_two_steps() {
        let mut session = session_vs(&passive_opponent());
        session.attempt_placement(7, 7).unwrap();

        let enemy_pos = session
            .state()
            .board()
            .stones(Stone::White)
            .unwrap()
            .iter_ones()
            .next()
            .unwrap();

        session.invoke_skill(SkillKind::RelocateStone).unwrap();
        session
            .supply_target(i32::from(enemy_pos.row), i32::from(enemy_pos.col))
            .unwrap();
        assert!(session.is_selecting_targets(), "destination still pending");

        session.supply_target(0, 0).unwrap();
        assert_eq!(session.state().board().get(Pos::new(0, 0)), Stone::White);
        assert_eq!(session.state().board().get(enemy_pos), Stone::Empty);
    }

    #[test]
    fn test_fanfare_on_master_opponent() {
        let mut session = GameSession::new(RecordingCollaborator::default());
        session.start_match_seeded(&OpponentConfig::warlord(), 1);
        assert!(session.collaborator().sounds.contains(&SoundCue::Entrance));
        assert!(session
            .collaborator()
            .messages
            .iter()
            .any(|(_, sev)| *sev == Severity::Warning));
    }

    #[test]
    fn test_human_win_reports_game_over() {
        let mut session = session_vs(&passive_opponent());
        // Four in a row already on the board; the fifth placement wins
        for col in 3..7 {
            session
                .state_mut()
                .board_mut()
                .place_stone(Pos::new(7, col), Stone::Black);
        }

        session.attempt_placement(7, 7).unwrap();

        assert!(session.state().is_over());
        assert_eq!(session.state().winner(), Some(Stone::Black));
        assert_eq!(session.collaborator().winner, Some(Stone::Black));
        assert!(session
            .collaborator()
            .messages
            .iter()
            .any(|(_, sev)| *sev == Severity::Success));
    }

    #[test]
    fn test_placement_rejected_after_game_over() {
        let mut session = session_vs(&passive_opponent());
        for col in 3..7 {
            session
                .state_mut()
                .board_mut()
                .place_stone(Pos::new(7, col), Stone::Black);
        }
        session.attempt_placement(7, 7).unwrap();

        assert_eq!(session.attempt_placement(0, 0), Err(GameError::MatchOver));
    }
}
