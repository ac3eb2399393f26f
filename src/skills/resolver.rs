//! Skill resolution: validate targets, apply effects atomically
//!
//! The resolution contract: a use is rejected with no state change and no
//! cooldown spent unless every target satisfies the skill's target
//! contract. On success the cooldown resets, the board mutation applies
//! in one piece, and the turn advances — except for the freeze, which
//! instead arms the extra-turn effect and leaves the caster free to place.

use crate::board::{Pos, Stone};
use crate::error::GameError;
use crate::match_state::MatchState;

use super::{SkillKind, TargetKind};

/// How a resolved skill hands control back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillOutcome {
    /// Effect applied, turn advanced; the opponent moves next.
    TurnEnded,
    /// Freeze armed: the caster owes two placements before the turn moves.
    ExtraTurnArmed,
}

/// Validate `targets` against the skill's target contract. Pure; runs
/// before any mutation so rejection is always all-or-nothing.
fn validate_targets(
    state: &MatchState,
    owner: Stone,
    kind: SkillKind,
    targets: &[Pos],
) -> Result<(), GameError> {
    let spec = kind.spec();
    if targets.len() != spec.target_count {
        return Err(GameError::InvalidTarget("wrong number of targets"));
    }

    let opponent = owner.opponent();
    let board = state.board();

    match spec.target_kind {
        TargetKind::None => {}
        TargetKind::OpponentStone => {
            if board.get(targets[0]) != opponent {
                return Err(GameError::InvalidTarget("expected an opponent stone"));
            }
        }
        TargetKind::AreaCenter => {
            // Any in-bounds cell; the area clamps to the board edge.
        }
        TargetKind::OwnStonePair => {
            if board.broken_count() == 0 {
                return Err(GameError::NothingToRestore);
            }
            if targets[0] == targets[1] {
                return Err(GameError::InvalidTarget("pick two different stones"));
            }
            if targets.iter().any(|&t| board.get(t) != owner) {
                return Err(GameError::InvalidTarget("expected your own stones"));
            }
        }
        TargetKind::OpponentStoneThenEmpty => {
            if board.get(targets[0]) != opponent {
                return Err(GameError::InvalidTarget("expected an opponent stone"));
            }
            if !board.is_legal(targets[1]) {
                return Err(GameError::InvalidTarget("destination is not playable"));
            }
        }
    }

    Ok(())
}

/// Resolve a skill use by `owner` against the given targets.
///
/// Checks usability (turn, cooldown, has-acted, roster) and the target
/// contract, then applies the effect. Source cells of removed or moved
/// stones are blocked for 2 turns.
pub fn resolve(
    state: &mut MatchState,
    owner: Stone,
    kind: SkillKind,
    targets: &[Pos],
) -> Result<SkillOutcome, GameError> {
    state.skill_usable(owner, kind)?;
    validate_targets(state, owner, kind, targets)?;

    // All checks passed; from here on the application cannot fail.
    match kind {
        SkillKind::RemoveStone => {
            let target = targets[0];
            state.board_mut().remove_stone(target);
            state.board_mut().block_cell(target, 2);
        }
        SkillKind::FreezeOpponent => {
            state.arm_extra_turn();
        }
        SkillKind::BreakArea => {
            let center = targets[0];
            for dr in -1..=1 {
                for dc in -1..=1 {
                    if let Some(p) = center.step(dr, dc, 1) {
                        state.board_mut().break_cell(p);
                    }
                }
            }
        }
        SkillKind::RestoreArea => {
            state.board_mut().clear_broken();
            for &target in targets {
                state.board_mut().remove_stone(target);
            }
        }
        SkillKind::RelocateStone => {
            let (from, to) = (targets[0], targets[1]);
            let stone = state.board().get(from);
            state.board_mut().remove_stone(from);
            state.board_mut().place_stone(to, stone);
            state.board_mut().block_cell(from, 2);
        }
    }

    state
        .skill_mut(owner, kind)
        .expect("usability check guarantees the instance exists")
        .trigger();

    if kind == SkillKind::FreezeOpponent {
        // The caster still places; the turn does not move.
        Ok(SkillOutcome::ExtraTurnArmed)
    } else {
        state.mark_acted();
        state.advance_turn();
        Ok(SkillOutcome::TurnEnded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BOARD_SIZE;

    fn dueling_state() -> MatchState {
        let mut state = MatchState::new();
        state.setup_skills(&SkillKind::ALL, &SkillKind::ALL);
        state
    }

    #[test]
    fn test_remove_stone_blocks_cell() {
        let mut state = dueling_state();
        let target = Pos::new(5, 5);
        state.board_mut().place_stone(target, Stone::White);

        let outcome = resolve(&mut state, Stone::Black, SkillKind::RemoveStone, &[target]);
        assert_eq!(outcome, Ok(SkillOutcome::TurnEnded));
        assert_eq!(state.board().get(target), Stone::Empty);
        assert!(!state.is_legal_placement(5, 5), "cell blocked for 2 turns");
        assert_eq!(state.current_player(), Stone::White, "turn advanced");

        // advance_turn already ran once inside resolve; one more clears it
        state.advance_turn();
        assert!(state.is_legal_placement(5, 5), "restriction expired");
    }

    #[test]
    fn test_remove_stone_rejects_own_stone() {
        let mut state = dueling_state();
        let target = Pos::new(5, 5);
        state.board_mut().place_stone(target, Stone::Black);

        let before_player = state.current_player();
        let result = resolve(&mut state, Stone::Black, SkillKind::RemoveStone, &[target]);
        assert_eq!(result, Err(GameError::InvalidTarget("expected an opponent stone")));
        assert_eq!(state.board().get(target), Stone::Black, "no state change");
        assert_eq!(state.current_player(), before_player, "no turn advance");
        assert!(
            state.skills(Stone::Black)[0].is_ready(),
            "no cooldown spent on rejection"
        );
    }

    #[test]
    fn test_freeze_arms_extra_turn_without_advancing() {
        let mut state = dueling_state();
        let outcome = resolve(&mut state, Stone::Black, SkillKind::FreezeOpponent, &[]);
        assert_eq!(outcome, Ok(SkillOutcome::ExtraTurnArmed));
        assert!(state.extra_turn().is_active());
        assert_eq!(state.extra_turn().remaining(), 2);
        assert_eq!(state.current_player(), Stone::Black, "caster keeps the turn");
        assert!(!state.has_acted(), "caster can still place");

        let freeze = state
            .skills(Stone::Black)
            .iter()
            .find(|s| s.kind == SkillKind::FreezeOpponent)
            .unwrap();
        assert_eq!(freeze.current_cooldown, 16);
    }

    #[test]
    fn test_break_area_center() {
        let mut state = dueling_state();
        state.board_mut().place_stone(Pos::new(7, 7), Stone::White);

        resolve(&mut state, Stone::Black, SkillKind::BreakArea, &[Pos::new(7, 7)]).unwrap();

        for row in 6..=8 {
            for col in 6..=8 {
                let pos = Pos::new(row, col);
                assert!(state.board().is_broken(pos), "({}, {}) broken", row, col);
                assert_eq!(state.board().get(pos), Stone::Empty);
            }
        }
        assert_eq!(state.board().broken_count(), 9);
        assert!(!state.is_legal_placement(6, 6));
    }

    #[test]
    fn test_break_area_clamps_at_corner() {
        let mut state = dueling_state();
        resolve(&mut state, Stone::Black, SkillKind::BreakArea, &[Pos::new(0, 0)]).unwrap();
        assert_eq!(state.board().broken_count(), 4, "2x2 area at the corner");

        let mut state = dueling_state();
        let edge = (BOARD_SIZE - 1) as u8;
        resolve(&mut state, Stone::Black, SkillKind::BreakArea, &[Pos::new(edge, 7)]).unwrap();
        assert_eq!(state.board().broken_count(), 6, "2x3 area at the edge");
    }

    #[test]
    fn test_restore_area_clears_everything() {
        let mut state = dueling_state();
        state.board_mut().break_cell(Pos::new(2, 2));
        state.board_mut().break_cell(Pos::new(12, 12));
        let (own1, own2) = (Pos::new(5, 5), Pos::new(6, 6));
        state.board_mut().place_stone(own1, Stone::Black);
        state.board_mut().place_stone(own2, Stone::Black);

        resolve(&mut state, Stone::Black, SkillKind::RestoreArea, &[own1, own2]).unwrap();

        assert_eq!(state.board().broken_count(), 0);
        assert_eq!(state.board().get(own1), Stone::Empty, "cost paid");
        assert_eq!(state.board().get(own2), Stone::Empty, "cost paid");
    }

    #[test]
    fn test_restore_area_rejects_empty_broken_set() {
        let mut state = dueling_state();
        let (own1, own2) = (Pos::new(5, 5), Pos::new(6, 6));
        state.board_mut().place_stone(own1, Stone::Black);
        state.board_mut().place_stone(own2, Stone::Black);

        let result = resolve(&mut state, Stone::Black, SkillKind::RestoreArea, &[own1, own2]);
        assert_eq!(result, Err(GameError::NothingToRestore));
        assert_eq!(state.board().get(own1), Stone::Black, "stones untouched");
    }

    #[test]
    fn test_restore_area_rejects_duplicate_stone() {
        let mut state = dueling_state();
        state.board_mut().break_cell(Pos::new(2, 2));
        let own = Pos::new(5, 5);
        state.board_mut().place_stone(own, Stone::Black);

        let result = resolve(&mut state, Stone::Black, SkillKind::RestoreArea, &[own, own]);
        assert_eq!(result, Err(GameError::InvalidTarget("pick two different stones")));
    }

    #[test]
    fn test_relocate_moves_stone_and_blocks_source() {
        let mut state = dueling_state();
        let (from, to) = (Pos::new(5, 5), Pos::new(10, 10));
        state.board_mut().place_stone(from, Stone::White);

        resolve(&mut state, Stone::Black, SkillKind::RelocateStone, &[from, to]).unwrap();

        assert_eq!(state.board().get(from), Stone::Empty);
        assert_eq!(state.board().get(to), Stone::White, "stone keeps its owner");
        assert!(!state.is_legal_placement(5, 5), "source blocked");
    }

    #[test]
    fn test_relocate_rejects_blocked_destination() {
        let mut state = dueling_state();
        let (from, to) = (Pos::new(5, 5), Pos::new(10, 10));
        state.board_mut().place_stone(from, Stone::White);
        state.board_mut().block_cell(to, 2);

        let result = resolve(&mut state, Stone::Black, SkillKind::RelocateStone, &[from, to]);
        assert_eq!(result, Err(GameError::InvalidTarget("destination is not playable")));
        assert_eq!(state.board().get(from), Stone::White, "no state change");
    }

    #[test]
    fn test_resolve_respects_cooldown() {
        let mut state = dueling_state();
        let target = Pos::new(5, 5);
        state.board_mut().place_stone(target, Stone::White);
        state.skill_mut(Stone::Black, SkillKind::RemoveStone).unwrap().trigger();

        let result = resolve(&mut state, Stone::Black, SkillKind::RemoveStone, &[target]);
        assert_eq!(result, Err(GameError::SkillOnCooldown));
    }

    #[test]
    fn test_resolve_respects_turn_ownership() {
        let mut state = dueling_state();
        let target = Pos::new(5, 5);
        state.board_mut().place_stone(target, Stone::Black);

        // White holds the skill but it is Black's turn
        let result = resolve(&mut state, Stone::White, SkillKind::RemoveStone, &[target]);
        assert_eq!(result, Err(GameError::NotYourTurn));
    }

    #[test]
    fn test_skill_then_placement_excluded() {
        let mut state = dueling_state();
        let target = Pos::new(5, 5);
        state.board_mut().place_stone(target, Stone::White);

        resolve(&mut state, Stone::Black, SkillKind::RemoveStone, &[target]).unwrap();
        // Turn advanced to White; a second Black action must be refused
        assert_eq!(
            state.skill_usable(Stone::Black, SkillKind::BreakArea),
            Err(GameError::NotYourTurn)
        );
    }
}
