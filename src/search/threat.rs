//! Threat detection: active runs and multi-threat cells
//!
//! Two families of scans feed the AI policy:
//!
//! - [`find_active_four`] / [`find_active_three`] locate an existing run of
//!   stones with at least one playable end. Their results drive the skill
//!   policy (what to freeze, relocate or destroy) and carry the end cells
//!   the freeze effect's forced placements consume.
//! - [`detect_multiple_threats`] classifies every legal cell by how many
//!   independent threats a stone there would create, finding forcing moves
//!   (double threes and three-four combinations) for attack and defense.

use crate::board::{Board, Pos, Stone, BOARD_SIZE};
use crate::eval::{evaluate_direction, DirectionScore};
use crate::rules::DIRECTIONS;

/// A run of stones with its playable ends.
///
/// `positions` are sorted along `dir`; `front_end` sits before the first
/// stone, `back_end` after the last. An absent end is shut (occupied,
/// broken, blocked or off the board). The space counts say how much legal
/// room extends past each end (saturating at 2 — exactly the lookahead the
/// difficulty tuning depends on).
#[derive(Debug, Clone)]
pub struct ActiveRun {
    pub positions: Vec<Pos>,
    pub front_end: Option<Pos>,
    pub back_end: Option<Pos>,
    pub front_space: u8,
    pub back_space: u8,
    pub dir: (i32, i32),
}

/// Threat classification for a single candidate cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreatClass {
    /// Double three, or three + four: unstoppable next turn
    Critical,
    /// At least one four-class direction
    High,
    /// At least one three-class direction
    Medium,
}

/// A cell whose hypothetical occupation creates one or more threats.
#[derive(Debug, Clone, Copy)]
pub struct ThreatCell {
    pub pos: Pos,
    pub class: ThreatClass,
    pub threes: u8,
    pub fours: u8,
}

/// Collect a run of exactly `len` contiguous `color` stones through `pos`
/// along `dir`, ignoring broken cells. Returns sorted positions or `None`.
fn collect_run(board: &Board, pos: Pos, dir: (i32, i32), color: Stone, len: usize) -> Option<Vec<Pos>> {
    let (dr, dc) = dir;
    let mut positions = vec![pos];

    // The scan reaches at most len-1 cells per side, like the run length
    // itself: a longer run is found from a different starting stone.
    for i in 1..len as i32 {
        match pos.step(dr, dc, i) {
            Some(p) if board.get(p) == color && !board.is_broken(p) => positions.push(p),
            _ => break,
        }
    }
    for i in 1..len as i32 {
        match pos.step(-dr, -dc, i) {
            Some(p) if board.get(p) == color && !board.is_broken(p) => positions.push(p),
            _ => break,
        }
    }

    if positions.len() != len {
        return None;
    }

    // Order along the direction so front/back ends are well defined
    positions.sort_by_key(|p| i32::from(p.row) * dr + i32::from(p.col) * dc);
    Some(positions)
}

/// Legal room extending past an end cell, saturating at 2.
///
/// Looks exactly one cell beyond the end — this deliberately shallow
/// lookahead is part of the opponent tuning and must not be deepened.
fn end_space(board: &Board, end: Option<Pos>, from: Pos, dir: (i32, i32)) -> u8 {
    if end.is_none() {
        return 0;
    }
    let mut space = 1;
    if let Some(p) = from.step(dir.0, dir.1, 2) {
        if board.is_legal(p) {
            space += 1;
        }
    }
    space
}

/// Find the first run of exactly `len` stones with at least one playable
/// end, in row-major scan order. The generic worker behind the two
/// public detectors.
fn find_active_run(board: &Board, color: Stone, len: usize) -> Option<ActiveRun> {
    for row in 0..BOARD_SIZE as u8 {
        for col in 0..BOARD_SIZE as u8 {
            let pos = Pos::new(row, col);
            if board.get(pos) != color {
                continue;
            }

            for &dir in &DIRECTIONS {
                let Some(positions) = collect_run(board, pos, dir, color, len) else {
                    continue;
                };

                let first = positions[0];
                let last = positions[len - 1];
                let front = first
                    .step(-dir.0, -dir.1, 1)
                    .filter(|&p| board.is_legal(p));
                let back = last.step(dir.0, dir.1, 1).filter(|&p| board.is_legal(p));

                let front_space = end_space(board, front, first, (-dir.0, -dir.1));
                let back_space = end_space(board, back, last, dir);

                let qualifies = match len {
                    // A four is active with any playable end
                    4 => front.is_some() || back.is_some(),
                    // A three needs both ends, or one end with room to
                    // still reach five on that side
                    _ => (front.is_some() && back.is_some()) || front_space >= 2 || back_space >= 2,
                };

                if qualifies {
                    return Some(ActiveRun {
                        positions,
                        front_end: front,
                        back_end: back,
                        front_space,
                        back_space,
                        dir,
                    });
                }
            }
        }
    }
    None
}

/// Find a four-in-a-row with at least one playable end.
pub fn find_active_four(board: &Board, color: Stone) -> Option<ActiveRun> {
    find_active_run(board, color, 4)
}

/// Find a three-in-a-row that can still grow into five.
///
/// Both-ends-open threes always qualify; a one-sided three qualifies when
/// the open side has at least 2 further legal cells in line.
pub fn find_active_three(board: &Board, color: Stone) -> Option<ActiveRun> {
    find_active_run(board, color, 3)
}

/// Classify every legal cell by the threats a hypothetical `color` stone
/// there would create.
///
/// Per cell, each of the four directions is scored independently:
/// a direction at or above the four-class threshold counts as a four
/// threat, one in the three-class band as a three threat. Results come
/// back in row-major order; callers pick the first of a class.
pub fn detect_multiple_threats(board: &Board, color: Stone) -> Vec<ThreatCell> {
    let mut threats = Vec::new();

    for row in 0..BOARD_SIZE as u8 {
        for col in 0..BOARD_SIZE as u8 {
            let pos = Pos::new(row, col);
            if !board.is_legal(pos) {
                continue;
            }

            let mut threes = 0u8;
            let mut fours = 0u8;
            for &(dr, dc) in &DIRECTIONS {
                let score = evaluate_direction(board, pos, dr, dc, color);
                if score >= DirectionScore::FOUR_CLASS {
                    fours += 1;
                } else if score >= DirectionScore::THREE_CLASS {
                    threes += 1;
                }
            }

            let class = if threes >= 2 || (threes >= 1 && fours >= 1) {
                ThreatClass::Critical
            } else if fours >= 1 {
                ThreatClass::High
            } else if threes >= 1 {
                ThreatClass::Medium
            } else {
                continue;
            };

            threats.push(ThreatCell {
                pos,
                class,
                threes,
                fours,
            });
        }
    }

    threats
}

/// First threat cell of the given class, in scan order.
pub fn first_of_class(threats: &[ThreatCell], class: ThreatClass) -> Option<Pos> {
    threats.iter().find(|t| t.class == class).map(|t| t.pos)
}
