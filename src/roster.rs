//! Opponent roster configuration
//!
//! Rosters are fixed configuration data, not logic: a display name, an AI
//! tier, the skill kinds the opponent brings, and whether its entrance
//! gets a fanfare. `GameSession::start_match` consumes one of these; the
//! shipped roster mirrors the three built-in opponents, but callers can
//! assemble their own.

use crate::skills::SkillKind;

/// AI difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AiTier {
    /// Weakest: jittered heuristic, rare skill use.
    Casual,
    /// Heuristic tier with tuned attack/defense weights.
    Skilled {
        attack_weight: f64,
        defense_weight: f64,
    },
    /// Hardest: threat priorities plus depth-limited search.
    Master,
}

/// One opponent's fixed configuration.
#[derive(Debug, Clone)]
pub struct OpponentConfig {
    pub name: &'static str,
    pub tier: AiTier,
    pub skills: Vec<SkillKind>,
    /// Play the entrance cue and a warning banner at match start.
    pub fanfare: bool,
}

impl OpponentConfig {
    /// Entry-level opponent: one skill, sloppy play.
    pub fn novice() -> Self {
        Self {
            name: "Novice",
            tier: AiTier::Casual,
            skills: vec![SkillKind::RemoveStone],
            fanfare: false,
        }
    }

    /// Attack-biased heuristic opponent with a destructive skill set.
    pub fn vanguard() -> Self {
        Self {
            name: "Vanguard",
            tier: AiTier::Skilled {
                attack_weight: 1.5,
                defense_weight: 1.0,
            },
            skills: vec![
                SkillKind::RemoveStone,
                SkillKind::BreakArea,
                SkillKind::RelocateStone,
            ],
            fanfare: false,
        }
    }

    /// The final opponent: full search tier and the freeze.
    pub fn warlord() -> Self {
        Self {
            name: "Warlord",
            tier: AiTier::Master,
            skills: vec![
                SkillKind::FreezeOpponent,
                SkillKind::RestoreArea,
                SkillKind::RelocateStone,
            ],
            fanfare: true,
        }
    }

    /// The shipped roster, weakest first.
    pub fn roster() -> Vec<OpponentConfig> {
        vec![Self::novice(), Self::vanguard(), Self::warlord()]
    }
}

/// Default attack/defense weights for the skilled tier.
pub const DEFAULT_ATTACK_WEIGHT: f64 = 1.2;
pub const DEFAULT_DEFENSE_WEIGHT: f64 = 1.2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_shape() {
        let roster = OpponentConfig::roster();
        assert_eq!(roster.len(), 3);
        assert_eq!(roster[0].tier, AiTier::Casual);
        assert!(matches!(roster[1].tier, AiTier::Skilled { .. }));
        assert_eq!(roster[2].tier, AiTier::Master);
    }

    #[test]
    fn test_warlord_brings_the_freeze() {
        let config = OpponentConfig::warlord();
        assert!(config.skills.contains(&SkillKind::FreezeOpponent));
        assert!(config.fanfare);
    }

    #[test]
    fn test_novice_has_single_skill() {
        let config = OpponentConfig::novice();
        assert_eq!(config.skills, vec![SkillKind::RemoveStone]);
    }
}
