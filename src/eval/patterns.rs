//! Direction scores for position evaluation
//!
//! These constants define the scoring weights for line patterns seen from
//! a single hypothetical placement. The AI's priority logic keys off the
//! relative ordering (and the two class thresholds below), so the values
//! must stay in this order even if retuned.

/// Scores for a single direction through a hypothetical placement
pub struct DirectionScore;

impl DirectionScore {
    /// Five in a row - immediate win
    pub const FIVE: i32 = 1_000_000;

    // Four patterns
    /// Open four: _OOOO_ (both ends open)
    pub const OPEN_FOUR: i32 = 100_000;
    /// Half-open four: XOOOO_ (one end open)
    pub const HALF_FOUR: i32 = 50_000;
    /// Dead four: both ends shut
    pub const DEAD_FOUR: i32 = 100;

    // Three patterns
    /// Open three: _OOO_
    pub const OPEN_THREE: i32 = 5_000;
    /// Half-open three: XOOO_
    pub const HALF_THREE: i32 = 1_000;
    /// Dead three
    pub const DEAD_THREE: i32 = 50;

    // Two patterns
    pub const OPEN_TWO: i32 = 500;
    pub const HALF_TWO: i32 = 100;
    pub const DEAD_TWO: i32 = 10;

    /// A lone stone is worth this per open end
    pub const SINGLE: i32 = 5;

    /// Threshold for a "four-class" threat (one move from five)
    pub const FOUR_CLASS: i32 = Self::HALF_FOUR;
    /// Threshold for a "three-class" threat (one move from a four shape)
    pub const THREE_CLASS: i32 = Self::OPEN_THREE;
}
