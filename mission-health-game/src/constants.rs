//! Centralized balance and tuning constants for Mission Health game logic.
//!
//! Round economy, scoring, progression and word-game limits live here so the
//! numbers can only change through reviewed code rather than asset edits.

// Mission economy ----------------------------------------------------------
pub const STARTING_RESOURCES: i32 = 100;
pub const ROUND_RESOURCE_BONUS: i32 = 30;
pub const OFFERED_INTERVENTIONS: usize = 3;
pub const FIRST_ROUND: u32 = 1;
pub const METRIC_MIN: i32 = 0;
pub const METRIC_MAX: i32 = 100;

// Scoring --------------------------------------------------------------------
pub const SCORE_RESOURCE_WEIGHT: i32 = 2;
pub const SCORE_DIVISOR: i32 = 10;

// Progression ----------------------------------------------------------------
pub const XP_PER_COMPLETION: u32 = 25;
pub const XP_PER_LEVEL: u32 = 100;
pub const ACHIEVEMENTS_KEY: &str = "missionHealthAchievements";
pub const XP_KEY: &str = "missionHealthXp";

// Word game ------------------------------------------------------------------
pub const WORD_LENGTH: usize = 5;
pub const MAX_GUESSES: usize = 6;

// District map -----------------------------------------------------------------
pub const STATE_CENTER: [f64; 2] = [78.6569, 23.4851];
pub const DENSITY_LOW_CEILING: f64 = 0.33;
pub const DENSITY_MEDIUM_CEILING: f64 = 0.66;
pub const MARKER_BASE_RADIUS: f64 = 8.0;
pub const MARKER_RADIUS_SPAN: f64 = 20.0;
