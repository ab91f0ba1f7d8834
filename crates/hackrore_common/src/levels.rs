//! Level table
//!
//! Levels 1-10 derived from total XP through a fixed ascending threshold
//! table. Level is never stored independently of XP.

use serde::{Deserialize, Serialize};

/// XP required to reach levels 1-10
pub const LEVEL_THRESHOLDS: [u64; 10] = [0, 100, 300, 600, 1000, 1500, 2100, 2800, 3600, 4500];

/// Highest level the table can express
pub const MAX_LEVEL: u32 = LEVEL_THRESHOLDS.len() as u32;

/// Level for a total XP value (1-indexed, level 1 at 0 XP)
pub fn level_for_xp(xp: u64) -> u32 {
    LEVEL_THRESHOLDS
        .iter()
        .rposition(|&threshold| xp >= threshold)
        .map(|i| i as u32 + 1)
        .unwrap_or(1)
}

/// XP needed to enter a level. Out-of-range levels clamp to the table.
pub fn threshold_for_level(level: u32) -> u64 {
    let idx = (level.max(1) as usize - 1).min(LEVEL_THRESHOLDS.len() - 1);
    LEVEL_THRESHOLDS[idx]
}

/// Progress within the current level band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    /// 0.0 - 100.0
    pub progress_percent: f64,
    pub current_level_threshold: u64,
    pub next_level_threshold: u64,
    pub xp_into_level: u64,
}

impl LevelProgress {
    pub fn compute(xp: u64, level: u32) -> Self {
        let current = threshold_for_level(level);
        let xp_into_level = xp.saturating_sub(current);

        if level >= MAX_LEVEL {
            return Self {
                progress_percent: 100.0,
                current_level_threshold: current,
                next_level_threshold: LEVEL_THRESHOLDS[LEVEL_THRESHOLDS.len() - 1],
                xp_into_level,
            };
        }

        let next = threshold_for_level(level + 1);
        let band = next.saturating_sub(current);
        let progress = if band == 0 {
            100.0
        } else {
            xp_into_level as f64 / band as f64 * 100.0
        };

        Self {
            progress_percent: progress.clamp(0.0, 100.0),
            current_level_threshold: current,
            next_level_threshold: next,
            xp_into_level,
        }
    }

    /// XP still missing before the next level (0 at max level)
    pub fn xp_to_next(&self, xp: u64) -> u64 {
        self.next_level_threshold.saturating_sub(xp)
    }

    /// Whole-number percentage for bars and badges
    pub fn percent(&self) -> u8 {
        self.progress_percent.floor() as u8
    }
}
