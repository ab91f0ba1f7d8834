//! Level-gated rewards (themes and badges).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnlockKind {
    Theme,
    Badge,
}

impl UnlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnlockKind::Theme => "theme",
            UnlockKind::Badge => "badge",
        }
    }
}

impl fmt::Display for UnlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A reward unlocked once the technician reaches `required_level`.
/// Serialized in the same shape the browser build stored under `user_unlocks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unlockable {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: UnlockKind,
    pub description: String,
    pub required_level: u32,
    #[serde(default)]
    pub unlocked: bool,
}

impl Unlockable {
    pub fn new(id: &str, name: &str, kind: UnlockKind, description: &str, required_level: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required_level,
            unlocked: false,
        }
    }

    /// Flip to unlocked if the level qualifies. Returns true on a fresh unlock.
    /// Never re-locks.
    pub fn evaluate(&mut self, level: u32) -> bool {
        if !self.unlocked && level >= self.required_level {
            self.unlocked = true;
            return true;
        }
        false
    }

    /// One-line notice for a fresh unlock
    pub fn unlock_notice(&self) -> String {
        format!("Unlocked {}: {} - {}", self.kind, self.name, self.description)
    }
}

/// Seed list, all locked
pub fn seed_unlockables() -> Vec<Unlockable> {
    vec![
        Unlockable::new("theme_cyberpunk", "Cyberpunk Glow", UnlockKind::Theme, "Unlock the Cyberpunk theme.", 3),
        Unlockable::new("theme_blueprint", "Blueprint Grid", UnlockKind::Theme, "Unlock the Blueprint theme.", 5),
        Unlockable::new("badge_novice", "Novice Technician", UnlockKind::Badge, "Complete 5 tests.", 2),
    ]
}

/// Rebuild the reward list from persisted records.
///
/// Seed definitions win for name, kind and required level; only the
/// `unlocked` flag is carried over. Persisted ids unknown to the seed list
/// are dropped.
pub fn merge_with_seed(saved: &[Unlockable]) -> Vec<Unlockable> {
    seed_unlockables()
        .into_iter()
        .map(|mut u| {
            if saved.iter().any(|s| s.id == u.id && s.unlocked) {
                u.unlocked = true;
            }
            u
        })
        .collect()
}
