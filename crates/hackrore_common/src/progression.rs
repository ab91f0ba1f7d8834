//! Progression ledger: XP, derived level, level-gated unlocks.
//!
//! XP only grows through `add_xp`. Level is recomputed from XP on every
//! change and on load, so the two cannot drift apart. Unlocks are
//! re-evaluated on every level-up and never revert.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{HackroreError, Result};
use crate::levels::{level_for_xp, LevelProgress, MAX_LEVEL};
use crate::storage::SharedStore;
use crate::unlockables::{merge_with_seed, seed_unlockables, Unlockable};

pub const XP_KEY: &str = "user_xp";
pub const LEVEL_KEY: &str = "user_level";
pub const UNLOCKS_KEY: &str = "user_unlocks";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub from: u32,
    pub to: u32,
}

/// Outcome of a single `add_xp` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpAward {
    pub amount: u64,
    pub reason: String,
    pub total_xp: u64,
    pub level: u32,
    pub level_up: Option<LevelUp>,
    /// Rewards that flipped to unlocked during this call
    pub unlocked: Vec<Unlockable>,
}

impl XpAward {
    /// Toast text: "+50 XP: Camera Test Complete"
    pub fn notification(&self) -> String {
        format!("+{} XP: {}", self.amount, self.reason)
    }

    /// Notification followed by level-up and unlock notices
    pub fn notices(&self) -> Vec<String> {
        let mut lines = vec![self.notification()];
        if let Some(up) = self.level_up {
            lines.push(format!("Level up! {} -> {}", up.from, up.to));
        }
        lines.extend(self.unlocked.iter().map(|u| u.unlock_notice()));
        lines
    }
}

pub struct ProgressionLedger {
    store: SharedStore,
    xp: u64,
    level: u32,
    unlockables: Vec<Unlockable>,
    durable: bool,
}

impl std::fmt::Debug for ProgressionLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressionLedger")
            .field("xp", &self.xp)
            .field("level", &self.level)
            .field("unlockables", &self.unlockables)
            .field("durable", &self.durable)
            .finish()
    }
}

impl ProgressionLedger {
    /// Fresh ledger at xp 0, level 1, nothing unlocked. Nothing is written yet.
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            xp: 0,
            level: 1,
            unlockables: seed_unlockables(),
            durable: true,
        }
    }

    /// Restore from storage. Unreadable values fall back to defaults.
    pub fn load(store: SharedStore) -> Self {
        let mut ledger = Self::new(store);

        if let Some(raw) = ledger.read(XP_KEY) {
            match raw.trim().parse::<u64>() {
                Ok(xp) => ledger.xp = xp,
                Err(e) => warn!(value = %raw, error = %e, "ignoring unreadable saved xp"),
            }
        }
        ledger.level = level_for_xp(ledger.xp);

        if let Some(saved_level) = ledger.read(LEVEL_KEY) {
            if saved_level.trim().parse::<u32>().ok() != Some(ledger.level) {
                debug!(saved = %saved_level, derived = ledger.level, "saved level disagrees with xp, using derived level");
            }
        }

        if let Some(raw) = ledger.read(UNLOCKS_KEY) {
            match serde_json::from_str::<Vec<Unlockable>>(&raw) {
                Ok(saved) => ledger.unlockables = merge_with_seed(&saved),
                Err(e) => warn!(error = %e, "ignoring unreadable saved unlocks"),
            }
        }

        // Catch up on anything the restored level already qualifies for
        let level = ledger.level;
        let caught_up = ledger
            .unlockables
            .iter_mut()
            .map(|u| u.evaluate(level))
            .filter(|&fresh| fresh)
            .count();
        if caught_up > 0 {
            ledger.persist();
        }

        debug!(xp = ledger.xp, level = ledger.level, "progression loaded");
        ledger
    }

    pub fn xp(&self) -> u64 {
        self.xp
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_max_level(&self) -> bool {
        self.level >= MAX_LEVEL
    }

    pub fn unlockables(&self) -> &[Unlockable] {
        &self.unlockables
    }

    /// False once a write failed; state keeps working in memory.
    pub fn is_durable(&self) -> bool {
        self.durable
    }

    /// Award XP. Zero is rejected and leaves the ledger untouched.
    pub fn add_xp(&mut self, amount: u64, reason: &str) -> Result<XpAward> {
        if amount == 0 {
            warn!(reason, "rejected zero XP award");
            return Err(HackroreError::invalid("XP amount must be positive"));
        }

        let previous = self.level;
        self.xp = self.xp.saturating_add(amount);
        let derived = level_for_xp(self.xp);

        let mut level_up = None;
        let mut unlocked = Vec::new();
        if derived > previous {
            self.level = derived;
            level_up = Some(LevelUp { from: previous, to: derived });
            info!(from = previous, to = derived, xp = self.xp, "level up");

            for u in self.unlockables.iter_mut() {
                if u.evaluate(derived) {
                    info!(id = %u.id, name = %u.name, "unlocked");
                    unlocked.push(u.clone());
                }
            }
        }

        debug!(amount, reason, total = self.xp, "xp awarded");
        self.persist();

        Ok(XpAward {
            amount,
            reason: reason.to_string(),
            total_xp: self.xp,
            level: self.level,
            level_up,
            unlocked,
        })
    }

    /// Whether a reward is unlocked. Unknown ids are simply locked.
    pub fn check_unlock(&self, id: &str) -> bool {
        self.unlockables
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.unlocked)
            .unwrap_or(false)
    }

    pub fn progress_to_next_level(&self) -> LevelProgress {
        LevelProgress::compute(self.xp, self.level)
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "storage read failed");
                None
            }
        }
    }

    fn persist(&mut self) {
        match self.write_all() {
            Ok(()) => self.durable = true,
            Err(e) => {
                if self.durable {
                    warn!(error = %e, "could not save progression, continuing in memory");
                }
                self.durable = false;
            }
        }
    }

    fn write_all(&self) -> Result<()> {
        self.store.set(XP_KEY, &self.xp.to_string())?;
        self.store.set(LEVEL_KEY, &self.level.to_string())?;
        self.store
            .set(UNLOCKS_KEY, &serde_json::to_string(&self.unlockables)?)?;
        Ok(())
    }
}
