//! Shared state and types for HackRore bench tooling.
//!
//! The core is the technician progression ledger (XP, levels, unlocks) and
//! the diagnostic result aggregator, both persisted through a pluggable
//! key-value store and reached through a `Session` handle.

pub mod case_report;
pub mod config;
pub mod error;
pub mod levels;
pub mod progression;
pub mod results;
pub mod rewards;
pub mod session;
pub mod storage;
pub mod tickets;
pub mod unlockables;

pub use error::HackroreError;
pub use levels::{level_for_xp, LevelProgress, LEVEL_THRESHOLDS, MAX_LEVEL};
pub use progression::{LevelUp, ProgressionLedger, XpAward};
pub use results::{NewResult, ResultAggregator, StatusCounts, TestResult, TestStatus, HISTORY_LIMIT};
pub use rewards::{CheckReward, DiagnosticCheck};
pub use session::{CheckReport, Session};
pub use storage::{FileStore, KeyValueStore, MemoryStore, SharedStore};
pub use unlockables::{UnlockKind, Unlockable};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
