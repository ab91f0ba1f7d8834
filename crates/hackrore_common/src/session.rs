//! Session handle passed to every check.
//!
//! Owns the progression ledger and the result aggregator for one run.
//! Accessors fail with `NotInitialized` until `start` has been called
//! and again after `end`.

use serde_json::{json, Value};
use tracing::debug;

use crate::error::{HackroreError, Result};
use crate::progression::{ProgressionLedger, XpAward};
use crate::results::{NewResult, ResultAggregator, TestResult, TestStatus};
use crate::rewards::DiagnosticCheck;
use crate::storage::SharedStore;

/// What one completed check produced
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub check: DiagnosticCheck,
    pub result: Option<TestResult>,
    pub award: Option<XpAward>,
}

pub struct Session {
    store: SharedStore,
    progression: Option<ProgressionLedger>,
    results: Option<ResultAggregator>,
}

impl Session {
    /// Unstarted session
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            progression: None,
            results: None,
        }
    }

    /// Started session with state restored from `store`
    pub fn open(store: SharedStore) -> Self {
        let mut session = Self::new(store);
        session.start();
        session
    }

    /// Load both components. Calling it again keeps the live state.
    pub fn start(&mut self) {
        if self.progression.is_none() {
            self.progression = Some(ProgressionLedger::load(self.store.clone()));
        }
        if self.results.is_none() {
            self.results = Some(ResultAggregator::load(self.store.clone()));
        }
        debug!("session started");
    }

    /// Drop in-memory state. Saved state stays in the store.
    pub fn end(&mut self) {
        self.progression = None;
        self.results = None;
        debug!("session ended");
    }

    pub fn is_started(&self) -> bool {
        self.progression.is_some() && self.results.is_some()
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn progression(&self) -> Result<&ProgressionLedger> {
        self.progression
            .as_ref()
            .ok_or(HackroreError::NotInitialized("progression"))
    }

    pub fn progression_mut(&mut self) -> Result<&mut ProgressionLedger> {
        self.progression
            .as_mut()
            .ok_or(HackroreError::NotInitialized("progression"))
    }

    pub fn results(&self) -> Result<&ResultAggregator> {
        self.results
            .as_ref()
            .ok_or(HackroreError::NotInitialized("results"))
    }

    pub fn results_mut(&mut self) -> Result<&mut ResultAggregator> {
        self.results
            .as_mut()
            .ok_or(HackroreError::NotInitialized("results"))
    }

    pub fn add_xp(&mut self, amount: u64, reason: &str) -> Result<XpAward> {
        self.progression_mut()?.add_xp(amount, reason)
    }

    pub fn add_result(&mut self, new: NewResult) -> Result<TestResult> {
        self.results_mut()?.add_result(new)
    }

    /// Record a finished check and pay out its reward.
    ///
    /// The result is stored first, then XP is awarded. `score` feeds the
    /// tiered rewards and is kept in the details when none are given.
    /// A passing scored check without a score is rejected; a keyboard pass
    /// with too few keys is recorded as pending and earns nothing.
    pub fn record_check(
        &mut self,
        check: DiagnosticCheck,
        status: TestStatus,
        score: Option<u64>,
        details: Option<Value>,
    ) -> Result<CheckReport> {
        if !self.is_started() {
            return Err(HackroreError::NotInitialized("session"));
        }

        check.validate_score(status, score)?;
        let status = check.settle_status(status, score);

        let result = match check.result_id() {
            Some(id) => {
                let mut new = NewResult::new(id, check.display_name(), status);
                new.details = details.or_else(|| score.map(|s| json!({ "score": s })));
                Some(self.add_result(new)?)
            }
            None => None,
        };

        let award = match check.reward(status, score) {
            Some(reward) => Some(self.add_xp(reward.xp, &reward.reason)?),
            None => None,
        };

        Ok(CheckReport {
            check,
            result,
            award,
        })
    }
}
