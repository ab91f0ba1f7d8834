//! Diagnostic check catalog and XP reward schedule.
//!
//! | Check          | Result id        | XP (on pass)                     |
//! |----------------|------------------|----------------------------------|
//! | Camera         | camera           | 50                               |
//! | Microphone     | microphone       | 50                               |
//! | Speaker        | speaker          | 50                               |
//! | Keyboard       | keyboard         | 100 once over 50 keys verified   |
//! | Storage        | storage          | 50                               |
//! | Controller     | controller       | 20                               |
//! | Geolocation    | sensor-gps       | 20                               |
//! | SensorSweep    | (none)           | 10                               |
//! | Benchmark      | benchmark        | 100 / 250 (>5000) / 500 (>10000) |
//! | MouseAccuracy  | mouse-accuracy   | 10 (>1) / 50 (>10) / 100 (>20)   |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{HackroreError, Result};
use crate::results::TestStatus;

/// A keyboard run must verify more distinct keys than this to pass
pub const KEYBOARD_KEYS_REQUIRED: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticCheck {
    Camera,
    Microphone,
    Speaker,
    Keyboard,
    Storage,
    Controller,
    Geolocation,
    SensorSweep,
    Benchmark,
    MouseAccuracy,
}

/// XP granted for one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReward {
    pub xp: u64,
    pub reason: String,
}

impl DiagnosticCheck {
    pub const ALL: [DiagnosticCheck; 10] = [
        DiagnosticCheck::Camera,
        DiagnosticCheck::Microphone,
        DiagnosticCheck::Speaker,
        DiagnosticCheck::Keyboard,
        DiagnosticCheck::Storage,
        DiagnosticCheck::Controller,
        DiagnosticCheck::Geolocation,
        DiagnosticCheck::SensorSweep,
        DiagnosticCheck::Benchmark,
        DiagnosticCheck::MouseAccuracy,
    ];

    /// CLI / config name
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Microphone => "microphone",
            Self::Speaker => "speaker",
            Self::Keyboard => "keyboard",
            Self::Storage => "storage",
            Self::Controller => "controller",
            Self::Geolocation => "geolocation",
            Self::SensorSweep => "sensor-sweep",
            Self::Benchmark => "benchmark",
            Self::MouseAccuracy => "mouse-accuracy",
        }
    }

    /// Key under which the outcome is recorded. `None` for XP-only checks.
    pub fn result_id(&self) -> Option<&'static str> {
        match self {
            Self::Camera => Some("camera"),
            Self::Microphone => Some("microphone"),
            Self::Speaker => Some("speaker"),
            Self::Keyboard => Some("keyboard"),
            Self::Storage => Some("storage"),
            Self::Controller => Some("controller"),
            Self::Geolocation => Some("sensor-gps"),
            Self::SensorSweep => None,
            Self::Benchmark => Some("benchmark"),
            Self::MouseAccuracy => Some("mouse-accuracy"),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Camera => "Camera Diagnostic",
            Self::Microphone => "Microphone Diagnostic",
            Self::Speaker => "Speaker Diagnostic",
            Self::Keyboard => "Keyboard Diagnostic",
            Self::Storage => "Storage Benchmark",
            Self::Controller => "Controller Vibration",
            Self::Geolocation => "Geolocation",
            Self::SensorSweep => "Sensor Sweep",
            Self::Benchmark => "System Performance Benchmark",
            Self::MouseAccuracy => "Mouse Accuracy Test",
        }
    }

    /// Whether the check needs a score to be rewarded
    pub fn is_scored(&self) -> bool {
        matches!(self, Self::Keyboard | Self::Benchmark | Self::MouseAccuracy)
    }

    /// A passing scored check must carry its score
    pub fn validate_score(&self, status: TestStatus, score: Option<u64>) -> Result<()> {
        if status == TestStatus::Pass && self.is_scored() && score.is_none() {
            return Err(HackroreError::invalid(format!(
                "{} needs a score to pass",
                self.slug()
            )));
        }
        Ok(())
    }

    /// Status to record. A keyboard pass with too few keys stays pending.
    pub fn settle_status(&self, status: TestStatus, score: Option<u64>) -> TestStatus {
        match self {
            Self::Keyboard if status == TestStatus::Pass => match score {
                Some(keys) if keys > KEYBOARD_KEYS_REQUIRED => TestStatus::Pass,
                _ => TestStatus::Pending,
            },
            _ => status,
        }
    }

    /// XP for an outcome. Only passing runs earn XP; scored checks look
    /// at `score` (keys verified, benchmark points, targets hit) and earn
    /// nothing without one.
    pub fn reward(&self, status: TestStatus, score: Option<u64>) -> Option<CheckReward> {
        if status != TestStatus::Pass {
            return None;
        }

        let fixed = |xp: u64, reason: &str| {
            Some(CheckReward {
                xp,
                reason: reason.to_string(),
            })
        };

        match self {
            Self::Camera => fixed(50, "Camera Test Complete"),
            Self::Microphone => fixed(50, "Mic Test Passed"),
            Self::Speaker => fixed(50, "Speaker Test Complete"),
            Self::Storage => fixed(50, "Storage Benchmark"),
            Self::Controller => fixed(20, "Haptic Feedback Test"),
            Self::Geolocation => fixed(20, "Geolocation Access"),
            Self::SensorSweep => fixed(10, "Sensor Sweep"),
            Self::Keyboard => match score {
                Some(keys) if keys > KEYBOARD_KEYS_REQUIRED => {
                    fixed(100, "Keyboard Maven: 50+ Keys Verified")
                }
                _ => None,
            },
            Self::Benchmark => {
                let points = score?;
                let xp = match points {
                    p if p > 10_000 => 500,
                    p if p > 5_000 => 250,
                    _ => 100,
                };
                Some(CheckReward {
                    xp,
                    reason: format!("Benchmark: {} pts", points),
                })
            }
            Self::MouseAccuracy => {
                let targets = score?;
                let xp = match targets {
                    t if t > 20 => 100,
                    t if t > 10 => 50,
                    t if t > 1 => 10,
                    _ => 0,
                };
                (xp > 0).then(|| CheckReward {
                    xp,
                    reason: format!("Accuracy Game: {} targets", targets),
                })
            }
        }
    }
}

impl fmt::Display for DiagnosticCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.slug())
    }
}

impl FromStr for DiagnosticCheck {
    type Err = HackroreError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.slug() == wanted || c.result_id() == Some(wanted.as_str()))
            .ok_or_else(|| HackroreError::invalid(format!("unknown check '{}'", s)))
    }
}
