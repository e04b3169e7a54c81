//! Per-day usage limits for metered AI features.
//!
//! Counters are stored remotely as one document per user. The reset is
//! lazy: a read on a new day reports zero usage without rewriting the
//! document, and the fresh date is committed only when a use is recorded.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Feature types subject to a daily usage limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UsageKind {
    /// AI attribute extraction from an item photo.
    WardrobeAnalysis,
    /// Virtual try-on look generation.
    LookGeneration,
}

impl UsageKind {
    /// All metered features.
    pub const ALL: [UsageKind; 2] = [UsageKind::WardrobeAnalysis, UsageKind::LookGeneration];

    /// Daily allowance for this feature.
    pub fn daily_limit(&self) -> u32 {
        match self {
            UsageKind::WardrobeAnalysis => 5,
            UsageKind::LookGeneration => 5,
        }
    }
}

impl fmt::Display for UsageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UsageKind::WardrobeAnalysis => "wardrobe-analysis",
            UsageKind::LookGeneration => "look-generation",
        };
        f.write_str(name)
    }
}

/// The stored per-user counter document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounter {
    /// Day the counters were last reset.
    pub last_reset: NaiveDate,
    /// Wardrobe analyses recorded on `last_reset`.
    #[serde(default)]
    pub wardrobe_analysis: u32,
    /// Look generations recorded on `last_reset`.
    #[serde(default)]
    pub look_generation: u32,
}

impl UsageCounter {
    /// A zeroed counter dated `today`.
    pub fn fresh(today: NaiveDate) -> Self {
        Self {
            last_reset: today,
            wardrobe_analysis: 0,
            look_generation: 0,
        }
    }

    /// The recorded count for `kind`, ignoring staleness.
    pub fn count(&self, kind: UsageKind) -> u32 {
        match kind {
            UsageKind::WardrobeAnalysis => self.wardrobe_analysis,
            UsageKind::LookGeneration => self.look_generation,
        }
    }

    /// The counter as it should be interpreted on `today`: a counter last
    /// reset on an earlier day reads as zero. The stored document is not
    /// rewritten here; only [`UsageCounter::record`] commits the reset.
    pub fn effective(&self, today: NaiveDate) -> Self {
        if self.last_reset == today {
            self.clone()
        } else {
            Self::fresh(today)
        }
    }

    /// Applies one use of `kind` on `today`, resetting first if the day
    /// changed. Returns the counter to persist.
    pub fn record(&self, kind: UsageKind, today: NaiveDate) -> Self {
        let mut next = self.effective(today);
        match kind {
            UsageKind::WardrobeAnalysis => next.wardrobe_analysis += 1,
            UsageKind::LookGeneration => next.look_generation += 1,
        }
        next
    }

    /// The limit status for `kind` as of `today`.
    pub fn status(&self, kind: UsageKind, today: NaiveDate) -> UsageStatus {
        let used = self.effective(today).count(kind);
        let limit = kind.daily_limit();
        UsageStatus {
            allowed: used < limit,
            remaining: limit.saturating_sub(used),
            limit,
        }
    }
}

/// Result of a usage-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageStatus {
    /// Whether another use is currently permitted.
    pub allowed: bool,
    /// Uses left today.
    pub remaining: u32,
    /// The daily allowance.
    pub limit: u32,
}
