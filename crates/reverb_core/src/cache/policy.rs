//! # Refresh Policy
//!
//! Decides whether the current snapshot is still good enough.
//!
//! Two independent triggers, either one is sufficient:
//!
//! ```text
//! ticks_since  >= max_retain_ticks      → Expired  (world may have changed)
//! distance_sq  >= max_retain_distance²  → Moved    (observer left the sweet spot)
//! ```

use std::fmt;

use reverb_shared::BlockPos;

use crate::config::CacheConfig;

/// Why a snapshot is being rebuilt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshReason {
    /// No snapshot exists yet.
    ColdStart,
    /// The snapshot reached its maximum age.
    Expired {
        /// Ticks since the snapshot was built.
        ticks_since: u64,
    },
    /// The observer drifted too far from the snapshot origin.
    Moved {
        /// Squared block distance between the new and the old origin.
        distance_sq: i64,
    },
}

impl fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColdStart => f.write_str("no existing snapshot"),
            Self::Expired { ticks_since } => write!(f, "expired after {ticks_since} tick(s)"),
            Self::Moved { distance_sq } => write!(f, "observer moved {distance_sq} block(s)² from origin"),
        }
    }
}

/// How far the current snapshot lags behind the observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Staleness {
    /// Ticks since the snapshot was built.
    pub ticks_since: u64,
    /// Squared block distance from the snapshot origin.
    pub distance_sq: i64,
}

/// Outcome of evaluating the policy for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshDecision {
    /// Build and publish a new snapshot.
    Refresh(RefreshReason),
    /// Keep the current snapshot.
    Retain(Staleness),
}

/// Age and drift thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshPolicy {
    max_retain_ticks: u64,
    max_retain_distance: u32,
}

impl RefreshPolicy {
    /// Creates a policy from raw thresholds.
    #[must_use]
    pub const fn new(max_retain_ticks: u64, max_retain_distance: u32) -> Self {
        Self {
            max_retain_ticks,
            max_retain_distance,
        }
    }

    /// Creates the policy described by a configuration.
    #[must_use]
    pub const fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_retain_ticks, config.max_retain_distance)
    }

    /// Maximum snapshot age in ticks.
    #[inline]
    #[must_use]
    pub const fn max_retain_ticks(&self) -> u64 {
        self.max_retain_ticks
    }

    /// Maximum observer drift in blocks.
    #[inline]
    #[must_use]
    pub const fn max_retain_distance(&self) -> u32 {
        self.max_retain_distance
    }

    /// Squared drift threshold, compared against squared distances.
    #[inline]
    #[must_use]
    pub fn max_retain_distance_sq(&self) -> i64 {
        let d = i64::from(self.max_retain_distance);
        d * d
    }

    /// Evaluates the policy.
    ///
    /// `previous` is the `(tick, origin)` tag of the current snapshot, or
    /// `None` when nothing has been published yet. When both triggers fire,
    /// the age trigger is reported.
    #[must_use]
    pub fn evaluate(
        &self,
        previous: Option<(u64, BlockPos)>,
        tick: u64,
        origin: BlockPos,
    ) -> RefreshDecision {
        let Some((previous_tick, previous_origin)) = previous else {
            return RefreshDecision::Refresh(RefreshReason::ColdStart);
        };

        let ticks_since = tick.saturating_sub(previous_tick);
        let distance_sq = origin.distance_squared(previous_origin);

        if ticks_since >= self.max_retain_ticks {
            RefreshDecision::Refresh(RefreshReason::Expired { ticks_since })
        } else if distance_sq >= self.max_retain_distance_sq() {
            RefreshDecision::Refresh(RefreshReason::Moved { distance_sq })
        } else {
            RefreshDecision::Retain(Staleness {
                ticks_since,
                distance_sq,
            })
        }
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: RefreshPolicy = RefreshPolicy::new(20, 16);

    #[test]
    fn test_cold_start() {
        assert_eq!(
            POLICY.evaluate(None, 0, BlockPos::ORIGIN),
            RefreshDecision::Refresh(RefreshReason::ColdStart)
        );
    }

    #[test]
    fn test_retains_below_both_thresholds() {
        let origin = BlockPos::new(0, 64, 0);
        let decision = POLICY.evaluate(Some((100, origin)), 119, origin.offset(15, 0, 0));
        assert_eq!(
            decision,
            RefreshDecision::Retain(Staleness {
                ticks_since: 19,
                distance_sq: 225,
            })
        );
    }

    #[test]
    fn test_age_trigger_is_inclusive() {
        let origin = BlockPos::new(0, 64, 0);
        assert_eq!(
            POLICY.evaluate(Some((100, origin)), 120, origin),
            RefreshDecision::Refresh(RefreshReason::Expired { ticks_since: 20 })
        );
    }

    #[test]
    fn test_distance_trigger_is_inclusive_and_squared() {
        let origin = BlockPos::new(0, 64, 0);
        assert_eq!(
            POLICY.evaluate(Some((100, origin)), 101, origin.offset(16, 0, 0)),
            RefreshDecision::Refresh(RefreshReason::Moved { distance_sq: 256 })
        );
        // 12² + 12² = 288 >= 256 even though each axis is below 16
        assert_eq!(
            POLICY.evaluate(Some((100, origin)), 101, origin.offset(12, 0, 12)),
            RefreshDecision::Refresh(RefreshReason::Moved { distance_sq: 288 })
        );
    }

    #[test]
    fn test_age_reported_when_both_fire() {
        let origin = BlockPos::ORIGIN;
        assert_eq!(
            POLICY.evaluate(Some((0, origin)), 50, origin.offset(100, 0, 0)),
            RefreshDecision::Refresh(RefreshReason::Expired { ticks_since: 50 })
        );
    }

    #[test]
    fn test_tick_going_backwards_does_not_underflow() {
        let origin = BlockPos::ORIGIN;
        assert_eq!(
            POLICY.evaluate(Some((500, origin)), 10, origin),
            RefreshDecision::Retain(Staleness {
                ticks_since: 0,
                distance_sq: 0,
            })
        );
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(
            RefreshReason::Expired { ticks_since: 20 }.to_string(),
            "expired after 20 tick(s)"
        );
        assert_eq!(RefreshReason::ColdStart.to_string(), "no existing snapshot");
    }
}
