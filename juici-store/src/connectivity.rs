//! Per-tier reachability state
//!
//! Owned by [`crate::Database`] and shared behind an `Arc`. Remote tiers
//! start `Unknown` until the startup probe lands; `Unknown` tiers are still
//! attempted so requests during that window are not lost. A tier marked
//! `Unhealthy` stays skipped until restart, unless `reprobe_after` is set.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::store::Tier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TierHealth {
    Unknown,
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Copy)]
struct TierState {
    health: TierHealth,
    since: Instant,
}

impl TierState {
    fn new(health: TierHealth) -> Self {
        Self {
            health,
            since: Instant::now(),
        }
    }
}

/// Point-in-time view of one tier, for status output
#[derive(Debug, Clone, Serialize)]
pub struct TierStatus {
    pub tier: Tier,
    pub health: TierHealth,
    pub seconds_in_state: u64,
}

#[derive(Debug)]
pub struct Connectivity {
    states: Mutex<HashMap<Tier, TierState>>,
    reprobe_after: Option<Duration>,
}

impl Connectivity {
    pub fn new(reprobe_after: Option<Duration>) -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
            reprobe_after,
        }
    }

    pub fn health(&self, tier: Tier) -> TierHealth {
        if !tier.is_remote() {
            return TierHealth::Healthy;
        }
        self.lock()
            .get(&tier)
            .map(|s| s.health)
            .unwrap_or(TierHealth::Unknown)
    }

    /// Whether the orchestrator should route to `tier` right now.
    pub fn should_attempt(&self, tier: Tier) -> bool {
        if !tier.is_remote() {
            return true;
        }
        match self.lock().get(&tier) {
            None => true,
            Some(state) => match state.health {
                TierHealth::Unknown | TierHealth::Healthy => true,
                TierHealth::Unhealthy => self
                    .reprobe_after
                    .is_some_and(|after| state.since.elapsed() >= after),
            },
        }
    }

    pub fn mark_healthy(&self, tier: Tier) {
        self.transition(tier, TierHealth::Healthy);
    }

    pub fn mark_unhealthy(&self, tier: Tier) {
        self.transition(tier, TierHealth::Unhealthy);
    }

    /// Set a tier's health directly, e.g. to pin routing in tests or from an
    /// operator command.
    pub fn force(&self, tier: Tier, health: TierHealth) {
        self.lock().insert(tier, TierState::new(health));
    }

    pub fn snapshot(&self, tiers: &[Tier]) -> Vec<TierStatus> {
        let states = self.lock();
        tiers
            .iter()
            .map(|&tier| {
                let (health, seconds_in_state) = match states.get(&tier) {
                    _ if !tier.is_remote() => (TierHealth::Healthy, 0),
                    Some(s) => (s.health, s.since.elapsed().as_secs()),
                    None => (TierHealth::Unknown, 0),
                };
                TierStatus {
                    tier,
                    health,
                    seconds_in_state,
                }
            })
            .collect()
    }

    /// Record a new health value.
    ///
    /// Re-marking `Healthy` keeps the original timestamp. Re-marking
    /// `Unhealthy` restarts it, so a tier that fails its re-attempt waits out
    /// a fresh `reprobe_after` window.
    fn transition(&self, tier: Tier, health: TierHealth) {
        if !tier.is_remote() {
            return;
        }
        let mut states = self.lock();
        match states.get_mut(&tier) {
            Some(state) if state.health == health => {
                if health == TierHealth::Unhealthy {
                    tracing::debug!(tier = %tier, "tier still unhealthy, restarting re-probe window");
                    state.since = Instant::now();
                }
            }
            Some(state) => {
                tracing::info!(tier = %tier, from = ?state.health, to = ?health, "tier health changed");
                *state = TierState::new(health);
            }
            None => {
                tracing::info!(tier = %tier, to = ?health, "tier health resolved");
                states.insert(tier, TierState::new(health));
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Tier, TierState>> {
        // Plain data, never half-written
        self.states.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tiers_are_attempted() {
        let c = Connectivity::default();
        assert_eq!(c.health(Tier::Primary), TierHealth::Unknown);
        assert!(c.should_attempt(Tier::Primary));
    }

    #[test]
    fn unhealthy_is_sticky_without_reprobe() {
        let c = Connectivity::default();
        c.mark_unhealthy(Tier::Secondary);
        assert!(!c.should_attempt(Tier::Secondary));
        assert_eq!(c.health(Tier::Secondary), TierHealth::Unhealthy);
    }

    #[test]
    fn memory_is_always_attempted() {
        let c = Connectivity::default();
        c.mark_unhealthy(Tier::Memory);
        assert!(c.should_attempt(Tier::Memory));
        assert_eq!(c.health(Tier::Memory), TierHealth::Healthy);
    }

    #[test]
    fn reprobe_window_reopens_tier() {
        let c = Connectivity::new(Some(Duration::ZERO));
        c.mark_unhealthy(Tier::Primary);
        assert!(c.should_attempt(Tier::Primary));

        let c = Connectivity::new(Some(Duration::from_secs(3600)));
        c.mark_unhealthy(Tier::Primary);
        assert!(!c.should_attempt(Tier::Primary));
    }

    #[test]
    fn failed_reattempt_is_skipped_again() {
        let c = Connectivity::new(Some(Duration::from_millis(50)));
        c.mark_unhealthy(Tier::Secondary);
        assert!(!c.should_attempt(Tier::Secondary));

        std::thread::sleep(Duration::from_millis(60));
        assert!(c.should_attempt(Tier::Secondary));

        // Re-attempt failed: wait another full window
        c.mark_unhealthy(Tier::Secondary);
        assert!(!c.should_attempt(Tier::Secondary));
        assert_eq!(c.health(Tier::Secondary), TierHealth::Unhealthy);
    }

    #[test]
    fn force_overrides() {
        let c = Connectivity::default();
        c.mark_unhealthy(Tier::Primary);
        c.force(Tier::Primary, TierHealth::Healthy);
        assert!(c.should_attempt(Tier::Primary));
    }

    #[test]
    fn snapshot_reports_each_tier() {
        let c = Connectivity::default();
        c.mark_healthy(Tier::Primary);
        let snap = c.snapshot(&[Tier::Primary, Tier::Secondary, Tier::Memory]);
        assert_eq!(snap.len(), 3);
        assert_eq!(snap[0].health, TierHealth::Healthy);
        assert_eq!(snap[1].health, TierHealth::Unknown);
        assert_eq!(snap[2].health, TierHealth::Healthy);
    }
}
