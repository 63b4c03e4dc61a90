//! Tunable parameters for route finding.

use crate::estimate::FareConfig;

/// Configuration parameters for the route finder.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Penalty added to the search weight whenever the route changes,
    /// in kilometres of equivalent riding.
    pub transfer_penalty_km: f64,

    /// Average bus speed, used for ride durations and wait estimates.
    pub avg_bus_speed_kmh: f64,

    /// Walking speed for straight-line walk estimates.
    pub walk_speed_kmh: f64,

    /// Wait assumed at a transfer when no estimate is available (minutes).
    pub default_wait_mins: u32,

    /// User points closer than this to the trip's ends get no extra walk (metres).
    pub user_walk_threshold_m: u32,

    /// How far to look for a served stop near an unserved endpoint.
    pub nearest_stop_radius_km: f64,

    /// Maximum number of nearby stops suggested when no route exists.
    pub max_suggestions: usize,

    pub fare: FareConfig,
}

impl PlannerConfig {
    /// Create a configuration with the given penalty and radius, other
    /// values at their defaults.
    pub fn new(transfer_penalty_km: f64, nearest_stop_radius_km: f64) -> Self {
        Self {
            transfer_penalty_km,
            nearest_stop_radius_km,
            ..Self::default()
        }
    }

    /// Set the transfer penalty.
    pub fn with_transfer_penalty(mut self, km: f64) -> Self {
        self.transfer_penalty_km = km;
        self
    }

    /// Set the fare rules.
    pub fn with_fare(mut self, fare: FareConfig) -> Self {
        self.fare = fare;
        self
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            transfer_penalty_km: 2.0,
            avg_bus_speed_kmh: 15.0,
            walk_speed_kmh: 5.0,
            default_wait_mins: 5,
            user_walk_threshold_m: 30,
            nearest_stop_radius_km: 2.0,
            max_suggestions: 5,
            fare: FareConfig::default(),
        }
    }
}
