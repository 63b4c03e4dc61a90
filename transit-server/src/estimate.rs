//! Fare and wait-time estimates.
//!
//! Pure functions: no I/O, no shared state.

use crate::domain::PassengerClass;

/// Fare rules for a ride segment.
#[derive(Debug, Clone, PartialEq)]
pub struct FareConfig {
    /// Flat boarding charge.
    pub base_rate: f64,
    /// Charge per kilometre travelled.
    pub per_km: f64,
    /// Fares are rounded up to a multiple of this.
    pub round_to: f64,
    /// Fractional discount for students (0.5 = half fare).
    pub student_discount: f64,
    /// Fractional discount for elderly passengers.
    pub elderly_discount: f64,
}

impl FareConfig {
    fn discount(&self, passenger: PassengerClass) -> f64 {
        match passenger {
            PassengerClass::Regular => 0.0,
            PassengerClass::Student => self.student_discount,
            PassengerClass::Elderly => self.elderly_discount,
        }
    }
}

impl Default for FareConfig {
    fn default() -> Self {
        Self {
            base_rate: 15.0,
            per_km: 1.8,
            round_to: 5.0,
            student_discount: 0.5,
            elderly_discount: 0.5,
        }
    }
}

/// Fare for riding `distance_km`, in whole currency units.
///
/// The regular fare is rounded *up* to the rounding unit before any
/// discount applies; the discounted amount is then rounded to the nearest
/// unit and never drops below 1.
pub fn fare(distance_km: f64, passenger: PassengerClass, config: &FareConfig) -> u32 {
    let distance_km = distance_km.max(0.0);
    let raw = config.base_rate + distance_km * config.per_km;

    let rounded = if config.round_to > 0.0 {
        (raw / config.round_to).ceil() * config.round_to
    } else {
        raw
    };

    let discounted = rounded * (1.0 - config.discount(passenger));

    discounted.round().max(1.0) as u32
}

/// Estimated minutes between buses on a route.
///
/// Assumes the route's vehicles are spread evenly over a round trip at
/// `avg_speed_kmh`. Returns `None` when there is nothing to estimate from:
/// no vehicles, or a route of unknown length.
pub fn estimate_wait_minutes(
    route_distance_km: f64,
    vehicle_count: u32,
    avg_speed_kmh: f64,
) -> Option<u32> {
    if vehicle_count == 0 || route_distance_km <= 0.0 || avg_speed_kmh <= 0.0 {
        return None;
    }

    let round_trip_mins = 2.0 * route_distance_km / avg_speed_kmh * 60.0;
    let headway = round_trip_mins / f64::from(vehicle_count);

    Some(headway.round().max(1.0) as u32)
}

/// Minutes to cover `distance_km` at `speed_kmh`, at least one.
pub fn travel_minutes(distance_km: f64, speed_kmh: f64) -> u32 {
    if speed_kmh <= 0.0 {
        return 1;
    }
    (distance_km / speed_kmh * 60.0).round().max(1.0) as u32
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Discounted fares never exceed the regular fare
        #[test]
        fn student_never_pays_more(d in 0.0f64..200.0) {
            let config = FareConfig::default();
            let regular = fare(d, PassengerClass::Regular, &config);
            prop_assert!(fare(d, PassengerClass::Student, &config) <= regular);
            prop_assert!(fare(d, PassengerClass::Elderly, &config) <= regular);
        }

        /// Regular fares are always a multiple of the rounding unit
        #[test]
        fn regular_fare_is_multiple_of_unit(d in 0.0f64..200.0) {
            let config = FareConfig::default();
            prop_assert_eq!(fare(d, PassengerClass::Regular, &config) % 5, 0);
        }

        /// Fares never decrease with distance
        #[test]
        fn monotone_in_distance(a in 0.0f64..100.0, b in 0.0f64..100.0) {
            let config = FareConfig::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                fare(lo, PassengerClass::Regular, &config) <= fare(hi, PassengerClass::Regular, &config)
            );
        }

        /// More vehicles never lengthen the wait
        #[test]
        fn more_vehicles_shorter_wait(km in 0.5f64..50.0, n in 1u32..50) {
            let few = estimate_wait_minutes(km, n, 15.0).unwrap();
            let many = estimate_wait_minutes(km, n + 1, 15.0).unwrap();
            prop_assert!(many <= few);
        }
    }
}
