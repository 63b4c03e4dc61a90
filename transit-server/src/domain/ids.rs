//! Identifier types.

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Error returned when constructing an identifier from zero.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} id: must be a positive integer")]
pub struct InvalidId {
    kind: &'static str,
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Create an identifier from a raw database id.
            ///
            /// Zero is rejected: it never names a stored row.
            pub fn new(raw: u32) -> Result<Self, InvalidId> {
                NonZeroU32::new(raw)
                    .map(Self)
                    .ok_or(InvalidId { kind: $kind })
            }

            /// Returns the raw integer id.
            pub fn get(self) -> u32 {
                self.0.get()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of an approved location (stop or landmark).
    LocationId,
    "location"
);

define_id!(
    /// Identifier of an approved route.
    ///
    /// The search uses `Option<RouteId>` for "not riding yet", so no real
    /// route can ever be confused with the boarding state.
    RouteId,
    "route"
);

define_id!(
    /// Identifier of a registered vehicle.
    VehicleId,
    "vehicle"
);

define_id!(
    /// Identifier of a service alert.
    AlertId,
    "alert"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rejected() {
        assert!(LocationId::new(0).is_err());
        assert!(RouteId::new(0).is_err());
    }

    #[test]
    fn error_names_kind() {
        let err = RouteId::new(0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid route id: must be a positive integer"
        );
    }

    #[test]
    fn display_and_debug() {
        let id = LocationId::new(42).unwrap();
        assert_eq!(id.to_string(), "42");
        assert_eq!(format!("{:?}", id), "LocationId(42)");
    }

    #[test]
    fn serde_is_transparent() {
        let id = RouteId::new(7).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");

        let parsed: RouteId = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, id);

        assert!(serde_json::from_str::<RouteId>("0").is_err());
    }

    #[test]
    fn option_has_no_size_overhead() {
        assert_eq!(
            std::mem::size_of::<Option<RouteId>>(),
            std::mem::size_of::<u32>()
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any positive integer round-trips through the id type
        #[test]
        fn positive_roundtrip(raw in 1u32..) {
            let id = LocationId::new(raw).unwrap();
            prop_assert_eq!(id.get(), raw);
        }

        /// Ordering matches the raw integer ordering
        #[test]
        fn ordering_consistent(a in 1u32.., b in 1u32..) {
            let ia = RouteId::new(a).unwrap();
            let ib = RouteId::new(b).unwrap();
            prop_assert_eq!(ia.cmp(&ib), a.cmp(&b));
        }
    }
}
