//! Identifier types for catalog and itinerary records.
//!
//! Identifiers are assigned by the surrounding system; the planner only
//! compares and hashes them. Each kind gets its own type so that a
//! destination id can never be passed where an activity id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Returns the raw numeric identifier.
            pub fn get(self) -> u32 {
                self.0
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
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

record_id!(
    /// Identifies a destination in the catalog.
    DestinationId
);
record_id!(
    /// Identifies an activity offered at a destination.
    ActivityId
);
record_id!(
    /// Identifies a destination category.
    CategoryId
);
record_id!(
    /// Identifies a traveler account.
    TravelerId
);
record_id!(
    /// Identifies a stored itinerary.
    ItineraryId
);
