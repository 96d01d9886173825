//! Catalog error types.

use crate::domain::{ActivityId, CategoryId, DestinationId, DomainError, ItineraryId};

/// Errors raised while reading or loading catalog data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    /// Reading or writing a snapshot file failed
    #[error("snapshot I/O error: {message}")]
    Io { message: String },

    /// Snapshot JSON could not be parsed or written
    #[error("snapshot JSON error: {message}")]
    Json { message: String },

    /// Two destinations share an id
    #[error("duplicate destination {0}")]
    DuplicateDestination(DestinationId),

    /// Two activities share an id
    #[error("duplicate activity {0}")]
    DuplicateActivity(ActivityId),

    /// A record points at a destination that is not in the catalog
    #[error("unknown destination {0}")]
    UnknownDestination(DestinationId),

    /// A destination points at a category that is not in the catalog
    #[error("unknown category {0}")]
    UnknownCategory(CategoryId),

    /// A route's distance is negative or not finite
    #[error("route {origin} -> {destination}: {source}")]
    InvalidRoute {
        origin: DestinationId,
        destination: DestinationId,
        source: DomainError,
    },

    /// The backing store failed
    #[error("catalog unavailable: {message}")]
    Unavailable { message: String },
}

/// Errors raised by an itinerary store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// No itinerary with this id
    #[error("unknown itinerary {0}")]
    UnknownItinerary(ItineraryId),

    /// Saving requires an itinerary that was created through the store
    #[error("itinerary has no id; create it first")]
    MissingId,

    /// The backing store failed
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}
