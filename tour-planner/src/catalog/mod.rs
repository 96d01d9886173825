//! Collaborators the planner reads from and writes to.
//!
//! The planner issues no I/O of its own. It reads destinations, activities
//! and routes through the `Catalog` trait, once per invocation, and hands
//! finished itineraries to an `ItineraryStore`. Failures from either are
//! propagated to the caller untouched.

mod error;
mod memory;
mod store;

pub use error::{CatalogError, StoreError};
pub use memory::{CatalogSnapshot, InMemoryCatalog};
pub use store::{InMemoryItineraryStore, ItineraryStore};

use crate::domain::{Activity, CategoryId, Destination, DestinationId, PreferenceSet, Route};

/// Read access to destination, activity and route records.
pub trait Catalog {
    /// Active destinations matching the filter, in id order.
    fn active_destinations(
        &self,
        filter: &DestinationFilter,
    ) -> Result<Vec<Destination>, CatalogError>;

    /// Activities offered at a destination, in id order.
    fn activities(
        &self,
        destination: DestinationId,
        available_only: bool,
    ) -> Result<Vec<Activity>, CatalogError>;

    /// Every active route.
    fn active_routes(&self) -> Result<Vec<Route>, CatalogError>;

    /// Look up one destination, active or not.
    fn destination(&self, id: DestinationId) -> Result<Option<Destination>, CatalogError>;
}

/// Narrows a destination listing.
///
/// Every set field must match. The default filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestinationFilter {
    /// Only destinations in this category.
    pub category: Option<CategoryId>,
    /// Case-insensitive substring of the name.
    pub text: Option<String>,
    /// At least one of these tags; empty means no tag restriction.
    pub tags: PreferenceSet,
}

impl DestinationFilter {
    /// A filter that matches every destination.
    pub fn any() -> Self {
        Self::default()
    }

    /// Restrict to one category.
    pub fn in_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    /// Restrict to names containing `text`.
    pub fn containing(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Restrict to destinations sharing at least one tag.
    pub fn with_any_tag(mut self, tags: PreferenceSet) -> Self {
        self.tags = tags;
        self
    }

    /// Returns true if the destination passes the filter.
    ///
    /// The active flag is not checked here; that is the catalog's job.
    pub fn matches(&self, destination: &Destination) -> bool {
        if let Some(category) = self.category
            && destination.category != Some(category)
        {
            return false;
        }
        if let Some(text) = &self.text
            && !destination
                .name
                .to_lowercase()
                .contains(&text.trim().to_lowercase())
        {
            return false;
        }
        self.tags.is_empty() || self.tags.matches_in(&destination.tags) > 0
    }
}
