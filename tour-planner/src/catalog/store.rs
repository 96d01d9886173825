//! Where finished itineraries go.

use std::collections::BTreeMap;

use tracing::debug;

use super::StoreError;
use crate::domain::{Itinerary, ItineraryId};

/// Persistence for itineraries.
pub trait ItineraryStore {
    /// Store a new itinerary and return it with its assigned id.
    fn create(&mut self, itinerary: Itinerary) -> Result<Itinerary, StoreError>;

    /// Overwrite a previously created itinerary.
    fn save(&mut self, itinerary: &Itinerary) -> Result<(), StoreError>;

    /// Drop every item of an itinerary, keeping the itinerary itself.
    fn delete_items(&mut self, id: ItineraryId) -> Result<(), StoreError>;

    /// Fetch an itinerary by id.
    fn get(&self, id: ItineraryId) -> Result<Option<Itinerary>, StoreError>;
}

/// A store that keeps itineraries in a map and hands out sequential ids.
#[derive(Debug, Clone, Default)]
pub struct InMemoryItineraryStore {
    itineraries: BTreeMap<ItineraryId, Itinerary>,
    next_id: u32,
}

impl InMemoryItineraryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored itineraries.
    pub fn len(&self) -> usize {
        self.itineraries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.itineraries.is_empty()
    }
}

impl ItineraryStore for InMemoryItineraryStore {
    fn create(&mut self, mut itinerary: Itinerary) -> Result<Itinerary, StoreError> {
        self.next_id += 1;
        let id = ItineraryId(self.next_id);
        itinerary.id = Some(id);
        self.itineraries.insert(id, itinerary.clone());
        debug!(itinerary = %id, items = itinerary.len(), "itinerary created");
        Ok(itinerary)
    }

    fn save(&mut self, itinerary: &Itinerary) -> Result<(), StoreError> {
        let id = itinerary.id.ok_or(StoreError::MissingId)?;
        let slot = self
            .itineraries
            .get_mut(&id)
            .ok_or(StoreError::UnknownItinerary(id))?;
        *slot = itinerary.clone();
        Ok(())
    }

    fn delete_items(&mut self, id: ItineraryId) -> Result<(), StoreError> {
        let itinerary = self
            .itineraries
            .get_mut(&id)
            .ok_or(StoreError::UnknownItinerary(id))?;
        itinerary.clear_items();
        // No items left, so no entry fees are needed.
        itinerary.recompute_totals(|_| None);
        Ok(())
    }

    fn get(&self, id: ItineraryId) -> Result<Option<Itinerary>, StoreError> {
        Ok(self.itineraries.get(&id).cloned())
    }
}
