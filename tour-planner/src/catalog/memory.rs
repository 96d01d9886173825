//! In-memory catalog backed by a JSON snapshot.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Catalog, CatalogError, DestinationFilter};
use crate::domain::{
    Activity, ActivityId, Category, CategoryId, Destination, DestinationId, Route, RouteSet,
};

/// Everything a catalog holds, in a serialisable shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub destinations: Vec<Destination>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// Bundled catalog of destinations around Lima.
const LIMA: &str = include_str!("../../data/lima.json");

/// A validated, read-only catalog held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    categories: BTreeMap<CategoryId, Category>,
    destinations: BTreeMap<DestinationId, Destination>,
    activities: BTreeMap<ActivityId, Activity>,
    routes: RouteSet,
}

impl InMemoryCatalog {
    /// Build a catalog, checking that every reference resolves.
    ///
    /// Routes that repeat an (origin, destination, mode) key replace the
    /// earlier row.
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Result<Self, CatalogError> {
        let categories: BTreeMap<CategoryId, Category> = snapshot
            .categories
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut destinations = BTreeMap::new();
        for destination in snapshot.destinations {
            if let Some(category) = destination.category
                && !categories.contains_key(&category)
            {
                return Err(CatalogError::UnknownCategory(category));
            }
            let id = destination.id;
            if destinations.insert(id, destination).is_some() {
                return Err(CatalogError::DuplicateDestination(id));
            }
        }

        let mut activities = BTreeMap::new();
        for activity in snapshot.activities {
            if !destinations.contains_key(&activity.destination) {
                return Err(CatalogError::UnknownDestination(activity.destination));
            }
            let id = activity.id;
            if activities.insert(id, activity).is_some() {
                return Err(CatalogError::DuplicateActivity(id));
            }
        }

        let mut routes = RouteSet::new();
        for route in snapshot.routes {
            for end in [route.origin, route.destination] {
                if !destinations.contains_key(&end) {
                    return Err(CatalogError::UnknownDestination(end));
                }
            }
            route.validate().map_err(|source| CatalogError::InvalidRoute {
                origin: route.origin,
                destination: route.destination,
                source,
            })?;
            routes.insert(route);
        }

        debug!(
            categories = categories.len(),
            destinations = destinations.len(),
            activities = activities.len(),
            routes = routes.len(),
            "catalog loaded"
        );

        Ok(Self {
            categories,
            destinations,
            activities,
            routes,
        })
    }

    /// Parse and validate a snapshot from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let snapshot: CatalogSnapshot =
            serde_json::from_str(json).map_err(|e| CatalogError::Json {
                message: e.to_string(),
            })?;
        Self::from_snapshot(snapshot)
    }

    /// The bundled Lima catalog.
    pub fn lima() -> Result<Self, CatalogError> {
        Self::from_json_str(LIMA)
    }

    /// Load a snapshot file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_json_str(&contents)
    }

    /// Write the catalog to a snapshot file.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), CatalogError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| CatalogError::Io {
                message: format!("failed to create snapshot directory: {}", e),
            })?;
        }

        let json = serde_json::to_string_pretty(&self.snapshot()).map_err(|e| {
            CatalogError::Json {
                message: format!("failed to serialize snapshot: {}", e),
            }
        })?;

        std::fs::write(path, json).map_err(|e| CatalogError::Io {
            message: format!("failed to write {}: {}", path.display(), e),
        })
    }

    /// Copy the catalog back into snapshot form.
    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            categories: self.categories.values().cloned().collect(),
            destinations: self.destinations.values().cloned().collect(),
            activities: self.activities.values().cloned().collect(),
            routes: self.routes.iter().cloned().collect(),
        }
    }

    /// Look up a category.
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(&id)
    }

    /// Every destination, active or not, in id order.
    pub fn destinations(&self) -> impl Iterator<Item = &Destination> {
        self.destinations.values()
    }

    /// Every activity in id order.
    pub fn all_activities(&self) -> impl Iterator<Item = &Activity> {
        self.activities.values()
    }

    /// Number of destinations.
    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    /// Returns true if there are no destinations.
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}

impl Catalog for InMemoryCatalog {
    fn active_destinations(
        &self,
        filter: &DestinationFilter,
    ) -> Result<Vec<Destination>, CatalogError> {
        Ok(self
            .destinations
            .values()
            .filter(|d| d.active && filter.matches(d))
            .cloned()
            .collect())
    }

    fn activities(
        &self,
        destination: DestinationId,
        available_only: bool,
    ) -> Result<Vec<Activity>, CatalogError> {
        Ok(self
            .activities
            .values()
            .filter(|a| a.destination == destination && (a.available || !available_only))
            .cloned()
            .collect())
    }

    fn active_routes(&self) -> Result<Vec<Route>, CatalogError> {
        Ok(self.routes.active().cloned().collect())
    }

    fn destination(&self, id: DestinationId) -> Result<Option<Destination>, CatalogError> {
        Ok(self.destinations.get(&id).cloned())
    }
}
