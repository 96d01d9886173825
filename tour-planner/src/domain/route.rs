//! Persisted routes between destinations.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{DestinationId, DomainError, Money};

/// How a route is travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    #[serde(alias = "caminando")]
    Walking,
    #[serde(alias = "auto")]
    Car,
    Bus,
    Taxi,
    #[serde(alias = "bicicleta")]
    Bicycle,
}

impl TransportMode {
    /// The canonical code for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Walking => "walking",
            TransportMode::Car => "car",
            TransportMode::Bus => "bus",
            TransportMode::Taxi => "taxi",
            TransportMode::Bicycle => "bicycle",
        }
    }
}

impl FromStr for TransportMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "walking" | "caminando" => Ok(TransportMode::Walking),
            "car" | "auto" => Ok(TransportMode::Car),
            "bus" => Ok(TransportMode::Bus),
            "taxi" => Ok(TransportMode::Taxi),
            "bicycle" | "bicicleta" => Ok(TransportMode::Bicycle),
            _ => Err(DomainError::UnknownTransportMode(s.to_string())),
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed connection from one destination to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRoute")]
pub struct Route {
    pub origin: DestinationId,
    pub destination: DestinationId,
    pub distance_km: f64,
    pub time_mins: u32,
    pub mode: TransportMode,
    #[serde(default)]
    pub cost: Money,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Deserialize)]
struct RawRoute {
    origin: DestinationId,
    destination: DestinationId,
    distance_km: f64,
    time_mins: u32,
    mode: TransportMode,
    #[serde(default)]
    cost: Money,
    #[serde(default = "default_active")]
    active: bool,
}

impl TryFrom<RawRoute> for Route {
    type Error = DomainError;

    fn try_from(raw: RawRoute) -> Result<Self, Self::Error> {
        let mut route = Route::new(
            raw.origin,
            raw.destination,
            raw.distance_km,
            raw.time_mins,
            raw.mode,
            raw.cost,
        )?;
        route.active = raw.active;
        Ok(route)
    }
}

impl Route {
    /// Create an active route.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the distance is negative or not finite.
    pub fn new(
        origin: DestinationId,
        destination: DestinationId,
        distance_km: f64,
        time_mins: u32,
        mode: TransportMode,
        cost: Money,
    ) -> Result<Self, DomainError> {
        let route = Self {
            origin,
            destination,
            distance_km,
            time_mins,
            mode,
            cost,
            active: true,
        };
        route.validate()?;
        Ok(route)
    }

    /// Check the distance, for routes built field by field.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.distance_km.is_finite() || self.distance_km < 0.0 {
            return Err(DomainError::InvalidDistance(self.distance_km));
        }
        Ok(())
    }

    /// Key under which the route is unique.
    pub fn key(&self) -> RouteKey {
        (self.origin, self.destination, self.mode)
    }
}

/// Uniqueness key for routes: (origin, destination, mode).
pub type RouteKey = (DestinationId, DestinationId, TransportMode);

/// A set of routes, unique per (origin, destination, mode).
#[derive(Debug, Clone, Default)]
pub struct RouteSet {
    routes: BTreeMap<RouteKey, Route>,
}

impl RouteSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a route, returning the one it replaced, if any.
    pub fn insert(&mut self, route: Route) -> Option<Route> {
        self.routes.insert(route.key(), route)
    }

    /// Look up a route by its key.
    pub fn get(&self, key: &RouteKey) -> Option<&Route> {
        self.routes.get(key)
    }

    /// Iterate over all routes in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    /// Iterate over active routes only.
    pub fn active(&self) -> impl Iterator<Item = &Route> {
        self.routes.values().filter(|r| r.active)
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if there are no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl FromIterator<Route> for RouteSet {
    fn from_iter<I: IntoIterator<Item = Route>>(iter: I) -> Self {
        let mut set = RouteSet::new();
        for route in iter {
            set.insert(route);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(from: u32, to: u32, km: f64, mode: TransportMode) -> Route {
        Route::new(DestinationId(from), DestinationId(to), km, 10, mode, Money::ZERO).unwrap()
    }

    #[test]
    fn negative_distance_rejected() {
        let result = Route::new(
            DestinationId(1),
            DestinationId(2),
            -1.0,
            5,
            TransportMode::Car,
            Money::ZERO,
        );
        assert!(result.is_err());
    }

    #[test]
    fn deserialize_validates_distance() {
        let json = r#"{"origin": 3, "destination": 2, "distance_km": -10.0,
                       "time_mins": 5, "mode": "car"}"#;
        let err = serde_json::from_str::<Route>(json).unwrap_err();
        assert!(err.to_string().contains("non-negative"), "got {err}");

        let json = r#"{"origin": 3, "destination": 2, "distance_km": 1.5,
                       "time_mins": 5, "mode": "auto", "active": false}"#;
        let route: Route = serde_json::from_str(json).unwrap();
        assert_eq!(route.mode, TransportMode::Car);
        assert!(!route.active);
        assert_eq!(route.cost, Money::ZERO);
    }

    #[test]
    fn duplicate_key_replaces() {
        let mut set = RouteSet::new();
        assert!(set.insert(route(1, 2, 5.0, TransportMode::Car)).is_none());
        let replaced = set.insert(route(1, 2, 4.0, TransportMode::Car));

        assert_eq!(replaced.map(|r| r.distance_km), Some(5.0));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn different_modes_coexist() {
        let set: RouteSet = [
            route(1, 2, 5.0, TransportMode::Car),
            route(1, 2, 4.0, TransportMode::Walking),
            route(2, 1, 5.0, TransportMode::Car),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 3);
    }

    #[test]
    fn active_filter() {
        let mut inactive = route(1, 3, 1.0, TransportMode::Bus);
        inactive.active = false;
        let set: RouteSet = [route(1, 2, 5.0, TransportMode::Car), inactive]
            .into_iter()
            .collect();

        assert_eq!(set.active().count(), 1);
    }

    #[test]
    fn parse_modes() {
        assert_eq!("auto".parse::<TransportMode>().unwrap(), TransportMode::Car);
        assert_eq!("Caminando".parse::<TransportMode>().unwrap(), TransportMode::Walking);
        assert_eq!("bicycle".parse::<TransportMode>().unwrap(), TransportMode::Bicycle);
        assert!("plane".parse::<TransportMode>().is_err());
    }
}
