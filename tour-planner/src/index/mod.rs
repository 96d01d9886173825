//! Ordered listings of destinations.
//!
//! Destinations are sorted by inserting them into a [`RedBlackIndex`] keyed
//! on one [`SortCriterion`] and reading it back in order.

mod rbtree;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::Destination;

pub use rbtree::{Color, RedBlackIndex, TreeViolation};

/// What to order destinations by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortCriterion {
    /// Name, ignoring case.
    #[default]
    Name,
    /// Rating; unrated destinations sort as 0.
    Rating,
    /// Entry fee; free destinations sort as 0.
    EntryFee,
}

impl SortCriterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortCriterion::Name => "name",
            SortCriterion::Rating => "rating",
            SortCriterion::EntryFee => "entry_fee",
        }
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort criterion: {0:?}")]
pub struct UnknownCriterion(pub String);

impl FromStr for SortCriterion {
    type Err = UnknownCriterion;

    /// Accepts the English names and the catalog's Spanish ones
    /// (`nombre`, `calificacion`, `costo_entrada`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" | "nombre" => Ok(SortCriterion::Name),
            "rating" | "calificacion" => Ok(SortCriterion::Rating),
            "entry_fee" | "costo_entrada" => Ok(SortCriterion::EntryFee),
            _ => Err(UnknownCriterion(s.to_string())),
        }
    }
}

/// A value extracted for ordering.
///
/// Text sorts before numbers; an index only ever holds one kind.
#[derive(Debug, Clone)]
pub enum SortKey {
    Text(String),
    Number(f64),
}

impl SortKey {
    /// A case-insensitive text key.
    pub fn text(s: impl AsRef<str>) -> Self {
        SortKey::Text(s.as_ref().to_lowercase())
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Less,
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

/// Something that can be stored in a [`RedBlackIndex`].
pub trait Keyed {
    /// The key to order by under `criterion`.
    fn sort_key(&self, criterion: SortCriterion) -> SortKey;

    /// Short human-readable name, used when drawing the tree.
    fn label(&self) -> &str;
}

impl Keyed for Destination {
    fn sort_key(&self, criterion: SortCriterion) -> SortKey {
        match criterion {
            SortCriterion::Name => SortKey::text(&self.name),
            SortCriterion::Rating => SortKey::Number(self.rating.map_or(0.0, |r| r.value())),
            SortCriterion::EntryFee => SortKey::Number(self.entry_fee.as_f64()),
        }
    }

    fn label(&self) -> &str {
        &self.name
    }
}

/// Sort destinations through a red-black tree.
///
/// Returns the sorted destinations together with the tree, so callers can
/// search or draw it afterwards.
pub fn sort_destinations(
    destinations: impl IntoIterator<Item = Destination>,
    criterion: SortCriterion,
    descending: bool,
) -> (Vec<Destination>, RedBlackIndex<Destination>) {
    let mut index = RedBlackIndex::new(criterion);
    for destination in destinations {
        index.insert(destination);
    }

    let sorted: Vec<Destination> = if descending {
        index.in_order_rev().into_iter().cloned().collect()
    } else {
        index.in_order().into_iter().cloned().collect()
    };

    let nodes = index.len();
    let max_height = 2 * (usize::BITS - (nodes + 1).leading_zeros()) as usize;
    let verified = index.verify();
    debug!(
        criterion = %criterion,
        nodes,
        height = index.height(),
        max_height,
        valid = verified.is_ok(),
        "destinations sorted"
    );
    if let Err(violation) = verified {
        warn!(%violation, "destination index failed verification");
    }

    (sorted, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DestinationId, GeoPoint, Money, Rating};

    fn dest(id: u32, name: &str, rating: Option<f64>, fee: u64) -> Destination {
        let mut d = Destination::new(DestinationId(id), name, GeoPoint::new(-12.1, -77.0))
            .with_entry_fee(Money::from_units(fee));
        d.rating = rating.map(|r| Rating::new(r).unwrap());
        d
    }

    fn lima() -> Vec<Destination> {
        vec![
            dest(1, "Playa Costa Verde", Some(4.5), 0),
            dest(2, "Museo Larco", Some(4.8), 30),
            dest(3, "Circuito Mágico del Agua", None, 4),
            dest(4, "Larcomar", Some(4.2), 0),
        ]
    }

    fn ids(destinations: &[Destination]) -> Vec<u32> {
        destinations.iter().map(|d| d.id.0).collect()
    }

    #[test]
    fn sort_by_name() {
        let (sorted, index) = sort_destinations(lima(), SortCriterion::Name, false);
        assert_eq!(ids(&sorted), [3, 4, 2, 1]);
        assert_eq!(index.len(), 4);
        assert!(index.verify().is_ok());
    }

    #[test]
    fn sort_by_rating_descending() {
        let (sorted, _) = sort_destinations(lima(), SortCriterion::Rating, true);
        // Unrated sorts as zero.
        assert_eq!(ids(&sorted), [2, 1, 4, 3]);
    }

    #[test]
    fn sort_by_entry_fee() {
        let (sorted, _) = sort_destinations(lima(), SortCriterion::EntryFee, false);
        // The two free destinations keep their input order.
        assert_eq!(ids(&sorted), [1, 4, 3, 2]);
    }

    #[test]
    fn find_by_name() {
        let (_, index) = sort_destinations(lima(), SortCriterion::Name, false);
        let found = index.find(&SortKey::text("museo larco"));
        assert_eq!(found.map(|d| d.id), Some(DestinationId(2)));
    }

    #[test]
    fn empty_input() {
        let (sorted, index) = sort_destinations(Vec::new(), SortCriterion::Name, true);
        assert!(sorted.is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn parse_criterion() {
        assert_eq!("rating".parse(), Ok(SortCriterion::Rating));
        assert_eq!("Calificacion".parse(), Ok(SortCriterion::Rating));
        assert_eq!("costo_entrada".parse(), Ok(SortCriterion::EntryFee));
        assert_eq!("nombre".parse(), Ok(SortCriterion::Name));
        assert!("distance".parse::<SortCriterion>().is_err());
    }

    #[test]
    fn text_keys_sort_before_numbers() {
        assert!(SortKey::text("zzz") < SortKey::Number(-1.0));
        assert_eq!(SortKey::text("ABC"), SortKey::text("abc"));
    }
}
