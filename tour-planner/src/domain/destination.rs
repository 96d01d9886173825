//! Destination records from the catalog.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{CategoryId, DestinationId, DomainError, Money};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Create a point from latitude and longitude.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A destination category (beaches, museums, food, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    /// Create a category.
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A visitor rating between 0.0 and 5.0 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Rating(f64);

impl Rating {
    /// Highest possible rating.
    pub const MAX: f64 = 5.0;

    /// Create a rating, rejecting values outside 0.0..=5.0 and NaN.
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if !(0.0..=Self::MAX).contains(&value) {
            return Err(DomainError::InvalidRating(value));
        }
        Ok(Self(value))
    }

    /// Returns the rating value.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Rating {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for f64 {
    fn from(rating: Rating) -> f64 {
        rating.0
    }
}

/// A set of lower-case preference tags.
///
/// Tags are compared case-insensitively, so they are normalised once on the
/// way in: trimmed, lower-cased, empties dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    /// Create an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag, normalising it. Returns false for blank or repeated tags.
    pub fn insert(&mut self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() {
            return false;
        }
        self.0.insert(tag)
    }

    /// Returns true if the (already lower-case) tag is present.
    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no tags.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over tags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Access the underlying set for set algebra.
    pub fn as_set(&self) -> &BTreeSet<String> {
        &self.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = TagSet::new();
        for tag in iter {
            tags.insert(tag.as_ref());
        }
        tags
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<TagSet> for Vec<String> {
    fn from(tags: TagSet) -> Self {
        tags.0.into_iter().collect()
    }
}

/// A place a traveler can visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: DestinationId,
    pub name: String,
    #[serde(default)]
    pub category: Option<CategoryId>,
    pub location: GeoPoint,
    #[serde(default)]
    pub entry_fee: Money,
    /// Estimated visit length in minutes.
    #[serde(default)]
    pub visit_mins: u32,
    #[serde(default)]
    pub tags: TagSet,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Destination {
    /// Create an active, free, untagged destination with no rating.
    pub fn new(id: DestinationId, name: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            id,
            name: name.into(),
            category: None,
            location,
            entry_fee: Money::ZERO,
            visit_mins: 0,
            tags: TagSet::new(),
            rating: None,
            active: true,
        }
    }

    /// Set the category.
    pub fn with_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    /// Set the entry fee.
    pub fn with_entry_fee(mut self, fee: Money) -> Self {
        self.entry_fee = fee;
        self
    }

    /// Set the estimated visit length.
    pub fn with_visit_mins(mut self, minutes: u32) -> Self {
        self.visit_mins = minutes;
        self
    }

    /// Replace the tags.
    pub fn with_tags<S: AsRef<str>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Set the rating.
    pub fn with_rating(mut self, rating: Rating) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Mark the destination inactive.
    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    /// The entry fee, or `None` for free entry.
    ///
    /// The catalog stores "no fee" as 0.00, so zero is treated as absent.
    pub fn listed_fee(&self) -> Option<Money> {
        (!self.entry_fee.is_zero()).then_some(self.entry_fee)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
