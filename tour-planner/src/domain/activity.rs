//! Activities offered at destinations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{ActivityId, DestinationId, DomainError, Money};

/// The kind of an activity.
///
/// Catalog exports may use either the English codes or the Spanish
/// catalog codes (`visita_guiada`, `degustacion`, ...); both parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    #[serde(alias = "visita_guiada")]
    GuidedVisit,
    #[serde(alias = "degustacion")]
    Tasting,
    #[serde(alias = "deporte")]
    Sport,
    Cultural,
    #[serde(alias = "entretenimiento")]
    Entertainment,
}

impl ActivityKind {
    /// All kinds, in declaration order.
    pub const ALL: [ActivityKind; 5] = [
        ActivityKind::GuidedVisit,
        ActivityKind::Tasting,
        ActivityKind::Sport,
        ActivityKind::Cultural,
        ActivityKind::Entertainment,
    ];

    /// The canonical code for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::GuidedVisit => "guided_visit",
            ActivityKind::Tasting => "tasting",
            ActivityKind::Sport => "sport",
            ActivityKind::Cultural => "cultural",
            ActivityKind::Entertainment => "entertainment",
        }
    }

    fn catalog_code(&self) -> &'static str {
        match self {
            ActivityKind::GuidedVisit => "visita_guiada",
            ActivityKind::Tasting => "degustacion",
            ActivityKind::Sport => "deporte",
            ActivityKind::Cultural => "cultural",
            ActivityKind::Entertainment => "entretenimiento",
        }
    }

    /// Returns true if a preference token names this kind (case-insensitive).
    pub fn matches_token(&self, token: &str) -> bool {
        token.eq_ignore_ascii_case(self.as_str()) || token.eq_ignore_ascii_case(self.catalog_code())
    }
}

impl FromStr for ActivityKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        ActivityKind::ALL
            .into_iter()
            .find(|kind| kind.matches_token(token))
            .ok_or_else(|| DomainError::UnknownActivityKind(s.to_string()))
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something to do at a destination, with its own price and length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub destination: DestinationId,
    pub name: String,
    pub kind: ActivityKind,
    pub cost: Money,
    pub duration_mins: u32,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl Activity {
    /// Create an available activity.
    pub fn new(
        id: ActivityId,
        destination: DestinationId,
        name: impl Into<String>,
        kind: ActivityKind,
        cost: Money,
        duration_mins: u32,
    ) -> Self {
        Self {
            id,
            destination,
            name: name.into(),
            kind,
            cost,
            duration_mins,
            available: true,
        }
    }

    /// Mark the activity unavailable.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }
}
