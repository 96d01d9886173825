//! Traveler profile as seen by the planner.

use serde::{Deserialize, Serialize};

use super::{Money, TagSet, TravelerId};

/// A traveler's preference tokens in canonical form.
///
/// Profiles store preferences either as a list or as one comma-joined
/// string. Both shapes are normalised here, once, into an ordered sequence
/// of unique lower-case tokens (first occurrence wins).
///
/// # Examples
///
/// ```
/// use tour_planner::domain::PreferenceSet;
///
/// let joined = PreferenceSet::parse("Museos, playa,,MUSEOS");
/// let listed = PreferenceSet::from_tokens(["museos", " Playa "]);
///
/// assert_eq!(joined, listed);
/// assert_eq!(joined.as_slice(), ["museos", "playa"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPreferences", into = "Vec<String>")]
pub struct PreferenceSet(Vec<String>);

impl PreferenceSet {
    /// An empty preference set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a comma-joined preference string.
    pub fn parse(joined: &str) -> Self {
        Self::from_tokens(joined.split(','))
    }

    /// Normalise a list of tokens.
    pub fn from_tokens<S: AsRef<str>>(tokens: impl IntoIterator<Item = S>) -> Self {
        let mut out: Vec<String> = Vec::new();
        for token in tokens {
            let token = token.as_ref().trim().to_lowercase();
            if !token.is_empty() && !out.contains(&token) {
                out.push(token);
            }
        }
        Self(out)
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no tokens.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if the token is present (expects lower case).
    pub fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|t| t == token)
    }

    /// Iterate over tokens in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// The tokens as a slice.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// How many of these preferences appear in a destination's tags.
    pub fn matches_in(&self, tags: &TagSet) -> usize {
        self.iter().filter(|token| tags.contains(token)).count()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPreferences {
    Joined(String),
    List(Vec<String>),
}

impl From<RawPreferences> for PreferenceSet {
    fn from(raw: RawPreferences) -> Self {
        match raw {
            RawPreferences::Joined(s) => PreferenceSet::parse(&s),
            RawPreferences::List(tokens) => PreferenceSet::from_tokens(tokens),
        }
    }
}

impl From<PreferenceSet> for Vec<String> {
    fn from(set: PreferenceSet) -> Self {
        set.0
    }
}

/// The parts of a traveler account the planner reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelerProfile {
    pub traveler: TravelerId,
    #[serde(default)]
    pub preferences: PreferenceSet,
    /// Budget ceiling; `None` means unbounded.
    #[serde(default)]
    pub budget: Option<Money>,
    /// Days the traveler has available, if they told us.
    #[serde(default)]
    pub available_days: Option<u32>,
}

impl TravelerProfile {
    /// Create a profile with no preferences and no budget.
    pub fn new(traveler: TravelerId) -> Self {
        Self {
            traveler,
            preferences: PreferenceSet::empty(),
            budget: None,
            available_days: None,
        }
    }

    /// Set the preferences.
    pub fn with_preferences(mut self, preferences: PreferenceSet) -> Self {
        self.preferences = preferences;
        self
    }

    /// Set the budget ceiling.
    pub fn with_budget(mut self, budget: Money) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Set the available days.
    pub fn with_available_days(mut self, days: u32) -> Self {
        self.available_days = Some(days);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_joined() {
        let prefs = PreferenceSet::parse(" Playa ,gastronomia, ,playa");
        assert_eq!(prefs.as_slice(), ["playa", "gastronomia"]);
    }

    #[test]
    fn empty_string_is_empty() {
        assert!(PreferenceSet::parse("").is_empty());
        assert!(PreferenceSet::parse(" , ,").is_empty());
    }

    #[test]
    fn matches_in_tags() {
        let prefs = PreferenceSet::from_tokens(["museos", "playa", "relax"]);
        let tags: TagSet = ["Playa", "relax", "aventura"].into_iter().collect();
        assert_eq!(prefs.matches_in(&tags), 2);
    }

    #[test]
    fn deserialize_both_shapes() {
        let from_string: PreferenceSet = serde_json::from_str("\"museos,PLAYA\"").unwrap();
        let from_list: PreferenceSet = serde_json::from_str(r#"["Museos", "playa"]"#).unwrap();
        assert_eq!(from_string, from_list);
        assert_eq!(serde_json::to_string(&from_list).unwrap(), r#"["museos","playa"]"#);
    }

    #[test]
    fn profile_deserialize_defaults() {
        let profile: TravelerProfile =
            serde_json::from_str(r#"{"traveler": 9, "preferences": "museos"}"#).unwrap();
        assert_eq!(profile.traveler, TravelerId(9));
        assert_eq!(profile.budget, None);
        assert!(profile.preferences.contains("museos"));
    }
}
