//! The contact record and its relationship metadata.
//!
//! A `Contact` is the in-memory shape of one `*__contact.md` file: YAML
//! frontmatter fields plus the runtime-only `file_path` and `content` (the
//! markdown body after the frontmatter, preserved byte-for-byte).

pub mod fields;
pub mod interaction;
pub mod status;

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

pub use interaction::{Interaction, InteractionKind};
pub use status::Health;

/// Timestamps keep the offset they were written with so records round-trip.
pub type Timestamp = DateTime<FixedOffset>;

/// Reserved tag marking a record as a contact.
pub const CONTACT_TAG: &str = "contact";

// ═══════════════════════════════════════════════════════════════════════
// Enums
// ═══════════════════════════════════════════════════════════════════════

/// Kind of relationship; drives the default contact cadence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelationshipType {
    Close,
    Family,
    Network,
    Work,
    Social,
    Providers,
    Recruiters,
    /// Unrecognized value from disk, preserved verbatim.
    Other(String),
}

/// Hotkey table shared by the edit form, quick type change, and filter popup.
pub static RELATIONSHIP_CHOICES: [(char, RelationshipType); 7] = [
    ('f', RelationshipType::Family),
    ('c', RelationshipType::Close),
    ('n', RelationshipType::Network),
    ('w', RelationshipType::Work),
    ('r', RelationshipType::Recruiters),
    ('p', RelationshipType::Providers),
    ('s', RelationshipType::Social),
];

impl RelationshipType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Close => "close",
            Self::Family => "family",
            Self::Network => "network",
            Self::Work => "work",
            Self::Social => "social",
            Self::Providers => "providers",
            Self::Recruiters => "recruiters",
            Self::Other(s) => s,
        }
    }

    /// Default target days between contacts; 0 means no target.
    pub fn default_frequency_days(&self) -> i64 {
        match self {
            Self::Close | Self::Family => 30,
            Self::Work => 60,
            Self::Network => 90,
            _ => 0,
        }
    }

    /// Look up the relationship bound to a hotkey.
    pub fn from_key(key: char) -> Option<Self> {
        RELATIONSHIP_CHOICES
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, t)| t.clone())
    }
}

impl From<String> for RelationshipType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "close" => Self::Close,
            "family" => Self::Family,
            "network" => Self::Network,
            "work" => Self::Work,
            "social" => Self::Social,
            "providers" => Self::Providers,
            "recruiters" => Self::Recruiters,
            _ => Self::Other(s),
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How reminders apply to a contact. Unset behaves as `Periodic`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContactStyle {
    /// Regular check-ins.
    Periodic,
    /// Passive monitoring.
    Ambient,
    /// Event-based.
    Triggered,
    Other(String),
}

pub static STYLE_CHOICES: [(char, ContactStyle); 3] = [
    ('p', ContactStyle::Periodic),
    ('a', ContactStyle::Ambient),
    ('t', ContactStyle::Triggered),
];

impl ContactStyle {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Periodic => "periodic",
            Self::Ambient => "ambient",
            Self::Triggered => "triggered",
            Self::Other(s) => s,
        }
    }

    pub fn from_key(key: char) -> Option<Self> {
        STYLE_CHOICES
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, s)| s.clone())
    }
}

impl From<String> for ContactStyle {
    fn from(s: String) -> Self {
        match s.as_str() {
            "periodic" => Self::Periodic,
            "ambient" => Self::Ambient,
            "triggered" => Self::Triggered,
            _ => Self::Other(s),
        }
    }
}

impl fmt::Display for ContactStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Contact
// ═══════════════════════════════════════════════════════════════════════

/// A contact record.
///
/// Field order matches the order written to disk. `state` is an open string:
/// only the action states in [`crate::task::ActionState`] carry behaviour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, deserialize_with = "fields::lenient_string")]
    pub title: String,
    #[serde(default, with = "fields::timestamp", skip_serializing_if = "Option::is_none")]
    pub date: Option<Timestamp>,
    #[serde(default, deserialize_with = "fields::lenient_tags")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "fields::lenient_string")]
    pub identifier: String,
    #[serde(default, deserialize_with = "fields::lenient_string", skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "fields::lenient_string", skip_serializing_if = "String::is_empty")]
    pub phone: String,
    #[serde(default, with = "fields::open_enum", skip_serializing_if = "Option::is_none")]
    pub relationship_type: Option<RelationshipType>,
    #[serde(default, deserialize_with = "fields::lenient_string", skip_serializing_if = "String::is_empty")]
    pub state: String,
    #[serde(default, deserialize_with = "fields::lenient_string", skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(default, with = "fields::open_enum", skip_serializing_if = "Option::is_none")]
    pub contact_style: Option<ContactStyle>,
    #[serde(default, with = "fields::timestamp", skip_serializing_if = "Option::is_none")]
    pub last_contacted: Option<Timestamp>,
    #[serde(default, with = "fields::timestamp", skip_serializing_if = "Option::is_none")]
    pub last_bump_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "fields::is_zero")]
    pub bump_count: u32,
    #[serde(default, with = "fields::timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,

    #[serde(default, deserialize_with = "fields::lenient_string", skip_serializing_if = "String::is_empty")]
    pub company: String,
    #[serde(default, deserialize_with = "fields::lenient_string", skip_serializing_if = "String::is_empty")]
    pub role: String,
    #[serde(default, deserialize_with = "fields::lenient_string", skip_serializing_if = "String::is_empty")]
    pub location: String,
    #[serde(default, deserialize_with = "fields::lenient_string", skip_serializing_if = "String::is_empty")]
    pub birthday: String,
    #[serde(default, deserialize_with = "fields::lenient_string", skip_serializing_if = "String::is_empty")]
    pub linkedin: String,
    #[serde(default, deserialize_with = "fields::lenient_string", skip_serializing_if = "String::is_empty")]
    pub twitter: String,
    #[serde(default, deserialize_with = "fields::lenient_string", skip_serializing_if = "String::is_empty")]
    pub website: String,
    #[serde(default, deserialize_with = "fields::lenient_string", skip_serializing_if = "String::is_empty")]
    pub notes: String,
    #[serde(default, skip_serializing_if = "fields::is_zero_i64")]
    pub custom_frequency_days: i64,
    #[serde(default, deserialize_with = "fields::lenient_string", skip_serializing_if = "String::is_empty")]
    pub last_interaction_type: String,
    #[serde(default, deserialize_with = "fields::lenient_tags", skip_serializing_if = "Vec::is_empty")]
    pub related_contact_labels: Vec<String>,

    /// On-disk location; assigned once, the identity key in collections.
    #[serde(skip)]
    pub file_path: Option<PathBuf>,
    /// Markdown body after the frontmatter.
    #[serde(skip)]
    pub content: String,
}

impl Contact {
    /// A fresh contact carrying only the marker tag.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tags: vec![CONTACT_TAG.to_string()],
            ..Default::default()
        }
    }

    pub fn has_contact_tag(&self) -> bool {
        self.tags.iter().any(|t| t == CONTACT_TAG)
    }

    /// Tags without the contact marker, for display and editing.
    pub fn user_tags(&self) -> impl Iterator<Item = &str> {
        self.tags
            .iter()
            .map(String::as_str)
            .filter(|t| *t != CONTACT_TAG)
    }

    /// Whether this record lives at `path`.
    pub fn is_at(&self, path: &std::path::Path) -> bool {
        self.file_path.as_deref() == Some(path)
    }

    /// Record a lightweight review without logging an interaction.
    pub fn bump(&mut self, now: Timestamp) {
        self.last_bump_date = Some(now);
        self.bump_count += 1;
    }

    /// "Company - Role", either half alone, or empty.
    pub fn company_role(&self) -> String {
        match (self.company.is_empty(), self.role.is_empty()) {
            (false, false) => format!("{} - {}", self.company, self.role),
            (false, true) => self.company.clone(),
            (true, false) => self.role.clone(),
            (true, true) => String::new(),
        }
    }
}

/// Parse a whitespace-separated tag string into a tag list.
///
/// `#` prefixes are stripped, duplicates dropped, and the contact marker is
/// always present exactly once, in first position.
pub fn normalize_tags(input: &str) -> Vec<String> {
    let mut tags = vec![CONTACT_TAG.to_string()];
    for raw in input.split_whitespace() {
        let tag = raw.trim_start_matches('#');
        if tag.is_empty() || tags.iter().any(|t| t == tag) {
            continue;
        }
        tags.push(tag.to_string());
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_round_trips_through_label() {
        for (_, kind) in &RELATIONSHIP_CHOICES {
            assert_eq!(RelationshipType::from(kind.as_str().to_string()), *kind);
        }
    }

    #[test]
    fn unknown_relationship_is_preserved() {
        let kind = RelationshipType::from("neighbors".to_string());
        assert_eq!(kind, RelationshipType::Other("neighbors".into()));
        assert_eq!(kind.as_str(), "neighbors");
        assert_eq!(kind.default_frequency_days(), 0);
    }

    #[test]
    fn default_frequencies() {
        assert_eq!(RelationshipType::Close.default_frequency_days(), 30);
        assert_eq!(RelationshipType::Family.default_frequency_days(), 30);
        assert_eq!(RelationshipType::Work.default_frequency_days(), 60);
        assert_eq!(RelationshipType::Network.default_frequency_days(), 90);
        assert_eq!(RelationshipType::Social.default_frequency_days(), 0);
        assert_eq!(RelationshipType::Providers.default_frequency_days(), 0);
        assert_eq!(RelationshipType::Recruiters.default_frequency_days(), 0);
    }

    #[test]
    fn hotkeys_resolve() {
        assert_eq!(RelationshipType::from_key('w'), Some(RelationshipType::Work));
        assert_eq!(RelationshipType::from_key('x'), None);
        assert_eq!(ContactStyle::from_key('a'), Some(ContactStyle::Ambient));
    }

    #[test]
    fn normalize_tags_keeps_marker_first_once() {
        assert_eq!(
            normalize_tags("#friend contact  climbing #friend"),
            vec!["contact", "friend", "climbing"]
        );
        assert_eq!(normalize_tags(""), vec!["contact"]);
    }

    #[test]
    fn normalize_tags_is_idempotent() {
        let once = normalize_tags("a #b c");
        let twice = normalize_tags(&once.join(" "));
        assert_eq!(once, twice);
    }

    #[test]
    fn user_tags_hide_marker() {
        let mut c = Contact::new("Ada");
        c.tags.push("math".into());
        assert_eq!(c.user_tags().collect::<Vec<_>>(), vec!["math"]);
    }

    #[test]
    fn bump_increments_count() {
        let now = DateTime::parse_from_rfc3339("2024-03-05T10:00:00+00:00").unwrap();
        let mut c = Contact::new("Ada");
        c.bump(now);
        c.bump(now);
        assert_eq!(c.bump_count, 2);
        assert_eq!(c.last_bump_date, Some(now));
    }

    #[test]
    fn company_role_combinations() {
        let mut c = Contact::new("Ada");
        assert_eq!(c.company_role(), "");
        c.role = "Engineer".into();
        assert_eq!(c.company_role(), "Engineer");
        c.company = "Acme".into();
        assert_eq!(c.company_role(), "Acme - Engineer");
    }
}
