//! Relationship health: frequency targets and elapsed-time predicates.
//!
//! All functions are pure in the contact and an explicit `now`. The three
//! predicates overlap by construction (a contact exactly `frequency` days out
//! is "needs attention" but not "overdue"); [`Contact::health`] applies the
//! fixed display priority overdue > needs attention > within threshold > ok.

use std::fmt;

use super::{Contact, ContactStyle, Timestamp};

/// Width of the pre-overdue warning window, in days.
pub const ATTENTION_WINDOW_DAYS: i64 = 7;

/// Sentinel returned by [`Contact::days_since_contact`] for never-contacted records.
pub const NEVER_CONTACTED: i64 = -1;

/// The single externally visible status of a contact at an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Health {
    Overdue,
    NeedsAttention,
    /// Contacted within half the target cadence.
    WithinThreshold,
    Ok,
}

impl Health {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::NeedsAttention => "due soon",
            Self::WithinThreshold => "good timing",
            Self::Ok => "ok",
        }
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

impl Contact {
    /// Target days between contacts; 0 means no target.
    pub fn frequency_days(&self) -> i64 {
        if self.custom_frequency_days > 0 {
            return self.custom_frequency_days;
        }
        self.relationship_type
            .as_ref()
            .map_or(0, |t| t.default_frequency_days())
    }

    /// Whole days since the last logged contact, truncated toward zero.
    ///
    /// `None` if never contacted. Negative when `last_contacted` lies in the future.
    pub fn elapsed_days(&self, now: Timestamp) -> Option<i64> {
        self.last_contacted
            .map(|last| now.signed_duration_since(last).num_hours() / 24)
    }

    /// [`Self::elapsed_days`] with [`NEVER_CONTACTED`] for unset.
    pub fn days_since_contact(&self, now: Timestamp) -> i64 {
        self.elapsed_days(now).unwrap_or(NEVER_CONTACTED)
    }

    /// Only periodic (or unset) styles are tracked against a cadence.
    fn tracked_frequency(&self) -> Option<i64> {
        match self.contact_style {
            None | Some(ContactStyle::Periodic) => {}
            Some(_) => return None,
        }
        Some(self.frequency_days()).filter(|f| *f > 0)
    }

    pub fn is_overdue(&self, now: Timestamp) -> bool {
        let Some(freq) = self.tracked_frequency() else {
            return false;
        };
        match self.elapsed_days(now) {
            None => true,
            Some(days) => days > freq,
        }
    }

    pub fn needs_attention(&self, now: Timestamp) -> bool {
        let Some(freq) = self.tracked_frequency() else {
            return false;
        };
        match self.elapsed_days(now) {
            None => true,
            Some(days) => days > freq - ATTENTION_WINDOW_DAYS && days <= freq,
        }
    }

    pub fn is_within_threshold(&self, now: Timestamp) -> bool {
        let Some(freq) = self.tracked_frequency() else {
            return false;
        };
        match self.elapsed_days(now) {
            None => false,
            Some(days) => days >= 0 && days <= freq / 2,
        }
    }

    pub fn health(&self, now: Timestamp) -> Health {
        if self.is_overdue(now) {
            Health::Overdue
        } else if self.needs_attention(now) {
            Health::NeedsAttention
        } else if self.is_within_threshold(now) {
            Health::WithinThreshold
        } else {
            Health::Ok
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::RelationshipType;
    use chrono::{DateTime, Duration};

    fn now() -> Timestamp {
        DateTime::parse_from_rfc3339("2024-06-01T12:00:00+00:00").unwrap()
    }

    fn contact(kind: RelationshipType, days_ago: Option<i64>) -> Contact {
        let mut c = Contact::new("Ada");
        c.relationship_type = Some(kind);
        c.last_contacted = days_ago.map(|d| now() - Duration::days(d));
        c
    }

    #[test]
    fn custom_frequency_overrides_type() {
        let mut c = contact(RelationshipType::Network, None);
        assert_eq!(c.frequency_days(), 90);
        c.custom_frequency_days = 14;
        assert_eq!(c.frequency_days(), 14);
        c.custom_frequency_days = -3;
        assert_eq!(c.frequency_days(), 90);
    }

    #[test]
    fn no_type_means_no_target() {
        let c = Contact::new("Ada");
        assert_eq!(c.frequency_days(), 0);
        assert!(!c.is_overdue(now()));
        assert!(!c.needs_attention(now()));
    }

    #[test]
    fn never_contacted_is_overdue_and_needs_attention() {
        let c = contact(RelationshipType::Close, None);
        assert_eq!(c.days_since_contact(now()), NEVER_CONTACTED);
        assert!(c.is_overdue(now()));
        assert!(c.needs_attention(now()));
        assert!(!c.is_within_threshold(now()));
        assert_eq!(c.health(now()), Health::Overdue);
    }

    #[test]
    fn partial_days_truncate() {
        let mut c = Contact::new("Ada");
        c.last_contacted = Some(now() - Duration::hours(47));
        assert_eq!(c.days_since_contact(now()), 1);
    }

    #[test]
    fn future_contact_is_negative_not_clamped() {
        let mut c = contact(RelationshipType::Close, None);
        c.last_contacted = Some(now() + Duration::days(3));
        assert_eq!(c.days_since_contact(now()), -3);
        assert!(!c.is_overdue(now()));
        assert!(!c.is_within_threshold(now()));
    }

    #[test]
    fn boundary_at_exact_frequency_is_attention_not_overdue() {
        let c = contact(RelationshipType::Close, Some(30));
        assert!(!c.is_overdue(now()));
        assert!(c.needs_attention(now()));
        assert_eq!(c.health(now()), Health::NeedsAttention);

        let c = contact(RelationshipType::Close, Some(31));
        assert!(c.is_overdue(now()));
        assert!(!c.needs_attention(now()));
    }

    #[test]
    fn attention_window_is_seven_days() {
        assert!(!contact(RelationshipType::Close, Some(23)).needs_attention(now()));
        assert!(contact(RelationshipType::Close, Some(24)).needs_attention(now()));
    }

    #[test]
    fn within_threshold_is_half_frequency() {
        assert!(contact(RelationshipType::Close, Some(0)).is_within_threshold(now()));
        assert!(contact(RelationshipType::Close, Some(15)).is_within_threshold(now()));
        assert!(!contact(RelationshipType::Close, Some(16)).is_within_threshold(now()));
        assert_eq!(
            contact(RelationshipType::Close, Some(20)).health(now()),
            Health::Ok
        );
    }

    #[test]
    fn ambient_and_triggered_are_never_tracked() {
        for style in [ContactStyle::Ambient, ContactStyle::Triggered] {
            let mut c = contact(RelationshipType::Close, None);
            c.contact_style = Some(style);
            assert!(!c.is_overdue(now()));
            assert!(!c.needs_attention(now()));
            assert!(!c.is_within_threshold(now()));
        }
    }

    #[test]
    fn predicates_imply_their_day_ranges() {
        for freq in [1_i64, 7, 30, 60, 90] {
            for days in -5..=(freq + 10) {
                let mut c = contact(RelationshipType::Social, Some(days));
                c.custom_frequency_days = freq;
                c.contact_style = Some(ContactStyle::Periodic);
                let d = c.days_since_contact(now());
                if c.is_overdue(now()) {
                    assert!(d > freq);
                }
                if c.needs_attention(now()) {
                    assert!(freq - 7 < d && d <= freq);
                }
                if c.is_within_threshold(now()) {
                    assert!(0 <= d && d <= freq / 2);
                }
            }
        }
    }
}
