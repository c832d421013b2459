//! Filtering and search over the loaded contacts.
//!
//! [`ContactView`] owns the base collection and exposes a filtered window
//! with a cursor. Exactly one [`Filter`] is active at a time; installing a
//! new one replaces the previous one.

use std::fmt;
use std::path::Path;

use crate::contact::{Contact, RelationshipType, Timestamp};
use crate::repository::sort_by_title;

/// Rows moved by a page up/down.
pub const PAGE_SIZE: usize = 10;

/// Status-based filter choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Overdue,
    NeedsAttention,
    WithinThreshold,
}

impl StatusFilter {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::NeedsAttention => "due soon",
            Self::WithinThreshold => "good timing",
        }
    }

    fn matches(&self, contact: &Contact, now: Timestamp) -> bool {
        match self {
            Self::Overdue => contact.is_overdue(now),
            Self::NeedsAttention => contact.needs_attention(now),
            Self::WithinThreshold => contact.is_within_threshold(now),
        }
    }
}

/// The single active narrowing predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Filter {
    #[default]
    None,
    /// Case-insensitive substring search. Never holds an empty string.
    Query(String),
    Type(RelationshipType),
    State(String),
    Status(StatusFilter),
}

impl Filter {
    /// Build a query filter; an empty query means no filter.
    pub fn query(text: &str) -> Self {
        if text.is_empty() {
            Self::None
        } else {
            Self::Query(text.to_string())
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn matches(&self, contact: &Contact, now: Timestamp) -> bool {
        match self {
            Self::None => true,
            Self::Query(q) => matches_query(contact, &q.to_lowercase()),
            Self::Type(t) => contact.relationship_type.as_ref() == Some(t),
            Self::State(s) => contact.state == *s,
            Self::Status(s) => s.matches(contact, now),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("all"),
            Self::Query(q) => write!(f, "search: \"{q}\""),
            Self::Type(t) => write!(f, "type: {t}"),
            Self::State(s) => write!(f, "state: {s}"),
            Self::Status(s) => write!(f, "status: {}", s.as_label()),
        }
    }
}

/// Substring match over title, company, email, label, role and tags.
/// `needle` must already be lowercase.
fn matches_query(contact: &Contact, needle: &str) -> bool {
    let fields = [
        &contact.title,
        &contact.company,
        &contact.email,
        &contact.label,
        &contact.role,
    ];
    fields
        .into_iter()
        .chain(contact.tags.iter())
        .any(|field| field.to_lowercase().contains(needle))
}

/// Base collection plus the filtered, cursor-bearing window over it.
#[derive(Debug, Clone, Default)]
pub struct ContactView {
    base: Vec<Contact>,
    filter: Filter,
    /// Indices into `base`, in base order.
    visible: Vec<usize>,
    cursor: usize,
}

impl ContactView {
    pub fn new(contacts: Vec<Contact>, now: Timestamp) -> Self {
        let mut view = Self {
            base: contacts,
            ..Default::default()
        };
        view.refilter(now);
        view
    }

    // ── Collection ──────────────────────────────────────────────────────

    /// Replace the base collection, keeping the active filter.
    pub fn set_base(&mut self, contacts: Vec<Contact>, now: Timestamp) {
        self.base = contacts;
        self.refilter(now);
    }

    /// Replace the record at the same path, or insert it in title order.
    pub fn upsert(&mut self, contact: Contact, now: Timestamp) {
        let existing = contact
            .file_path
            .as_deref()
            .and_then(|p| self.base.iter().position(|c| c.is_at(p)));
        match existing {
            Some(i) => self.base[i] = contact,
            None => {
                self.base.push(contact);
                sort_by_title(&mut self.base);
            }
        }
        self.refilter(now);
    }

    pub fn find(&self, path: &Path) -> Option<&Contact> {
        self.base.iter().find(|c| c.is_at(path))
    }

    pub fn base_len(&self) -> usize {
        self.base.len()
    }

    // ── Filtering ───────────────────────────────────────────────────────

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Current search text, empty unless a query filter is active.
    pub fn query(&self) -> &str {
        match &self.filter {
            Filter::Query(q) => q,
            _ => "",
        }
    }

    /// Install a categorical filter, clamping the cursor.
    pub fn set_filter(&mut self, filter: Filter, now: Timestamp) {
        self.filter = filter;
        self.refilter(now);
    }

    /// Install a search query; the cursor returns to the top.
    pub fn set_query(&mut self, text: &str, now: Timestamp) {
        self.filter = Filter::query(text);
        self.cursor = 0;
        self.refilter(now);
    }

    /// Drop any filter and return to the top of the full collection.
    pub fn clear(&mut self, now: Timestamp) {
        self.set_query("", now);
    }

    /// Recompute the visible window, e.g. after time moved on.
    pub fn refilter(&mut self, now: Timestamp) {
        self.visible = self
            .base
            .iter()
            .enumerate()
            .filter(|(_, c)| self.filter.matches(c, now))
            .map(|(i, _)| i)
            .collect();
        self.clamp();
    }

    // ── Window ──────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Contact> {
        self.visible.iter().map(|&i| &self.base[i])
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<&Contact> {
        self.visible.get(self.cursor).map(|&i| &self.base[i])
    }

    /// Point the cursor at the visible record at `path`, if present.
    pub fn select_path(&mut self, path: &Path) -> bool {
        match self.visible.iter().position(|&i| self.base[i].is_at(path)) {
            Some(pos) => {
                self.cursor = pos;
                true
            }
            None => false,
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.visible.len() {
            self.cursor += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_top(&mut self) {
        self.cursor = 0;
    }

    pub fn move_bottom(&mut self) {
        self.cursor = self.visible.len().saturating_sub(1);
    }

    pub fn page_down(&mut self) {
        self.cursor += PAGE_SIZE;
        self.clamp();
    }

    pub fn page_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(PAGE_SIZE);
    }

    fn clamp(&mut self) {
        if self.cursor >= self.visible.len() {
            self.cursor = self.visible.len().saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};
    use std::path::PathBuf;

    fn now() -> Timestamp {
        DateTime::parse_from_rfc3339("2024-06-01T12:00:00+00:00").unwrap()
    }

    fn contact(title: &str) -> Contact {
        let mut c = Contact::new(title);
        c.file_path = Some(PathBuf::from(format!("/c/{title}__contact.md")));
        c
    }

    fn sample() -> Vec<Contact> {
        let mut amy = contact("Amy");
        amy.company = "Acme Corp".into();
        amy.relationship_type = Some(RelationshipType::Work);
        amy.last_contacted = Some(now() - Duration::days(5));

        let mut bob = contact("Bob");
        bob.tags.push("climbing".into());
        bob.state = "followup".into();
        bob.relationship_type = Some(RelationshipType::Close);

        let mut cat = contact("Cat");
        cat.email = "cat@example.org".into();
        cat.relationship_type = Some(RelationshipType::Close);
        cat.last_contacted = Some(now() - Duration::days(27));

        vec![amy, bob, cat]
    }

    fn titles(view: &ContactView) -> Vec<&str> {
        view.iter().map(|c| c.title.as_str()).collect()
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let mut view = ContactView::new(sample(), now());
        view.set_query("acme", now());
        assert_eq!(titles(&view), vec!["Amy"]);
        view.set_query("CLIMB", now());
        assert_eq!(titles(&view), vec!["Bob"]);
        view.set_query("example.org", now());
        assert_eq!(titles(&view), vec!["Cat"]);
        view.set_query("contact", now());
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn clearing_query_restores_base_and_resets_cursor() {
        let mut view = ContactView::new(sample(), now());
        view.move_bottom();
        view.set_query("a", now());
        view.move_down();
        view.clear(now());
        assert_eq!(view.len(), 3);
        assert_eq!(view.cursor(), 0);
        assert_eq!(*view.filter(), Filter::None);
    }

    #[test]
    fn empty_query_is_no_filter() {
        assert_eq!(Filter::query(""), Filter::None);
    }

    #[test]
    fn filters_replace_each_other() {
        let mut view = ContactView::new(sample(), now());
        view.set_query("acme", now());
        view.set_filter(Filter::Type(RelationshipType::Close), now());
        assert_eq!(titles(&view), vec!["Bob", "Cat"]);
        assert_eq!(view.query(), "");
        view.set_filter(Filter::State("followup".into()), now());
        assert_eq!(titles(&view), vec!["Bob"]);
    }

    #[test]
    fn status_filters_use_the_engine() {
        let mut view = ContactView::new(sample(), now());
        view.set_filter(Filter::Status(StatusFilter::Overdue), now());
        assert_eq!(titles(&view), vec!["Bob"]);
        view.set_filter(Filter::Status(StatusFilter::NeedsAttention), now());
        assert_eq!(titles(&view), vec!["Bob", "Cat"]);
        view.set_filter(Filter::Status(StatusFilter::WithinThreshold), now());
        assert_eq!(titles(&view), vec!["Amy"]);
    }

    #[test]
    fn categorical_filter_clamps_cursor() {
        let mut view = ContactView::new(sample(), now());
        view.move_bottom();
        assert_eq!(view.cursor(), 2);
        view.set_filter(Filter::Type(RelationshipType::Close), now());
        assert_eq!(view.cursor(), 1);
        view.set_filter(Filter::State("archived".into()), now());
        assert_eq!(view.cursor(), 0);
        assert!(view.selected().is_none());
    }

    #[test]
    fn upsert_replaces_by_path_and_inserts_sorted() {
        let mut view = ContactView::new(sample(), now());
        let mut bob = view.find(Path::new("/c/Bob__contact.md")).unwrap().clone();
        bob.company = "Initech".into();
        view.upsert(bob, now());
        assert_eq!(view.base_len(), 3);
        assert_eq!(
            view.find(Path::new("/c/Bob__contact.md")).unwrap().company,
            "Initech"
        );

        view.upsert(contact("Abe"), now());
        assert_eq!(titles(&view), vec!["Abe", "Amy", "Bob", "Cat"]);
    }

    #[test]
    fn upsert_reapplies_filter() {
        let mut view = ContactView::new(sample(), now());
        view.set_filter(Filter::State("followup".into()), now());
        let mut bob = view.selected().unwrap().clone();
        bob.state = "ok".into();
        view.upsert(bob, now());
        assert!(view.is_empty());
    }

    #[test]
    fn paging_stays_in_bounds() {
        let many: Vec<_> = (0..25).map(|i| contact(&format!("c{i:02}"))).collect();
        let mut view = ContactView::new(many, now());
        view.page_down();
        assert_eq!(view.cursor(), 10);
        view.page_down();
        view.page_down();
        assert_eq!(view.cursor(), 24);
        view.page_up();
        assert_eq!(view.cursor(), 14);
        view.move_top();
        view.move_up();
        assert_eq!(view.cursor(), 0);
    }

    #[test]
    fn select_path_moves_cursor() {
        let mut view = ContactView::new(sample(), now());
        assert!(view.select_path(Path::new("/c/Cat__contact.md")));
        assert_eq!(view.selected().unwrap().title, "Cat");
        assert!(!view.select_path(Path::new("/elsewhere")));
    }

    #[test]
    fn description_names_the_filter() {
        assert_eq!(Filter::Query("acme".into()).to_string(), "search: \"acme\"");
        assert_eq!(
            Filter::Status(StatusFilter::NeedsAttention).to_string(),
            "status: due soon"
        );
    }
}
