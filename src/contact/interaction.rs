//! Logged interactions. These are not stored as structured data: a logged
//! interaction updates the contact's temporal fields and, when it carries a
//! summary, is prepended to the body as a dated markdown section.

use std::fmt;

use super::{Contact, Timestamp};

/// How the user got in touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Phone,
    Email,
    Text,
    Meeting,
    Video,
    Social,
    Mail,
    Other,
    /// Sentinel for state-only changes; never offered as a logging choice.
    Note,
}

/// Selectable kinds with their hotkeys, in menu order.
pub static INTERACTION_CHOICES: [(char, InteractionKind); 8] = [
    ('p', InteractionKind::Phone),
    ('e', InteractionKind::Email),
    ('t', InteractionKind::Text),
    ('m', InteractionKind::Meeting),
    ('v', InteractionKind::Video),
    ('s', InteractionKind::Social),
    ('l', InteractionKind::Mail),
    ('o', InteractionKind::Other),
];

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Text => "text",
            Self::Meeting => "meeting",
            Self::Video => "video",
            Self::Social => "social",
            Self::Mail => "mail",
            Self::Other => "other",
            Self::Note => "note",
        }
    }

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Phone => "Phone Call",
            Self::Email => "Email",
            Self::Text => "Text/SMS",
            Self::Meeting => "In-Person Meeting",
            Self::Video => "Video Call",
            Self::Social => "Social Media",
            Self::Mail => "Physical Mail",
            Self::Other => "Other",
            Self::Note => "Note",
        }
    }

    pub fn from_key(key: char) -> Option<Self> {
        INTERACTION_CHOICES
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, kind)| *kind)
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single contact event.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub at: Timestamp,
    pub kind: InteractionKind,
    pub summary: Option<String>,
}

impl Interaction {
    /// Markdown block prepended to the contact body, or `None` without a summary.
    pub fn journal_entry(&self) -> Option<String> {
        let summary = self.summary.as_deref().filter(|s| !s.is_empty())?;
        Some(format!(
            "## {} - {}\n\n{}\n\n",
            self.at.format("%Y-%m-%d"),
            self.kind,
            summary
        ))
    }
}

impl Contact {
    /// Apply a logged interaction and move the contact to `next_state`.
    ///
    /// A quick state change arrives here too, as a [`InteractionKind::Note`].
    pub fn log_interaction(&mut self, interaction: &Interaction, next_state: &str) {
        self.last_contacted = Some(interaction.at);
        self.last_interaction_type = interaction.kind.as_str().to_string();
        self.state = next_state.to_string();
        self.prepend_entry(interaction);
    }

    fn prepend_entry(&mut self, interaction: &Interaction) {
        if let Some(entry) = interaction.journal_entry() {
            self.content.insert_str(0, &entry);
        }
    }
}
