//! Edit/create form.
//!
//! Two nested modes: field selection (a hotkey picks a field) and field
//! editing. Text fields edit a draft that only replaces the field value on
//! Enter; choice fields take a single hotkey and return immediately.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::contact::{
    normalize_tags, Contact, ContactStyle, RelationshipType, RELATIONSHIP_CHOICES, STYLE_CHOICES,
};
use crate::task::{task_trigger, StateChoice, DEFAULT_STATE, STATE_CHOICES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Phone,
    Company,
    Role,
    Location,
    Type,
    Style,
    State,
    Tags,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Self::Name,
        Self::Email,
        Self::Phone,
        Self::Company,
        Self::Role,
        Self::Location,
        Self::Type,
        Self::Style,
        Self::State,
        Self::Tags,
    ];

    pub fn key(self) -> char {
        match self {
            Self::Name => 'n',
            Self::Email => 'e',
            Self::Phone => 'p',
            Self::Company => 'c',
            Self::Role => 'r',
            Self::Location => 'l',
            Self::Type => 't',
            Self::Style => 's',
            Self::State => 'S',
            Self::Tags => 'T',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Company => "Company",
            Self::Role => "Role",
            Self::Location => "Location",
            Self::Type => "Type",
            Self::Style => "Style",
            Self::State => "State",
            Self::Tags => "Tags",
        }
    }

    pub fn from_key(key: char) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Picked from a fixed set with one key rather than typed.
    pub fn is_choice(self) -> bool {
        matches!(self, Self::Type | Self::Style | Self::State)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// What the caller should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    Continue,
    Cancel,
    Commit,
}

/// Field currently being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEdit {
    pub field: Field,
    pub draft: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    /// Record being edited; `None` when creating.
    pub target: Option<PathBuf>,
    values: [String; 10],
    original_state: String,
    editing: Option<FieldEdit>,
}

impl EditForm {
    pub fn for_contact(contact: &Contact) -> Self {
        let mut values: [String; 10] = Default::default();
        values[Field::Name.index()] = contact.title.clone();
        values[Field::Email.index()] = contact.email.clone();
        values[Field::Phone.index()] = contact.phone.clone();
        values[Field::Company.index()] = contact.company.clone();
        values[Field::Role.index()] = contact.role.clone();
        values[Field::Location.index()] = contact.location.clone();
        values[Field::Type.index()] = contact
            .relationship_type
            .as_ref()
            .map(|t| t.to_string())
            .unwrap_or_default();
        values[Field::Style.index()] = contact
            .contact_style
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_default();
        values[Field::State.index()] = contact.state.clone();
        values[Field::Tags.index()] = contact.user_tags().collect::<Vec<_>>().join(" ");
        Self {
            target: contact.file_path.clone(),
            values,
            original_state: contact.state.clone(),
            editing: None,
        }
    }

    /// Blank form with creation defaults.
    pub fn for_new() -> Self {
        let mut values: [String; 10] = Default::default();
        values[Field::Type.index()] = RelationshipType::Network.to_string();
        values[Field::Style.index()] = ContactStyle::Periodic.to_string();
        values[Field::State.index()] = DEFAULT_STATE.to_string();
        Self {
            target: None,
            values,
            original_state: String::new(),
            editing: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.target.is_none()
    }

    pub fn value(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    pub fn editing(&self) -> Option<&FieldEdit> {
        self.editing.as_ref()
    }

    /// State the record had when the form opened; empty for new records.
    pub fn original_state(&self) -> &str {
        &self.original_state
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return FormOutcome::Cancel;
        }
        match self.editing.take() {
            None => self.select_field(key),
            Some(edit) => {
                self.editing = self.edit_field(edit, key);
                FormOutcome::Continue
            }
        }
    }

    fn select_field(&mut self, key: KeyEvent) -> FormOutcome {
        match key.code {
            KeyCode::Esc => FormOutcome::Cancel,
            KeyCode::Char('q') => FormOutcome::Commit,
            KeyCode::Char(c) => {
                if let Some(field) = Field::from_key(c) {
                    self.editing = Some(FieldEdit {
                        field,
                        draft: self.value(field).to_string(),
                    });
                }
                FormOutcome::Continue
            }
            _ => FormOutcome::Continue,
        }
    }

    /// Returns the edit still in progress, or `None` once it ends.
    fn edit_field(&mut self, mut edit: FieldEdit, key: KeyEvent) -> Option<FieldEdit> {
        if key.code == KeyCode::Esc {
            return None;
        }
        if edit.field.is_choice() {
            if let KeyCode::Char(c) = key.code {
                if let Some(value) = choice_for(edit.field, c) {
                    self.values[edit.field.index()] = value;
                    return None;
                }
            }
            return Some(edit);
        }
        match key.code {
            KeyCode::Enter => {
                self.values[edit.field.index()] = edit.draft;
                return None;
            }
            KeyCode::Backspace => {
                edit.draft.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                edit.draft.push(c);
            }
            _ => {}
        }
        Some(edit)
    }

    /// A name is the only required field.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.value(Field::Name).trim().is_empty() {
            Err("Name is required")
        } else {
            Ok(())
        }
    }

    /// Copy form values onto `contact`, leaving unrelated fields alone.
    pub fn apply_to(&self, contact: &mut Contact) {
        let text = |f: Field| self.value(f).trim().to_string();
        contact.title = text(Field::Name);
        contact.email = text(Field::Email);
        contact.phone = text(Field::Phone);
        contact.company = text(Field::Company);
        contact.role = text(Field::Role);
        contact.location = text(Field::Location);
        contact.relationship_type = Some(text(Field::Type))
            .filter(|s| !s.is_empty())
            .map(RelationshipType::from);
        contact.contact_style = Some(text(Field::Style))
            .filter(|s| !s.is_empty())
            .map(ContactStyle::from);
        contact.state = text(Field::State);
        contact.tags = normalize_tags(self.value(Field::Tags));
    }

    /// Notice shown when saving will generate a task.
    pub fn task_hint(&self) -> Option<String> {
        let state = self.value(Field::State);
        task_trigger(&self.original_state, state)
            .map(|action| format!("Task will be created when saved (state → {action})"))
    }
}

fn choice_for(field: Field, key: char) -> Option<String> {
    match field {
        Field::Type => RELATIONSHIP_CHOICES
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, t)| t.to_string()),
        Field::Style => STYLE_CHOICES
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, s)| s.to_string()),
        Field::State => StateChoice::from_key(key).map(|c| c.state.to_string()),
        _ => None,
    }
}

/// Hotkeys and labels for the choice field being edited.
pub fn choices(field: Field) -> Vec<(char, String)> {
    match field {
        Field::Type => RELATIONSHIP_CHOICES
            .iter()
            .map(|(k, t)| (*k, t.to_string()))
            .collect(),
        Field::Style => STYLE_CHOICES
            .iter()
            .map(|(k, s)| (*k, s.to_string()))
            .collect(),
        Field::State => STATE_CHOICES
            .iter()
            .map(|c| (c.key, c.state.to_string()))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn code(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(form: &mut EditForm, s: &str) {
        for c in s.chars() {
            form.handle_key(key(c));
        }
    }

    #[test]
    fn new_form_has_defaults() {
        let form = EditForm::for_new();
        assert!(form.is_new());
        assert_eq!(form.value(Field::Type), "network");
        assert_eq!(form.value(Field::Style), "periodic");
        assert_eq!(form.value(Field::State), "ok");
        assert_eq!(form.validate(), Err("Name is required"));
    }

    #[test]
    fn enter_commits_field_and_esc_discards() {
        let mut form = EditForm::for_new();
        form.handle_key(key('n'));
        type_str(&mut form, "Ada");
        form.handle_key(code(KeyCode::Enter));
        assert_eq!(form.value(Field::Name), "Ada");
        assert!(form.editing().is_none());

        form.handle_key(key('n'));
        type_str(&mut form, " Lovelace");
        form.handle_key(code(KeyCode::Esc));
        assert_eq!(form.value(Field::Name), "Ada");
        assert!(form.editing().is_none());
    }

    #[test]
    fn hotkeys_inside_text_are_literal() {
        let mut form = EditForm::for_new();
        form.handle_key(key('c'));
        type_str(&mut form, "qwerty");
        assert_eq!(form.editing().unwrap().draft, "qwerty");
        form.handle_key(code(KeyCode::Backspace));
        form.handle_key(code(KeyCode::Enter));
        assert_eq!(form.value(Field::Company), "qwert");
    }

    #[test]
    fn choice_fields_take_one_key() {
        let mut form = EditForm::for_new();
        form.handle_key(key('t'));
        form.handle_key(key('x'));
        assert!(form.editing().is_some(), "unknown key keeps the picker open");
        form.handle_key(key('w'));
        assert_eq!(form.value(Field::Type), "work");
        assert!(form.editing().is_none());

        form.handle_key(key('S'));
        form.handle_key(key('p'));
        assert_eq!(form.value(Field::State), "ping");
    }

    #[test]
    fn selection_mode_escape_cancels_and_q_commits() {
        let mut form = EditForm::for_new();
        assert_eq!(form.handle_key(key('q')), FormOutcome::Commit);
        assert_eq!(form.handle_key(code(KeyCode::Esc)), FormOutcome::Cancel);
    }

    #[test]
    fn apply_preserves_untouched_fields_and_normalizes_tags() {
        let mut contact = Contact::new("Ada");
        contact.tags.push("math".into());
        contact.bump_count = 4;
        contact.notes = "keep".into();

        let mut form = EditForm::for_contact(&contact);
        assert_eq!(form.value(Field::Tags), "math");
        form.handle_key(key('T'));
        type_str(&mut form, " #history contact");
        form.handle_key(code(KeyCode::Enter));
        form.apply_to(&mut contact);

        assert_eq!(contact.tags, vec!["contact", "math", "history"]);
        assert_eq!(contact.bump_count, 4);
        assert_eq!(contact.notes, "keep");
        assert_eq!(contact.relationship_type, None);
    }

    #[test]
    fn task_hint_only_for_changed_action_state() {
        let mut contact = Contact::new("Ada");
        contact.state = "ping".into();
        let mut form = EditForm::for_contact(&contact);
        assert_eq!(form.task_hint(), None);
        form.handle_key(key('S'));
        form.handle_key(key('f'));
        assert_eq!(
            form.task_hint().as_deref(),
            Some("Task will be created when saved (state → followup)")
        );
    }
}
