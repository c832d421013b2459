//! Application state machine.
//!
//! [`App::update`] is a pure transition `(state, event, now) -> (state,
//! effects)`. All mutation of the contact collection happens here; disk work
//! is requested through [`Effect`]s and its results come back as [`Event`]s.
//!
//! Workflows (edit, create, logging, quick type change) target their record
//! by path and are entered from an [`EntryView`], which is where a completed
//! or cancelled workflow returns.

pub mod form;
pub mod logging;
pub mod worker;

use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::contact::{Contact, Interaction, RelationshipType, Timestamp};
use crate::filter::{ContactView, Filter, StatusFilter};
use crate::task::DEFAULT_STATE;

pub use form::{EditForm, Field, FormOutcome};
pub use logging::{LogFlow, LogOutcome, LogStep};
pub use worker::{SaveJob, SaveOutcome, Worker};

/// How long a status message stays visible.
pub const MESSAGE_TTL: Duration = Duration::from_secs(3);

// ═══════════════════════════════════════════════════════════════════════
// Screens, events, effects
// ═══════════════════════════════════════════════════════════════════════

/// Screen a workflow returns to when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryView {
    List,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    Browse,
    /// Typing a search query.
    Search,
    /// Filter menu overlay.
    FilterPopup,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    List(ListMode),
    Detail,
    Edit(EditForm),
    Create(EditForm),
    Log(LogFlow),
    QuickType { target: PathBuf },
}

#[derive(Debug, Clone)]
pub enum Event {
    Key(KeyEvent),
    ContactsLoaded(Vec<Contact>),
    LoadFailed(String),
    Saved(SaveOutcome),
    SaveFailed(String),
    /// Timer tagged with the message generation it was scheduled for.
    ClearMessage(u64),
    Resize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadContacts,
    Save(SaveJob),
    ClearMessageAfter { generation: u64, delay: Duration },
    Quit,
}

// ═══════════════════════════════════════════════════════════════════════
// App
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct App {
    pub screen: Screen,
    pub entry: EntryView,
    pub contacts: ContactView,
    /// Record shown in the detail view.
    pub selected: Option<PathBuf>,
    pub message: Option<String>,
    message_generation: u64,
    /// Collection-level failure; blocks everything but quitting.
    pub fatal: Option<String>,
    pub loading: bool,
    /// A save is in flight; keys are ignored until it reports back.
    pub saving: bool,
}

impl Default for App {
    fn default() -> Self {
        Self {
            screen: Screen::List(ListMode::Browse),
            entry: EntryView::List,
            contacts: ContactView::default(),
            selected: None,
            message: None,
            message_generation: 0,
            fatal: None,
            loading: true,
            saving: false,
        }
    }
}

impl App {
    /// Initial state plus the effect that loads the collection.
    pub fn new() -> (Self, Vec<Effect>) {
        (Self::default(), vec![Effect::LoadContacts])
    }

    /// Contact shown in the detail view, looked up by path.
    pub fn selected_contact(&self) -> Option<&Contact> {
        self.selected.as_deref().and_then(|p| self.contacts.find(p))
    }

    /// `[i/n]` position plus the active filter, if any.
    pub fn header_summary(&self) -> String {
        let n = self.contacts.len();
        let i = if n == 0 { 0 } else { self.contacts.cursor() + 1 };
        let filter = self.contacts.filter();
        if filter.is_active() {
            format!("[{i}/{n}] {filter}")
        } else {
            format!("[{i}/{n}]")
        }
    }

    pub fn update(mut self, event: Event, now: Timestamp) -> (Self, Vec<Effect>) {
        let mut effects = Vec::new();
        match event {
            Event::Key(key) => self.handle_key(key, now, &mut effects),
            Event::ContactsLoaded(contacts) => self.on_loaded(contacts, now),
            Event::LoadFailed(message) => {
                self.loading = false;
                self.fatal = Some(message);
            }
            Event::Saved(outcome) => self.on_saved(outcome, now, &mut effects),
            Event::SaveFailed(message) => {
                self.saving = false;
                self.set_message(message, &mut effects);
            }
            Event::ClearMessage(generation) => {
                if generation == self.message_generation {
                    self.message = None;
                }
            }
            Event::Resize => {}
        }
        (self, effects)
    }

    // ── Background results ──────────────────────────────────────────────

    fn on_loaded(&mut self, contacts: Vec<Contact>, now: Timestamp) {
        self.loading = false;
        self.contacts.set_base(contacts, now);
        if self.selected_contact().is_none() {
            self.selected = None;
            if self.screen == Screen::Detail {
                self.screen = Screen::List(ListMode::Browse);
            }
        }
    }

    fn on_saved(&mut self, outcome: SaveOutcome, now: Timestamp, effects: &mut Vec<Effect>) {
        self.saving = false;
        let path = outcome.contact.file_path.clone();
        self.contacts.upsert(outcome.contact, now);
        if outcome.created {
            if let Some(path) = &path {
                self.contacts.select_path(path);
            }
        }
        self.return_to_entry();
        self.set_message(outcome.message, effects);
    }

    fn set_message(&mut self, message: String, effects: &mut Vec<Effect>) {
        self.message_generation += 1;
        self.message = Some(message);
        effects.push(Effect::ClearMessageAfter {
            generation: self.message_generation,
            delay: MESSAGE_TTL,
        });
    }

    fn return_to_entry(&mut self) {
        self.screen = match self.entry {
            EntryView::Detail if self.selected_contact().is_some() => Screen::Detail,
            _ => Screen::List(ListMode::Browse),
        };
    }

    fn entry_for_current(&self) -> EntryView {
        match self.screen {
            Screen::Detail => EntryView::Detail,
            _ => EntryView::List,
        }
    }

    /// Record the action applies to: the detail record or the list cursor.
    fn target(&self) -> Option<&Contact> {
        match self.screen {
            Screen::Detail => self.selected_contact(),
            _ => self.contacts.selected(),
        }
    }

    fn dispatch(&mut self, job: SaveJob, effects: &mut Vec<Effect>) {
        self.saving = true;
        effects.push(Effect::Save(job));
    }

    // ── Keys ────────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent, now: Timestamp, effects: &mut Vec<Effect>) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if self.fatal.is_some() {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
                || (ctrl && key.code == KeyCode::Char('c'))
            {
                effects.push(Effect::Quit);
            }
            return;
        }
        if self.saving {
            return;
        }

        match std::mem::replace(&mut self.screen, Screen::List(ListMode::Browse)) {
            Screen::List(ListMode::Browse) => {
                self.screen = Screen::List(ListMode::Browse);
                self.on_list_key(key, now, effects);
            }
            Screen::List(ListMode::Search) => {
                self.screen = Screen::List(ListMode::Search);
                self.on_search_key(key, now);
            }
            Screen::List(ListMode::FilterPopup) => {
                self.screen = Screen::List(ListMode::FilterPopup);
                self.on_filter_key(key, now, effects);
            }
            Screen::Detail => {
                self.screen = Screen::Detail;
                self.on_detail_key(key, now, effects);
            }
            Screen::Edit(mut form) => match form.handle_key(key) {
                FormOutcome::Continue => self.screen = Screen::Edit(form),
                FormOutcome::Cancel => self.return_to_entry(),
                FormOutcome::Commit => {
                    self.commit_edit(&form, effects);
                    self.screen = Screen::Edit(form);
                }
            },
            Screen::Create(mut form) => match form.handle_key(key) {
                FormOutcome::Continue => self.screen = Screen::Create(form),
                FormOutcome::Cancel => self.return_to_entry(),
                FormOutcome::Commit => {
                    self.commit_create(&form, now, effects);
                    self.screen = Screen::Create(form);
                }
            },
            Screen::Log(mut flow) => match flow.handle_key(key) {
                LogOutcome::Continue => self.screen = Screen::Log(flow),
                LogOutcome::Cancel => self.return_to_entry(),
                LogOutcome::Commit {
                    kind,
                    next_state,
                    note,
                } => {
                    let interaction = Interaction {
                        at: now,
                        kind,
                        summary: note,
                    };
                    self.commit_log(&flow, &interaction, next_state, effects);
                    self.screen = Screen::Log(flow);
                }
            },
            Screen::QuickType { target } => match key.code {
                KeyCode::Esc => self.return_to_entry(),
                KeyCode::Char('c') if ctrl => self.return_to_entry(),
                KeyCode::Char(c) => {
                    if let Some(kind) = RelationshipType::from_key(c) {
                        self.commit_type(&target, kind, effects);
                    }
                    self.screen = Screen::QuickType { target };
                }
                _ => self.screen = Screen::QuickType { target },
            },
        }
    }

    fn on_list_key(&mut self, key: KeyEvent, now: Timestamp, effects: &mut Vec<Effect>) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => effects.push(Effect::Quit),
            KeyCode::Char('d') if ctrl => self.contacts.page_down(),
            KeyCode::Char('u') if ctrl => self.contacts.page_up(),
            KeyCode::PageDown => self.contacts.page_down(),
            KeyCode::PageUp => self.contacts.page_up(),
            KeyCode::Char('q') => effects.push(Effect::Quit),
            KeyCode::Char('j') | KeyCode::Down => self.contacts.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.contacts.move_up(),
            KeyCode::Char('g') | KeyCode::Home => self.contacts.move_top(),
            KeyCode::Char('G') | KeyCode::End => self.contacts.move_bottom(),
            KeyCode::Enter => {
                if let Some(path) = self.contacts.selected().and_then(|c| c.file_path.clone()) {
                    self.selected = Some(path);
                    self.screen = Screen::Detail;
                }
            }
            KeyCode::Char('/') => self.screen = Screen::List(ListMode::Search),
            KeyCode::Char('f') => self.screen = Screen::List(ListMode::FilterPopup),
            KeyCode::Char('c') => {
                self.entry = EntryView::List;
                self.screen = Screen::Create(EditForm::for_new());
            }
            _ => self.on_record_key(key, now, effects),
        }
    }

    fn on_detail_key(&mut self, key: KeyEvent, now: Timestamp, effects: &mut Vec<Effect>) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => effects.push(Effect::Quit),
            KeyCode::Esc | KeyCode::Char('q') => {
                self.selected = None;
                self.screen = Screen::List(ListMode::Browse);
            }
            _ => self.on_record_key(key, now, effects),
        }
    }

    /// Actions on one record, shared by the list and detail screens.
    fn on_record_key(&mut self, key: KeyEvent, now: Timestamp, effects: &mut Vec<Effect>) {
        let Some(contact) = self.target() else {
            return;
        };
        let Some(path) = contact.file_path.clone() else {
            return;
        };
        match key.code {
            KeyCode::Char('b') => {
                let mut contact = contact.clone();
                contact.bump(now);
                let job = SaveJob {
                    message: format!("Bumped {} (review #{})", contact.title, contact.bump_count),
                    old_state: contact.state.clone(),
                    contact,
                };
                self.entry = self.entry_for_current();
                self.dispatch(job, effects);
            }
            KeyCode::Char('e') => {
                let form = EditForm::for_contact(contact);
                self.entry = self.entry_for_current();
                self.screen = Screen::Edit(form);
            }
            KeyCode::Char('d') => {
                self.entry = self.entry_for_current();
                self.screen = Screen::Log(LogFlow::full(path));
            }
            KeyCode::Char('s') => {
                self.entry = self.entry_for_current();
                self.screen = Screen::Log(LogFlow::state_only(path));
            }
            KeyCode::Char('T') => {
                self.entry = self.entry_for_current();
                self.screen = Screen::QuickType { target: path };
            }
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: KeyEvent, now: Timestamp) {
        match key.code {
            KeyCode::Esc => {
                self.contacts.clear(now);
                self.screen = Screen::List(ListMode::Browse);
            }
            KeyCode::Enter => self.screen = Screen::List(ListMode::Browse),
            KeyCode::Backspace => {
                let mut query = self.contacts.query().to_string();
                query.pop();
                self.contacts.set_query(&query, now);
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let mut query = self.contacts.query().to_string();
                query.push(c);
                self.contacts.set_query(&query, now);
            }
            _ => {}
        }
    }

    fn on_filter_key(&mut self, key: KeyEvent, now: Timestamp, effects: &mut Vec<Effect>) {
        let KeyCode::Char(c) = key.code else {
            if key.code == KeyCode::Esc {
                self.screen = Screen::List(ListMode::Browse);
            }
            return;
        };
        let filter = match c {
            'q' => {
                self.screen = Screen::List(ListMode::Browse);
                return;
            }
            'a' => Filter::None,
            'F' => Filter::State("followup".into()),
            'P' => Filter::State("ping".into()),
            'S' => Filter::State("scheduled".into()),
            'T' => Filter::State("timeout".into()),
            'o' => Filter::Status(StatusFilter::Overdue),
            'd' => Filter::Status(StatusFilter::NeedsAttention),
            'g' => Filter::Status(StatusFilter::WithinThreshold),
            other => match RelationshipType::from_key(other) {
                Some(kind) => Filter::Type(kind),
                None => return,
            },
        };
        let message = if filter.is_active() {
            format!("Filtered by {filter}")
        } else {
            "Showing all contacts".to_string()
        };
        self.contacts.set_filter(filter, now);
        self.screen = Screen::List(ListMode::Browse);
        self.set_message(message, effects);
    }

    // ── Commits ─────────────────────────────────────────────────────────

    fn commit_edit(&mut self, form: &EditForm, effects: &mut Vec<Effect>) {
        if let Err(reason) = form.validate() {
            self.set_message(reason.to_string(), effects);
            return;
        }
        let Some(original) = form.target.as_deref().and_then(|p| self.contacts.find(p)) else {
            self.set_message("Contact no longer exists".to_string(), effects);
            return;
        };
        let mut contact = original.clone();
        form.apply_to(&mut contact);
        let job = SaveJob {
            message: format!("Updated {}", contact.title),
            old_state: form.original_state().to_string(),
            contact,
        };
        self.dispatch(job, effects);
    }

    fn commit_create(&mut self, form: &EditForm, now: Timestamp, effects: &mut Vec<Effect>) {
        if let Err(reason) = form.validate() {
            self.set_message(reason.to_string(), effects);
            return;
        }
        let mut contact = Contact::new("");
        form.apply_to(&mut contact);
        contact.date = Some(now);
        contact.identifier = now.format("%Y%m%dT%H%M%S").to_string();
        let job = SaveJob {
            message: format!("Created {}", contact.title),
            old_state: String::new(),
            contact,
        };
        self.dispatch(job, effects);
    }

    fn commit_log(
        &mut self,
        flow: &LogFlow,
        interaction: &Interaction,
        next_state: &str,
        effects: &mut Vec<Effect>,
    ) {
        let Some(original) = self.contacts.find(&flow.target) else {
            self.set_message("Contact no longer exists".to_string(), effects);
            return;
        };
        let mut contact = original.clone();
        let old_state = contact.state.clone();
        contact.log_interaction(interaction, next_state);
        let mut message = format!("Logged {} interaction with {}", interaction.kind, contact.title);
        if next_state != DEFAULT_STATE {
            message.push_str(&format!(" (→ {next_state})"));
        }
        let job = SaveJob {
            contact,
            old_state,
            message,
        };
        self.dispatch(job, effects);
    }

    fn commit_type(&mut self, target: &std::path::Path, kind: RelationshipType, effects: &mut Vec<Effect>) {
        let Some(original) = self.contacts.find(target) else {
            self.set_message("Contact no longer exists".to_string(), effects);
            return;
        };
        let mut contact = original.clone();
        let message = format!("Changed {} to {kind}", contact.title);
        let old_state = contact.state.clone();
        contact.relationship_type = Some(kind);
        let job = SaveJob {
            contact,
            old_state,
            message,
        };
        self.dispatch(job, effects);
    }
}
