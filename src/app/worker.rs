//! Background units of work: directory scans and saves.
//!
//! Workers never touch application state. Each unit runs to completion and
//! reports back as a single [`Event`].

use std::path::PathBuf;

use crate::contact::{Contact, Timestamp};
use crate::record;
use crate::repository::ContactRepository;
use crate::task::TaskWriter;

use super::Event;

/// A fully prepared contact waiting to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveJob {
    /// Record as it should be written. No `file_path` means create.
    pub contact: Contact,
    /// State before the change, empty for new records.
    pub old_state: String,
    /// Success message, before task annotations.
    pub message: String,
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    /// The record as re-read from disk.
    pub contact: Contact,
    pub message: String,
    pub created: bool,
}

/// Executes scans and saves against the configured directories.
#[derive(Debug, Clone)]
pub struct Worker {
    repository: ContactRepository,
    tasks: TaskWriter,
}

impl Worker {
    pub fn new(contacts_dir: impl Into<PathBuf>, tasks_dir: impl Into<PathBuf>) -> Self {
        Self {
            repository: ContactRepository::new(contacts_dir),
            tasks: TaskWriter::new(tasks_dir),
        }
    }

    pub fn load(&self) -> Event {
        match self.repository.scan() {
            Ok(contacts) => Event::ContactsLoaded(contacts),
            Err(e) => {
                tracing::error!(error = %e, "contact scan failed");
                Event::LoadFailed(e.to_string())
            }
        }
    }

    /// Write, reload, then run the task side effect.
    pub fn save(&self, job: SaveJob, now: Timestamp) -> Event {
        let SaveJob {
            mut contact,
            old_state,
            mut message,
        } = job;
        let created = contact.file_path.is_none();

        let path = match record::save_contact(&mut contact, self.repository.root(), now) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(contact = %contact.title, error = %e, "save failed");
                return Event::SaveFailed(format!("Error saving {}: {e}", contact.title));
            }
        };

        let saved = match record::read_contact(&path) {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "reload after save failed");
                return Event::SaveFailed(format!("Saved but could not reload {}: {e}", contact.title));
            }
        };

        match self.tasks.on_transition(&saved, &old_state, now) {
            Ok(Some(_)) => message.push_str(" [task created]"),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(contact = %saved.title, error = %e, "task creation failed");
                message.push_str(&format!(" [task error: {e}]"));
            }
        }

        Event::Saved(SaveOutcome {
            contact: saved,
            message,
            created,
        })
    }
}
