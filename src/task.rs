//! Follow-up tasks generated from contact state transitions.
//!
//! The action-state table here is the single source for both the state
//! choices offered by the UI and the states that produce a task. A task is
//! written once per qualifying transition into a separate collection
//! directory and never touched again.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::contact::{Contact, Timestamp};
use crate::error::{TaskError, TaskResult};
use crate::record::{self, IDENTIFIER_SEPARATOR};

/// Filename marker for task records.
pub const TASK_SUFFIX: &str = "__task.md";

/// The default, no-action state.
pub const DEFAULT_STATE: &str = "ok";

// ═══════════════════════════════════════════════════════════════════════
// State table
// ═══════════════════════════════════════════════════════════════════════

/// Contact states that require the user to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionState {
    Followup,
    Ping,
    Scheduled,
    Timeout,
}

impl ActionState {
    pub const ALL: [ActionState; 4] = [Self::Followup, Self::Ping, Self::Scheduled, Self::Timeout];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Followup => "followup",
            Self::Ping => "ping",
            Self::Scheduled => "scheduled",
            Self::Timeout => "timeout",
        }
    }

    /// Recognize an action state; any other string (including `ok`) is `None`.
    pub fn from_state(state: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == state)
    }

    pub fn task_title(&self, name: &str) -> String {
        match self {
            Self::Followup => format!("Follow up with {name}"),
            Self::Ping => format!("Ping {name}"),
            Self::Scheduled => format!("Meeting with {name}"),
            Self::Timeout => format!("Follow up with {name} (no response)"),
        }
    }

    pub fn task_body(&self, name: &str) -> String {
        match self {
            Self::Followup => format!("Follow up with {name} regarding previous conversation."),
            Self::Ping => format!("Send a quick check-in message to {name}."),
            Self::Scheduled => format!("Scheduled meeting or call with {name}."),
            Self::Timeout => {
                format!("{name} has not responded. Consider following up or closing the loop.")
            }
        }
    }
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selectable next state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChoice {
    pub key: char,
    pub state: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

/// Next-state menu, shared by interaction logging and the edit form.
pub const STATE_CHOICES: [StateChoice; 5] = [
    StateChoice {
        key: 'o',
        state: DEFAULT_STATE,
        label: "OK",
        description: "No action needed",
    },
    StateChoice {
        key: 'f',
        state: "followup",
        label: "Follow up",
        description: "Continue the conversation",
    },
    StateChoice {
        key: 'p',
        state: "ping",
        label: "Ping",
        description: "Send a quick check-in",
    },
    StateChoice {
        key: 's',
        state: "scheduled",
        label: "Scheduled",
        description: "Meeting or call is planned",
    },
    StateChoice {
        key: 't',
        state: "timeout",
        label: "Timeout",
        description: "Waiting on a reply that never came",
    },
];

impl StateChoice {
    pub fn from_key(key: char) -> Option<&'static StateChoice> {
        STATE_CHOICES.iter().find(|c| c.key == key)
    }
}

/// The action state a save should produce a task for, if any.
///
/// Only a change of value into an action state qualifies.
pub fn task_trigger(old_state: &str, new_state: &str) -> Option<ActionState> {
    if old_state == new_state {
        return None;
    }
    ActionState::from_state(new_state)
}

// ═══════════════════════════════════════════════════════════════════════
// Task records
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
struct TaskRecord<'a> {
    title: &'a str,
    date: String,
    tags: Vec<String>,
    identifier: &'a str,
    index_id: i64,
    #[serde(rename = "type")]
    kind: &'static str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    contact_id: &'a str,
}

/// Writes task records into the task collection directory.
#[derive(Debug, Clone)]
pub struct TaskWriter {
    dir: PathBuf,
}

impl TaskWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the task for `action`, returning its path.
    pub fn create(&self, contact: &Contact, action: ActionState, now: Timestamp) -> TaskResult<PathBuf> {
        std::fs::create_dir_all(&self.dir).map_err(|e| TaskError::CreateDir {
            path: self.dir.display().to_string(),
            source: e,
        })?;

        let title = action.task_title(&contact.title);
        let identifier = now.format("%Y%m%dT%H%M%S").to_string();
        let task = TaskRecord {
            title: &title,
            date: now.format("%Y-%m-%d").to_string(),
            tags: vec!["task".to_string(), format!("contact-{action}")],
            identifier: &identifier,
            index_id: now.timestamp().rem_euclid(100_000),
            kind: "task",
            status: "open",
            label: Some(contact.label.as_str()).filter(|l| !l.is_empty()),
            contact_id: &contact.identifier,
        };
        let metadata = serde_yaml::to_string(&task).map_err(|e| TaskError::Encode {
            title: title.clone(),
            message: e.to_string(),
        })?;
        let body = format!("\n{}\n", action.task_body(&contact.title));
        let text = record::frame(&metadata, &body);

        let file_name = format!(
            "{identifier}{IDENTIFIER_SEPARATOR}{}{TASK_SUFFIX}",
            record::slugify(&title)
        );
        let path = self.dir.join(&file_name);
        record::write_atomic(&path, text.as_bytes(), false)
            .map_err(|e| TaskError::Write { file_name, source: e })?;

        tracing::info!(path = %path.display(), contact = %contact.title, state = %action, "task created");
        Ok(path)
    }

    /// Create a task if the `old_state -> contact.state` change calls for one.
    pub fn on_transition(
        &self,
        contact: &Contact,
        old_state: &str,
        now: Timestamp,
    ) -> TaskResult<Option<PathBuf>> {
        match task_trigger(old_state, &contact.state) {
            Some(action) => self.create(contact, action, now).map(Some),
            None => Ok(None),
        }
    }
}
