//! Three-step interaction logging: type, next state, optional note.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::contact::InteractionKind;
use crate::task::StateChoice;

/// Longest note accepted, in characters.
pub const MAX_NOTE_CHARS: usize = 200;

/// Each step carries only what has been chosen so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogStep {
    PickType,
    PickNextState {
        kind: InteractionKind,
    },
    EnterNote {
        kind: InteractionKind,
        next_state: &'static str,
        note: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutcome {
    Continue,
    Cancel,
    Commit {
        kind: InteractionKind,
        next_state: &'static str,
        note: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFlow {
    pub target: PathBuf,
    pub step: LogStep,
}

impl LogFlow {
    pub fn full(target: PathBuf) -> Self {
        Self {
            target,
            step: LogStep::PickType,
        }
    }

    /// State-only change: starts at step 2 with the [`InteractionKind::Note`] sentinel.
    pub fn state_only(target: PathBuf) -> Self {
        Self {
            target,
            step: LogStep::PickNextState {
                kind: InteractionKind::Note,
            },
        }
    }

    pub fn is_state_only(&self) -> bool {
        match &self.step {
            LogStep::PickType => false,
            LogStep::PickNextState { kind } | LogStep::EnterNote { kind, .. } => {
                *kind == InteractionKind::Note
            }
        }
    }

    /// 1-based step number for the full flow.
    pub fn step_number(&self) -> u8 {
        match self.step {
            LogStep::PickType => 1,
            LogStep::PickNextState { .. } => 2,
            LogStep::EnterNote { .. } => 3,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> LogOutcome {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            return LogOutcome::Cancel;
        }

        let step = std::mem::replace(&mut self.step, LogStep::PickType);
        let (next, outcome) = match step {
            LogStep::PickType => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => (LogStep::PickType, LogOutcome::Cancel),
                KeyCode::Char(c) => match InteractionKind::from_key(c) {
                    Some(kind) => (LogStep::PickNextState { kind }, LogOutcome::Continue),
                    None => (LogStep::PickType, LogOutcome::Continue),
                },
                _ => (LogStep::PickType, LogOutcome::Continue),
            },

            LogStep::PickNextState { kind } => match key.code {
                // From a quick state change this lands on type selection,
                // which continues as a full logging flow.
                KeyCode::Esc => (LogStep::PickType, LogOutcome::Continue),
                KeyCode::Char('q') => (LogStep::PickNextState { kind }, LogOutcome::Cancel),
                KeyCode::Char(c) => match StateChoice::from_key(c) {
                    Some(choice) => (
                        LogStep::EnterNote {
                            kind,
                            next_state: choice.state,
                            note: String::new(),
                        },
                        LogOutcome::Continue,
                    ),
                    None => (LogStep::PickNextState { kind }, LogOutcome::Continue),
                },
                _ => (LogStep::PickNextState { kind }, LogOutcome::Continue),
            },

            LogStep::EnterNote {
                kind,
                next_state,
                mut note,
            } => match key.code {
                KeyCode::Esc => (LogStep::PickNextState { kind }, LogOutcome::Continue),
                KeyCode::Enter => {
                    let outcome = LogOutcome::Commit {
                        kind,
                        next_state,
                        note: Some(note.clone()).filter(|n| !n.is_empty()),
                    };
                    (
                        LogStep::EnterNote {
                            kind,
                            next_state,
                            note,
                        },
                        outcome,
                    )
                }
                KeyCode::Backspace => {
                    note.pop();
                    (
                        LogStep::EnterNote {
                            kind,
                            next_state,
                            note,
                        },
                        LogOutcome::Continue,
                    )
                }
                KeyCode::Char(c) if !ctrl => {
                    if note.chars().count() < MAX_NOTE_CHARS {
                        note.push(c);
                    }
                    (
                        LogStep::EnterNote {
                            kind,
                            next_state,
                            note,
                        },
                        LogOutcome::Continue,
                    )
                }
                _ => (
                    LogStep::EnterNote {
                        kind,
                        next_state,
                        note,
                    },
                    LogOutcome::Continue,
                ),
            },
        };
        self.step = next;
        outcome
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

    fn flow() -> LogFlow {
        LogFlow::full(PathBuf::from("/c/ada__contact.md"))
    }

    #[test]
    fn full_flow_moves_forward_on_valid_keys_only() {
        let mut f = flow();
        assert_eq!(f.handle_key(key('z')), LogOutcome::Continue);
        assert_eq!(f.step, LogStep::PickType);

        f.handle_key(key('p'));
        assert_eq!(
            f.step,
            LogStep::PickNextState {
                kind: InteractionKind::Phone
            }
        );
        f.handle_key(key('f'));
        assert_eq!(f.step_number(), 3);

        for c in "hi".chars() {
            f.handle_key(key(c));
        }
        assert_eq!(
            f.handle_key(code(KeyCode::Enter)),
            LogOutcome::Commit {
                kind: InteractionKind::Phone,
                next_state: "followup",
                note: Some("hi".into()),
            }
        );
    }

    #[test]
    fn escape_walks_back_one_step() {
        let mut f = flow();
        f.handle_key(key('e'));
        f.handle_key(key('o'));
        f.handle_key(key('x'));
        f.handle_key(code(KeyCode::Esc));
        assert_eq!(
            f.step,
            LogStep::PickNextState {
                kind: InteractionKind::Email
            }
        );
        f.handle_key(code(KeyCode::Esc));
        assert_eq!(f.step, LogStep::PickType);
        assert_eq!(f.handle_key(code(KeyCode::Esc)), LogOutcome::Cancel);
    }

    #[test]
    fn note_step_treats_q_as_text_and_ctrl_q_as_cancel() {
        let mut f = flow();
        f.handle_key(key('t'));
        f.handle_key(key('o'));
        assert_eq!(f.handle_key(key('q')), LogOutcome::Continue);
        assert_eq!(
            f.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)),
            LogOutcome::Cancel
        );
    }

    #[test]
    fn empty_note_commits_as_none() {
        let mut f = flow();
        f.handle_key(key('m'));
        f.handle_key(key('o'));
        assert_eq!(
            f.handle_key(code(KeyCode::Enter)),
            LogOutcome::Commit {
                kind: InteractionKind::Meeting,
                next_state: "ok",
                note: None,
            }
        );
    }

    #[test]
    fn note_is_capped() {
        let mut f = flow();
        f.handle_key(key('o'));
        f.handle_key(key('o'));
        for _ in 0..(MAX_NOTE_CHARS + 20) {
            f.handle_key(key('a'));
        }
        match &f.step {
            LogStep::EnterNote { note, .. } => assert_eq!(note.chars().count(), MAX_NOTE_CHARS),
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn state_only_starts_at_step_two_and_escape_goes_to_type_selection() {
        let mut f = LogFlow::state_only(PathBuf::from("/c/ada__contact.md"));
        assert!(f.is_state_only());
        assert_eq!(f.step_number(), 2);
        assert_eq!(f.handle_key(code(KeyCode::Esc)), LogOutcome::Continue);
        assert_eq!(f.step, LogStep::PickType);
        assert!(!f.is_state_only());
        f.handle_key(key('p'));
        assert_eq!(
            f.step,
            LogStep::PickNextState {
                kind: InteractionKind::Phone
            }
        );

        let mut f = LogFlow::state_only(PathBuf::from("/c/ada__contact.md"));
        f.handle_key(key('p'));
        assert!(f.is_state_only());
        f.handle_key(code(KeyCode::Esc));
        assert!(f.is_state_only(), "back from note keeps the sentinel");
    }
}
