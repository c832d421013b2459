//! End-to-end workflows: key events drive the state machine, the worker
//! performs the effects against a real directory.

use std::path::Path;

use chrono::DateTime;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tempfile::TempDir;

use kinship::app::{App, Effect, Event, Screen, Worker};
use kinship::contact::Timestamp;
use kinship::record;

fn now() -> Timestamp {
    DateTime::parse_from_rfc3339("2024-06-01T09:00:00+00:00").unwrap()
}

fn chars(s: &str) -> Vec<Event> {
    s.chars()
        .map(|c| Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)))
        .collect()
}

fn enter() -> Event {
    Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
}

/// Feed events, running load and save effects synchronously on the worker.
fn drive(mut app: App, worker: &Worker, events: Vec<Event>) -> App {
    let mut queue: std::collections::VecDeque<Event> = events.into();
    while let Some(event) = queue.pop_front() {
        let (next, effects) = app.update(event, now());
        app = next;
        for effect in effects {
            match effect {
                Effect::LoadContacts => queue.push_front(worker.load()),
                Effect::Save(job) => queue.push_front(worker.save(job, now())),
                Effect::ClearMessageAfter { .. } | Effect::Quit => {}
            }
        }
    }
    app
}

struct Fixture {
    contacts: TempDir,
    tasks: TempDir,
    worker: Worker,
}

fn fixture() -> Fixture {
    let contacts = TempDir::new().unwrap();
    let tasks = TempDir::new().unwrap();
    let worker = Worker::new(contacts.path(), tasks.path().join("tasks"));
    Fixture {
        contacts,
        tasks,
        worker,
    }
}

fn started(fx: &Fixture) -> App {
    let (app, effects) = App::new();
    assert_eq!(effects, vec![Effect::LoadContacts]);
    drive(app, &fx.worker, vec![Event::ContactsLoaded(Vec::new())])
}

fn task_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

#[test]
fn create_then_log_interaction_writes_record_and_task() {
    let fx = fixture();
    let app = started(&fx);

    // Create "Jane Doe" through the form.
    let mut events = chars("cn");
    events.extend(chars("Jane Doe"));
    events.push(enter());
    events.extend(chars("q"));
    let app = drive(app, &fx.worker, events);

    let path = fx.contacts.path().join("20240601--jane-doe__contact.md");
    assert!(path.exists());
    assert_eq!(app.message.as_deref(), Some("Created Jane Doe"));
    assert_eq!(app.screen, Screen::List(kinship::app::ListMode::Browse));
    assert_eq!(app.contacts.len(), 1);

    // Log a phone call, move to followup, with a note.
    let mut events = chars("dpf");
    events.extend(chars("talked about the move"));
    events.push(enter());
    let app = drive(app, &fx.worker, events);

    let message = app.message.clone().unwrap();
    assert!(message.starts_with("Logged phone interaction with Jane Doe"), "{message}");
    assert!(message.ends_with("[task created]"), "{message}");
    assert_eq!(task_count(&fx.tasks.path().join("tasks")), 1);

    let saved = record::read_contact(&path).unwrap();
    assert_eq!(saved.state, "followup");
    assert_eq!(saved.last_contacted, Some(now()));
    assert_eq!(saved.last_interaction_type, "phone");
    assert!(saved.content.contains("talked about the move"));
    assert_eq!(app.contacts.selected().map(|c| c.state.as_str()), Some("followup"));
}

#[test]
fn repeating_the_same_state_does_not_duplicate_tasks() {
    let fx = fixture();
    let app = started(&fx);

    let mut events = chars("cn");
    events.extend(chars("Sam"));
    events.push(enter());
    events.extend(chars("q"));
    events.extend(chars("sf"));
    events.push(enter());
    let app = drive(app, &fx.worker, events);
    assert_eq!(task_count(&fx.tasks.path().join("tasks")), 1);

    let app = drive(app, &fx.worker, {
        let mut again = chars("sf");
        again.push(enter());
        again
    });
    assert_eq!(task_count(&fx.tasks.path().join("tasks")), 1);
    assert_eq!(
        app.message.as_deref(),
        Some("Logged note interaction with Sam (→ followup)")
    );

    let saved = record::read_contact(&fx.contacts.path().join("20240601--sam__contact.md")).unwrap();
    assert_eq!(saved.last_contacted, Some(now()));
    assert_eq!(saved.last_interaction_type, "note");
}

#[test]
fn bump_persists_review_counter() {
    let fx = fixture();
    let app = started(&fx);

    let mut events = chars("cn");
    events.extend(chars("Kim"));
    events.push(enter());
    events.extend(chars("qbb"));
    let app = drive(app, &fx.worker, events);

    assert_eq!(app.message.as_deref(), Some("Bumped Kim (review #2)"));
    let saved = record::read_contact(&fx.contacts.path().join("20240601--kim__contact.md")).unwrap();
    assert_eq!(saved.bump_count, 2);
    assert_eq!(saved.last_bump_date, Some(now()));
    assert_eq!(saved.last_contacted, None);
}

#[test]
fn missing_directory_is_fatal() {
    let fx = fixture();
    let worker = Worker::new(fx.contacts.path().join("absent"), fx.tasks.path());
    let (app, _) = App::new();
    let app = drive(app, &worker, vec![worker.load()]);
    assert!(app.fatal.is_some());

    let (_, effects) = app.update(chars("q").remove(0), now());
    assert_eq!(effects, vec![Effect::Quit]);
}
