//! Terminal front end.
//!
//! Owns the crossterm event loop and the single event queue. Key presses,
//! resizes, background results and timers all arrive as [`Event`]s and are
//! fed one at a time through [`App::update`]; the effects it returns are
//! executed here, off the loop thread where they touch the disk.

pub mod widgets;

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as TermEvent, KeyEventKind};
use miette::IntoDiagnostic;
use ratatui::DefaultTerminal;

use crate::app::{App, Effect, Event, Worker};
use crate::contact::Timestamp;

/// Current wall-clock time in the local zone.
pub fn now() -> Timestamp {
    chrono::Local::now().fixed_offset()
}

/// TUI runtime: application state plus the effect executor.
pub struct KinshipTui {
    app: App,
    worker: Arc<Worker>,
    tx: mpsc::Sender<Event>,
    rx: mpsc::Receiver<Event>,
    should_quit: bool,
}

impl KinshipTui {
    pub fn new(worker: Worker) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            app: App::default(),
            worker: Arc::new(worker),
            tx,
            rx,
            should_quit: false,
        }
    }

    /// Run until the user quits. The terminal is restored on every exit path.
    pub fn run(mut self) -> miette::Result<()> {
        let mut terminal = ratatui::init();
        let result = self.event_loop(&mut terminal);
        ratatui::restore();
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> miette::Result<()> {
        let (app, effects) = App::new();
        self.app = app;
        self.execute(effects);

        loop {
            while let Ok(event) = self.rx.try_recv() {
                self.step(event);
            }

            terminal
                .draw(|frame| widgets::render(frame, &self.app, now()))
                .into_diagnostic()?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(100)).into_diagnostic()? {
                match event::read().into_diagnostic()? {
                    TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                        self.step(Event::Key(key));
                    }
                    TermEvent::Resize(..) => self.step(Event::Resize),
                    _ => {}
                }
            }
        }
        tracing::info!("exiting");
        Ok(())
    }

    fn step(&mut self, event: Event) {
        let app = std::mem::take(&mut self.app);
        let (app, effects) = app.update(event, now());
        self.app = app;
        self.execute(effects);
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LoadContacts => {
                    let worker = Arc::clone(&self.worker);
                    let tx = self.tx.clone();
                    rayon::spawn(move || {
                        let _ = tx.send(worker.load());
                    });
                }
                Effect::Save(job) => {
                    let worker = Arc::clone(&self.worker);
                    let tx = self.tx.clone();
                    rayon::spawn(move || {
                        let _ = tx.send(worker.save(job, now()));
                    });
                }
                Effect::ClearMessageAfter { generation, delay } => {
                    let tx = self.tx.clone();
                    let spawned = thread::Builder::new()
                        .name("kinship-message-timer".into())
                        .spawn(move || {
                            thread::sleep(delay);
                            let _ = tx.send(Event::ClearMessage(generation));
                        });
                    if let Err(e) = spawned {
                        tracing::warn!(error = %e, "failed to spawn message timer");
                    }
                }
                Effect::Quit => self.should_quit = true,
            }
        }
    }
}
