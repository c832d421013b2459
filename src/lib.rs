// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # kinship
//!
//! A terminal relationship tracker over Denote-style plain-text notes. Each
//! contact is a `*__contact.md` file: YAML frontmatter followed by a markdown
//! journal. Contacts get a cadence from their relationship type; the list
//! shows who is overdue, and moving a contact into an action state writes a
//! companion `__task.md` note.
//!
//! ## Architecture
//!
//! - **Records** (`record`, `repository`): frontmatter codec, atomic saves, lenient directory scan
//! - **Model** (`contact`): contact fields, cadence and health, interaction logging
//! - **Views** (`filter`): search and filters over the loaded collection
//! - **Tasks** (`task`): follow-up notes generated on state transitions
//! - **State machine** (`app`): pure `update(event) -> effects` core and the save worker
//! - **Terminal** (`tui`): ratatui rendering and the crossterm event loop
//!
//! ## Library usage
//!
//! ```no_run
//! use kinship::repository::ContactRepository;
//!
//! let contacts = ContactRepository::new("/home/me/Notes/contacts").scan().unwrap();
//! let now = chrono::Local::now().fixed_offset();
//! for c in contacts.iter().filter(|c| c.is_overdue(now)) {
//!     println!("{} ({} days)", c.title, c.days_since_contact(now));
//! }
//! ```

pub mod app;
pub mod config;
pub mod contact;
pub mod error;
pub mod filter;
pub mod paths;
pub mod record;
pub mod repository;
pub mod task;
pub mod tui;
