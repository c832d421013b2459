//! Rich diagnostic error types for kinship.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::paths::PathError;

/// Fatal startup errors returned from `main`.
///
/// Record, scan and task errors never reach this level: the worker turns them
/// into status messages or the blocking error screen.
#[derive(Debug, Error, Diagnostic)]
pub enum KinshipError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Record errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RecordError {
    #[error("failed to read record: {path}")]
    #[diagnostic(
        code(kinship::record::read),
        help("Check that the file exists and that you have read permissions.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid record format in {path}: no frontmatter found")]
    #[diagnostic(
        code(kinship::record::missing_frontmatter),
        help(
            "A record starts with a `---` line, followed by YAML metadata, \
             a closing `---` line, and the free-form body."
        )
    )]
    MissingFrontmatter { path: String },

    #[error("invalid frontmatter in {path}: {message}")]
    #[diagnostic(
        code(kinship::record::frontmatter),
        help("Fix the YAML between the two `---` lines; scalar fields must be plain strings or numbers.")
    )]
    Frontmatter { path: String, message: String },

    #[error("not a contact record: {path} has no \"contact\" tag")]
    #[diagnostic(
        code(kinship::record::not_a_contact),
        help("Add `contact` to the `tags` list if this file describes a contact.")
    )]
    NotAContact { path: String },

    #[error("failed to encode frontmatter for \"{title}\": {message}")]
    #[diagnostic(
        code(kinship::record::encode),
        help("This indicates a field value YAML cannot represent. File a bug report.")
    )]
    Encode { title: String, message: String },

    #[error("a record already exists at {path}")]
    #[diagnostic(
        code(kinship::record::already_exists),
        help("Another contact with the same name was created on the same day. Pick a distinguishing name.")
    )]
    AlreadyExists { path: String },

    #[error("failed to write record: {path}")]
    #[diagnostic(
        code(kinship::record::write),
        help(
            "A filesystem operation failed. Check that the directory exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type RecordResult<T> = std::result::Result<T, RecordError>;

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("contacts directory '{path}' does not exist")]
    #[diagnostic(
        code(kinship::store::not_found),
        help(
            "Create the directory, or point kinship elsewhere with --contacts-dir, \
             KINSHIP_CONTACTS_DIR, or `notes_directory` in config.toml."
        )
    )]
    NotFound { path: String },

    #[error("contacts path '{path}' exists but is not a directory")]
    #[diagnostic(
        code(kinship::store::not_a_directory),
        help("The contacts root must be a directory containing `*__contact.md` files.")
    )]
    NotADirectory { path: String },

    #[error("cannot access contacts directory '{path}'")]
    #[diagnostic(
        code(kinship::store::inaccessible),
        help("Check the permissions on the contacts directory.")
    )]
    Inaccessible {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Task errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TaskError {
    #[error("failed to create tasks directory: {path}")]
    #[diagnostic(
        code(kinship::task::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode task \"{title}\": {message}")]
    #[diagnostic(code(kinship::task::encode))]
    Encode { title: String, message: String },

    #[error("failed to create task file '{file_name}'")]
    #[diagnostic(
        code(kinship::task::write),
        help("A task with the same name may have been created in the same second, or the directory is not writable.")
    )]
    Write {
        file_name: String,
        #[source]
        source: std::io::Error,
    },
}

pub type TaskResult<T> = std::result::Result<T, TaskError>;
