//! Contact collection backed by a directory tree.
//!
//! A scan walks the root recursively, admits files named `*__contact.md`,
//! and parses them in parallel. Files that fail to parse are skipped; only
//! problems with the root itself abort the scan.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::contact::Contact;
use crate::error::{StoreError, StoreResult};
use crate::record::{self, CONTACT_SUFFIX};

/// Directory-backed contact store.
#[derive(Debug, Clone)]
pub struct ContactRepository {
    root: PathBuf,
}

impl ContactRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every contact under the root, sorted by title (case-insensitive).
    pub fn scan(&self) -> StoreResult<Vec<Contact>> {
        self.check_root()?;

        let paths = self.record_paths();
        let total = paths.len();

        let mut contacts: Vec<Contact> = paths
            .par_iter()
            .filter_map(|path| match record::read_contact(path) {
                Ok(contact) => Some(contact),
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping record");
                    None
                }
            })
            .collect();

        sort_by_title(&mut contacts);
        tracing::info!(
            root = %self.root.display(),
            loaded = contacts.len(),
            skipped = total - contacts.len(),
            "contacts scanned"
        );
        Ok(contacts)
    }

    fn check_root(&self) -> StoreResult<()> {
        let display = self.root.display().to_string();
        let meta = std::fs::metadata(&self.root).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound {
                    path: display.clone(),
                }
            } else {
                StoreError::Inaccessible {
                    path: display.clone(),
                    source: e,
                }
            }
        })?;
        if !meta.is_dir() {
            return Err(StoreError::NotADirectory { path: display });
        }
        std::fs::read_dir(&self.root).map_err(|e| StoreError::Inaccessible {
            path: display,
            source: e,
        })?;
        Ok(())
    }

    fn record_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let path = entry.path();
            if is_contact_file_name(path) && path.is_file() {
                paths.push(path.to_path_buf());
            }
        }
        paths
    }
}

/// `*.md` files carrying the contact marker in their name.
pub fn is_contact_file_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.ends_with(".md") && name.contains(CONTACT_SUFFIX))
}

/// Stable case-insensitive title order.
pub fn sort_by_title(contacts: &mut [Contact]) {
    contacts.sort_by_cached_key(|c| c.title.to_lowercase());
}
