//! Denote-style record files: YAML frontmatter between `---` lines, then a
//! free-form markdown body.
//!
//! The header opens on the first line and closes at the next line that is
//! exactly `---`; the body after it is kept verbatim. Saving stamps `updated_at`,
//! generates a `<YYYYMMDD>--<slug>__contact.md` name for new records, and
//! replaces the file atomically via a temp file in the same directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::contact::{Contact, Timestamp};
use crate::error::{RecordError, RecordResult};

/// Line delimiting the frontmatter block.
pub const FRONTMATTER_DELIMITER: &str = "---\n";

const DELIMITER_LINE: &str = "---";

/// Filename marker identifying contact records.
pub const CONTACT_SUFFIX: &str = "__contact.md";

/// Separates the identifier prefix from the title slug in Denote filenames.
pub const IDENTIFIER_SEPARATOR: &str = "--";

/// Split raw text into `(metadata, body)`.
///
/// Only whole `---` lines delimit, so values containing `---` stay in the
/// header. `None` unless the text opens with a delimiter line and has a
/// closing one.
pub fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let rest = text
        .strip_prefix(FRONTMATTER_DELIMITER)
        .or_else(|| text.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == DELIMITER_LINE {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Decode a contact from file text. `path` becomes the record's identity.
pub fn parse_contact(text: &str, path: &Path) -> RecordResult<Contact> {
    let display = path.display().to_string();
    let (metadata, body) = split_frontmatter(text)
        .ok_or_else(|| RecordError::MissingFrontmatter {
            path: display.clone(),
        })?;

    let mut contact: Contact =
        serde_yaml::from_str(metadata).map_err(|e| RecordError::Frontmatter {
            path: display.clone(),
            message: e.to_string(),
        })?;

    if !contact.has_contact_tag() {
        return Err(RecordError::NotAContact { path: display });
    }

    if contact.identifier.is_empty() {
        if let Some(id) = identifier_from_path(path) {
            contact.identifier = id;
        }
    }

    contact.file_path = Some(path.to_path_buf());
    contact.content = body.to_string();
    Ok(contact)
}

/// Read and decode a contact file.
pub fn read_contact(path: &Path) -> RecordResult<Contact> {
    let text = std::fs::read_to_string(path).map_err(|e| RecordError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_contact(&text, path)
}

/// Denote identifier: the filename prefix before the first `--`.
pub fn identifier_from_path(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(".md").unwrap_or(name);
    stem.split_once(IDENTIFIER_SEPARATOR)
        .map(|(id, _)| id.to_string())
}

/// Encode a contact as file text. Does not touch `updated_at`.
pub fn render_contact(contact: &Contact) -> RecordResult<String> {
    let metadata = serde_yaml::to_string(contact).map_err(|e| RecordError::Encode {
        title: contact.title.clone(),
        message: e.to_string(),
    })?;
    Ok(frame(&metadata, &contact.content))
}

/// Wrap encoded metadata and a body in frontmatter delimiters.
pub fn frame(metadata: &str, body: &str) -> String {
    let mut out = String::with_capacity(metadata.len() + body.len() + 8);
    out.push_str(FRONTMATTER_DELIMITER);
    out.push_str(metadata);
    if !metadata.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(FRONTMATTER_DELIMITER);
    out.push_str(body);
    out
}

/// Persist a contact, returning the path written.
///
/// Records without a `file_path` get a generated name inside `dir`; an
/// existing file at that name is never overwritten. `updated_at` is set to
/// `now` on the passed record, and empty tags and labels are removed from it.
pub fn save_contact(contact: &mut Contact, dir: &Path, now: Timestamp) -> RecordResult<PathBuf> {
    let (path, is_new) = match &contact.file_path {
        Some(path) => (path.clone(), false),
        None => {
            let date = contact.date.unwrap_or(now);
            (dir.join(contact_file_name(&contact.title, date)), true)
        }
    };

    // Empty list entries are dropped on read; drop them here so the saved
    // record matches what comes back.
    contact.tags.retain(|t| !t.is_empty());
    contact.related_contact_labels.retain(|l| !l.is_empty());
    contact.updated_at = Some(now);
    contact.file_path = Some(path.clone());
    let text = render_contact(contact)?;

    write_atomic(&path, text.as_bytes(), !is_new).map_err(|e| {
        if e.kind() == std::io::ErrorKind::AlreadyExists {
            RecordError::AlreadyExists {
                path: path.display().to_string(),
            }
        } else {
            RecordError::Write {
                path: path.display().to_string(),
                source: e,
            }
        }
    })?;

    tracing::debug!(path = %path.display(), new = is_new, "contact saved");
    Ok(path)
}

/// `<YYYYMMDD>--<slug>__contact.md`
pub fn contact_file_name(title: &str, date: Timestamp) -> String {
    format!(
        "{}{IDENTIFIER_SEPARATOR}{}{CONTACT_SUFFIX}",
        date.format("%Y%m%d"),
        slugify(title)
    )
}

/// Kebab-case: lowercase, spaces to hyphens, drop everything outside `[a-z0-9-]`.
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Whole-file replace through a sibling temp file.
///
/// With `clobber == false` the rename fails with `AlreadyExists` if the
/// target is present. Existing permissions are carried over.
pub(crate) fn write_atomic(path: &Path, data: &[u8], clobber: bool) -> std::io::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;

    match std::fs::metadata(path) {
        Ok(meta) => tmp.as_file().set_permissions(meta.permissions())?,
        Err(_) => default_permissions(tmp.as_file())?,
    }

    if clobber {
        tmp.persist(path).map_err(|e| e.error)?;
    } else {
        tmp.persist_noclobber(path).map_err(|e| e.error)?;
    }
    Ok(())
}

#[cfg(unix)]
fn default_permissions(file: &std::fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions(_file: &std::fs::File) -> std::io::Result<()> {
    Ok(())
}
