//! Lenient serde adapters for hand-edited frontmatter.
//!
//! Files are written by this program, by other Denote tools, and by hand, so
//! decoding accepts the loose shapes YAML allows (null scalars, bare numbers,
//! date-only timestamps) while encoding always writes one canonical form.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone};
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serializer};

use super::{ContactStyle, RelationshipType, Timestamp};

pub fn is_zero(n: &u32) -> bool {
    *n == 0
}

pub fn is_zero_i64(n: &i64) -> bool {
    *n == 0
}

// ── Scalars ─────────────────────────────────────────────────────────────

struct LenientString;

impl<'de> Visitor<'de> for LenientString {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, number, boolean, or null")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<String, D::Error> {
        d.deserialize_any(LenientString)
    }
}

/// Decode any YAML scalar as a string; `null` becomes empty.
pub fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    d.deserialize_any(LenientString)
}

struct LenientTags;

impl<'de> Visitor<'de> for LenientTags {
    type Value = Vec<String>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a list of tags or a whitespace-separated string")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<String>, A::Error> {
        let mut out = Vec::new();
        while let Some(tag) = seq.next_element::<TagItem>()? {
            if !tag.0.is_empty() {
                out.push(tag.0);
            }
        }
        Ok(out)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Vec<String>, E> {
        Ok(v.split_whitespace().map(str::to_string).collect())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Vec<String>, E> {
        Ok(Vec::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<Vec<String>, E> {
        Ok(Vec::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Vec<String>, D::Error> {
        d.deserialize_any(LenientTags)
    }
}

struct TagItem(String);

impl<'de> Deserialize<'de> for TagItem {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        lenient_string(d).map(TagItem)
    }
}

/// Decode a tag list given either as a sequence or a single string.
pub fn lenient_tags<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    d.deserialize_any(LenientTags)
}

// ── Open enums ──────────────────────────────────────────────────────────

/// String-backed enum with a catch-all variant.
pub trait OpenEnum: From<String> {
    fn label(&self) -> &str;
}

impl OpenEnum for RelationshipType {
    fn label(&self) -> &str {
        self.as_str()
    }
}

impl OpenEnum for ContactStyle {
    fn label(&self) -> &str {
        self.as_str()
    }
}

/// `Option<T>` where an empty or missing string means `None`.
pub mod open_enum {
    use super::*;

    pub fn serialize<S: Serializer, T: OpenEnum>(
        value: &Option<T>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_str(v.label()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>, T: OpenEnum>(
        d: D,
    ) -> Result<Option<T>, D::Error> {
        let raw = lenient_string(d)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Ok(None)
        } else {
            Ok(Some(T::from(trimmed.to_string())))
        }
    }
}

// ── Timestamps ──────────────────────────────────────────────────────────

/// Parse the timestamp shapes found in the wild.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f] ±HHMM`, naive date-times
/// (interpreted in the local zone), and bare dates (local midnight).
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f %z", "%Y-%m-%d %H:%M:%S%.f %:z"] {
        if let Ok(ts) = DateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return local(naive);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(local)
}

fn local(naive: NaiveDateTime) -> Option<Timestamp> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
}

/// Canonical on-disk timestamp form.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// `Option<Timestamp>` encoded as an RFC 3339 string.
pub mod timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<Timestamp>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => s.serialize_str(&format_timestamp(ts)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Timestamp>, D::Error> {
        let raw = lenient_string(d)?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("unrecognized timestamp \"{raw}\"")))
    }
}
