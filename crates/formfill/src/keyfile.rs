//! Keyfile parsing
//!
//! A keyfile maps readable field names to the internal names used inside a
//! PDF template, one field per line:
//!
//! ```text
//! # comment
//! reference_id_number topmostSubform[0].Page1[0].f1_09[0] /Tx
//! is_individual c1_1[0] /Btn
//! ```
//!
//! The first token is the readable name and the last token the type tag.
//! Everything in between is the internal name, which may contain spaces.

use crate::{FillError, Result};
use form_values::FieldType;
use std::collections::HashMap;
use std::path::Path;

/// One parsed keyfile line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyfileEntry {
    pub readable: String,
    pub internal_id: String,
    pub field_type: FieldType,
}

/// Parsed keyfile, looked up by internal name
#[derive(Debug, Clone, Default)]
pub struct Keyfile {
    entries: Vec<KeyfileEntry>,
    by_internal: HashMap<String, usize>,
}

impl Keyfile {
    /// Read and parse a keyfile
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| FillError::KeyfileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let keyfile = Self::parse(&content)?;
        tracing::debug!("Loaded {} keyfile entries from {}", keyfile.len(), path.display());
        Ok(keyfile)
    }

    /// Parse keyfile content
    ///
    /// A later line for the same internal name replaces the earlier one.
    pub fn parse(content: &str) -> Result<Self> {
        let mut keyfile = Self::default();

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let entry = parse_line(line).ok_or_else(|| FillError::MalformedKeyfile {
                line: index + 1,
                content: line.to_string(),
            })?;

            match keyfile.by_internal.get(&entry.internal_id) {
                Some(&existing) => keyfile.entries[existing] = entry,
                None => {
                    keyfile
                        .by_internal
                        .insert(entry.internal_id.clone(), keyfile.entries.len());
                    keyfile.entries.push(entry);
                }
            }
        }

        Ok(keyfile)
    }

    /// Entries in first-seen order of their internal names
    pub fn entries(&self) -> &[KeyfileEntry] {
        &self.entries
    }

    /// Entry for an internal field name
    pub fn lookup(&self, internal_id: &str) -> Option<&KeyfileEntry> {
        self.by_internal
            .get(internal_id)
            .map(|&index| &self.entries[index])
    }

    /// Readable name for an internal field name
    pub fn readable_name(&self, internal_id: &str) -> Option<&str> {
        self.lookup(internal_id).map(|entry| entry.readable.as_str())
    }

    /// Whether any entry uses this readable name
    pub fn contains_readable(&self, readable: &str) -> bool {
        self.entries.iter().any(|entry| entry.readable == readable)
    }

    /// Number of distinct internal names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_line(line: &str) -> Option<KeyfileEntry> {
    let first = line.find(' ')?;
    let last = line.rfind(' ')?;
    if first == last {
        return None;
    }

    let readable = line[..first].trim();
    let internal_id = line[first..last].trim();
    let tag = line[last..].trim();
    if readable.is_empty() || internal_id.is_empty() || !tag.starts_with('/') {
        return None;
    }

    Some(KeyfileEntry {
        readable: readable.to_string(),
        internal_id: internal_id.to_string(),
        field_type: FieldType::from_tag(tag)?,
    })
}
