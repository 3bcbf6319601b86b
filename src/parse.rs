//! Commit log parsing.
//!
//! The log is produced with [`LOG_FORMAT`]: every commit starts with a record
//! separator, its metadata fields are unit-separated and end at a group
//! separator, and `--numstat` lines follow until the next commit.

use crate::error::{ContribError, Result};
use crate::model::{FileDelta, ParsedCommit, RawIdentity};
use chrono::{DateTime, FixedOffset};

pub const LOG_FORMAT: &str = "%x1e%H%x1f%an%x1f%ae%x1f%aI%x1f%B%x1d";

const RECORD_START: char = '\u{1e}';
const FIELD_SEP: char = '\u{1f}';
const METADATA_END: char = '\u{1d}';
const METADATA_FIELDS: usize = 5;

/// Splits raw log text into one block per commit.
pub fn split_blocks(text: &str) -> impl Iterator<Item = &str> {
    text.split(RECORD_START).filter(|b| !b.trim().is_empty())
}

pub fn parse_log(text: &str) -> impl Iterator<Item = Result<ParsedCommit>> + '_ {
    split_blocks(text).map(parse_commit)
}

pub fn parse_commit(block: &str) -> Result<ParsedCommit> {
    let (metadata, numstat) = block.split_once(METADATA_END).ok_or_else(|| {
        ContribError::malformed(leading_hash(block), "missing end-of-metadata delimiter")
    })?;

    let fields: Vec<&str> = metadata.splitn(METADATA_FIELDS, FIELD_SEP).collect();
    if fields.len() != METADATA_FIELDS {
        return Err(ContribError::malformed(
            leading_hash(block),
            format!("expected {METADATA_FIELDS} metadata fields, found {}", fields.len()),
        ));
    }

    let hash = fields[0].trim();
    if hash.is_empty() {
        return Err(ContribError::malformed(None, "empty commit hash"));
    }

    let timestamp = parse_timestamp(fields[3].trim())
        .ok_or_else(|| ContribError::malformed(Some(hash), format!("invalid timestamp {:?}", fields[3])))?;

    let mut file_deltas = Vec::new();
    for line in numstat.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        file_deltas.push(parse_numstat(line, hash)?);
    }

    Ok(ParsedCommit {
        hash: hash.to_string(),
        raw_identity: RawIdentity::new(fields[1], fields[2]),
        timestamp,
        message: fields[4].trim_end_matches(['\n', '\r']).to_string(),
        file_deltas,
    })
}

fn parse_numstat(line: &str, hash: &str) -> Result<FileDelta> {
    let mut parts = line.splitn(3, '\t');
    let (added, removed, path) = match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(r), Some(p)) if !p.is_empty() => (a.trim(), r.trim(), p),
        _ => {
            return Err(ContribError::malformed(
                Some(hash),
                format!("numstat line is not `added<TAB>removed<TAB>path`: {line:?}"),
            ))
        }
    };

    if is_binary_marker(added) && is_binary_marker(removed) {
        return Ok(FileDelta {
            path: path.to_string(),
            lines_added: 0,
            lines_removed: 0,
            is_binary: true,
        });
    }

    let count = |field: &str| {
        parse_count(field).ok_or_else(|| {
            ContribError::malformed(Some(hash), format!("invalid line count {field:?} for {path}"))
        })
    };

    Ok(FileDelta {
        path: path.to_string(),
        lines_added: count(added)?,
        lines_removed: count(removed)?,
        is_binary: false,
    })
}

fn is_binary_marker(field: &str) -> bool {
    field == "-" || field.eq_ignore_ascii_case("binary")
}

// Digits only: `u64::from_str` would also take a leading '+'.
fn parse_count(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

fn parse_timestamp(input: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(input)
        .or_else(|_| DateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S %z"))
        .ok()
}

fn leading_hash(block: &str) -> Option<&str> {
    block
        .split([FIELD_SEP, METADATA_END, '\n'])
        .next()
        .map(str::trim)
        .filter(|h| !h.is_empty())
}
