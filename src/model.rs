use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ContribError, Result};

pub const SCHEMA_VERSION: u32 = 1;

/// Author name and email exactly as git recorded them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawIdentity {
    pub name: String,
    pub email: String,
}

impl RawIdentity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDelta {
    pub path: String,
    pub lines_added: u64,
    pub lines_removed: u64,
    pub is_binary: bool,
}

/// A commit as read from the log, before it is attributed to a repository
/// and a canonical author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommit {
    pub hash: String,
    pub raw_identity: RawIdentity,
    pub timestamp: DateTime<FixedOffset>,
    pub message: String,
    pub file_deltas: Vec<FileDelta>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub hash: String,
    pub repository_id: String,
    pub raw_identity: RawIdentity,
    pub resolved_author: String,
    pub timestamp: DateTime<FixedOffset>,
    pub message: String,
    pub file_deltas: Vec<FileDelta>,
}

impl CommitRecord {
    pub fn from_parsed(parsed: ParsedCommit, repository_id: &str, resolved_author: String) -> Self {
        Self {
            hash: parsed.hash,
            repository_id: repository_id.to_string(),
            raw_identity: parsed.raw_identity,
            resolved_author,
            timestamp: parsed.timestamp,
            message: parsed.message,
            file_deltas: parsed.file_deltas,
        }
    }

    /// Calendar date in the author's own offset.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn lines_added(&self) -> u64 {
        self.file_deltas.iter().map(|d| d.lines_added).sum()
    }

    pub fn lines_removed(&self) -> u64 {
        self.file_deltas.iter().map(|d| d.lines_removed).sum()
    }
}

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ContribError::Config(format!(
                "Invalid date window: start ({start}) is after end ({end})"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub author: String,
    pub commit_count: u64,
    pub lines_added: u64,
    pub lines_removed: u64,
    pub total_lines: u64,
    pub active_days: u64,
    pub first_commit_date: NaiveDate,
    pub last_commit_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub repository_id: String,
    pub commit_count: u64,
    pub contributor_count: u64,
    pub lines_added: u64,
    pub lines_removed: u64,
    pub active_days: u64,
    pub first_commit_date: NaiveDate,
    pub last_commit_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub commit_count: u64,
    pub active_authors: BTreeSet<String>,
    /// Commits per author on this day; the values sum to `commit_count`.
    pub author_commits: BTreeMap<String, u64>,
    pub lines_added: u64,
    pub lines_removed: u64,
    pub affected_files: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedEntry {
    pub repository_id: String,
    pub hash: String,
    pub resolved_author: String,
    pub timestamp: DateTime<FixedOffset>,
    pub message: String,
    pub files_changed: Vec<String>,
    pub lines_added: u64,
    pub lines_removed: u64,
}

/// The four aggregate views of one run, each in its canonical order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionTables {
    pub authors: Vec<AuthorSummary>,
    pub repositories: Vec<RepositorySummary>,
    pub daily: Vec<DailyActivity>,
    pub detailed: Vec<DetailedEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedCommit {
    pub repository_id: String,
    pub hash: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRepository {
    pub repository_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub tables: ContributionTables,
    pub skipped_commits: Vec<SkippedCommit>,
    pub skipped_repositories: Vec<SkippedRepository>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableOutput<T> {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub since: NaiveDate,
    pub until: NaiveDate,
    pub rows: Vec<T>,
}

impl<T> TableOutput<T> {
    pub fn new(window: &DateWindow, rows: Vec<T>) -> Self {
        Self {
            version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            since: window.start,
            until: window.end,
            rows,
        }
    }
}

/// Commits per month for one author; `counts` lines up with
/// `TimelineOutput::months`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSeries {
    pub author: String,
    pub total: u64,
    pub counts: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub since: NaiveDate,
    pub until: NaiveDate,
    pub months: Vec<String>,
    pub series: Vec<AuthorSeries>,
}
