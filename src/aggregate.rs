//! Folds filtered commits into the author, repository, daily and detailed
//! views.
//!
//! Every accumulator combines with sums, set unions and (through the date
//! sets) min/max, so [`Aggregator::merge`] is associative and commutative and
//! per-repository aggregators can be combined in any order.

use crate::model::{
    AuthorSummary, CommitRecord, ContributionTables, DailyActivity, DetailedEntry, RepositorySummary,
};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, Default)]
struct AuthorAccum {
    commits: u64,
    added: u64,
    removed: u64,
    days: BTreeSet<NaiveDate>,
}

impl AuthorAccum {
    fn merge(&mut self, other: AuthorAccum) {
        self.commits += other.commits;
        self.added += other.added;
        self.removed += other.removed;
        self.days.extend(other.days);
    }
}

#[derive(Debug, Clone, Default)]
struct RepoAccum {
    commits: u64,
    added: u64,
    removed: u64,
    authors: BTreeSet<String>,
    days: BTreeSet<NaiveDate>,
}

impl RepoAccum {
    fn merge(&mut self, other: RepoAccum) {
        self.commits += other.commits;
        self.added += other.added;
        self.removed += other.removed;
        self.authors.extend(other.authors);
        self.days.extend(other.days);
    }
}

#[derive(Debug, Clone, Default)]
struct DayAccum {
    commits: u64,
    added: u64,
    removed: u64,
    authors: BTreeMap<String, u64>,
    files: BTreeSet<String>,
}

impl DayAccum {
    fn merge(&mut self, other: DayAccum) {
        self.commits += other.commits;
        self.added += other.added;
        self.removed += other.removed;
        for (author, commits) in other.authors {
            *self.authors.entry(author).or_insert(0) += commits;
        }
        self.files.extend(other.files);
    }
}

#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    authors: HashMap<String, AuthorAccum>,
    repositories: HashMap<String, RepoAccum>,
    days: HashMap<NaiveDate, DayAccum>,
    detailed: Vec<DetailedEntry>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commit_count(&self) -> usize {
        self.detailed.len()
    }

    pub fn absorb(&mut self, commit: &CommitRecord) {
        let date = commit.date();
        let added = commit.lines_added();
        let removed = commit.lines_removed();

        let author = self.authors.entry(commit.resolved_author.clone()).or_default();
        author.commits += 1;
        author.added += added;
        author.removed += removed;
        author.days.insert(date);

        let repo = self.repositories.entry(commit.repository_id.clone()).or_default();
        repo.commits += 1;
        repo.added += added;
        repo.removed += removed;
        repo.authors.insert(commit.resolved_author.clone());
        repo.days.insert(date);

        let day = self.days.entry(date).or_default();
        day.commits += 1;
        day.added += added;
        day.removed += removed;
        *day.authors.entry(commit.resolved_author.clone()).or_insert(0) += 1;
        day.files.extend(commit.file_deltas.iter().map(|d| d.path.clone()));

        self.detailed.push(DetailedEntry {
            repository_id: commit.repository_id.clone(),
            hash: commit.hash.clone(),
            resolved_author: commit.resolved_author.clone(),
            timestamp: commit.timestamp,
            message: commit.message.clone(),
            files_changed: commit.file_deltas.iter().map(|d| d.path.clone()).collect(),
            lines_added: added,
            lines_removed: removed,
        });
    }

    pub fn merge(&mut self, other: Aggregator) {
        for (name, acc) in other.authors {
            self.authors.entry(name).or_default().merge(acc);
        }
        for (id, acc) in other.repositories {
            self.repositories.entry(id).or_default().merge(acc);
        }
        for (date, acc) in other.days {
            self.days.entry(date).or_default().merge(acc);
        }
        self.detailed.extend(other.detailed);
    }

    pub fn finish(self) -> ContributionTables {
        let mut authors: Vec<AuthorSummary> = self
            .authors
            .into_iter()
            .filter_map(|(author, acc)| {
                let first_commit_date = *acc.days.first()?;
                let last_commit_date = *acc.days.last()?;
                Some(AuthorSummary {
                    author,
                    commit_count: acc.commits,
                    lines_added: acc.added,
                    lines_removed: acc.removed,
                    total_lines: acc.added + acc.removed,
                    active_days: acc.days.len() as u64,
                    first_commit_date,
                    last_commit_date,
                })
            })
            .collect();
        authors.sort_by(|a, b| a.author.cmp(&b.author));

        let mut repositories: Vec<RepositorySummary> = self
            .repositories
            .into_iter()
            .filter_map(|(repository_id, acc)| {
                let first_commit_date = *acc.days.first()?;
                let last_commit_date = *acc.days.last()?;
                Some(RepositorySummary {
                    repository_id,
                    commit_count: acc.commits,
                    contributor_count: acc.authors.len() as u64,
                    lines_added: acc.added,
                    lines_removed: acc.removed,
                    active_days: acc.days.len() as u64,
                    first_commit_date,
                    last_commit_date,
                })
            })
            .collect();
        repositories.sort_by(|a, b| a.repository_id.cmp(&b.repository_id));

        let mut daily: Vec<DailyActivity> = self
            .days
            .into_iter()
            .map(|(date, acc)| DailyActivity {
                date,
                commit_count: acc.commits,
                active_authors: acc.authors.keys().cloned().collect(),
                author_commits: acc.authors,
                lines_added: acc.added,
                lines_removed: acc.removed,
                affected_files: acc.files,
            })
            .collect();
        daily.sort_by_key(|d| d.date);

        let mut detailed = self.detailed;
        detailed.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.hash.cmp(&b.hash))
                .then_with(|| a.repository_id.cmp(&b.repository_id))
        });

        ContributionTables {
            authors,
            repositories,
            daily,
            detailed,
        }
    }
}

pub fn aggregate(commits: &[CommitRecord]) -> ContributionTables {
    let mut aggregator = Aggregator::new();
    for commit in commits {
        aggregator.absorb(commit);
    }
    aggregator.finish()
}
