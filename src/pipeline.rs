//! Per-repository processing and the merge into run-wide tables.

use crate::aggregate::Aggregator;
use crate::config::{AnalyzerConfig, RepositorySpec};
use crate::error::{ContribError, Result};
use crate::filter::filter;
use crate::model::{CommitRecord, DateWindow, RunReport, SkippedCommit, SkippedRepository};
use crate::parse::parse_log;
use crate::resolve::AuthorResolver;

/// Supplies the raw commit log of a repository.
pub trait LogSource {
    fn commit_log(&self, repository: &RepositorySpec) -> Result<String>;
}

/// Parses, resolves, filters and aggregates one repository's log. Malformed
/// commits are returned instead of aborting the repository.
pub fn process_repository(
    repository_id: &str,
    log: &str,
    window: &DateWindow,
    resolver: &AuthorResolver,
) -> (Aggregator, Vec<SkippedCommit>) {
    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for parsed in parse_log(log) {
        match parsed {
            Ok(commit) => {
                let author = resolver.resolve(&commit.raw_identity);
                records.push(CommitRecord::from_parsed(commit, repository_id, author));
            }
            Err(ContribError::MalformedRecord { hash, reason }) => {
                tracing::warn!(
                    repository = repository_id,
                    hash = hash.as_deref().unwrap_or("<unknown>"),
                    "Skipping malformed commit: {reason}"
                );
                skipped.push(SkippedCommit {
                    repository_id: repository_id.to_string(),
                    hash,
                    reason,
                });
            }
            Err(other) => {
                tracing::warn!(repository = repository_id, "Skipping unreadable commit: {other}");
                skipped.push(SkippedCommit {
                    repository_id: repository_id.to_string(),
                    hash: None,
                    reason: other.to_string(),
                });
            }
        }
    }

    let (kept, stats) = filter(records, window, resolver);
    tracing::debug!(
        repository = repository_id,
        kept = stats.kept,
        excluded_author = stats.excluded_author,
        outside_window = stats.outside_window,
        "Filtered commits"
    );

    let mut aggregator = Aggregator::new();
    for commit in &kept {
        aggregator.absorb(commit);
    }
    (aggregator, skipped)
}

/// Runs every configured repository in order and merges the results.
/// Unavailable repositories and malformed commits are reported in the
/// returned [`RunReport`]; everything that parsed still reaches the tables.
pub fn run<S: LogSource + ?Sized>(config: &AnalyzerConfig, source: &S) -> RunReport {
    let mut total = Aggregator::new();
    let mut report = RunReport::default();

    for (i, repository) in config.repositories.iter().enumerate() {
        tracing::info!(
            "Processing repository {}/{}: {}",
            i + 1,
            config.repositories.len(),
            repository.id
        );

        let log = match source.commit_log(repository) {
            Ok(log) => log,
            Err(e) => {
                let reason = match e {
                    ContribError::RepositoryUnavailable { reason, .. } => reason,
                    other => other.to_string(),
                };
                tracing::warn!(repository = %repository.id, "Skipping repository: {reason}");
                report.skipped_repositories.push(SkippedRepository {
                    repository_id: repository.id.clone(),
                    reason,
                });
                continue;
            }
        };

        let (aggregator, skipped) = process_repository(&repository.id, &log, &config.window, &config.resolver);
        if aggregator.commit_count() == 0 {
            tracing::info!("No commits found in {}", repository.id);
        } else {
            tracing::info!("Analyzed {}: {} commits", repository.id, aggregator.commit_count());
        }
        total.merge(aggregator);
        report.skipped_commits.extend(skipped);
    }

    report.tables = total.finish();
    report
}
