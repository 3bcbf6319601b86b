use chrono::NaiveDate;
use gcontrib::aggregate::{aggregate, Aggregator};
use gcontrib::config::{assign_ids, AnalyzerConfig, OutputConfig, RepositorySpec};
use gcontrib::error::{ContribError, Result};
use gcontrib::model::{CommitRecord, DateWindow};
use gcontrib::parse::parse_log;
use gcontrib::pipeline::{run, LogSource};
use gcontrib::resolve::{AliasTable, AuthorResolver, ExclusionSet};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::path::PathBuf;

struct MemorySource(HashMap<String, String>);

impl LogSource for MemorySource {
    fn commit_log(&self, repository: &RepositorySpec) -> Result<String> {
        self.0
            .get(&repository.id)
            .cloned()
            .ok_or_else(|| ContribError::unavailable(repository.id.clone(), "missing"))
    }
}

fn block(hash: &str, name: &str, email: &str, ts: &str, numstat: &str) -> String {
    format!("\u{1e}{hash}\u{1f}{name}\u{1f}{email}\u{1f}{ts}\u{1f}subject {hash}\n\u{1d}\n{numstat}")
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn config(repos: &[&str], since: &str, until: &str, aliases: &[(&str, &str)], excluded: &[&str]) -> AnalyzerConfig {
    AnalyzerConfig {
        repositories: assign_ids(repos.iter().map(|r| PathBuf::from(format!("/work/{r}"))).collect()),
        resolver: AuthorResolver::new(
            AliasTable::new(aliases.iter().copied()).unwrap(),
            ExclusionSet::new(excluded.iter().copied()),
        ),
        window: DateWindow::new(date(since), date(until)).unwrap(),
        include_merges: true,
        output: OutputConfig::default(),
    }
}

fn mixed_history() -> MemorySource {
    let api = [
        block("a1", "J. Doe", "jdoe@x.com", "2023-01-02T09:00:00+01:00", "10\t2\tsrc/lib.rs\n3\t0\tREADME.md\n"),
        block("a2", "Ann", "ann@x.com", "2023-01-02T18:00:00Z", "-\t-\tlogo.png\n"),
        block("a3", "Renovate", "bot@renovate", "2023-01-03T08:00:00Z", "500\t500\tCargo.lock\n"),
        block("a4", "Ann", "ann@x.com", "2023-01-09T12:00:00Z", "1\t1\tsrc/lib.rs\n"),
    ]
    .concat();
    let web = [
        block("w1", "John Doe", "JDoe@X.com", "2023-01-02T23:30:00-05:00", "7\t0\tindex.html\n"),
        block("w2", "Ann", "ann@x.com", "2023-01-20T10:00:00Z", "0\t4\tsrc/lib.rs\n"),
        block("w3", "Ann", "ann@x.com", "2023-02-01T10:00:00Z", "1\t0\tlate.txt\n"),
    ]
    .concat();
    MemorySource(HashMap::from([("api".to_string(), api), ("web".to_string(), web)]))
}

#[test]
fn views_agree_on_totals() {
    let report = run(
        &config(&["api", "web"], "2023-01-01", "2023-01-31", &[("jdoe@x.com", "John Doe")], &["bot@renovate"]),
        &mixed_history(),
    );
    let t = &report.tables;

    let commits = t.detailed.len() as u64;
    assert_eq!(commits, 5);
    assert_eq!(t.authors.iter().map(|a| a.commit_count).sum::<u64>(), commits);
    assert_eq!(t.repositories.iter().map(|r| r.commit_count).sum::<u64>(), commits);
    assert_eq!(t.daily.iter().map(|d| d.commit_count).sum::<u64>(), commits);

    let added: u64 = t.detailed.iter().map(|e| e.lines_added).sum();
    let removed: u64 = t.detailed.iter().map(|e| e.lines_removed).sum();
    assert_eq!(t.authors.iter().map(|a| a.lines_added).sum::<u64>(), added);
    assert_eq!(t.repositories.iter().map(|r| r.lines_removed).sum::<u64>(), removed);
    assert_eq!(t.daily.iter().map(|d| d.lines_added).sum::<u64>(), added);

    for a in &t.authors {
        assert!(a.active_days >= 1 && a.active_days <= a.commit_count);
        assert!(a.first_commit_date <= a.last_commit_date);
        assert_eq!(a.total_lines, a.lines_added + a.lines_removed);

        let daily_commits: u64 = t
            .daily
            .iter()
            .filter_map(|d| d.author_commits.get(&a.author))
            .sum();
        assert_eq!(daily_commits, a.commit_count, "daily commits for {}", a.author);
    }
    for d in &t.daily {
        assert_eq!(d.author_commits.values().sum::<u64>(), d.commit_count);
    }
    for r in &t.repositories {
        assert!(r.contributor_count >= 1 && r.contributor_count <= r.commit_count);
    }
}

#[test]
fn excluded_authors_leave_no_trace() {
    let report = run(
        &config(&["api", "web"], "2023-01-01", "2023-01-31", &[], &["bot@renovate"]),
        &mixed_history(),
    );
    let t = &report.tables;
    assert!(t.authors.iter().all(|a| a.author != "Renovate"));
    assert!(t.detailed.iter().all(|e| e.hash != "a3"));
    assert!(t.daily.iter().all(|d| !d.affected_files.contains("Cargo.lock")));
    assert!(t.daily.iter().all(|d| !d.active_authors.contains("Renovate")));
    assert_eq!(t.daily.iter().map(|d| d.lines_added).sum::<u64>(), 21);
}

#[test]
fn aliases_unify_identities_across_repositories() {
    let report = run(
        &config(&["api", "web"], "2023-01-01", "2023-01-31", &[("jdoe@x.com", "John Doe")], &["bot@renovate"]),
        &mixed_history(),
    );
    let john = report
        .tables
        .authors
        .iter()
        .find(|a| a.author == "John Doe")
        .unwrap();
    assert_eq!(john.commit_count, 2);
    assert_eq!(john.lines_added, 20);
    assert_eq!(john.active_days, 1);
    assert!(report.tables.authors.iter().all(|a| a.author != "J. Doe"));
}

#[test]
fn author_local_dates_drive_daily_buckets() {
    let report = run(&config(&["web"], "2023-01-01", "2023-01-31", &[], &[]), &mixed_history());
    let days: Vec<NaiveDate> = report.tables.daily.iter().map(|d| d.date).collect();
    assert_eq!(days, vec![date("2023-01-02"), date("2023-01-20")]);
}

#[test]
fn window_is_inclusive_on_both_ends() {
    let log = [
        block("d0", "Ann", "ann@x.com", "2022-12-31T12:00:00Z", "1\t0\ta\n"),
        block("d1", "Ann", "ann@x.com", "2023-01-01T00:00:00Z", "1\t0\ta\n"),
        block("d3", "Ann", "ann@x.com", "2023-01-03T23:59:59Z", "1\t0\ta\n"),
        block("d4", "Ann", "ann@x.com", "2023-01-04T00:00:00Z", "1\t0\ta\n"),
    ]
    .concat();
    let source = MemorySource(HashMap::from([("api".to_string(), log)]));

    let report = run(&config(&["api"], "2023-01-01", "2023-01-03", &[], &[]), &source);
    let hashes: Vec<&str> = report.tables.detailed.iter().map(|e| e.hash.as_str()).collect();
    assert_eq!(hashes, vec!["d1", "d3"]);
}

#[test]
fn runs_are_repeatable_and_order_independent() {
    let cfg = config(&["api", "web"], "2023-01-01", "2023-01-31", &[("jdoe@x.com", "John Doe")], &[]);
    let first = run(&cfg, &mixed_history());
    let second = run(&cfg, &mixed_history());
    assert_eq!(first.tables, second.tables);

    let reversed = config(&["web", "api"], "2023-01-01", "2023-01-31", &[("jdoe@x.com", "John Doe")], &[]);
    assert_eq!(run(&reversed, &mixed_history()).tables, first.tables);
}

#[test]
fn unavailable_repositories_do_not_stop_the_run() {
    let report = run(
        &config(&["api", "gone", "web"], "2023-01-01", "2023-01-31", &[], &[]),
        &mixed_history(),
    );
    assert_eq!(report.skipped_repositories.len(), 1);
    assert_eq!(report.skipped_repositories[0].repository_id, "gone");
    assert_eq!(report.tables.repositories.len(), 2);
}

#[test]
fn aggregator_merge_matches_single_pass() {
    let history = mixed_history();
    let mut records: Vec<CommitRecord> = Vec::new();
    for repo in ["api", "web"] {
        for parsed in parse_log(&history.0[repo]) {
            let parsed = parsed.unwrap();
            let author = parsed.raw_identity.name.clone();
            records.push(CommitRecord::from_parsed(parsed, repo, author));
        }
    }
    let (left, right) = records.split_at(3);

    let mut a = Aggregator::new();
    left.iter().for_each(|c| a.absorb(c));
    let mut b = Aggregator::new();
    right.iter().for_each(|c| b.absorb(c));
    b.merge(a);

    assert_eq!(b.finish(), aggregate(&records));
}
