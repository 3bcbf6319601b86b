//! Report files: one JSON document per aggregate view plus a plain-text
//! digest, named after the analysed window.

use crate::cli::{analyze, CommonArgs};
use crate::error::Result;
use crate::model::{ContributionTables, DateWindow, RunReport, TableOutput};
use crate::output::print_skipped;
use crate::util::{file_stamp, month_key};
use anyhow::Context;
use console::style;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

pub fn exec(common: &CommonArgs, output_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let mut overrides = common.overrides();
    overrides.output_dir = output_dir;
    let (config, report) = analyze(common, overrides)?;

    if report.tables.detailed.is_empty() {
        tracing::warn!("No commits found in any repository");
    }

    let written = write_reports(&report, &config.window, &config.output.dir)
        .with_context(|| format!("Failed to write reports to {}", config.output.dir.display()))?;

    println!("{}", style("Generated reports").bold());
    for path in &written {
        println!("  {}", path.display());
    }

    print_skipped(&report);
    Ok(())
}

pub fn report_path(dir: &Path, kind: &str, window: &DateWindow, extension: &str) -> PathBuf {
    dir.join(format!(
        "git_commits_{kind}_{}_{}.{extension}",
        file_stamp(window.start),
        file_stamp(window.end)
    ))
}

fn write_json<T: Serialize + Clone>(path: PathBuf, rows: &[T], window: &DateWindow) -> Result<PathBuf> {
    let output = TableOutput::new(window, rows.to_vec());
    std::fs::write(&path, serde_json::to_string_pretty(&output)?)?;
    Ok(path)
}

/// Writes every report file into `dir`, creating it if needed, and returns
/// the paths written.
pub fn write_reports(report: &RunReport, window: &DateWindow, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let tables = &report.tables;

    let mut written = vec![
        write_json(report_path(dir, "author_summary", window, "json"), &tables.authors, window)?,
        write_json(report_path(dir, "repository_summary", window, "json"), &tables.repositories, window)?,
        write_json(report_path(dir, "daily_activity", window, "json"), &tables.daily, window)?,
        write_json(report_path(dir, "detailed_log", window, "json"), &tables.detailed, window)?,
    ];

    let digest = report_path(dir, "detailed_report", window, "txt");
    std::fs::write(&digest, detailed_report(tables))?;
    written.push(digest);

    Ok(written)
}

fn top_by_commits(counts: HashMap<&str, u64>, n: usize) -> Vec<(&str, u64)> {
    let mut ranked: Vec<(&str, u64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(n);
    ranked
}

/// Plain-text digest: top contributors, monthly activity and repository
/// activity.
pub fn detailed_report(tables: &ContributionTables) -> String {
    let rule = "=".repeat(80);
    let section = "-".repeat(50);
    let mut lines = vec![rule.clone(), "DETAILED CONTRIBUTION REPORT".to_string(), rule, String::new()];

    lines.push("1. TOP 10 CONTRIBUTORS".to_string());
    lines.push(section.clone());
    lines.push(String::new());
    let mut authors: Vec<_> = tables.authors.iter().collect();
    authors.sort_by(|a, b| b.commit_count.cmp(&a.commit_count).then_with(|| a.author.cmp(&b.author)));
    for a in authors.iter().take(10) {
        lines.push(format!("{}:", a.author));
        lines.push(format!("  Commits: {}", a.commit_count));
        lines.push(format!("  Lines Added: {}", a.lines_added));
        lines.push(format!("  Lines Deleted: {}", a.lines_removed));
        lines.push(format!("  Total Lines Modified: {}", a.total_lines));
        lines.push(format!("  Active Days: {}", a.active_days));
        lines.push(String::new());
    }

    lines.push("2. MONTHLY ACTIVITY".to_string());
    lines.push(section.clone());
    lines.push(String::new());
    let mut months: BTreeMap<String, HashMap<&str, u64>> = BTreeMap::new();
    for e in &tables.detailed {
        *months
            .entry(month_key(e.timestamp.date_naive()))
            .or_default()
            .entry(e.resolved_author.as_str())
            .or_insert(0) += 1;
    }
    for (month, counts) in months {
        let total: u64 = counts.values().sum();
        lines.push(format!("{month}:"));
        lines.push(format!("  Total Commits: {total}"));
        lines.push("  Top Contributors:".to_string());
        for (author, commits) in top_by_commits(counts, 3) {
            lines.push(format!("    - {author}: {commits} commits"));
        }
        lines.push(String::new());
    }

    lines.push("3. REPOSITORY ACTIVITY".to_string());
    lines.push(section);
    lines.push(String::new());
    let mut per_repo: HashMap<&str, HashMap<&str, u64>> = HashMap::new();
    for e in &tables.detailed {
        *per_repo
            .entry(e.repository_id.as_str())
            .or_default()
            .entry(e.resolved_author.as_str())
            .or_insert(0) += 1;
    }
    let mut repos: Vec<_> = tables.repositories.iter().collect();
    repos.sort_by(|a, b| b.commit_count.cmp(&a.commit_count).then_with(|| a.repository_id.cmp(&b.repository_id)));
    for r in repos {
        lines.push(format!("{}:", r.repository_id));
        lines.push(format!("  Total Commits: {}", r.commit_count));
        lines.push(format!("  Contributors: {}", r.contributor_count));
        lines.push("  Top Contributors:".to_string());
        let counts = per_repo.remove(r.repository_id.as_str()).unwrap_or_default();
        for (author, commits) in top_by_commits(counts, 2) {
            lines.push(format!("    - {author}: {commits} commits"));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}
