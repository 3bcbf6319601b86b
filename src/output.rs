use crate::model::{
    AuthorSummary, DailyActivity, DateWindow, DetailedEntry, RepositorySummary, RunReport, TableOutput,
};
use crate::util::short_hash;
use anyhow::Result;
use console::style;
use serde::Serialize;

const MAX_TABLE_ROWS: usize = 50;

pub fn output_json<T: Serialize + Clone>(rows: &[T], window: &DateWindow) -> Result<()> {
    let output = TableOutput::new(window, rows.to_vec());
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn output_ndjson<T: Serialize>(rows: &[T]) -> Result<()> {
    for row in rows {
        println!("{}", serde_json::to_string(row)?);
    }
    Ok(())
}

fn print_window(window: &DateWindow) {
    println!("Commits from {} to {}", window.start, window.end);
}

fn print_remaining(total: usize) {
    if total > MAX_TABLE_ROWS {
        println!("\n... and {} more entries", total - MAX_TABLE_ROWS);
    }
}

pub fn output_authors(rows: &[AuthorSummary], window: &DateWindow) {
    print_window(window);
    println!(
        "{:<30} {:>8} {:>9} {:>9} {:>9} {:>6} {:>10} {:>10}",
        style("Author").bold(),
        style("Commits").bold(),
        style("Added").bold(),
        style("Removed").bold(),
        style("Total").bold(),
        style("Days").bold(),
        style("First").bold(),
        style("Last").bold()
    );
    println!("{}", "─".repeat(100));
    for r in rows.iter().take(MAX_TABLE_ROWS) {
        println!(
            "{:<30} {:>8} {:>9} {:>9} {:>9} {:>6} {:>10} {:>10}",
            r.author,
            r.commit_count,
            style(r.lines_added).green(),
            style(r.lines_removed).red(),
            r.total_lines,
            r.active_days,
            r.first_commit_date,
            r.last_commit_date
        );
    }
    print_remaining(rows.len());
}

pub fn output_repositories(rows: &[RepositorySummary], window: &DateWindow) {
    print_window(window);
    println!(
        "{:<30} {:>8} {:>8} {:>9} {:>9} {:>6} {:>10} {:>10}",
        style("Repository").bold(),
        style("Commits").bold(),
        style("Authors").bold(),
        style("Added").bold(),
        style("Removed").bold(),
        style("Days").bold(),
        style("First").bold(),
        style("Last").bold()
    );
    println!("{}", "─".repeat(100));
    for r in rows.iter().take(MAX_TABLE_ROWS) {
        println!(
            "{:<30} {:>8} {:>8} {:>9} {:>9} {:>6} {:>10} {:>10}",
            r.repository_id,
            r.commit_count,
            r.contributor_count,
            style(r.lines_added).green(),
            style(r.lines_removed).red(),
            r.active_days,
            r.first_commit_date,
            r.last_commit_date
        );
    }
    print_remaining(rows.len());
}

pub fn output_daily(rows: &[DailyActivity], window: &DateWindow) {
    print_window(window);
    println!(
        "{:<10} {:>8} {:>9} {:>9} {:>6}  {}",
        style("Date").bold(),
        style("Commits").bold(),
        style("Added").bold(),
        style("Removed").bold(),
        style("Files").bold(),
        style("Authors").bold()
    );
    println!("{}", "─".repeat(80));
    for r in rows.iter().take(MAX_TABLE_ROWS) {
        let authors: Vec<String> = r
            .author_commits
            .iter()
            .map(|(author, commits)| format!("{author} ({commits})"))
            .collect();
        println!(
            "{:<10} {:>8} {:>9} {:>9} {:>6}  {}",
            r.date,
            r.commit_count,
            style(r.lines_added).green(),
            style(r.lines_removed).red(),
            r.affected_files.len(),
            authors.join(", ")
        );
    }
    print_remaining(rows.len());
}

pub fn output_log(rows: &[DetailedEntry], window: &DateWindow) {
    print_window(window);
    for e in rows.iter().take(MAX_TABLE_ROWS) {
        println!(
            "{} {} {} {} {} {}",
            style(short_hash(&e.hash)).yellow(),
            style(e.timestamp.format("%Y-%m-%d %H:%M")).dim(),
            style(&e.repository_id).cyan(),
            e.resolved_author,
            style(format!("+{}", e.lines_added)).green(),
            style(format!("-{}", e.lines_removed)).red()
        );
        println!("    {}", e.message.lines().next().unwrap_or(""));
    }
    print_remaining(rows.len());
}

/// Lists every commit and repository the run had to skip.
pub fn print_skipped(report: &RunReport) {
    if report.skipped_repositories.is_empty() && report.skipped_commits.is_empty() {
        return;
    }
    eprintln!();
    for r in &report.skipped_repositories {
        eprintln!(
            "{} repository {}: {}",
            style("skipped").yellow().bold(),
            r.repository_id,
            r.reason
        );
    }
    for c in &report.skipped_commits {
        eprintln!(
            "{} commit {} in {}: {}",
            style("skipped").yellow().bold(),
            c.hash.as_deref().unwrap_or("<unknown>"),
            c.repository_id,
            c.reason
        );
    }
    eprintln!(
        "{} repositories and {} commits skipped",
        report.skipped_repositories.len(),
        report.skipped_commits.len()
    );
}
