use crate::cli::{analyze, CommonArgs};
use crate::model::{AuthorSeries, DateWindow, DetailedEntry, TimelineOutput, SCHEMA_VERSION};
use crate::output::print_skipped;
use crate::util::{month_key, months_between};
use chrono::Utc;
use console::style;
use std::collections::HashMap;

pub fn exec(common: &CommonArgs, json: bool, top: Option<usize>) -> anyhow::Result<()> {
    let mut overrides = common.overrides();
    overrides.top_contributors = top;
    let (config, report) = analyze(common, overrides)?;

    let output = build_timeline(&report.tables.detailed, &config.window, config.output.top_contributors);
    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        render(&output);
    }

    print_skipped(&report);
    Ok(())
}

pub fn build_timeline(entries: &[DetailedEntry], window: &DateWindow, top_n: usize) -> TimelineOutput {
    let (months, series) = monthly_series(entries, window, top_n);
    TimelineOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        since: window.start,
        until: window.end,
        months,
        series,
    }
}

/// Commits per author per month across every month of the window, keeping
/// the `top_n` most active authors (ties broken by name).
pub fn monthly_series(entries: &[DetailedEntry], window: &DateWindow, top_n: usize) -> (Vec<String>, Vec<AuthorSeries>) {
    let months = months_between(window.start, window.end);
    let index: HashMap<String, usize> = months.iter().cloned().enumerate().map(|(i, m)| (m, i)).collect();

    let mut per_author: HashMap<String, Vec<u64>> = HashMap::new();
    for e in entries {
        let Some(&i) = index.get(&month_key(e.timestamp.date_naive())) else {
            continue;
        };
        per_author
            .entry(e.resolved_author.clone())
            .or_insert_with(|| vec![0; months.len()])[i] += 1;
    }

    let mut series: Vec<AuthorSeries> = per_author
        .into_iter()
        .map(|(author, counts)| AuthorSeries {
            author,
            total: counts.iter().sum(),
            counts,
        })
        .collect();
    series.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.author.cmp(&b.author)));
    series.truncate(top_n);

    (months, series)
}

fn intensity_char(count: u64, max: u64) -> char {
    if count == 0 {
        return '·';
    }
    match ((count as f64 / max.max(1) as f64) * 4.0).ceil() as u32 {
        0 | 1 => '▁',
        2 => '▃',
        3 => '▅',
        _ => '█',
    }
}

pub fn render(output: &TimelineOutput) {
    if output.series.is_empty() {
        println!("No data to display");
        return;
    }

    println!("{}", style("Monthly Contribution Activity").bold());
    if let (Some(first), Some(last)) = (output.months.first(), output.months.last()) {
        println!("{first} .. {last} ({} months)", output.months.len());
    }
    println!("{}", "─".repeat(50));

    let max = output
        .series
        .iter()
        .flat_map(|s| s.counts.iter().copied())
        .max()
        .unwrap_or(1);
    let width = output
        .series
        .iter()
        .map(|s| s.author.chars().count())
        .max()
        .unwrap_or(0)
        .min(30);

    for s in &output.series {
        let strip: String = s.counts.iter().map(|&c| intensity_char(c, max)).collect();
        println!("{:<width$} {} {:>6}", s.author, style(strip).green(), s.total);
    }

    println!("\n{}", style("Legend").bold());
    println!("  {} commits per month, relative to the busiest month ({max})", style("·▁▃▅█").green());
}
