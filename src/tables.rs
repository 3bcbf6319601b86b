use crate::cli::{analyze, CommonArgs};
use crate::output::{
    output_authors, output_daily, output_json, output_log, output_ndjson, output_repositories, print_skipped,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Authors,
    Repos,
    Daily,
    Log,
}

pub fn exec(common: &CommonArgs, view: View, json: bool, ndjson: bool) -> anyhow::Result<()> {
    let (config, report) = analyze(common, common.overrides())?;
    let tables = &report.tables;
    let window = &config.window;

    match view {
        View::Authors if json => output_json(&tables.authors, window)?,
        View::Authors if ndjson => output_ndjson(&tables.authors)?,
        View::Authors => output_authors(&tables.authors, window),
        View::Repos if json => output_json(&tables.repositories, window)?,
        View::Repos if ndjson => output_ndjson(&tables.repositories)?,
        View::Repos => output_repositories(&tables.repositories, window),
        View::Daily if json => output_json(&tables.daily, window)?,
        View::Daily if ndjson => output_ndjson(&tables.daily)?,
        View::Daily => output_daily(&tables.daily, window),
        View::Log if json => output_json(&tables.detailed, window)?,
        View::Log if ndjson => output_ndjson(&tables.detailed)?,
        View::Log => output_log(&tables.detailed, window),
    }

    print_skipped(&report);
    Ok(())
}
