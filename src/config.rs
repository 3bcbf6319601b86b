//! Run configuration.
//!
//! A TOML file supplies defaults, command-line flags extend or replace them,
//! and [`AnalyzerConfig::build`] validates the result into the immutable
//! settings handed to the pipeline.

use crate::discover::discover;
use crate::error::{ContribError, Result};
use crate::model::DateWindow;
use crate::resolve::{normalize_key, AliasTable, AuthorResolver, ExclusionSet};
use chrono::{DateTime, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub repositories: Vec<PathBuf>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub include_merges: Option<bool>,
    pub excluded_authors: Vec<String>,
    pub aliases: BTreeMap<String, String>,
    pub discovery: DiscoveryConfig,
    pub output: OutputConfig,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config: FileConfig = toml::from_str(&text)?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        Ok(config)
    }

    fn rebase(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        self.repositories.iter_mut().for_each(join);
        self.discovery.roots.iter_mut().for_each(join);
        join(&mut self.output.dir);
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    pub roots: Vec<PathBuf>,
    pub min_depth: usize,
    pub max_depth: usize,
    pub excluded_paths: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            min_depth: 0,
            max_depth: 1,
            excluded_paths: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub top_contributors: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("reports"),
            top_contributors: 20,
        }
    }
}

/// Settings given on the command line; they take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub repositories: Vec<PathBuf>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub aliases: Vec<String>,
    pub excluded_authors: Vec<String>,
    pub no_merges: bool,
    pub output_dir: Option<PathBuf>,
    pub top_contributors: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositorySpec {
    pub id: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub repositories: Vec<RepositorySpec>,
    pub resolver: AuthorResolver,
    pub window: DateWindow,
    pub include_merges: bool,
    pub output: OutputConfig,
}

impl AnalyzerConfig {
    pub fn build(file: FileConfig, overrides: ConfigOverrides, today: NaiveDate) -> Result<Self> {
        let since = overrides
            .since
            .or(file.since)
            .ok_or_else(|| ContribError::Config("No start date: pass --since or set `since`".to_string()))?;
        let start = parse_date_arg(&since, today)?;
        let end = match overrides.until.or(file.until) {
            Some(until) => parse_date_arg(&until, today)?,
            None => today,
        };
        let window = DateWindow::new(start, end)?;

        let cli_aliases = overrides
            .aliases
            .iter()
            .map(|a| parse_alias_arg(a))
            .collect::<Result<Vec<_>>>()?;
        let replaced: HashSet<String> = cli_aliases.iter().map(|(k, _)| normalize_key(k)).collect();
        let aliases = AliasTable::new(
            file.aliases
                .into_iter()
                .filter(|(k, _)| !replaced.contains(&normalize_key(k)))
                .chain(cli_aliases),
        )?;
        let excluded = ExclusionSet::new(file.excluded_authors.iter().chain(&overrides.excluded_authors));

        let mut paths = file.repositories;
        paths.extend(overrides.repositories);
        paths.extend(discover(&file.discovery));
        let mut seen = HashSet::new();
        paths.retain(|p| seen.insert(p.clone()));
        if paths.is_empty() {
            return Err(ContribError::Config(
                "No repositories configured: pass --repo or set `repositories` / `[discovery]`".to_string(),
            ));
        }

        let mut output = file.output;
        if let Some(dir) = overrides.output_dir {
            output.dir = dir;
        }
        if let Some(top) = overrides.top_contributors {
            output.top_contributors = top;
        }

        Ok(Self {
            repositories: assign_ids(paths),
            resolver: AuthorResolver::new(aliases, excluded),
            window,
            include_merges: !overrides.no_merges && file.include_merges.unwrap_or(true),
            output,
        })
    }
}

fn parse_alias_arg(arg: &str) -> Result<(String, String)> {
    arg.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| ContribError::Config(format!("Alias {arg:?} is not of the form KEY=NAME")))
}

fn repository_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            path.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
}

/// Names repositories after their directory; names shared by several paths
/// fall back to the full path so distinct repositories are never merged.
pub fn assign_ids(paths: Vec<PathBuf>) -> Vec<RepositorySpec> {
    let names: Vec<Option<String>> = paths.iter().map(|p| repository_name(p)).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names.iter().flatten() {
        *counts.entry(name.as_str()).or_insert(0) += 1;
    }

    paths
        .iter()
        .zip(&names)
        .map(|(path, name)| {
            let id = match name {
                Some(n) if counts.get(n.as_str()) == Some(&1) => n.clone(),
                _ => path.display().to_string(),
            };
            RepositorySpec { id, path: path.clone() }
        })
        .collect()
}

/// Accepts `YYYY-MM-DD`, RFC3339, `N days|weeks|months ago`, or a humantime
/// duration such as `90days` counted back from `today`.
pub fn parse_date_arg(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.date_naive());
    }

    let days = match parse_natural_days(input) {
        Some((count, per_unit)) => count.checked_mul(per_unit),
        None => match humantime::parse_duration(input) {
            Ok(d) => i64::try_from(d.as_secs() / 86_400).ok(),
            Err(_) => {
                return Err(ContribError::InvalidDate(format!(
                    "'{input}' is not a date (YYYY-MM-DD, RFC3339) or relative duration"
                )))
            }
        },
    };
    days.and_then(Duration::try_days)
        .and_then(|d| today.checked_sub_signed(d))
        .ok_or_else(|| ContribError::InvalidDate(format!("Duration overflow for '{input}'")))
}

/// `N days|weeks|months|years ago` as `(N, days per unit)`.
fn parse_natural_days(input: &str) -> Option<(i64, i64)> {
    let input = input.to_lowercase();
    let rest = input.strip_suffix(" ago")?;
    let (n, unit) = rest.trim().split_once(' ')?;
    let n: u64 = n.trim().parse().ok()?;
    let per_unit = match unit.trim().trim_end_matches('s') {
        "day" => 1,
        "week" => 7,
        "month" => 30,
        "year" => 365,
        _ => return None,
    };
    Some((i64::try_from(n).unwrap_or(i64::MAX), per_unit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawIdentity;
    use pretty_assertions::assert_eq;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn overrides(repos: &[&str], since: &str) -> ConfigOverrides {
        ConfigOverrides {
            repositories: repos.iter().map(PathBuf::from).collect(),
            since: Some(since.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn parses_dates_and_relative_durations() {
        let today = d("2023-03-31");
        assert_eq!(parse_date_arg("2023-01-15", today).unwrap(), d("2023-01-15"));
        assert_eq!(parse_date_arg("2023-01-15T23:00:00-02:00", today).unwrap(), d("2023-01-15"));
        assert_eq!(parse_date_arg("10 days ago", today).unwrap(), d("2023-03-21"));
        assert_eq!(parse_date_arg("2 weeks ago", today).unwrap(), d("2023-03-17"));
        assert_eq!(parse_date_arg("1 month ago", today).unwrap(), d("2023-03-01"));
        assert_eq!(parse_date_arg("30days", today).unwrap(), d("2023-03-01"));
        assert!(matches!(parse_date_arg("whenever", today), Err(ContribError::InvalidDate(_))));
    }

    #[test]
    fn oversized_durations_are_invalid_dates() {
        let today = d("2023-03-31");
        for input in [
            "200000000000000 days ago",
            "9223372036854775807 years ago",
            "18446744073709551615 weeks ago",
            "5000000years",
            "10000000000000000000s",
        ] {
            assert!(
                matches!(parse_date_arg(input, today), Err(ContribError::InvalidDate(_))),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn loads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gcontrib.toml");
        std::fs::write(
            &path,
            r#"
repositories = ["api", "/abs/web"]
since = "2023-01-01"
until = "2023-06-30"
excluded_authors = ["bot@ci.example"]

[aliases]
"jdoe@x.com" = "John Doe"

[output]
top_contributors = 5
"#,
        )
        .unwrap();

        let file = FileConfig::load(&path).unwrap();
        assert_eq!(file.repositories, vec![dir.path().join("api"), PathBuf::from("/abs/web")]);
        assert_eq!(file.aliases.get("jdoe@x.com").map(String::as_str), Some("John Doe"));
        assert_eq!(file.excluded_authors, vec!["bot@ci.example"]);
        assert_eq!(file.output.top_contributors, 5);
        assert_eq!(file.output.dir, dir.path().join("reports"));
        assert_eq!(file.discovery.max_depth, 1);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<FileConfig>("repos = []").is_err());
    }

    #[test]
    fn builds_validated_config() {
        let file = FileConfig {
            until: Some("2023-01-31".into()),
            aliases: BTreeMap::from([("jd".to_string(), "Old Name".to_string())]),
            excluded_authors: vec!["bot@ci".into()],
            ..Default::default()
        };
        let mut o = overrides(&["/src/api", "/src/web", "/src/api"], "2023-01-01");
        o.aliases = vec!["jd=John Doe".into()];
        o.excluded_authors = vec!["ci-user".into()];

        let config = AnalyzerConfig::build(file, o, d("2023-12-31")).unwrap();
        assert_eq!(config.window, DateWindow::new(d("2023-01-01"), d("2023-01-31")).unwrap());
        assert_eq!(
            config.repositories.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["api", "web"]
        );
        assert_eq!(config.resolver.resolve(&RawIdentity::new("jd", "")), "John Doe");
        assert!(config.resolver.is_excluded(&RawIdentity::new("ci-user", "")));
        assert!(config.resolver.is_excluded(&RawIdentity::new("x", "bot@ci")));
        assert!(config.include_merges);
    }

    #[test]
    fn until_defaults_to_today() {
        let config =
            AnalyzerConfig::build(FileConfig::default(), overrides(&["/r"], "2023-01-01"), d("2023-02-01")).unwrap();
        assert_eq!(config.window.end, d("2023-02-01"));
    }

    #[test]
    fn config_errors_are_fatal() {
        let today = d("2023-12-31");

        let inverted = ConfigOverrides {
            until: Some("2022-12-31".into()),
            ..overrides(&["/r"], "2023-01-01")
        };
        assert!(matches!(
            AnalyzerConfig::build(FileConfig::default(), inverted, today),
            Err(ContribError::Config(_))
        ));

        assert!(matches!(
            AnalyzerConfig::build(FileConfig::default(), overrides(&[], "2023-01-01"), today),
            Err(ContribError::Config(_))
        ));

        let empty_alias = ConfigOverrides {
            aliases: vec!["a@x= ".into()],
            ..overrides(&["/r"], "2023-01-01")
        };
        assert!(matches!(
            AnalyzerConfig::build(FileConfig::default(), empty_alias, today),
            Err(ContribError::Config(_))
        ));

        let bad_alias = ConfigOverrides {
            aliases: vec!["no-equals-sign".into()],
            ..overrides(&["/r"], "2023-01-01")
        };
        assert!(matches!(
            AnalyzerConfig::build(FileConfig::default(), bad_alias, today),
            Err(ContribError::Config(_))
        ));

        let no_since = ConfigOverrides {
            since: None,
            ..overrides(&["/r"], "2023-01-01")
        };
        assert!(matches!(
            AnalyzerConfig::build(FileConfig::default(), no_since, today),
            Err(ContribError::Config(_))
        ));
    }

    #[test]
    fn colliding_directory_names_use_full_paths() {
        let specs = assign_ids(vec![
            PathBuf::from("/a/service"),
            PathBuf::from("/b/service"),
            PathBuf::from("/b/tools"),
        ]);
        let ids: Vec<&str> = specs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["/a/service", "/b/service", "tools"]);
    }
}
