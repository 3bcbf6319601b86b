use crate::config::DiscoveryConfig;
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

fn is_repository(path: &Path) -> bool {
    path.join(".git").exists()
}

/// Finds repositories under the configured search roots.
///
/// A root that is itself a repository is returned as-is. Otherwise the tree is
/// walked for `.git` entries whose repository sits between `min_depth` and
/// `max_depth` levels below the root, skipping paths that contain any of the
/// excluded fragments.
pub fn discover(config: &DiscoveryConfig) -> Vec<PathBuf> {
    let mut found = BTreeSet::new();

    for root in &config.roots {
        if !root.exists() {
            tracing::warn!(root = %root.display(), "Search root does not exist");
            continue;
        }
        if is_repository(root) {
            tracing::info!(repository = %root.display(), "Search root is a repository");
            found.insert(root.clone());
            continue;
        }

        let walker = WalkBuilder::new(root)
            .hidden(false)
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false)
            .max_depth(Some(config.max_depth + 1))
            .filter_entry(|e| e.path().parent().and_then(Path::file_name) != Some(OsStr::new(".git")))
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry under {}: {e}", root.display());
                    continue;
                }
            };
            if entry.file_name() != ".git" {
                continue;
            }
            let Some(repo) = entry.path().parent() else {
                continue;
            };

            let depth = repo.strip_prefix(root).map(|p| p.components().count()).unwrap_or(0);
            if depth < config.min_depth || depth > config.max_depth {
                tracing::debug!(repository = %repo.display(), depth, "Skipping repository outside depth bounds");
                continue;
            }
            let display = repo.to_string_lossy();
            if config.excluded_paths.iter().any(|x| display.contains(x.as_str())) {
                tracing::debug!(repository = %repo.display(), "Skipping excluded path");
                continue;
            }

            tracing::info!(repository = %repo.display(), "Found repository");
            found.insert(repo.to_path_buf());
        }
    }

    found.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn fake_repo(path: &Path) {
        fs::create_dir_all(path.join(".git")).unwrap();
    }

    fn config(roots: Vec<PathBuf>, min_depth: usize, max_depth: usize, excluded: &[&str]) -> DiscoveryConfig {
        DiscoveryConfig {
            roots,
            min_depth,
            max_depth,
            excluded_paths: excluded.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn finds_repositories_within_depth_bounds() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fake_repo(&root.join("api"));
        fake_repo(&root.join("group/web"));
        fake_repo(&root.join("group/deep/nested"));
        fake_repo(&root.join("vendor/lib"));

        let found = discover(&config(vec![root.to_path_buf()], 1, 2, &["vendor"]));
        assert_eq!(found, vec![root.join("api"), root.join("group/web")]);
    }

    #[test]
    fn min_depth_skips_shallow_repositories() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fake_repo(&root.join("api"));
        fake_repo(&root.join("group/web"));

        let found = discover(&config(vec![root.to_path_buf()], 2, 3, &[]));
        assert_eq!(found, vec![root.join("group/web")]);
    }

    #[test]
    fn root_that_is_a_repository_is_used_directly() {
        let dir = tempdir().unwrap();
        fake_repo(dir.path());
        fake_repo(&dir.path().join("sub"));

        let found = discover(&config(vec![dir.path().to_path_buf()], 1, 1, &[]));
        assert_eq!(found, vec![dir.path().to_path_buf()]);
    }

    #[test]
    fn missing_roots_yield_nothing() {
        let dir = tempdir().unwrap();
        let found = discover(&config(vec![dir.path().join("missing")], 0, 1, &[]));
        assert!(found.is_empty());
    }
}
