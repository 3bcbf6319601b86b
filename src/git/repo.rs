use crate::config::RepositorySpec;
use crate::error::{ContribError, Result};
use crate::parse::LOG_FORMAT;
use crate::pipeline::LogSource;
use gix::{discover, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open the repository containing `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let requested = path.as_ref();
        let name = requested.display().to_string();
        if !requested.exists() {
            return Err(ContribError::unavailable(name, "path does not exist"));
        }

        let repo = discover(requested).map_err(|e| ContribError::unavailable(name, e))?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn has_commits(&self) -> Result<bool> {
        let head = self
            .repo
            .head()
            .map_err(|e| ContribError::unavailable(self.path.display().to_string(), e))?;
        Ok(!head.is_unborn())
    }

    /// Raw `git log --numstat` output for HEAD in the format `parse` expects.
    /// A repository without commits yields an empty log.
    pub fn commit_log(&self, include_merges: bool) -> Result<String> {
        if !self.has_commits()? {
            return Ok(String::new());
        }

        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(&self.path)
            .args(["-c", "core.quotepath=off", "log", "--numstat", "--no-color", "--no-ext-diff"])
            .arg(format!("--format={LOG_FORMAT}"));
        if !include_merges {
            cmd.arg("--no-merges");
        }

        let output = cmd.output().map_err(|e| {
            ContribError::unavailable(self.path.display().to_string(), format!("failed to run git: {e}"))
        })?;
        if !output.status.success() {
            return Err(ContribError::unavailable(
                self.path.display().to_string(),
                String::from_utf8_lossy(&output.stderr).trim(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Reads commit logs from repositories on disk through the `git` binary.
#[derive(Debug, Clone)]
pub struct GitLogSource {
    pub include_merges: bool,
    pub progress: bool,
}

impl GitLogSource {
    pub fn new(include_merges: bool, progress: bool) -> Self {
        Self { include_merges, progress }
    }

    fn spinner(&self, repository: &str) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Reading history of {repository}..."));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

impl LogSource for GitLogSource {
    fn commit_log(&self, repository: &RepositorySpec) -> Result<String> {
        let pb = self.spinner(&repository.id);
        let result = GitRepo::open(&repository.path)
            .and_then(|repo| repo.commit_log(self.include_merges))
            .map_err(|e| match e {
                ContribError::RepositoryUnavailable { reason, .. } => {
                    ContribError::unavailable(repository.id.clone(), reason)
                }
                other => other,
            });
        pb.finish_and_clear();
        result
    }
}
