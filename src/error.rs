use thiserror::Error;

pub type Result<T> = std::result::Result<T, ContribError>;

#[derive(Error, Debug)]
pub enum ContribError {
    #[error("Malformed commit record{}: {reason}", hash.as_deref().map(|h| format!(" {h}")).unwrap_or_default())]
    MalformedRecord { hash: Option<String>, reason: String },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Repository unavailable: {repository}: {reason}")]
    RepositoryUnavailable { repository: String, reason: String },
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContribError {
    pub fn malformed(hash: Option<&str>, reason: impl Into<String>) -> Self {
        ContribError::MalformedRecord {
            hash: hash.map(str::to_string),
            reason: reason.into(),
        }
    }

    pub fn unavailable(repository: impl Into<String>, reason: impl ToString) -> Self {
        ContribError::RepositoryUnavailable {
            repository: repository.into(),
            reason: reason.to_string(),
        }
    }
}
