use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// Failures surfaced by the core. Walk-time problems (unlistable
/// directories, unreadable files, bad patterns) are logged or collected by
/// the caller instead of being returned.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid config file: {0}")]
    TomlParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Ignore rules error: {0}")]
    Ignore(#[from] ignore::Error),

    #[error("Invalid pattern: {0}")]
    Glob(String),

    #[error("Git index error: {0}")]
    Git(String),

    #[error("Tokenizer error: {0}")]
    TikToken(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<globset::Error> for AppError {
    fn from(err: globset::Error) -> Self {
        AppError::Glob(err.to_string())
    }
}
