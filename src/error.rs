use std::{fmt::Display, io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BarErr {
    #[error("Extraction error in {item}: {reason}")]
    Extraction { item: String, reason: String },
    #[error("Feed {feed} has no posts")]
    EmptyFeed { feed: String },
    #[error("Materialization error for {}: {source}", .path.display())]
    Materialization {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Config file {} not valid: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
    #[error("Async runtime error: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("{context}:\n {message}")]
    Context { context: String, message: String },
    #[error("{0}")]
    Other(String),
}

impl BarErr {
    pub fn extraction(item: impl Into<String>, reason: impl Into<String>) -> Self {
        BarErr::Extraction {
            item: item.into(),
            reason: reason.into(),
        }
    }
}

impl From<String> for BarErr {
    fn from(err: String) -> Self {
        BarErr::Other(err)
    }
}

impl From<&str> for BarErr {
    fn from(err: &str) -> Self {
        BarErr::Other(err.to_string())
    }
}

pub trait ContextExt<T> {
    fn with_context<F>(self, context: F) -> Result<T, BarErr>
    where
        F: FnOnce() -> String;
}

impl<T, E: Display> ContextExt<T> for Result<T, E> {
    fn with_context<F>(self, context: F) -> Result<T, BarErr>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| BarErr::Context {
            context: context(),
            message: err.to_string(),
        })
    }
}
