use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Grammar violation in a log or a malformed table row.
    #[error("malformed {what} at line {line}: {message}")]
    Parse {
        what: &'static str,
        line: usize,
        message: String,
    },

    /// A branch or shed entry names a bus with no coordinates.
    #[error("missing bus {bus} referenced by {context}")]
    Lookup { bus: usize, context: String },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("render failed: {0}")]
    Render(String),
}

impl Error {
    pub(crate) fn parse(what: &'static str, line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            what,
            line,
            message: message.into(),
        }
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn render(err: impl std::fmt::Display) -> Self {
        Error::Render(err.to_string())
    }
}
