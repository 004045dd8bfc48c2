//! Error types for partbind operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading, merging, or writing chapter files.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML parsing error in {}: {source}", path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Malformed XML in {}: {message}", path.display())]
    MalformedXml { path: PathBuf, message: String },

    #[error("Invalid span id {id:?} in {}", path.display())]
    InvalidSpanId { path: PathBuf, id: String },

    #[error("Span id {id:?} in {} does not fit the 64-bit id range after renumbering", path.display())]
    SpanIdOverflow { path: PathBuf, id: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::MalformedXml {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
