//! Domain-specific errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::model::EntryId;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("unknown classpath entry kind `{0}`")]
    UnknownKind(String),
    #[error("entry `{0}` is not part of the classpath tree")]
    UnknownEntry(EntryId),
    #[error("entry `{0}` belongs to the default classpath and cannot be removed")]
    NotRemovable(EntryId),
}

/// Failures reading or writing the launch configuration store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read launch configuration {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write launch configuration {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("launch configuration {path} is not valid JSON")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize launch configuration")]
    Serialize(#[source] serde_json::Error),
    #[error("attribute `{name}` holds a {found} value, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("launch configuration store unavailable: {0}")]
    Unavailable(String),
}

/// Failures computing the default classpath or decoding stored entries.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("invalid classpath entry descriptor `{memento}`")]
    InvalidMemento {
        memento: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode classpath entry `{id}`")]
    Encode {
        id: EntryId,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot compute default classpath")]
    Store(#[from] PersistenceError),
}

/// Problems that make a launch classpath unusable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("illegal project name `{name}`: {reason}")]
    InvalidProjectName { name: String, reason: &'static str },
    #[error("project `{0}` does not exist")]
    ProjectNotFound(String),
    #[error("project `{0}` is closed")]
    ProjectClosed(String),
    #[error("invalid runtime classpath: archive `{0}` is not an absolute path")]
    RelativeArchive(String),
    #[error("project entry `{0}` is missing or closed")]
    InaccessibleProject(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("classpath cannot be applied: {0}")]
    Blocked(String),
}
