use thiserror::Error;

use crate::types::Kind;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("not found")]
    NotFound,

    #[error("invalid entity kind: expected {expected}, found '{found}'")]
    InvalidEntityKind { expected: Kind, found: String },

    #[error("malformed identifier: '{0}'")]
    MalformedIdentifier(String),

    #[error("malformed value: '{0}'")]
    MalformedValue(String),

    #[error("{kind} id {id} already allocated")]
    AllocationRace { kind: Kind, id: i64 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("user {0} listed more than once in team roster")]
    DuplicateMember(i64),

    #[error("paper {0} is editable but not visible")]
    EditWithoutSee(i64),

    #[error("forbidden")]
    Forbidden,
}

pub type Result<T> = std::result::Result<T, Error>;
