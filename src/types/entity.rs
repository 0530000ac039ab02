use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Kind of entity addressed by a structured identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    User,
    Team,
    Paper,
}

impl Kind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Kind::User => "user",
            Kind::Team => "team",
            Kind::Paper => "paper",
        }
    }

    pub fn parse(s: &str) -> Option<Kind> {
        match s {
            "user" => Some(Kind::User),
            "team" => Some(Kind::Team),
            "paper" => Some(Kind::Paper),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `<kind>:<id>` identifier addressing one entity record in the fact store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityRef {
    pub kind: Kind,
    pub id: i64,
}

impl EntityRef {
    pub const fn new(kind: Kind, id: i64) -> Self {
        Self { kind, id }
    }

    pub const fn user(id: i64) -> Self {
        Self::new(Kind::User, id)
    }

    pub const fn team(id: i64) -> Self {
        Self::new(Kind::Team, id)
    }

    pub const fn paper(id: i64) -> Self {
        Self::new(Kind::Paper, id)
    }

    /// Parses a structured identifier, requiring it to be of the `expected` kind.
    pub fn parse_as(token: &str, expected: Kind) -> Result<Self> {
        let (kind, id) = token
            .split_once(':')
            .ok_or_else(|| Error::MalformedIdentifier(token.to_string()))?;

        if Kind::parse(kind) != Some(expected) {
            return Err(Error::InvalidEntityKind {
                expected,
                found: kind.to_string(),
            });
        }

        let id = id
            .parse::<i64>()
            .map_err(|_| Error::MalformedIdentifier(token.to_string()))?;

        Ok(Self::new(expected, id))
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
