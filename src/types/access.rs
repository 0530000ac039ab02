use std::fmt;

use serde::{Deserialize, Serialize};

/// Access represents a bitmask of rights a user holds on a paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Access(u32);

impl Access {
    pub const NONE: Access = Access(0);
    pub const SEE: Access = Access(1 << 0); // 1
    pub const EDIT: Access = Access(1 << 1); // 2
    pub const ALL: Access = Access(Self::SEE.0 | Self::EDIT.0);

    /// Returns true if this bitmask contains the required rights.
    #[must_use]
    pub const fn has(self, required: Access) -> bool {
        self.0 & required.0 == required.0
    }

    #[must_use]
    pub const fn union(self, other: Access) -> Access {
        Access(self.0 | other.0)
    }

    /// Expands the bitmask with implied rights: edit implies see.
    #[must_use]
    pub fn expand_implied(self) -> Access {
        if self.has(Self::EDIT) {
            self.union(Self::SEE)
        } else {
            self
        }
    }

    #[must_use]
    pub fn to_strings(self) -> Vec<&'static str> {
        let mut rights = Vec::new();
        if self.has(Self::SEE) {
            rights.push("see");
        }
        if self.has(Self::EDIT) {
            rights.push("edit");
        }
        rights
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "none");
        }
        write!(f, "{}", self.to_strings().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_has() {
        let a = Access::SEE;
        assert!(a.has(Access::SEE));
        assert!(!a.has(Access::EDIT));
        assert!(Access::ALL.has(Access::EDIT));
        assert!(Access::NONE.has(Access::NONE));
    }

    #[test]
    fn test_expand_implied() {
        let expanded = Access::EDIT.expand_implied();
        assert!(expanded.has(Access::SEE));
        assert_eq!(Access::SEE.expand_implied(), Access::SEE);
    }

    #[test]
    fn test_display() {
        assert_eq!(Access::ALL.to_string(), "see, edit");
        assert_eq!(Access::NONE.to_string(), "none");
    }
}
