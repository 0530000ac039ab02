use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// An identity record. `id == 0` means "no such user".
///
/// `owns` and `bookmarks` are stored. `can_see` and `can_edit` are derived
/// on read from ownership plus the grants of every active team the user
/// belongs to, and are ignored on write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub external_id: String,
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub owns: BTreeSet<i64>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub can_see: BTreeSet<i64>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub can_edit: BTreeSet<i64>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub bookmarks: BTreeSet<i64>,
}

impl User {
    pub fn exists(&self) -> bool {
        self.id != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: i64,
    pub is_team_admin: bool,
}

impl Member {
    pub const fn admin(user_id: i64) -> Self {
        Self {
            user_id,
            is_team_admin: true,
        }
    }

    pub const fn member(user_id: i64) -> Self {
        Self {
            user_id,
            is_team_admin: false,
        }
    }
}

/// A team and the papers it grants to its whole roster. `id == 0` means
/// "no such team" (never created, or soft-deleted).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    /// Ordered by ascending user id on read, not in write order.
    pub members: Vec<Member>,
    pub can_see: BTreeSet<i64>,
    pub can_edit: BTreeSet<i64>,
}

impl Team {
    pub fn exists(&self) -> bool {
        self.id != 0
    }

    pub fn member(&self, user_id: i64) -> Option<&Member> {
        self.members.iter().find(|m| m.user_id == user_id)
    }
}
