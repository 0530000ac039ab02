//! Predicates and well-known records of the fact layout.

pub const NAME: &str = "name";
pub const EMAIL: &str = "email";
pub const EXTERNAL_ID: &str = "externalID";
pub const IS_ADMIN: &str = "isAdmin";
pub const OWNS: &str = "owns";
pub const BOOKMARK: &str = "bookmark";

pub const MEMBER_OF: &str = "memberOf";
pub const ADMIN_OF: &str = "adminOf";
pub const CAN_SEE: &str = "canSee";
pub const CAN_EDIT: &str = "canEdit";

pub const DELETED: &str = "deleted";
pub const HAS: &str = "has";
pub const VALUE: &str = "value";

/// Sentinel every soft-deleted record points at.
pub const DELETED_ITEMS: &str = "deletedItems";
/// Index record listing every team ever created.
pub const ALL_TEAMS: &str = "allTeams";

pub const MAX_USER_ID: &str = "maxUserID";
pub const MAX_TEAM_ID: &str = "maxTeamID";
pub const MAX_PAPER_ID: &str = "maxPaperID";

pub const TRUE: &str = "true";
