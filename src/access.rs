//! Effective rights of a user on a paper.
//!
//! Site admins and owners hold every right. Everyone else holds the union of
//! the grants of the active teams they belong to, as already derived into
//! [`User::can_see`] and [`User::can_edit`] on read.

use crate::error::{Error, Result};
use crate::repository::{TeamRepository, UserRepository};
use crate::types::{Access, User};

/// Rights `user` holds on `paper_id`. A zero-value user holds none.
pub fn access_of(user: &User, paper_id: i64) -> Access {
    if !user.exists() {
        return Access::NONE;
    }

    if user.is_admin || user.owns.contains(&paper_id) {
        return Access::ALL;
    }

    let mut access = Access::NONE;
    if user.can_see.contains(&paper_id) {
        access = access.union(Access::SEE);
    }
    if user.can_edit.contains(&paper_id) {
        access = access.union(Access::EDIT);
    }
    access.expand_implied()
}

pub fn resolve(users: &dyn UserRepository, user_id: i64, paper_id: i64) -> Result<Access> {
    let user = users.get(user_id)?;
    Ok(access_of(&user, paper_id))
}

/// Fails with [`Error::Forbidden`] unless the user holds `required` on the paper.
pub fn require(
    users: &dyn UserRepository,
    user_id: i64,
    paper_id: i64,
    required: Access,
) -> Result<()> {
    if !resolve(users, user_id, paper_id)?.has(required) {
        tracing::debug!("User {user_id} lacks {required} on paper {paper_id}");
        return Err(Error::Forbidden);
    }
    Ok(())
}

/// Returns true if the user may change the team's name, roster or grants:
/// site admins and the team's own admins.
pub fn can_manage_team(
    users: &dyn UserRepository,
    teams: &dyn TeamRepository,
    user_id: i64,
    team_id: i64,
) -> Result<bool> {
    let user = users.get(user_id)?;
    if !user.exists() {
        return Ok(false);
    }
    if user.is_admin {
        return Ok(true);
    }

    let team = teams.get(team_id)?;
    if !team.exists() {
        return Err(Error::NotFound);
    }

    Ok(team
        .member(user_id)
        .map(|m| m.is_team_admin)
        .unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use super::*;
    use crate::repository;
    use crate::store::FactStore;
    use crate::types::{Member, Team};

    #[test]
    fn test_access_of_zero_user() {
        assert_eq!(access_of(&User::default(), 1), Access::NONE);
    }

    #[test]
    fn test_access_of_edit_implies_see() {
        let user = User {
            id: 3,
            can_edit: BTreeSet::from([8]),
            ..User::default()
        };
        assert_eq!(access_of(&user, 8), Access::ALL);
        assert_eq!(access_of(&user, 9), Access::NONE);
    }

    #[test]
    fn test_resolve_through_team_grants() {
        let store = FactStore::open_in_memory().unwrap();
        store.initialize().unwrap();
        let (users, teams) = repository::open(Arc::new(store));

        let mut owner = User {
            name: "Owner".to_string(),
            email: "owner@example.com".to_string(),
            owns: BTreeSet::from([1, 2]),
            ..User::default()
        };
        let mut reader = User {
            name: "Reader".to_string(),
            email: "reader@example.com".to_string(),
            ..User::default()
        };
        users.upsert(&mut owner).unwrap();
        users.upsert(&mut reader).unwrap();

        let mut team = Team {
            name: "Journal club".to_string(),
            members: vec![Member::admin(owner.id), Member::member(reader.id)],
            can_see: BTreeSet::from([1, 2]),
            can_edit: BTreeSet::from([2]),
            ..Team::default()
        };
        teams.upsert(&mut team).unwrap();

        assert_eq!(resolve(&users, owner.id, 1).unwrap(), Access::ALL);
        assert_eq!(resolve(&users, reader.id, 1).unwrap(), Access::SEE);
        assert_eq!(resolve(&users, reader.id, 2).unwrap(), Access::ALL);
        assert_eq!(resolve(&users, reader.id, 3).unwrap(), Access::NONE);

        assert!(require(&users, reader.id, 1, Access::SEE).is_ok());
        assert!(matches!(
            require(&users, reader.id, 1, Access::EDIT),
            Err(Error::Forbidden)
        ));

        assert!(can_manage_team(&users, &teams, owner.id, team.id).unwrap());
        assert!(!can_manage_team(&users, &teams, reader.id, team.id).unwrap());

        teams.delete(team.id).unwrap();
        assert_eq!(resolve(&users, reader.id, 2).unwrap(), Access::NONE);
        assert!(matches!(
            can_manage_team(&users, &teams, reader.id, team.id),
            Err(Error::NotFound)
        ));
    }
}
