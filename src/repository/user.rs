use std::collections::BTreeSet;
use std::sync::Arc;

use rusqlite::Connection;

use super::team::ROLES;
use super::{UserRepository, claim, paper_refs};
use crate::error::{Error, Result};
use crate::store::vocab::{
    BOOKMARK, CAN_EDIT, CAN_SEE, DELETED, DELETED_ITEMS, EMAIL, EXTERNAL_ID, IS_ADMIN, NAME, OWNS,
    TRUE,
};
use crate::store::{
    Batch, FactStore, Traversal, decode_bool, decode_id, decode_string, facts_about,
};
use crate::types::{EntityRef, Kind, User};

/// Predicates whose presence makes a user exist.
const SCALARS: [&str; 4] = [NAME, EMAIL, EXTERNAL_ID, IS_ADMIN];

pub struct FactUserRepository {
    store: Arc<FactStore>,
}

impl FactUserRepository {
    pub fn new(store: Arc<FactStore>) -> Self {
        Self { store }
    }
}

/// Assembles a user from one tagged traversal: stored attributes plus the
/// grants of every active team reached through a role edge.
fn load_user(conn: &Connection, id: i64) -> Result<User> {
    if id <= 0 {
        return Ok(User::default());
    }

    let subject = EntityRef::user(id).to_string();
    let mut traversal = Traversal::start(&subject).out(NAME).tag(NAME);
    for predicate in [EMAIL, EXTERNAL_ID, IS_ADMIN, OWNS, BOOKMARK] {
        traversal = traversal.union(Traversal::start(&subject).out(predicate).tag(predicate));
    }
    for role in ROLES {
        for grant in [CAN_SEE, CAN_EDIT] {
            traversal = traversal.union(
                Traversal::start(&subject)
                    .out(role)
                    .except_has(DELETED, DELETED_ITEMS)
                    .out(grant)
                    .tag(grant),
            );
        }
    }

    let hits = traversal.run(conn)?;
    if !hits.iter().any(|hit| SCALARS.contains(&hit.tag.as_str())) {
        return Ok(User::default());
    }

    let mut user = User {
        id,
        ..User::default()
    };
    let mut team_see = BTreeSet::new();
    let mut team_edit = BTreeSet::new();

    for hit in hits {
        match hit.tag.as_str() {
            NAME => user.name = decode_string(&hit.value),
            EMAIL => user.email = decode_string(&hit.value),
            EXTERNAL_ID => user.external_id = decode_string(&hit.value),
            IS_ADMIN => user.is_admin = decode_bool(&hit.value)?,
            OWNS => {
                user.owns.insert(decode_id(&hit.value, Kind::Paper)?);
            }
            BOOKMARK => {
                user.bookmarks.insert(decode_id(&hit.value, Kind::Paper)?);
            }
            CAN_SEE => {
                team_see.insert(decode_id(&hit.value, Kind::Paper)?);
            }
            CAN_EDIT => {
                team_edit.insert(decode_id(&hit.value, Kind::Paper)?);
            }
            _ => {}
        }
    }

    user.can_edit = user.owns.union(&team_edit).copied().collect();
    user.can_see = user
        .can_edit
        .iter()
        .chain(team_see.iter())
        .copied()
        .collect();

    Ok(user)
}

/// Lowest user id holding `value` under `predicate`, or 0.
fn find_by(conn: &Connection, predicate: &str, value: &str) -> Result<i64> {
    if value.is_empty() {
        return Ok(0);
    }

    let holders = Traversal::start(value)
        .in_(predicate)
        .of_kind(Kind::User)
        .values(conn)?;

    let mut lowest = 0;
    for holder in holders {
        let id = decode_id(&holder, Kind::User)?;
        if lowest == 0 || id < lowest {
            lowest = id;
        }
    }
    Ok(lowest)
}

impl UserRepository for FactUserRepository {
    fn get(&self, id: i64) -> Result<User> {
        self.store.read(|conn| load_user(conn, id))
    }

    fn get_by_email(&self, email: &str) -> Result<User> {
        self.store.read(|conn| {
            let id = find_by(conn, EMAIL, email)?;
            load_user(conn, id)
        })
    }

    fn get_by_external_id(&self, token: &str) -> Result<User> {
        self.store.read(|conn| {
            let id = find_by(conn, EXTERNAL_ID, token)?;
            load_user(conn, id)
        })
    }

    fn list(&self) -> Result<Vec<User>> {
        self.store.read(|conn| {
            let ids = Traversal::having(NAME)
                .union(Traversal::having(EMAIL))
                .union(Traversal::having(EXTERNAL_ID))
                .of_kind(Kind::User)
                .values(conn)?
                .iter()
                .map(|value| decode_id(value, Kind::User))
                .collect::<Result<BTreeSet<_>>>()?;

            ids.into_iter().map(|id| load_user(conn, id)).collect()
        })
    }

    fn upsert(&self, user: &mut User) -> Result<()> {
        let id = self.store.write(|tx| {
            let id = claim(tx, Kind::User, user.id)?;

            let holder = find_by(tx, EMAIL, &user.email)?;
            if holder != 0 && holder != id {
                return Err(Error::Conflict(format!(
                    "email '{}' already belongs to user {holder}",
                    user.email
                )));
            }

            let old = load_user(tx, id)?;
            let existed = old.exists();
            let subject = EntityRef::user(id).to_string();

            let mut batch = Batch::default();
            batch.replace_scalar(
                &subject,
                NAME,
                existed.then_some(old.name.as_str()),
                Some(user.name.as_str()),
            );
            batch.replace_scalar(
                &subject,
                EMAIL,
                existed.then_some(old.email.as_str()),
                Some(user.email.as_str()),
            );
            batch.replace_scalar(
                &subject,
                EXTERNAL_ID,
                existed.then_some(old.external_id.as_str()),
                Some(user.external_id.as_str()),
            );
            batch.replace_scalar(
                &subject,
                IS_ADMIN,
                old.is_admin.then_some(TRUE),
                user.is_admin.then_some(TRUE),
            );
            batch.diff_objects(&subject, OWNS, &paper_refs(&old.owns), &paper_refs(&user.owns));
            batch.diff_objects(
                &subject,
                BOOKMARK,
                &paper_refs(&old.bookmarks),
                &paper_refs(&user.bookmarks),
            );
            batch.apply(tx)?;

            Ok(id)
        })?;

        user.id = id;
        Ok(())
    }

    /// Users are hard-deleted: every fact about them goes, including their
    /// team role edges and ownership. Papers they owned become unowned.
    fn delete(&self, id: i64) -> Result<bool> {
        self.store.write(|tx| {
            let facts = facts_about(tx, &EntityRef::user(id).to_string())?;
            if facts.is_empty() {
                return Ok(false);
            }

            let mut batch = Batch::default();
            for fact in facts {
                batch.remove(fact);
            }
            batch.apply(tx)?;

            tracing::info!("Deleted user {id}");
            Ok(true)
        })
    }

    fn paper_owner(&self, paper_id: i64) -> Result<i64> {
        self.store.read(|conn| {
            let owners = Traversal::start(EntityRef::paper(paper_id))
                .in_(OWNS)
                .of_kind(Kind::User)
                .values(conn)?;

            let mut owner = 0;
            for value in owners {
                let id = decode_id(&value, Kind::User)?;
                if owner == 0 || id < owner {
                    owner = id;
                }
            }
            Ok(owner)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{FactTeamRepository, TeamRepository};
    use crate::types::{Member, Team};
    use tempfile::TempDir;

    fn test_store(temp: &TempDir) -> Arc<FactStore> {
        let store = FactStore::open(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        Arc::new(store)
    }

    fn ada() -> User {
        User {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            external_id: "github|1815".to_string(),
            ..User::default()
        }
    }

    #[test]
    fn test_user_crud() {
        let temp = TempDir::new().unwrap();
        let users = FactUserRepository::new(test_store(&temp));

        let mut user = ada();
        users.upsert(&mut user).unwrap();
        assert_eq!(user.id, 1);

        let fetched = users.get(1).unwrap();
        assert_eq!(fetched, user);

        let by_email = users.get_by_email("ada@example.com").unwrap();
        assert_eq!(by_email.id, 1);

        let by_external = users.get_by_external_id("github|1815").unwrap();
        assert_eq!(by_external.id, 1);

        user.name = "Ada Lovelace".to_string();
        users.upsert(&mut user).unwrap();
        assert_eq!(users.get(1).unwrap().name, "Ada Lovelace");

        assert!(users.delete(1).unwrap());
        assert!(!users.get(1).unwrap().exists());
        assert!(!users.delete(1).unwrap());
    }

    #[test]
    fn test_unknown_user_is_zero_value() {
        let temp = TempDir::new().unwrap();
        let users = FactUserRepository::new(test_store(&temp));

        assert_eq!(users.get(42).unwrap(), User::default());
        assert_eq!(users.get_by_email("nobody@example.com").unwrap(), User::default());
        assert_eq!(users.get_by_external_id("").unwrap(), User::default());
    }

    #[test]
    fn test_duplicate_email_conflicts() {
        let temp = TempDir::new().unwrap();
        let users = FactUserRepository::new(test_store(&temp));

        users.upsert(&mut ada()).unwrap();

        let mut impostor = ada();
        impostor.external_id = "github|9".to_string();
        let result = users.upsert(&mut impostor);

        assert!(matches!(result, Err(Error::Conflict(_))));
        assert_eq!(impostor.id, 0);
        assert_eq!(users.list().unwrap().len(), 1);
    }

    #[test]
    fn test_owns_and_bookmarks_diff() {
        let temp = TempDir::new().unwrap();
        let users = FactUserRepository::new(test_store(&temp));

        let mut user = ada();
        user.owns = BTreeSet::from([1, 2]);
        user.bookmarks = BTreeSet::from([7]);
        users.upsert(&mut user).unwrap();

        assert_eq!(users.paper_owner(2).unwrap(), user.id);
        assert_eq!(users.paper_owner(3).unwrap(), 0);

        user.owns = BTreeSet::from([2, 3]);
        user.bookmarks.clear();
        users.upsert(&mut user).unwrap();

        let fetched = users.get(user.id).unwrap();
        assert_eq!(fetched.owns, BTreeSet::from([2, 3]));
        assert!(fetched.bookmarks.is_empty());
        assert_eq!(users.paper_owner(1).unwrap(), 0);
        assert_eq!(users.paper_owner(3).unwrap(), user.id);
    }

    #[test]
    fn test_derived_visibility_ignores_stored_input() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);
        let users = FactUserRepository::new(store.clone());
        let teams = FactTeamRepository::new(store);

        let mut user = ada();
        user.owns = BTreeSet::from([1]);
        user.can_see = BTreeSet::from([99]);
        users.upsert(&mut user).unwrap();

        let mut team = Team {
            name: "Readers".to_string(),
            members: vec![Member::member(user.id)],
            can_see: BTreeSet::from([5, 6]),
            can_edit: BTreeSet::from([6]),
            ..Team::default()
        };
        teams.upsert(&mut team).unwrap();

        let fetched = users.get(user.id).unwrap();
        assert_eq!(fetched.can_see, BTreeSet::from([1, 5, 6]));
        assert_eq!(fetched.can_edit, BTreeSet::from([1, 6]));

        teams.delete(team.id).unwrap();
        let fetched = users.get(user.id).unwrap();
        assert_eq!(fetched.can_see, BTreeSet::from([1]));
        assert_eq!(fetched.can_edit, BTreeSet::from([1]));
    }

    #[test]
    fn test_admin_flag_round_trip() {
        let temp = TempDir::new().unwrap();
        let users = FactUserRepository::new(test_store(&temp));

        let mut user = ada();
        user.is_admin = true;
        users.upsert(&mut user).unwrap();
        assert!(users.get(user.id).unwrap().is_admin);

        user.is_admin = false;
        users.upsert(&mut user).unwrap();
        assert!(!users.get(user.id).unwrap().is_admin);
    }

    #[test]
    fn test_negative_id_is_rejected() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);
        let users = FactUserRepository::new(store.clone());

        let mut user = User { id: -3, ..ada() };
        let result = users.upsert(&mut user);

        assert!(matches!(result, Err(Error::MalformedIdentifier(_))));
        assert_eq!(store.count_facts().unwrap(), 0);
    }
}
