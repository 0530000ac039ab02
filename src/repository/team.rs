use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use rusqlite::Connection;

use super::{TeamRepository, claim, paper_refs};
use crate::error::{Error, Result};
use crate::store::vocab::{
    ADMIN_OF, ALL_TEAMS, CAN_EDIT, CAN_SEE, DELETED, DELETED_ITEMS, HAS, MEMBER_OF, NAME,
};
use crate::store::{Batch, Fact, FactStore, Traversal, decode_id, decode_string, has_fact};
use crate::types::{EntityRef, Kind, Member, Team};

/// Role predicates linking a user to a team. A user holds at most one.
pub(super) const ROLES: [&str; 2] = [ADMIN_OF, MEMBER_OF];

pub struct FactTeamRepository {
    store: Arc<FactStore>,
}

impl FactTeamRepository {
    pub fn new(store: Arc<FactStore>) -> Self {
        Self { store }
    }
}

fn is_deleted(conn: &Connection, id: i64) -> Result<bool> {
    has_fact(
        conn,
        &Fact::new(EntityRef::team(id).to_string(), DELETED, DELETED_ITEMS),
    )
}

fn load_team(conn: &Connection, id: i64) -> Result<Team> {
    if id <= 0 {
        return Ok(Team::default());
    }

    let subject = EntityRef::team(id).to_string();

    let names = Traversal::start(&subject)
        .except_has(DELETED, DELETED_ITEMS)
        .out(NAME)
        .values(conn)?;
    let Some(name) = names.first() else {
        return Ok(Team::default());
    };

    let roster = Traversal::start(&subject)
        .in_(ADMIN_OF)
        .tag(ADMIN_OF)
        .union(Traversal::start(&subject).in_(MEMBER_OF).tag(MEMBER_OF))
        .run(conn)?;

    let mut members: BTreeMap<i64, bool> = BTreeMap::new();
    for hit in roster {
        let user_id = decode_id(&hit.value, Kind::User)?;
        *members.entry(user_id).or_default() |= hit.tag == ADMIN_OF;
    }

    let grants = Traversal::start(&subject)
        .out(CAN_SEE)
        .tag(CAN_SEE)
        .union(Traversal::start(&subject).out(CAN_EDIT).tag(CAN_EDIT))
        .run(conn)?;

    let mut team = Team {
        id,
        name: decode_string(name),
        members: members
            .into_iter()
            .map(|(user_id, is_team_admin)| Member {
                user_id,
                is_team_admin,
            })
            .collect(),
        ..Team::default()
    };

    for hit in grants {
        let paper = decode_id(&hit.value, Kind::Paper)?;
        match hit.tag.as_str() {
            CAN_SEE => team.can_see.insert(paper),
            _ => team.can_edit.insert(paper),
        };
    }

    Ok(team)
}

/// Ids of the active teams `user_id` reaches through either role edge.
fn team_ids_for_user(conn: &Connection, user_id: i64) -> Result<BTreeSet<i64>> {
    let subject = EntityRef::user(user_id).to_string();

    Traversal::start(&subject)
        .out(ADMIN_OF)
        .union(Traversal::start(&subject).out(MEMBER_OF))
        .except_has(DELETED, DELETED_ITEMS)
        .values(conn)?
        .iter()
        .map(|value| decode_id(value, Kind::Team))
        .collect()
}

/// Maps each member's user identifier to the role predicate it holds.
fn roster(team: &Team) -> BTreeMap<String, &'static str> {
    team.members
        .iter()
        .map(|m| {
            let role = if m.is_team_admin { ADMIN_OF } else { MEMBER_OF };
            (EntityRef::user(m.user_id).to_string(), role)
        })
        .collect()
}

fn validate(team: &Team) -> Result<()> {
    let mut seen = BTreeSet::new();
    for member in &team.members {
        if !seen.insert(member.user_id) {
            return Err(Error::DuplicateMember(member.user_id));
        }
    }

    if let Some(&paper) = team.can_edit.difference(&team.can_see).next() {
        return Err(Error::EditWithoutSee(paper));
    }

    Ok(())
}

impl TeamRepository for FactTeamRepository {
    fn get(&self, id: i64) -> Result<Team> {
        self.store.read(|conn| load_team(conn, id))
    }

    fn get_for_user(&self, user_id: i64) -> Result<Vec<Team>> {
        self.store.read(|conn| {
            let mut teams = Vec::new();
            for id in team_ids_for_user(conn, user_id)? {
                let team = load_team(conn, id)?;
                if team.exists() {
                    teams.push(team);
                }
            }
            Ok(teams)
        })
    }

    fn list(&self) -> Result<Vec<Team>> {
        self.store.read(|conn| {
            let ids = Traversal::start(ALL_TEAMS)
                .out(HAS)
                .except_has(DELETED, DELETED_ITEMS)
                .values(conn)?
                .iter()
                .map(|value| decode_id(value, Kind::Team))
                .collect::<Result<BTreeSet<_>>>()?;

            let mut teams = Vec::new();
            for id in ids {
                let team = load_team(conn, id)?;
                if team.exists() {
                    teams.push(team);
                }
            }
            Ok(teams)
        })
    }

    /// Writes the team as one batch diffed against its stored state.
    ///
    /// Upserting the id of a soft-deleted team reads an empty previous
    /// state, writes the new facts on top of whatever the deleted team left
    /// behind, and keeps the deletion marker: reads go on treating the team
    /// as absent.
    fn upsert(&self, team: &mut Team) -> Result<()> {
        validate(team)?;

        let id = self.store.write(|tx| {
            let id = claim(tx, Kind::Team, team.id)?;

            if is_deleted(tx, id)? {
                tracing::warn!("Upserting soft-deleted team {id}; it stays hidden from reads");
            }

            let old = load_team(tx, id)?;
            let subject = EntityRef::team(id).to_string();

            let mut batch = Batch::default();
            batch.replace_scalar(
                &subject,
                NAME,
                old.exists().then_some(old.name.as_str()),
                Some(team.name.as_str()),
            );
            batch.diff_roles(&subject, &ROLES, &roster(&old), &roster(team));
            batch.diff_objects(
                &subject,
                CAN_SEE,
                &paper_refs(&old.can_see),
                &paper_refs(&team.can_see),
            );
            batch.diff_objects(
                &subject,
                CAN_EDIT,
                &paper_refs(&old.can_edit),
                &paper_refs(&team.can_edit),
            );
            batch.add(Fact::new(ALL_TEAMS, HAS, subject.as_str()));
            batch.apply(tx)?;

            Ok(id)
        })?;

        team.id = id;
        Ok(())
    }

    /// Marks the team deleted. Its roster and grants stay stored.
    fn delete(&self, id: i64) -> Result<bool> {
        self.store.write(|tx| {
            if !load_team(tx, id)?.exists() {
                return Ok(false);
            }

            let mut batch = Batch::default();
            batch.add(Fact::new(
                EntityRef::team(id).to_string(),
                DELETED,
                DELETED_ITEMS,
            ));
            batch.apply(tx)?;

            tracing::info!("Soft-deleted team {id}");
            Ok(true)
        })
    }
}
