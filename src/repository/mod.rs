mod team;
mod user;

pub use team::FactTeamRepository;
pub use user::FactUserRepository;

use std::collections::BTreeSet;
use std::sync::Arc;

use rusqlite::Transaction;

use crate::error::{Error, Result};
use crate::store::{FactStore, facts_about, increment, reserve};
use crate::types::{EntityRef, Kind, Team, User};

/// Identity records consumed by the service layer.
///
/// Reads never fail for a missing record: they return a zero-value [`User`]
/// whose `id` is 0, and callers translate that into "not found".
pub trait UserRepository: Send + Sync {
    fn get(&self, id: i64) -> Result<User>;
    fn get_by_email(&self, email: &str) -> Result<User>;
    fn get_by_external_id(&self, token: &str) -> Result<User>;
    fn list(&self) -> Result<Vec<User>>;
    /// Creates the user when `user.id == 0` (assigning the new id) or
    /// writes it under the given id otherwise, in one atomic commit. An
    /// explicit id above the counter raises the counter past it.
    fn upsert(&self, user: &mut User) -> Result<()>;
    fn delete(&self, id: i64) -> Result<bool>;
    /// Id of the user owning `paper_id`, or 0 when nobody owns it.
    fn paper_owner(&self, paper_id: i64) -> Result<i64>;
}

/// Teams, their rosters and the papers they grant.
///
/// Soft-deleted teams read as zero-value [`Team`]s and never appear in
/// [`TeamRepository::get_for_user`] or [`TeamRepository::list`].
pub trait TeamRepository: Send + Sync {
    /// Members come back ordered by ascending user id, whatever order the
    /// last upsert wrote them in.
    fn get(&self, id: i64) -> Result<Team>;
    /// Active teams `user_id` belongs to (as admin or member), ascending by id.
    fn get_for_user(&self, user_id: i64) -> Result<Vec<Team>>;
    fn list(&self) -> Result<Vec<Team>>;
    fn upsert(&self, team: &mut Team) -> Result<()>;
    fn delete(&self, id: i64) -> Result<bool>;
}

/// Builds both repositories over one shared store.
pub fn open(store: Arc<FactStore>) -> (FactUserRepository, FactTeamRepository) {
    (
        FactUserRepository::new(store.clone()),
        FactTeamRepository::new(store),
    )
}

/// Allocates a fresh id and checks nothing is stored under it yet.
fn allocate(tx: &Transaction<'_>, kind: Kind) -> Result<i64> {
    let id = increment(tx, kind)?;
    if !facts_about(tx, &EntityRef::new(kind, id).to_string())?.is_empty() {
        return Err(Error::AllocationRace { kind, id });
    }
    tracing::info!("Allocated new {kind} {id}");
    Ok(id)
}

/// Id an upsert writes under. `requested == 0` allocates a fresh id; any
/// other positive id is used as given and the counter is raised past it.
fn claim(tx: &Transaction<'_>, kind: Kind, requested: i64) -> Result<i64> {
    match requested {
        0 => allocate(tx, kind),
        id if id < 0 => Err(Error::MalformedIdentifier(
            EntityRef::new(kind, id).to_string(),
        )),
        id => {
            reserve(tx, kind, id)?;
            Ok(id)
        }
    }
}

fn paper_refs(papers: &BTreeSet<i64>) -> BTreeSet<String> {
    papers
        .iter()
        .map(|&id| EntityRef::paper(id).to_string())
        .collect()
}
