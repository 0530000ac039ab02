//! Per-kind id allocation from a counter fact `(maxUserID value N)`.
//!
//! [`increment`] only accepts a [`Transaction`]. Stores open write
//! transactions as `BEGIN IMMEDIATE`, which takes SQLite's write lock up
//! front, so two allocators can never read the same high-water mark.

use rusqlite::{Connection, Transaction};

use super::vocab::{MAX_PAPER_ID, MAX_TEAM_ID, MAX_USER_ID, VALUE};
use super::{Batch, Traversal, decode_int};
use crate::error::Result;
use crate::types::Kind;

pub const fn counter_record(kind: Kind) -> &'static str {
    match kind {
        Kind::User => MAX_USER_ID,
        Kind::Team => MAX_TEAM_ID,
        Kind::Paper => MAX_PAPER_ID,
    }
}

/// Current high-water mark for `kind`, or 0 when nothing was allocated yet.
pub fn get_next(conn: &Connection, kind: Kind) -> Result<i64> {
    let values = Traversal::start(counter_record(kind))
        .out(VALUE)
        .values(conn)?;

    let mut current = 0;
    for value in values {
        current = current.max(decode_int(&value)?);
    }
    Ok(current)
}

pub fn increment(tx: &Transaction<'_>, kind: Kind) -> Result<i64> {
    let current = get_next(tx, kind)?;
    let next = current + 1;
    set_counter(tx, kind, current, next)?;

    tracing::debug!("Allocated {kind} id {next}");
    Ok(next)
}

/// Raises the `kind` counter to at least `id`, so later allocations never
/// hand out an id that was written explicitly.
pub fn reserve(tx: &Transaction<'_>, kind: Kind, id: i64) -> Result<()> {
    let current = get_next(tx, kind)?;
    if id > current {
        set_counter(tx, kind, current, id)?;
        tracing::debug!("Raised {kind} counter from {current} to {id}");
    }
    Ok(())
}

fn set_counter(tx: &Transaction<'_>, kind: Kind, current: i64, value: i64) -> Result<()> {
    let old = (current != 0).then(|| current.to_string());
    let mut batch = Batch::default();
    batch.replace_scalar(
        counter_record(kind),
        VALUE,
        old.as_deref(),
        Some(value.to_string().as_str()),
    );
    batch.apply(tx)?;
    Ok(())
}
