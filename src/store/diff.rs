use std::collections::{BTreeMap, BTreeSet};

use rusqlite::{Transaction, params};

use super::Fact;
use crate::error::Result;

/// Add/remove operations accumulated for one atomic update.
///
/// Multi-valued relations are diffed as sets: only `old - new` is removed
/// and only `new - old` is added. Removals are applied before additions.
#[derive(Debug, Default)]
pub struct Batch {
    removes: Vec<Fact>,
    adds: Vec<Fact>,
}

/// Row counts actually touched by [`Batch::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Applied {
    pub removed: usize,
    pub added: usize,
}

impl Batch {
    pub fn add(&mut self, fact: Fact) {
        self.adds.push(fact);
    }

    pub fn remove(&mut self, fact: Fact) {
        self.removes.push(fact);
    }

    pub fn adds(&self) -> &[Fact] {
        &self.adds
    }

    pub fn removes(&self) -> &[Fact] {
        &self.removes
    }

    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.removes.is_empty()
    }

    /// Emits one removal per fact in `old - new` and one addition per fact
    /// in `new - old`.
    pub fn diff(&mut self, old: &BTreeSet<Fact>, new: &BTreeSet<Fact>) {
        for fact in old.difference(new) {
            self.remove(fact.clone());
        }
        for fact in new.difference(old) {
            self.add(fact.clone());
        }
    }

    /// Diffs the objects of a multi-valued `(subject, predicate, *)` relation.
    pub fn diff_objects(
        &mut self,
        subject: &str,
        predicate: &str,
        old: &BTreeSet<String>,
        new: &BTreeSet<String>,
    ) {
        let facts = |objects: &BTreeSet<String>| -> BTreeSet<Fact> {
            objects
                .iter()
                .map(|o| Fact::new(subject, predicate, o.as_str()))
                .collect()
        };
        self.diff(&facts(old), &facts(new));
    }

    /// Diffs role edges `(subject, role, object)` pointing at one `object`.
    ///
    /// `old` and `new` map each subject to its single role predicate. The
    /// diff is keyed by `(subject, object)` separately for every predicate in
    /// `roles`, so a subject whose role changes loses exactly its old edge
    /// and gains exactly its new one.
    pub fn diff_roles(
        &mut self,
        object: &str,
        roles: &[&str],
        old: &BTreeMap<String, &str>,
        new: &BTreeMap<String, &str>,
    ) {
        for role in roles {
            let edges = |roster: &BTreeMap<String, &str>| -> BTreeSet<Fact> {
                roster
                    .iter()
                    .filter(|(_, r)| *r == role)
                    .map(|(subject, _)| Fact::new(subject.as_str(), *role, object))
                    .collect()
            };
            self.diff(&edges(old), &edges(new));
        }
    }

    /// Unconditionally replaces a single-valued attribute: the old value (if
    /// any) is removed and the new value (if any) is added, even when equal.
    pub fn replace_scalar(
        &mut self,
        subject: &str,
        predicate: &str,
        old: Option<&str>,
        new: Option<&str>,
    ) {
        if let Some(old) = old {
            self.remove(Fact::new(subject, predicate, old));
        }
        if let Some(new) = new {
            self.add(Fact::new(subject, predicate, new));
        }
    }

    /// Applies every operation inside `tx`. Nothing is visible until the
    /// caller commits.
    pub fn apply(self, tx: &Transaction<'_>) -> Result<Applied> {
        let mut applied = Applied::default();

        {
            let mut stmt = tx.prepare_cached(
                "DELETE FROM facts WHERE subject = ?1 AND predicate = ?2 AND object = ?3",
            )?;
            for fact in &self.removes {
                applied.removed += stmt.execute(params![fact.subject, fact.predicate, fact.object])?;
            }
        }

        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR IGNORE INTO facts (subject, predicate, object) VALUES (?1, ?2, ?3)",
            )?;
            for fact in &self.adds {
                applied.added += stmt.execute(params![fact.subject, fact.predicate, fact.object])?;
            }
        }

        tracing::debug!(
            removed = applied.removed,
            added = applied.added,
            "applied fact batch"
        );
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FactStore, facts_about};

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_diff_objects_emits_only_delta() {
        let mut batch = Batch::default();
        batch.diff_objects(
            "team:1",
            "canSee",
            &set(&["paper:1", "paper:2"]),
            &set(&["paper:2", "paper:3"]),
        );

        assert_eq!(batch.removes(), [Fact::new("team:1", "canSee", "paper:1")]);
        assert_eq!(batch.adds(), [Fact::new("team:1", "canSee", "paper:3")]);
    }

    #[test]
    fn test_diff_identical_sets_is_empty() {
        let mut batch = Batch::default();
        let papers = set(&["paper:1", "paper:2"]);
        batch.diff_objects("team:1", "canEdit", &papers, &papers);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_diff_roles_moves_edge_between_predicates() {
        let old = BTreeMap::from([
            ("user:1".to_string(), "adminOf"),
            ("user:2".to_string(), "memberOf"),
        ]);
        let new = BTreeMap::from([
            ("user:1".to_string(), "memberOf"),
            ("user:2".to_string(), "memberOf"),
        ]);

        let mut batch = Batch::default();
        batch.diff_roles("team:7", &["adminOf", "memberOf"], &old, &new);

        assert_eq!(batch.removes(), [Fact::new("user:1", "adminOf", "team:7")]);
        assert_eq!(batch.adds(), [Fact::new("user:1", "memberOf", "team:7")]);
    }

    #[test]
    fn test_replace_scalar_is_unconditional() {
        let mut batch = Batch::default();
        batch.replace_scalar("user:1", "name", Some("Ada"), Some("Ada"));
        assert_eq!(batch.removes().len(), 1);
        assert_eq!(batch.adds().len(), 1);
    }

    #[test]
    fn test_apply_counts_rows() {
        let store = FactStore::open_in_memory().unwrap();
        store.initialize().unwrap();

        let applied = store
            .write(|tx| {
                let mut batch = Batch::default();
                batch.add(Fact::new("user:1", "name", "Ada"));
                batch.add(Fact::new("user:1", "name", "Ada"));
                batch.remove(Fact::new("user:1", "email", "missing"));
                batch.apply(tx)
            })
            .unwrap();

        assert_eq!(applied, Applied { removed: 0, added: 1 });

        store
            .write(|tx| {
                let mut batch = Batch::default();
                batch.replace_scalar("user:1", "name", Some("Ada"), Some("Ada Lovelace"));
                batch.apply(tx)
            })
            .unwrap();

        let facts = store.read(|conn| facts_about(conn, "user:1")).unwrap();
        assert_eq!(facts, vec![Fact::new("user:1", "name", "Ada Lovelace")]);
    }
}
