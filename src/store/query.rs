use std::fmt::Display;

use rusqlite::{Connection, params_from_iter};

use crate::error::{Error, Result};
use crate::types::Kind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Out,
    In,
}

#[derive(Debug, Clone)]
enum Start {
    /// A single named node.
    Node(String),
    /// Every subject carrying at least one fact with this predicate.
    Having(String),
}

#[derive(Debug, Clone)]
enum Step {
    Hop {
        direction: Direction,
        predicate: String,
    },
    /// Drop nodes carrying `(node, predicate, object)`.
    Except { predicate: String, object: String },
    /// Keep only nodes of the form `<kind>:...`.
    OfKind(Kind),
}

#[derive(Debug, Clone)]
struct Branch {
    start: Start,
    steps: Vec<Step>,
    tag: String,
}

/// A declarative walk over the fact graph.
///
/// A traversal is a union of branches. Each branch starts at a node, follows
/// predicate hops outward (subject to object) or inward (object to subject),
/// and reports the node it ends on together with its tag. Builder methods
/// apply to every branch accumulated so far, so tag a branch before joining
/// it with [`Traversal::union`].
///
/// ```ignore
/// let roster = Traversal::start("team:3").in_("adminOf").tag("admin")
///     .union(Traversal::start("team:3").in_("memberOf").tag("member"));
/// ```
#[derive(Debug, Clone)]
pub struct Traversal {
    branches: Vec<Branch>,
}

impl Traversal {
    pub fn start(node: impl Display) -> Self {
        Self::with_start(Start::Node(node.to_string()))
    }

    pub fn having(predicate: &str) -> Self {
        Self::with_start(Start::Having(predicate.to_string()))
    }

    fn with_start(start: Start) -> Self {
        Self {
            branches: vec![Branch {
                start,
                steps: Vec::new(),
                tag: String::new(),
            }],
        }
    }

    fn push(mut self, step: Step) -> Self {
        for branch in &mut self.branches {
            branch.steps.push(step.clone());
        }
        self
    }

    /// Follows `predicate` from subject to object.
    pub fn out(self, predicate: &str) -> Self {
        self.push(Step::Hop {
            direction: Direction::Out,
            predicate: predicate.to_string(),
        })
    }

    /// Follows `predicate` backwards, from object to subject.
    pub fn in_(self, predicate: &str) -> Self {
        self.push(Step::Hop {
            direction: Direction::In,
            predicate: predicate.to_string(),
        })
    }

    pub fn except_has(self, predicate: &str, object: &str) -> Self {
        self.push(Step::Except {
            predicate: predicate.to_string(),
            object: object.to_string(),
        })
    }

    pub fn of_kind(self, kind: Kind) -> Self {
        self.push(Step::OfKind(kind))
    }

    pub fn tag(mut self, tag: &str) -> Self {
        for branch in &mut self.branches {
            branch.tag = tag.to_string();
        }
        self
    }

    pub fn union(mut self, other: Traversal) -> Self {
        self.branches.extend(other.branches);
        self
    }

    /// Compiles the traversal into one SQL statement: a `UNION` of one
    /// self-join per branch.
    pub fn compile(&self) -> Plan {
        let mut params = Vec::new();
        let selects: Vec<String> = self
            .branches
            .iter()
            .map(|branch| compile_branch(branch, &mut params))
            .collect();

        Plan {
            sql: selects.join(" UNION "),
            params,
        }
    }

    pub fn run(&self, conn: &Connection) -> Result<Vec<TaggedValue>> {
        self.compile().run(conn)
    }

    /// Runs the traversal and keeps only the reached values.
    pub fn values(&self, conn: &Connection) -> Result<Vec<String>> {
        Ok(self.run(conn)?.into_iter().map(|hit| hit.value).collect())
    }
}

fn bind(params: &mut Vec<String>, value: &str) -> String {
    params.push(value.to_string());
    format!("?{}", params.len())
}

fn compile_branch(branch: &Branch, params: &mut Vec<String>) -> String {
    let mut tables = Vec::new();
    let mut conds = Vec::new();

    let mut cur = match &branch.start {
        Start::Node(node) => bind(params, node),
        Start::Having(predicate) => {
            tables.push("facts s".to_string());
            conds.push(format!("s.predicate = {}", bind(params, predicate)));
            "s.subject".to_string()
        }
    };

    for (i, step) in branch.steps.iter().enumerate() {
        match step {
            Step::Hop {
                direction,
                predicate,
            } => {
                let alias = format!("f{i}");
                let (near, far) = match direction {
                    Direction::Out => ("subject", "object"),
                    Direction::In => ("object", "subject"),
                };
                tables.push(format!("facts {alias}"));
                conds.push(format!("{alias}.{near} = {cur}"));
                conds.push(format!("{alias}.predicate = {}", bind(params, predicate)));
                cur = format!("{alias}.{far}");
            }
            Step::Except { predicate, object } => {
                let alias = format!("x{i}");
                let predicate = bind(params, predicate);
                let object = bind(params, object);
                conds.push(format!(
                    "NOT EXISTS (SELECT 1 FROM facts {alias} WHERE {alias}.subject = {cur} \
                     AND {alias}.predicate = {predicate} AND {alias}.object = {object})"
                ));
            }
            Step::OfKind(kind) => {
                let pattern = bind(params, &format!("{kind}:%"));
                conds.push(format!("{cur} LIKE {pattern}"));
            }
        }
    }

    let tag = bind(params, &branch.tag);
    let mut sql = format!("SELECT {tag} AS tag, {cur} AS value");
    if !tables.is_empty() {
        sql.push_str(" FROM ");
        sql.push_str(&tables.join(", "));
    }
    if !conds.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conds.join(" AND "));
    }
    sql
}

/// An executable traversal: SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    sql: String,
    params: Vec<String>,
}

impl Plan {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn run(&self, conn: &Connection) -> Result<Vec<TaggedValue>> {
        tracing::trace!(sql = %self.sql, params = ?self.params, "running plan");

        let mut stmt = conn.prepare_cached(&self.sql)?;
        let rows = stmt.query_map(params_from_iter(self.params.iter()), |row| {
            Ok(TaggedValue {
                tag: row.get(0)?,
                value: row.get(1)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}

/// One node reached by a traversal, with the tag of the branch that reached it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TaggedValue {
    pub tag: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Batch, Fact, FactStore};

    fn seeded() -> FactStore {
        let store = FactStore::open_in_memory().unwrap();
        store.initialize().unwrap();
        store
            .write(|tx| {
                let mut batch = Batch::default();
                batch.add(Fact::new("user:1", "name", "Ada"));
                batch.add(Fact::new("user:1", "email", "ada@example.com"));
                batch.add(Fact::new("user:1", "adminOf", "team:1"));
                batch.add(Fact::new("user:2", "memberOf", "team:1"));
                batch.add(Fact::new("user:2", "memberOf", "team:2"));
                batch.add(Fact::new("team:1", "name", "Pizza"));
                batch.add(Fact::new("team:1", "canSee", "paper:10"));
                batch.add(Fact::new("team:2", "name", "Pasta"));
                batch.add(Fact::new("team:2", "canSee", "paper:20"));
                batch.add(Fact::new("team:2", "deleted", "deletedItems"));
                batch.apply(tx)?;
                Ok(())
            })
            .unwrap();
        store
    }

    fn sorted(mut hits: Vec<TaggedValue>) -> Vec<(String, String)> {
        hits.sort();
        hits.into_iter().map(|h| (h.tag, h.value)).collect()
    }

    #[test]
    fn test_compile_single_hop() {
        let plan = Traversal::start("user:1").out("name").tag("name").compile();
        assert_eq!(
            plan.sql(),
            "SELECT ?3 AS tag, f0.object AS value FROM facts f0 WHERE f0.subject = ?1 AND f0.predicate = ?2"
        );
        assert_eq!(plan.params(), ["user:1", "name", "name"]);
    }

    #[test]
    fn test_tagged_union() {
        let store = seeded();
        let hits = store
            .read(|conn| {
                Traversal::start("user:1")
                    .out("name")
                    .tag("name")
                    .union(Traversal::start("user:1").out("email").tag("email"))
                    .run(conn)
            })
            .unwrap();

        assert_eq!(
            sorted(hits),
            vec![
                ("email".to_string(), "ada@example.com".to_string()),
                ("name".to_string(), "Ada".to_string()),
            ]
        );
    }

    #[test]
    fn test_inbound_hop() {
        let store = seeded();
        let hits = store
            .read(|conn| {
                Traversal::start("team:1")
                    .in_("adminOf")
                    .tag("admin")
                    .union(Traversal::start("team:1").in_("memberOf").tag("member"))
                    .run(conn)
            })
            .unwrap();

        assert_eq!(
            sorted(hits),
            vec![
                ("admin".to_string(), "user:1".to_string()),
                ("member".to_string(), "user:2".to_string()),
            ]
        );
    }

    #[test]
    fn test_except_filters_current_node() {
        let store = seeded();
        let papers = store
            .read(|conn| {
                Traversal::start("user:2")
                    .out("memberOf")
                    .except_has("deleted", "deletedItems")
                    .out("canSee")
                    .values(conn)
            })
            .unwrap();

        assert_eq!(papers, vec!["paper:10".to_string()]);
    }

    #[test]
    fn test_having_of_kind() {
        let store = seeded();
        let mut users = store
            .read(|conn| Traversal::having("name").of_kind(Kind::User).values(conn))
            .unwrap();
        users.sort();

        assert_eq!(users, vec!["user:1".to_string()]);
    }

    #[test]
    fn test_absent_start_yields_nothing() {
        let store = seeded();
        let hits = store
            .read(|conn| Traversal::start("user:99").out("name").run(conn))
            .unwrap();
        assert!(hits.is_empty());
    }
}
