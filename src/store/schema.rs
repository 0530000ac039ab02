pub const SCHEMA: &str = r#"
-- One row per (subject, predicate, object) fact
CREATE TABLE IF NOT EXISTS facts (
    subject TEXT NOT NULL,
    predicate TEXT NOT NULL,
    object TEXT NOT NULL,
    PRIMARY KEY (subject, predicate, object)
) WITHOUT ROWID;

-- Reverse lookups: owner of a paper, roster of a team, user by email
CREATE INDEX IF NOT EXISTS idx_facts_object ON facts(object, predicate);
CREATE INDEX IF NOT EXISTS idx_facts_predicate ON facts(predicate);
"#;
