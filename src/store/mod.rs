mod decode;
mod diff;
mod query;
mod schema;
mod sequence;
mod sqlite;
pub mod vocab;

pub use decode::{decode_bool, decode_id, decode_int, decode_ref, decode_string};
pub use diff::{Applied, Batch};
pub use query::{Plan, TaggedValue, Traversal};
pub use sequence::{counter_record, get_next, increment, reserve};
pub use sqlite::{FactStore, facts_about, has_fact};

/// An atomic (subject, predicate, object) unit of stored information.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fact {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Fact {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl std::fmt::Display for Fact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.subject, self.predicate, self.object)
    }
}
