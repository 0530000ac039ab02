mod access;
mod entity;
mod models;

pub use access::Access;
pub use entity::{EntityRef, Kind};
pub use models::{Member, Team, User};
