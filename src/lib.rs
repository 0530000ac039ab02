//! # Papershelf
//!
//! Users, teams and paper sharing grants stored as facts in an embedded
//! SQLite file. Service layers consume the [`repository::UserRepository`]
//! and [`repository::TeamRepository`] traits; effective rights on a paper
//! come from [`access`].
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! papershelf = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use papershelf::config::StoreConfig;
//! use papershelf::repository::{self, TeamRepository};
//! use papershelf::types::{Member, Team};
//!
//! let store = StoreConfig::default().open_store().unwrap();
//! let (users, teams) = repository::open(Arc::new(store));
//!
//! let mut team = Team {
//!     name: "Pizza".to_string(),
//!     members: vec![Member::admin(1), Member::member(2)],
//!     ..Team::default()
//! };
//! teams.upsert(&mut team).unwrap();
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the administration CLI. Disable with
//!   `default-features = false`.

pub mod access;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod repository;
pub mod store;
pub mod types;
