//! Persistence for the depot package index.
//!
//! The catalogue is a single SQLite database managed through diesel. It holds
//! four tables: users, packages, releases and distributions.

pub mod connection;
pub mod error;
pub mod migration;
pub mod models;
pub mod repository;
pub mod schema;
