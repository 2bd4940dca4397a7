//! SQLite persistence for tabs and projects.

pub mod connection;
mod helpers;
mod migrations;
mod repositories;
mod store;

pub use connection::Database;
