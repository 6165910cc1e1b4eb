//! SQLite database module for the Chef Market engine.

mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
