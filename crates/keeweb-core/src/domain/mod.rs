//! Domain entities

pub mod database;
pub mod views;

pub use database::{Database, Entry, Group};
pub use views::{EntryView, GroupView};
