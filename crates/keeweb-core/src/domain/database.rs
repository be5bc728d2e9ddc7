//! Decrypted password database document

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root of a decrypted database: top-level groups keyed by group id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub groups: BTreeMap<String, Group>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    pub name: String,
    pub notes: String,
    pub icon_id: u32,
    pub is_expanded: bool,
    pub last_top_visible_entry: Option<String>,
    pub groups: BTreeMap<String, Group>,
    pub entries: BTreeMap<String, Entry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entry {
    pub title: String,
    pub url: String,
    pub username: String,
    pub password: String,
    pub notes: String,
    pub icon_id: u32,
}

impl Database {
    /// Depth-first search through the whole group tree.
    pub fn find_group(&self, gid: &str) -> Option<&Group> {
        find_in(&self.groups, gid)
    }
}

fn find_in<'a>(groups: &'a BTreeMap<String, Group>, gid: &str) -> Option<&'a Group> {
    for (id, group) in groups {
        if id == gid {
            return Some(group);
        }
        if let Some(found) = find_in(&group.groups, gid) {
            return Some(found);
        }
    }
    None
}
