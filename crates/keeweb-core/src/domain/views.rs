//! Client-facing projections of groups and entries

use serde::Serialize;

use super::database::{Entry, Group};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupView {
    pub id: String,
    pub name: String,
    pub notes: String,
    pub icon: u32,
    pub expanded: bool,
    pub selected: Option<String>,
    pub groups: Vec<GroupView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryView {
    pub id: String,
    pub title: String,
    pub url: String,
    pub username: String,
    pub password: String,
    pub notes: String,
    pub icon: u32,
}

impl GroupView {
    /// Projects a group map recursively, in id order.
    pub fn from_groups(groups: &BTreeMap<String, Group>) -> Vec<GroupView> {
        groups
            .iter()
            .map(|(id, group)| GroupView {
                id: id.clone(),
                name: group.name.clone(),
                notes: group.notes.clone(),
                icon: group.icon_id,
                expanded: group.is_expanded,
                selected: group.last_top_visible_entry.clone(),
                groups: GroupView::from_groups(&group.groups),
            })
            .collect()
    }
}

impl EntryView {
    /// Projects the direct entries of one group (sub-groups are not included).
    pub fn from_entries(entries: &BTreeMap<String, Entry>) -> Vec<EntryView> {
        entries
            .iter()
            .map(|(id, entry)| EntryView {
                id: id.clone(),
                title: entry.title.clone(),
                url: entry.url.clone(),
                username: entry.username.clone(),
                password: entry.password.clone(),
                notes: entry.notes.clone(),
                icon: entry.icon_id,
            })
            .collect()
    }
}
