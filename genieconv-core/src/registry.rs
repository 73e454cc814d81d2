//! Registry of every converter group taking part in a conversion run.
//!
//! Besides owning the groups it holds the alliance relation: a team effect
//! generated in one group is replicated into each of its allies.

use crate::group::{ConverterObjectGroup, GroupId};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    groups: BTreeMap<GroupId, ConverterObjectGroup>,
    alliances: BTreeMap<GroupId, BTreeSet<GroupId>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group. A group with the same id is replaced.
    pub fn add_group(&mut self, group: ConverterObjectGroup) -> GroupId {
        let id = group.id();
        if self.groups.insert(id, group).is_some() {
            log::warn!("Replacing existing converter group {}", id);
        }
        id
    }

    pub fn get(&self, id: GroupId) -> Option<&ConverterObjectGroup> {
        self.groups.get(&id)
    }

    pub fn get_mut(&mut self, id: GroupId) -> Option<&mut ConverterObjectGroup> {
        self.groups.get_mut(&id)
    }

    pub fn contains(&self, id: GroupId) -> bool {
        self.groups.contains_key(&id)
    }

    /// Make two groups allies of each other.
    pub fn ally(&mut self, a: GroupId, b: GroupId) {
        if a == b {
            return;
        }
        self.alliances.entry(a).or_default().insert(b);
        self.alliances.entry(b).or_default().insert(a);
    }

    /// Allies of a group in id order. The group itself is never included.
    pub fn allies_of(&self, id: GroupId) -> Vec<GroupId> {
        self.alliances
            .get(&id)
            .map(|allies| allies.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Groups in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ConverterObjectGroup> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of patches across all groups.
    pub fn patch_count(&self) -> usize {
        self.groups.values().map(|g| g.len()).sum()
    }
}
