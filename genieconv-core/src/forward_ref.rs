//! Forward references and the identity registry that resolves them.
//!
//! Objects reference each other before either exists. A [`ForwardRef`] names
//! the target by the group that will own it and a path inside that group; the
//! broader pipeline materializes objects into the [`IdentityRegistry`], and the
//! resolution pass swaps each reference for the identity found there.

use crate::group::GroupId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to an object that may not be materialized yet.
///
/// Equality covers the full (group, path, index) tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ForwardRef {
    group: GroupId,
    object_path: String,
    index: Option<u32>,
}

impl ForwardRef {
    pub fn new(group: GroupId, object_path: impl Into<String>) -> Self {
        Self {
            group,
            object_path: object_path.into(),
            index: None,
        }
    }

    /// Reference to one element of a set or list member.
    pub fn with_index(group: GroupId, object_path: impl Into<String>, index: u32) -> Self {
        Self {
            group,
            object_path: object_path.into(),
            index: Some(index),
        }
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn object_path(&self) -> &str {
        &self.object_path
    }

    pub fn index(&self) -> Option<u32> {
        self.index
    }
}

impl fmt::Display for ForwardRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.object_path)?;
        if let Some(index) = self.index {
            write!(f, "[{}]", index)?;
        }
        Ok(())
    }
}

/// Concrete identity of a materialized object.
#[derive(
    Hash, Eq, PartialEq, Clone, Copy, Debug, Default, Serialize, Deserialize, PartialOrd, Ord,
)]
pub struct ObjectId(pub u32);

/// What a forward reference resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedTarget {
    pub object: ObjectId,
    pub index: Option<u32>,
}

/// Maps (group, object path) to the identity of the materialized object.
///
/// Written by a single writer while objects are materialized, then only read
/// during resolution.
#[derive(Debug, Clone, Default)]
pub struct IdentityRegistry {
    by_group: FxHashMap<GroupId, FxHashMap<String, ObjectId>>,
    next_id: u32,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that an object exists, returning its identity.
    ///
    /// Materializing the same (group, path) again returns the same identity.
    pub fn materialize(&mut self, group: GroupId, object_path: &str) -> ObjectId {
        let paths = self.by_group.entry(group).or_default();
        if let Some(&id) = paths.get(object_path) {
            return id;
        }
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        paths.insert(object_path.to_string(), id);
        id
    }

    /// Materialize the object a reference points at.
    pub fn materialize_ref(&mut self, forward: &ForwardRef) -> ObjectId {
        self.materialize(forward.group, &forward.object_path)
    }

    pub fn lookup(&self, group: GroupId, object_path: &str) -> Option<ObjectId> {
        self.by_group
            .get(&group)
            .and_then(|paths| paths.get(object_path))
            .copied()
    }

    pub fn resolve(&self, forward: &ForwardRef) -> Option<ResolvedTarget> {
        self.lookup(forward.group, &forward.object_path)
            .map(|object| ResolvedTarget {
                object,
                index: forward.index,
            })
    }

    /// Number of materialized objects.
    pub fn len(&self) -> usize {
        self.next_id as usize
    }

    pub fn is_empty(&self) -> bool {
        self.next_id == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_covers_full_tuple() {
        let tech = GroupId::tech(22);
        let a = ForwardRef::new(tech, "Militia.Regenerate.rate");
        let b = ForwardRef::new(tech, "Militia.Regenerate.rate");
        let indexed = ForwardRef::with_index(tech, "Militia.Regenerate.rate", 0);
        let other_group = ForwardRef::new(GroupId::civ(1), "Militia.Regenerate.rate");

        assert_eq!(a, b);
        assert_ne!(a, indexed);
        assert_ne!(a, other_group);
    }

    #[test]
    fn test_materialize_is_idempotent() {
        let mut identities = IdentityRegistry::new();
        let first = identities.materialize(GroupId::tech(1), "Archer.Attack.max_range");
        let second = identities.materialize(GroupId::tech(1), "Archer.Attack.max_range");
        let other = identities.materialize(GroupId::tech(2), "Archer.Attack.max_range");

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(identities.len(), 2);
    }

    #[test]
    fn test_resolve_keeps_index() {
        let mut identities = IdentityRegistry::new();
        let target = ForwardRef::with_index(GroupId::tech(3), "Villager.Gather", 2);
        let id = identities.materialize_ref(&target);

        assert_eq!(
            identities.resolve(&target),
            Some(ResolvedTarget {
                object: id,
                index: Some(2)
            })
        );
        assert_eq!(
            identities.resolve(&ForwardRef::new(GroupId::tech(3), "Villager.Move")),
            None
        );
    }

    #[test]
    fn test_equal_refs_resolve_identically() {
        let mut identities = IdentityRegistry::new();
        identities.materialize(GroupId::civ(4), "Knight.Regenerate.rate");
        let a = ForwardRef::new(GroupId::civ(4), "Knight.Regenerate.rate");
        let b = a.clone();
        assert_eq!(identities.resolve(&a), identities.resolve(&b));
    }

    #[test]
    fn test_display() {
        let target = ForwardRef::with_index(GroupId::tech(22), "Monk.Gather", 1);
        assert_eq!(target.to_string(), "tech:22/Monk.Gather[1]");
    }
}
