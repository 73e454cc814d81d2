//! Builders for tests and fixtures.

use crate::forward_ref::IdentityRegistry;
use crate::group::{ConverterObjectGroup, GroupId};
use crate::registry::GroupRegistry;
use geniedata::{AbilityId, EntityVariant, GameEntityLine, LineId};

pub struct LineBuilder {
    id: LineId,
    variants: Vec<EntityVariant>,
}

impl LineBuilder {
    pub fn new(id: u32) -> Self {
        Self {
            id: LineId(id),
            variants: Vec::new(),
        }
    }

    /// Add a variant in unit class 0.
    pub fn variant(self, unit_id: u16, name: &str, abilities: &[AbilityId]) -> Self {
        self.variant_in_class(unit_id, 0, name, abilities)
    }

    pub fn variant_in_class(
        mut self,
        unit_id: u16,
        class_id: u16,
        name: &str,
        abilities: &[AbilityId],
    ) -> Self {
        self.variants.push(EntityVariant {
            unit_id,
            class_id,
            name: name.to_string(),
            abilities: abilities.iter().copied().collect(),
        });
        self
    }

    pub fn build(self) -> GameEntityLine {
        GameEntityLine::new(self.id, self.variants)
    }
}

pub struct RegistryBuilder {
    registry: GroupRegistry,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            registry: GroupRegistry::new(),
        }
    }

    pub fn group(mut self, id: GroupId, name: &str) -> Self {
        self.registry.add_group(ConverterObjectGroup::new(id, name));
        self
    }

    pub fn tech(self, index: u16, name: &str) -> Self {
        self.group(GroupId::tech(index), name)
    }

    pub fn civ(self, index: u16, name: &str) -> Self {
        self.group(GroupId::civ(index), name)
    }

    pub fn ally(mut self, a: GroupId, b: GroupId) -> Self {
        self.registry.ally(a, b);
        self
    }

    pub fn build(self) -> GroupRegistry {
        self.registry
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Materialize the target of every patch in the registry, standing in for
/// the object model builder that runs alongside patch generation.
pub fn materialize_all(registry: &GroupRegistry) -> IdentityRegistry {
    let mut identities = IdentityRegistry::new();
    for group in registry.iter() {
        for patch in group.patches() {
            identities.materialize_ref(patch.target());
        }
    }
    identities
}
