//! Unit and building lines.
//!
//! A line is the legacy family of variants that upgrade into each other
//! (Militia -> Man-at-Arms -> Long Swordsman ...). The converter patches a
//! line by patching the ability members of each of its variants.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identifier of a line, usually the unit id of its head variant.
#[derive(
    Hash, Eq, PartialEq, Clone, Copy, Debug, Default, Serialize, Deserialize, PartialOrd, Ord,
)]
pub struct LineId(pub u32);

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line#{}", self.0)
    }
}

/// Abilities a variant can carry in the target object model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AbilityId {
    Live,
    Regenerate,
    LineOfSight,
    Move,
    Attack,
    Garrison,
    Gather,
    ResourceStorage,
}

impl AbilityId {
    /// Object name of the ability below its variant.
    pub fn name(self) -> &'static str {
        match self {
            AbilityId::Live => "Live",
            AbilityId::Regenerate => "Regenerate",
            AbilityId::LineOfSight => "LineOfSight",
            AbilityId::Move => "Move",
            AbilityId::Attack => "Attack",
            AbilityId::Garrison => "Garrison",
            AbilityId::Gather => "Gather",
            AbilityId::ResourceStorage => "ResourceStorage",
        }
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One unit or building variant inside a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityVariant {
    pub unit_id: u16,
    pub class_id: u16,
    /// Object path of the variant in the target model, e.g. "Militia".
    pub name: String,
    #[serde(default)]
    pub abilities: BTreeSet<AbilityId>,
}

impl EntityVariant {
    pub fn has_ability(&self, ability: AbilityId) -> bool {
        self.abilities.contains(&ability)
    }
}

/// A family of related variants. Never mutated by the converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEntityLine {
    id: LineId,
    variants: Vec<EntityVariant>,
}

impl GameEntityLine {
    pub fn new(id: LineId, variants: Vec<EntityVariant>) -> Self {
        Self { id, variants }
    }

    pub fn id(&self) -> LineId {
        self.id
    }

    /// Variants in upgrade order.
    pub fn variants(&self) -> &[EntityVariant] {
        &self.variants
    }

    /// True if any variant carries the ability.
    pub fn has_ability(&self, ability: AbilityId) -> bool {
        self.variants.iter().any(|v| v.has_ability(ability))
    }

    /// Variants carrying the ability, in upgrade order.
    pub fn variants_with(&self, ability: AbilityId) -> impl Iterator<Item = &EntityVariant> + '_ {
        self.variants.iter().filter(move |v| v.has_ability(ability))
    }

    pub fn contains_unit(&self, unit_id: u16) -> bool {
        self.variants.iter().any(|v| v.unit_id == unit_id)
    }

    pub fn has_class(&self, class_id: u16) -> bool {
        self.variants.iter().any(|v| v.class_id == class_id)
    }
}
