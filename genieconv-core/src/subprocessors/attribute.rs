//! Attribute upgrade subprocessors.
//!
//! Each legacy attribute effect patches one member of one ability on every
//! variant of a line. The kinds differ only in which ability/member they
//! target and which values are legal, so they share [`upgrade`] and are
//! described by an [`AttributeSpec`].

use super::{EffectError, PatchContext};
use crate::forward_ref::ForwardRef;
use crate::operator::{MemberOperator, MemberValue};
use crate::patch::Patch;
use geniedata::{AbilityId, EntityVariant, GameEntityLine};

/// Legal values of a patched member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueDomain {
    NonNegativeInt,
    NonNegativeFloat,
}

impl ValueDomain {
    /// Check an operand before any patch is built and return it in the
    /// member's numeric kind.
    ///
    /// Deltas (`+=`, `-=`) may have either sign. Replacing and scaling
    /// operands must keep the member non-negative, and integer members only
    /// take integral replacements and deltas, which become `Int`. Scale
    /// factors keep their kind.
    pub fn validate(
        self,
        effect: &'static str,
        operator: MemberOperator,
        value: MemberValue,
    ) -> Result<MemberValue, EffectError> {
        let invalid = |reason: &'static str| EffectError::InvalidValueDomain {
            effect,
            operator,
            value,
            reason,
        };

        if operator == MemberOperator::Divide && value.is_zero() {
            return Err(EffectError::DivisionByZero { effect });
        }
        if !value.as_f64().is_finite() {
            return Err(invalid("value is not finite"));
        }

        let is_delta = matches!(operator, MemberOperator::Add | MemberOperator::Subtract);
        if !is_delta && value.is_negative() {
            return Err(invalid("member must stay non-negative"));
        }

        let is_scale = matches!(operator, MemberOperator::Multiply | MemberOperator::Divide);
        if self == ValueDomain::NonNegativeInt && !is_scale {
            return match value {
                MemberValue::Int(_) => Ok(value),
                MemberValue::Float(v) if value.is_integral() => Ok(MemberValue::Int(v as i64)),
                MemberValue::Float(_) => Err(invalid("member is an integer")),
            };
        }
        Ok(value)
    }
}

/// Which member an attribute effect patches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpec {
    pub name: &'static str,
    pub ability: AbilityId,
    /// Member path below the ability, e.g. "rate" or "HP.max_value".
    pub member: &'static str,
    pub domain: ValueDomain,
}

impl AttributeSpec {
    /// Last segment of the member path.
    pub fn member_name(&self) -> &'static str {
        self.member.rsplit('.').next().unwrap_or(self.member)
    }

    /// `<variant>.<Ability>.<member>`
    pub fn target_path(&self, variant: &EntityVariant) -> String {
        format!("{}.{}.{}", variant.name, self.ability.name(), self.member)
    }
}

pub const HIT_POINTS: AttributeSpec = AttributeSpec {
    name: "hit points",
    ability: AbilityId::Live,
    member: "HP.max_value",
    domain: ValueDomain::NonNegativeInt,
};

pub const LINE_OF_SIGHT: AttributeSpec = AttributeSpec {
    name: "line of sight",
    ability: AbilityId::LineOfSight,
    member: "range",
    domain: ValueDomain::NonNegativeFloat,
};

pub const GARRISON_CAPACITY: AttributeSpec = AttributeSpec {
    name: "garrison capacity",
    ability: AbilityId::Garrison,
    member: "capacity",
    domain: ValueDomain::NonNegativeInt,
};

pub const MOVE_SPEED: AttributeSpec = AttributeSpec {
    name: "movement speed",
    ability: AbilityId::Move,
    member: "speed",
    domain: ValueDomain::NonNegativeFloat,
};

pub const RELOAD_TIME: AttributeSpec = AttributeSpec {
    name: "reload time",
    ability: AbilityId::Attack,
    member: "reload_time",
    domain: ValueDomain::NonNegativeFloat,
};

pub const MAX_RANGE: AttributeSpec = AttributeSpec {
    name: "max range",
    ability: AbilityId::Attack,
    member: "max_range",
    domain: ValueDomain::NonNegativeFloat,
};

pub const WORK_RATE: AttributeSpec = AttributeSpec {
    name: "work rate",
    ability: AbilityId::Gather,
    member: "gather_rate",
    domain: ValueDomain::NonNegativeFloat,
};

pub const CARRY_CAPACITY: AttributeSpec = AttributeSpec {
    name: "carry capacity",
    ability: AbilityId::ResourceStorage,
    member: "capacity",
    domain: ValueDomain::NonNegativeInt,
};

pub const REGENERATION_RATE: AttributeSpec = AttributeSpec {
    name: "regeneration rate",
    ability: AbilityId::Regenerate,
    member: "rate",
    domain: ValueDomain::NonNegativeFloat,
};

/// Patch `spec`'s member on every variant of `line` that has the ability.
///
/// The originating group always gets one patch per variant. For team effects
/// every ally gets its own patch with a reference scoped to the ally. The
/// returned references are in variant order, originating group first within
/// a variant. A line without the ability yields no patches and no error.
pub fn upgrade(
    spec: &AttributeSpec,
    ctx: &mut PatchContext<'_>,
    line: &GameEntityLine,
    value: MemberValue,
    operator: MemberOperator,
    team: bool,
) -> Result<Vec<ForwardRef>, EffectError> {
    let value = spec.domain.validate(spec.name, operator, value)?;
    let recipients = ctx.recipients(team)?;

    let mut refs = Vec::new();
    for variant in line.variants_with(spec.ability) {
        let path = spec.target_path(variant);
        for &group in &recipients {
            let target = ForwardRef::new(group, path.as_str());
            let patch = Patch::new(target.clone(), spec.member_name(), operator, value, team)
                .map_err(|e| EffectError::from_operator(spec.name, operator, e))?;
            let outcome = ctx.register(spec.name, group, line.id(), patch)?;
            log::trace!("{} {} {} on {}: {:?}", spec.name, operator, value, target, outcome);
            refs.push(target);
        }
    }

    if refs.is_empty() {
        log::debug!(
            "{} has no variant with {}, skipping {} patch",
            line.id(),
            spec.ability,
            spec.name
        );
    }
    Ok(refs)
}

/// Hit point effect (ID: 0).
pub fn hp_upgrade(
    ctx: &mut PatchContext<'_>,
    line: &GameEntityLine,
    value: MemberValue,
    operator: MemberOperator,
    team: bool,
) -> Result<Vec<ForwardRef>, EffectError> {
    upgrade(&HIT_POINTS, ctx, line, value, operator, team)
}

/// Line of sight effect (ID: 1).
pub fn line_of_sight_upgrade(
    ctx: &mut PatchContext<'_>,
    line: &GameEntityLine,
    value: MemberValue,
    operator: MemberOperator,
    team: bool,
) -> Result<Vec<ForwardRef>, EffectError> {
    upgrade(&LINE_OF_SIGHT, ctx, line, value, operator, team)
}

/// Garrison capacity effect (ID: 2).
pub fn garrison_capacity_upgrade(
    ctx: &mut PatchContext<'_>,
    line: &GameEntityLine,
    value: MemberValue,
    operator: MemberOperator,
    team: bool,
) -> Result<Vec<ForwardRef>, EffectError> {
    upgrade(&GARRISON_CAPACITY, ctx, line, value, operator, team)
}

/// Movement speed effect (ID: 5).
pub fn move_speed_upgrade(
    ctx: &mut PatchContext<'_>,
    line: &GameEntityLine,
    value: MemberValue,
    operator: MemberOperator,
    team: bool,
) -> Result<Vec<ForwardRef>, EffectError> {
    upgrade(&MOVE_SPEED, ctx, line, value, operator, team)
}

/// Reload time effect (ID: 10).
pub fn reload_time_upgrade(
    ctx: &mut PatchContext<'_>,
    line: &GameEntityLine,
    value: MemberValue,
    operator: MemberOperator,
    team: bool,
) -> Result<Vec<ForwardRef>, EffectError> {
    upgrade(&RELOAD_TIME, ctx, line, value, operator, team)
}

/// Max range effect (ID: 12).
pub fn max_range_upgrade(
    ctx: &mut PatchContext<'_>,
    line: &GameEntityLine,
    value: MemberValue,
    operator: MemberOperator,
    team: bool,
) -> Result<Vec<ForwardRef>, EffectError> {
    upgrade(&MAX_RANGE, ctx, line, value, operator, team)
}

/// Work rate effect (ID: 13).
pub fn work_rate_upgrade(
    ctx: &mut PatchContext<'_>,
    line: &GameEntityLine,
    value: MemberValue,
    operator: MemberOperator,
    team: bool,
) -> Result<Vec<ForwardRef>, EffectError> {
    upgrade(&WORK_RATE, ctx, line, value, operator, team)
}

/// Carry capacity effect (ID: 14).
pub fn carry_capacity_upgrade(
    ctx: &mut PatchContext<'_>,
    line: &GameEntityLine,
    value: MemberValue,
    operator: MemberOperator,
    team: bool,
) -> Result<Vec<ForwardRef>, EffectError> {
    upgrade(&CARRY_CAPACITY, ctx, line, value, operator, team)
}

/// Regeneration rate effect (ID: 109).
///
/// Patches `<variant>.Regenerate.rate`, the per-second hit point
/// regeneration. Lines without regeneration (siege, most buildings) are
/// skipped.
pub fn regeneration_rate_upgrade(
    ctx: &mut PatchContext<'_>,
    line: &GameEntityLine,
    value: MemberValue,
    operator: MemberOperator,
    team: bool,
) -> Result<Vec<ForwardRef>, EffectError> {
    upgrade(&REGENERATION_RATE, ctx, line, value, operator, team)
}
