//! Patch subprocessors, one per legacy effect kind.
//!
//! Every subprocessor has the same shape ([`Subprocessor`]): it receives the
//! group the effect belongs to, one entity line, the operand, the operator and
//! the team flag, registers the patches it builds and returns the forward
//! references it created.

pub mod attribute;

use crate::forward_ref::ForwardRef;
use crate::group::{GroupId, Registration};
use crate::operator::{MemberOperator, MemberValue, OperatorError};
use crate::patch::Patch;
use crate::registry::GroupRegistry;
use geniedata::{GameEntityLine, LineId};
use thiserror::Error;

pub use attribute::{AttributeSpec, ValueDomain};

/// Per-effect failure. Aborts the one effect, siblings keep converting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EffectError {
    #[error("Invalid value {value} for {effect} with operator {operator}: {reason}")]
    InvalidValueDomain {
        effect: &'static str,
        operator: MemberOperator,
        value: MemberValue,
        reason: &'static str,
    },
    #[error("Division by zero in {effect}")]
    DivisionByZero { effect: &'static str },
    #[error("Converter group {0} is not registered")]
    UnknownGroup(GroupId),
}

/// Signature shared by all subprocessors.
pub type Subprocessor = fn(
    &mut PatchContext<'_>,
    &GameEntityLine,
    MemberValue,
    MemberOperator,
    bool,
) -> Result<Vec<ForwardRef>, EffectError>;

/// The group an effect is converted for, plus the registry it lives in.
pub struct PatchContext<'a> {
    group: GroupId,
    registry: &'a mut GroupRegistry,
}

impl<'a> PatchContext<'a> {
    pub fn new(group: GroupId, registry: &'a mut GroupRegistry) -> Self {
        Self { group, registry }
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn registry(&self) -> &GroupRegistry {
        &*self.registry
    }

    /// Groups that receive a copy of the effect: the originating group first,
    /// then its allies when the effect is team-wide.
    ///
    /// Fails before anything is registered if any of them is unknown.
    pub fn recipients(&self, team_wide: bool) -> Result<Vec<GroupId>, EffectError> {
        let mut recipients = vec![self.group];
        if team_wide {
            recipients.extend(self.registry.allies_of(self.group));
        }
        match recipients.iter().find(|id| !self.registry.contains(**id)) {
            Some(&missing) => Err(EffectError::UnknownGroup(missing)),
            None => Ok(recipients),
        }
    }

    /// Register a patch on `group` and mark `line` as affected there.
    ///
    /// A patch that cannot be folded into an existing one leaves the group
    /// unchanged.
    pub fn register(
        &mut self,
        effect: &'static str,
        group: GroupId,
        line: LineId,
        patch: Patch,
    ) -> Result<Registration, EffectError> {
        let operator = patch.operator();
        let target = self
            .registry
            .get_mut(group)
            .ok_or(EffectError::UnknownGroup(group))?;
        let outcome = target
            .register_patch(patch)
            .map_err(|e| EffectError::from_operator(effect, operator, e))?;
        target.mark_affected(line);
        Ok(outcome)
    }
}

impl EffectError {
    pub(crate) fn from_operator(
        effect: &'static str,
        operator: MemberOperator,
        err: OperatorError,
    ) -> Self {
        match err {
            OperatorError::DivisionByZero => EffectError::DivisionByZero { effect },
            OperatorError::NonFinite(value) => EffectError::InvalidValueDomain {
                effect,
                operator,
                value,
                reason: "value is not finite",
            },
        }
    }
}
