//! Patch objects: deferred modifications of one member of a target object.

use crate::forward_ref::{ForwardRef, ResolvedTarget};
use crate::operator::{MemberOperator, MemberValue, OperatorError};
use serde::{Deserialize, Serialize};

/// "Modify `member_name` of `target` using `operator` with `value`."
///
/// Immutable once created. `team_wide` records that the patch came from a team
/// effect; fan-out to allied groups has already happened by then, one patch
/// per group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    target: ForwardRef,
    member_name: String,
    operator: MemberOperator,
    value: MemberValue,
    team_wide: bool,
}

impl Patch {
    /// Build a patch. Dividing by zero and non-finite operands are rejected
    /// here, not when applied.
    pub fn new(
        target: ForwardRef,
        member_name: impl Into<String>,
        operator: MemberOperator,
        value: MemberValue,
        team_wide: bool,
    ) -> Result<Self, OperatorError> {
        if operator == MemberOperator::Divide && value.is_zero() {
            return Err(OperatorError::DivisionByZero);
        }
        if !value.as_f64().is_finite() {
            return Err(OperatorError::NonFinite(value));
        }
        Ok(Self {
            target,
            member_name: member_name.into(),
            operator,
            value,
            team_wide,
        })
    }

    pub fn target(&self) -> &ForwardRef {
        &self.target
    }

    pub fn member_name(&self) -> &str {
        &self.member_name
    }

    pub fn operator(&self) -> MemberOperator {
        self.operator
    }

    pub fn value(&self) -> MemberValue {
        self.value
    }

    pub fn is_team_wide(&self) -> bool {
        self.team_wide
    }

    /// Same patch with a different operand. Used when folding duplicates, so
    /// the folded operand goes through the same checks as a new one.
    pub(crate) fn with_value(&self, value: MemberValue) -> Result<Patch, OperatorError> {
        Patch::new(
            self.target.clone(),
            self.member_name.clone(),
            self.operator,
            value,
            self.team_wide,
        )
    }

    pub(crate) fn set_team_wide(&mut self, team_wide: bool) {
        self.team_wide = team_wide;
    }

    /// Bind the patch to the concrete object its target resolved to.
    pub fn resolve(&self, target: ResolvedTarget) -> ResolvedPatch {
        ResolvedPatch {
            target,
            source: self.target.clone(),
            member_name: self.member_name.clone(),
            operator: self.operator,
            value: self.value,
            team_wide: self.team_wide,
        }
    }
}

/// A patch whose target is a concrete object, ready for the serializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPatch {
    pub target: ResolvedTarget,
    /// The forward reference the target was resolved from, for diagnostics.
    pub source: ForwardRef,
    pub member_name: String,
    pub operator: MemberOperator,
    pub value: MemberValue,
    pub team_wide: bool,
}
