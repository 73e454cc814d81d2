//! Converter object groups.
//!
//! One group exists per legacy tech or civilization being converted. It owns
//! the patches generated for it and remembers which entity lines they touch.

use crate::forward_ref::ForwardRef;
use crate::operator::{MemberOperator, OperatorError};
use crate::patch::Patch;
use geniedata::LineId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GroupKind {
    Tech,
    Civilization,
}

/// Group identifier: the kind plus the legacy tech or civ index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId {
    pub kind: GroupKind,
    pub index: u16,
}

impl GroupId {
    pub const fn tech(index: u16) -> Self {
        Self {
            kind: GroupKind::Tech,
            index,
        }
    }

    pub const fn civ(index: u16) -> Self {
        Self {
            kind: GroupKind::Civilization,
            index,
        }
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            GroupKind::Tech => write!(f, "tech:{}", self.index),
            GroupKind::Civilization => write!(f, "civ:{}", self.index),
        }
    }
}

/// What `register_patch` did with a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// First patch for this (target, member, operator).
    Appended,
    /// Identical replacing patch already present.
    Unchanged,
    /// Replacing operator with a new value: last write wins.
    Replaced,
    /// Accumulating operator: folded into the existing operand.
    Composed,
}

type PatchKey = (ForwardRef, String, MemberOperator);

/// Conversion scope of one tech or civilization.
#[derive(Debug, Clone)]
pub struct ConverterObjectGroup {
    id: GroupId,
    name: String,
    patches: Vec<Patch>,
    index: FxHashMap<PatchKey, usize>,
    affected_lines: BTreeSet<LineId>,
}

impl ConverterObjectGroup {
    pub fn new(id: GroupId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            patches: Vec::new(),
            index: FxHashMap::default(),
            affected_lines: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn kind(&self) -> GroupKind {
        self.id.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a patch, merging it with an earlier one on the same member.
    ///
    /// Patches are keyed by (target, member, operator). Replacing operators
    /// keep the last value; accumulating operators compose so two `+=` on the
    /// same member become one `+=` of the sum. A merged entry is team-wide if
    /// either side was.
    ///
    /// A composed operand that would be rejected by [`Patch::new`] (a `/=`
    /// folding to zero, a `*=` overflowing to infinity) fails the call and
    /// leaves the existing entry untouched.
    pub fn register_patch(&mut self, patch: Patch) -> Result<Registration, OperatorError> {
        let key = (
            patch.target().clone(),
            patch.member_name().to_string(),
            patch.operator(),
        );

        let Some(&slot) = self.index.get(&key) else {
            self.index.insert(key, self.patches.len());
            self.patches.push(patch);
            return Ok(Registration::Appended);
        };

        let existing = &mut self.patches[slot];
        let team_wide = existing.is_team_wide() || patch.is_team_wide();
        let operator = patch.operator();
        let outcome = if operator.is_accumulating() {
            let value = operator.compose(existing.value(), patch.value());
            *existing = existing.with_value(value)?;
            Registration::Composed
        } else if existing.value() == patch.value() {
            Registration::Unchanged
        } else {
            *existing = patch;
            Registration::Replaced
        };
        existing.set_team_wide(team_wide);
        Ok(outcome)
    }

    /// Record that a line received patches from this group.
    pub fn mark_affected(&mut self, line: LineId) {
        self.affected_lines.insert(line);
    }

    /// Lines touched by this group's patches.
    pub fn affected_lines(&self) -> &BTreeSet<LineId> {
        &self.affected_lines
    }

    /// Owned patches in registration order.
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::MemberValue;

    fn patch(path: &str, operator: MemberOperator, value: MemberValue) -> Patch {
        Patch::new(
            ForwardRef::new(GroupId::tech(22), path),
            "rate",
            operator,
            value,
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_group_id_display() {
        assert_eq!(GroupId::tech(22).to_string(), "tech:22");
        assert_eq!(GroupId::civ(3).to_string(), "civ:3");
        assert_ne!(GroupId::tech(3), GroupId::civ(3));
    }

    #[test]
    fn test_identical_assign_is_noop() {
        let mut group = ConverterObjectGroup::new(GroupId::tech(22), "Supremacy");
        let p = patch(
            "Villager.Regenerate.rate",
            MemberOperator::Assign,
            MemberValue::Float(2.0),
        );

        assert_eq!(group.register_patch(p.clone()), Ok(Registration::Appended));
        assert_eq!(group.register_patch(p), Ok(Registration::Unchanged));
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_assign_last_write_wins() {
        let mut group = ConverterObjectGroup::new(GroupId::tech(22), "Supremacy");
        group
            .register_patch(patch(
                "Villager.Regenerate.rate",
                MemberOperator::Override,
                MemberValue::Float(1.0),
            ))
            .unwrap();
        let outcome = group.register_patch(patch(
            "Villager.Regenerate.rate",
            MemberOperator::Override,
            MemberValue::Float(3.0),
        ));

        assert_eq!(outcome, Ok(Registration::Replaced));
        assert_eq!(group.len(), 1);
        assert_eq!(group.patches()[0].value(), MemberValue::Float(3.0));
    }

    #[test]
    fn test_add_patches_compose() {
        let mut group = ConverterObjectGroup::new(GroupId::tech(22), "Supremacy");
        let p = patch(
            "Villager.Regenerate.rate",
            MemberOperator::Add,
            MemberValue::Float(0.5),
        );

        group.register_patch(p.clone()).unwrap();
        assert_eq!(group.register_patch(p), Ok(Registration::Composed));
        assert_eq!(group.len(), 1);
        assert_eq!(group.patches()[0].value(), MemberValue::Float(1.0));
    }

    #[test]
    fn test_multiply_patches_compose() {
        let mut group = ConverterObjectGroup::new(GroupId::tech(22), "Supremacy");
        for factor in [1.5, 2.0] {
            group
                .register_patch(patch(
                    "Knight.Move.speed",
                    MemberOperator::Multiply,
                    MemberValue::Float(factor),
                ))
                .unwrap();
        }

        assert_eq!(group.len(), 1);
        assert_eq!(group.patches()[0].value(), MemberValue::Float(3.0));
    }

    #[test]
    fn test_different_operators_stay_separate() {
        let mut group = ConverterObjectGroup::new(GroupId::tech(22), "Supremacy");
        let one = MemberValue::Float(1.0);
        group.register_patch(patch("Knight.Move.speed", MemberOperator::Add, one)).unwrap();
        group.register_patch(patch("Knight.Move.speed", MemberOperator::Multiply, one)).unwrap();
        group.register_patch(patch("Archer.Move.speed", MemberOperator::Add, one)).unwrap();

        assert_eq!(group.len(), 3);
        let operators: Vec<_> = group.patches().iter().map(|p| p.operator()).collect();
        assert_eq!(
            operators,
            vec![
                MemberOperator::Add,
                MemberOperator::Multiply,
                MemberOperator::Add
            ]
        );
    }

    #[test]
    fn test_divide_folding_to_zero_is_rejected() {
        let mut group = ConverterObjectGroup::new(GroupId::tech(22), "Supremacy");
        let p = patch(
            "ManAtArms.Regenerate.rate",
            MemberOperator::Divide,
            MemberValue::Float(1e-200),
        );

        group.register_patch(p.clone()).unwrap();
        assert_eq!(group.register_patch(p), Err(OperatorError::DivisionByZero));
        assert_eq!(group.len(), 1);
        assert_eq!(group.patches()[0].value(), MemberValue::Float(1e-200));
    }

    #[test]
    fn test_multiply_folding_to_infinity_is_rejected() {
        let mut group = ConverterObjectGroup::new(GroupId::tech(22), "Supremacy");
        let p = patch(
            "ManAtArms.Regenerate.rate",
            MemberOperator::Multiply,
            MemberValue::Float(1e200),
        );

        group.register_patch(p.clone()).unwrap();
        assert_eq!(
            group.register_patch(p),
            Err(OperatorError::NonFinite(MemberValue::Float(f64::INFINITY)))
        );
        assert_eq!(group.patches()[0].value(), MemberValue::Float(1e200));
    }

    #[test]
    fn test_merged_patch_keeps_team_flag() {
        let mut group = ConverterObjectGroup::new(GroupId::tech(22), "Supremacy");
        let target = ForwardRef::new(GroupId::tech(22), "Villager.Regenerate.rate");
        for team_wide in [false, true] {
            let p = Patch::new(
                target.clone(),
                "rate",
                MemberOperator::Assign,
                MemberValue::Float(2.0),
                team_wide,
            )
            .unwrap();
            group.register_patch(p).unwrap();
        }

        assert_eq!(group.len(), 1);
        assert!(group.patches()[0].is_team_wide());
    }

    #[test]
    fn test_affected_lines() {
        let mut group = ConverterObjectGroup::new(GroupId::civ(1), "Britons");
        group.mark_affected(LineId(4));
        group.mark_affected(LineId(4));
        group.mark_affected(LineId(74));

        let lines: Vec<_> = group.affected_lines().iter().copied().collect();
        assert_eq!(lines, vec![LineId(4), LineId(74)]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_repeated_add_folds_into_one_patch(
                values in proptest::collection::vec(-100..100i64, 1..20)
            ) {
                let mut group = ConverterObjectGroup::new(GroupId::tech(1), "t");
                for v in &values {
                    let outcome = group.register_patch(patch(
                        "Militia.Live.HP.max_value",
                        MemberOperator::Add,
                        MemberValue::Int(*v),
                    ));
                    prop_assert!(outcome.is_ok());
                }
                prop_assert_eq!(group.len(), 1);
                prop_assert_eq!(group.patches()[0].value(), MemberValue::Int(values.iter().sum()));
            }
        }
    }
}
