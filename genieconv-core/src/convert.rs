//! Conversion driver: turns a group's legacy effect records into patches.
//!
//! Per-effect failures (bad value domain, division by zero) are collected
//! into a [`ConversionReport`] so one run surfaces every problem. Dispatch
//! failures (unknown command type or attribute id) mean the dispatch table
//! does not cover the data and stop the run.

use crate::config::ConvertConfig;
use crate::dispatch::{DispatchError, EffectId};
use crate::forward_ref::ForwardRef;
use crate::group::GroupId;
use crate::operator::{MemberOperator, MemberValue};
use crate::registry::GroupRegistry;
use crate::subprocessors::{EffectError, PatchContext};
use geniedata::{EffectCommand, EffectRecord, GameEntityLine, LineId};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::instrument;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("Effect record {record} of {group}: {source}")]
    Dispatch {
        group: GroupId,
        record: usize,
        source: DispatchError,
    },
    #[error("Effect record {record} of {group} failed: {source}")]
    Effect {
        group: GroupId,
        record: usize,
        source: EffectError,
    },
}

/// One effect that could not be converted for one line.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectFailure {
    /// Position of the record in the group's effect table.
    pub record: usize,
    pub effect: EffectId,
    pub line: LineId,
    pub error: EffectError,
}

/// Failures and generated reference counts, per group.
#[derive(Debug, Clone, Default)]
pub struct ConversionReport {
    failures: BTreeMap<GroupId, Vec<EffectFailure>>,
    generated: BTreeMap<GroupId, usize>,
}

impl ConversionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_failure(&mut self, group: GroupId, failure: EffectFailure) {
        self.failures.entry(group).or_default().push(failure);
    }

    pub fn record_generated(&mut self, group: GroupId, count: usize) {
        *self.generated.entry(group).or_default() += count;
    }

    pub fn failures(&self, group: GroupId) -> &[EffectFailure] {
        self.failures.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn failure_count(&self) -> usize {
        self.failures.values().map(Vec::len).sum()
    }

    pub fn generated_count(&self, group: GroupId) -> usize {
        self.generated.get(&group).copied().unwrap_or(0)
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary, listing at most `limit` failures.
    pub fn summary(&self, limit: usize) -> String {
        let references: usize = self.generated.values().sum();
        let mut report = format!(
            "Conversion report: {} groups, {} references, {} failed effects\n",
            self.generated.len(),
            references,
            self.failure_count()
        );

        let mut listed = 0;
        for (group, failures) in &self.failures {
            if listed == limit {
                break;
            }
            report.push_str(&format!("  {:12} {:4} failed\n", group.to_string(), failures.len()));
            for failure in failures {
                if listed == limit {
                    break;
                }
                report.push_str(&format!(
                    "    record {:3} {} on {}: {}\n",
                    failure.record, failure.effect, failure.line, failure.error
                ));
                listed += 1;
            }
        }
        if self.failure_count() > listed {
            report.push_str(&format!("  ... and {} more\n", self.failure_count() - listed));
        }
        report
    }

    /// [`Self::summary`] capped at the configured `report_limit`.
    pub fn summary_for(&self, config: &ConvertConfig) -> String {
        self.summary(config.report_limit)
    }
}

/// Lines an effect record applies to: by unit id if set, else by class.
fn target_lines<'l>(record: &EffectRecord, lines: &'l [GameEntityLine]) -> Vec<&'l GameEntityLine> {
    match (record.target_unit(), record.target_class()) {
        (Some(unit), _) => lines.iter().filter(|l| l.contains_unit(unit)).collect(),
        (None, Some(class)) => lines.iter().filter(|l| l.has_class(class)).collect(),
        (None, None) => Vec::new(),
    }
}

/// Convert every effect record of `group` against the entity lines.
///
/// Returns the forward references created, in record order.
#[instrument(skip_all, name = "convert_effects", fields(group = %group))]
pub fn convert_group_effects(
    registry: &mut GroupRegistry,
    group: GroupId,
    records: &[EffectRecord],
    lines: &[GameEntityLine],
    config: &ConvertConfig,
    report: &mut ConversionReport,
) -> Result<Vec<ForwardRef>, ConvertError> {
    let mut refs = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let dispatch_error = |source: DispatchError| ConvertError::Dispatch {
            group,
            record: index,
            source,
        };
        let (command, team) =
            EffectCommand::decode(record.command_type).map_err(|e| dispatch_error(e.into()))?;
        let effect = EffectId::from_raw(record.attribute_id).map_err(dispatch_error)?;
        let operator = MemberOperator::from(command);
        let value = MemberValue::from_legacy(record.amount);
        let subprocessor = effect.subprocessor();

        let targets = target_lines(record, lines);
        if targets.is_empty() {
            log::debug!("Effect record {} of {} matches no entity line", index, group);
        }

        for line in targets {
            let mut ctx = PatchContext::new(group, registry);
            match subprocessor(&mut ctx, line, value, operator, team) {
                Ok(created) => refs.extend(created),
                Err(error) => {
                    log::warn!("{}: {} on {} failed: {}", group, effect, line.id(), error);
                    report.record_failure(
                        group,
                        EffectFailure {
                            record: index,
                            effect,
                            line: line.id(),
                            error: error.clone(),
                        },
                    );
                    if config.fail_fast {
                        return Err(ConvertError::Effect {
                            group,
                            record: index,
                            source: error,
                        });
                    }
                }
            }
        }
    }

    report.record_generated(group, refs.len());
    log::debug!(
        "{}: {} effect records produced {} forward references",
        group,
        records.len(),
        refs.len()
    );
    Ok(refs)
}

#[cfg(test)]
#[path = "convert_tests.rs"]
mod tests;
