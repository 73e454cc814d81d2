//! The resolution pass.
//!
//! Generation and resolution are two explicit phases. While the pass is
//! [`PassState::Open`] subprocessors may register patches through it; once
//! closed, no further registration is accepted and every patch target is
//! looked up in the identity registry. Any reference that cannot be found
//! fails the whole run, since the emitted model would be structurally broken.

use crate::config::ConvertConfig;
use crate::forward_ref::IdentityRegistry;
use crate::group::{ConverterObjectGroup, GroupId};
use crate::patch::ResolvedPatch;
use crate::registry::GroupRegistry;
use crate::subprocessors::PatchContext;
use geniedata::LineId;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    Open,
    Closed,
}

/// A forward reference no materialized object answers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnresolvedRef {
    pub group: GroupId,
    pub object_path: String,
}

impl fmt::Display for UnresolvedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.object_path)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("{} unresolved forward reference(s): {}", .refs.len(), list_refs(.refs))]
    Unresolved { refs: Vec<UnresolvedRef> },
    #[error("Resolution pass is closed, no further patches can be registered")]
    PassClosed,
    #[error("Resolution pass is still open")]
    PassOpen,
}

fn list_refs(refs: &[UnresolvedRef]) -> String {
    const SHOWN: usize = 5;
    let mut listed: Vec<String> = refs.iter().take(SHOWN).map(|r| r.to_string()).collect();
    if refs.len() > SHOWN {
        listed.push(format!("... and {} more", refs.len() - SHOWN));
    }
    listed.join(", ")
}

/// A group with every patch bound to a concrete object.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedGroup {
    pub id: GroupId,
    pub name: String,
    pub patches: Vec<ResolvedPatch>,
    pub affected_lines: BTreeSet<LineId>,
}

/// Two-phase driver owning the groups of one conversion run.
#[derive(Debug)]
pub struct ResolutionPass {
    state: PassState,
    registry: GroupRegistry,
    parallel: bool,
}

impl ResolutionPass {
    pub fn new(registry: GroupRegistry) -> Self {
        Self {
            state: PassState::Open,
            registry,
            parallel: true,
        }
    }

    pub fn with_config(registry: GroupRegistry, config: &ConvertConfig) -> Self {
        Self {
            parallel: config.parallel_resolution,
            ..Self::new(registry)
        }
    }

    pub fn state(&self) -> PassState {
        self.state
    }

    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    /// Mutable access for generation. Refused once the pass is closed.
    pub fn registry_mut(&mut self) -> Result<&mut GroupRegistry, ResolutionError> {
        match self.state {
            PassState::Open => Ok(&mut self.registry),
            PassState::Closed => Err(ResolutionError::PassClosed),
        }
    }

    /// Subprocessor context for `group`. Refused once the pass is closed.
    pub fn context(&mut self, group: GroupId) -> Result<PatchContext<'_>, ResolutionError> {
        Ok(PatchContext::new(group, self.registry_mut()?))
    }

    /// Stop accepting patches. Closing twice is harmless.
    pub fn close(&mut self) {
        if self.state == PassState::Open {
            log::info!(
                "Closing resolution pass: {} groups, {} patches",
                self.registry.len(),
                self.registry.patch_count()
            );
            self.state = PassState::Closed;
        }
    }

    /// Every distinct reference the registry cannot answer, sorted.
    pub fn unresolved(&self, identities: &IdentityRegistry) -> Vec<UnresolvedRef> {
        let missing: BTreeSet<UnresolvedRef> = self
            .registry
            .iter()
            .filter_map(|group| resolve_group(group, identities).err())
            .flatten()
            .collect();
        missing.into_iter().collect()
    }

    /// Resolve every patch of every group.
    ///
    /// Only reads `self` and `identities`, so running it again against the
    /// same registry gives the same result.
    #[instrument(skip_all, name = "resolve")]
    pub fn resolve(
        &self,
        identities: &IdentityRegistry,
    ) -> Result<Vec<ResolvedGroup>, ResolutionError> {
        if self.state == PassState::Open {
            return Err(ResolutionError::PassOpen);
        }

        let groups: Vec<&ConverterObjectGroup> = self.registry.iter().collect();
        let results: Vec<_> = if self.parallel {
            let _span = tracing::info_span!("groups_parallel", count = groups.len()).entered();
            groups
                .into_par_iter()
                .map(|group| resolve_group(group, identities))
                .collect()
        } else {
            groups
                .into_iter()
                .map(|group| resolve_group(group, identities))
                .collect()
        };

        let mut resolved = Vec::with_capacity(results.len());
        let mut missing = BTreeSet::new();
        for result in results {
            match result {
                Ok(group) => resolved.push(group),
                Err(refs) => missing.extend(refs),
            }
        }

        if !missing.is_empty() {
            let refs: Vec<UnresolvedRef> = missing.into_iter().collect();
            log::error!("{} forward references left unresolved", refs.len());
            return Err(ResolutionError::Unresolved { refs });
        }

        let patches: usize = resolved.iter().map(|g| g.patches.len()).sum();
        log::info!("Resolved {} patches across {} groups", patches, resolved.len());
        Ok(resolved)
    }

    pub fn into_registry(self) -> GroupRegistry {
        self.registry
    }
}

fn resolve_group(
    group: &ConverterObjectGroup,
    identities: &IdentityRegistry,
) -> Result<ResolvedGroup, Vec<UnresolvedRef>> {
    let mut patches = Vec::with_capacity(group.len());
    let mut missing = Vec::new();

    for patch in group.patches() {
        match identities.resolve(patch.target()) {
            Some(target) => patches.push(patch.resolve(target)),
            None => missing.push(UnresolvedRef {
                group: patch.target().group(),
                object_path: patch.target().object_path().to_string(),
            }),
        }
    }

    if !missing.is_empty() {
        return Err(missing);
    }
    Ok(ResolvedGroup {
        id: group.id(),
        name: group.name().to_string(),
        patches,
        affected_lines: group.affected_lines().clone(),
    })
}
