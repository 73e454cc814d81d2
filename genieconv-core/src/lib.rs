//! # Genie Conversion Core
//!
//! Turns legacy attribute effects (tech upgrades, civ bonuses) into patches
//! over a data-driven object model that is still being built while the
//! patches are generated.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌────────────────┐
//! │ EffectRecord │────▶│  dispatch    │────▶│ subprocessor   │
//! │ (legacy row) │     │ (EffectId)   │     │ (per effect)   │
//! └──────────────┘     └──────────────┘     └───────┬────────┘
//!                                                   │ Patch + ForwardRef
//!                      ┌──────────────┐     ┌───────▼────────┐
//!                      │ Resolution   │◀────│ GroupRegistry  │
//!                      │ Pass (close) │     │ (tech/civ)     │
//!                      └──────┬───────┘     └────────────────┘
//!                             │ IdentityRegistry lookup
//!                      ┌──────▼───────┐
//!                      │ResolvedGroup │──▶ serializer
//!                      └──────────────┘
//! ```
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`MemberOperator`] | `=`, `+=`, `-=`, `*=`, `/=`, `@=` and their arithmetic |
//! | [`ForwardRef`] | Handle to an object that may not exist yet |
//! | [`ConverterObjectGroup`] | Patches owned by one tech or civ |
//! | [`GroupRegistry`] | All groups of a run plus the alliance relation |
//! | [`EffectId`] | Closed dispatch table of supported attribute effects |
//! | [`convert_group_effects`] | Runs a group's effect table through the subprocessors |
//! | [`ResolutionPass`] | Open/closed protocol that binds every reference or fails |
//!
//! ## Two phases
//!
//! 1. While the [`ResolutionPass`] is open, effects are converted and patches
//!    registered. Nothing is resolved yet.
//! 2. After [`ResolutionPass::close`], [`ResolutionPass::resolve`] looks every
//!    patch target up in the [`IdentityRegistry`]. A single unresolved
//!    reference fails the run and the caller discards all results.

pub mod config;
pub mod convert;
pub mod dispatch;
pub mod forward_ref;
pub mod group;
pub mod operator;
pub mod patch;
pub mod registry;
pub mod resolution;
pub mod subprocessors;
pub mod testing;

pub use config::ConvertConfig;
pub use convert::{convert_group_effects, ConversionReport, ConvertError, EffectFailure};
pub use dispatch::{DispatchError, EffectId};
pub use forward_ref::{ForwardRef, IdentityRegistry, ObjectId, ResolvedTarget};
pub use group::{ConverterObjectGroup, GroupId, GroupKind, Registration};
pub use operator::{MemberOperator, MemberValue, OperatorError};
pub use patch::{Patch, ResolvedPatch};
pub use registry::GroupRegistry;
pub use resolution::{PassState, ResolutionError, ResolutionPass, ResolvedGroup, UnresolvedRef};
pub use subprocessors::{EffectError, PatchContext, Subprocessor};
