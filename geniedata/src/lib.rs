//! Legacy Genie engine records as handed over by the ingestion stage.
//!
//! Everything here is read-only input for the patch converter: entity lines
//! group unit/building variants, and effect records are the flat rows of the
//! tech and civilization effect tables.

pub mod effects;
pub mod loader;
pub mod units;

pub use effects::{EffectCommand, EffectRecord, RawCommandError};
pub use loader::{LoadError, load_effects, load_lines};
pub use units::{AbilityId, EntityVariant, GameEntityLine, LineId};
