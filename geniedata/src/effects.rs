//! Tech and civilization effect table rows.
//!
//! A legacy effect is a flat tuple: command type, target unit, target class,
//! attribute id and amount. Only the attribute-modifying commands are decoded
//! here; resource and tech-cost commands are handled by other converters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Attribute-modifying effect command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectCommand {
    /// Set the attribute to the amount.
    AttributeSet,
    /// Add the amount to the attribute.
    AttributeAdd,
    /// Multiply the attribute by the amount.
    AttributeMultiply,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawCommandError {
    #[error("Effect command type {0} is not an attribute modification")]
    NotAttributeCommand(u8),
}

impl EffectCommand {
    /// Decode a raw command type into the command and its team flag.
    ///
    /// Types 0/4/5 apply to the owning player, 10/14/15 are the team
    /// variants introduced by the Definitive Edition data files.
    pub fn decode(type_id: u8) -> Result<(Self, bool), RawCommandError> {
        match type_id {
            0 => Ok((Self::AttributeSet, false)),
            4 => Ok((Self::AttributeAdd, false)),
            5 => Ok((Self::AttributeMultiply, false)),
            10 => Ok((Self::AttributeSet, true)),
            14 => Ok((Self::AttributeAdd, true)),
            15 => Ok((Self::AttributeMultiply, true)),
            other => Err(RawCommandError::NotAttributeCommand(other)),
        }
    }

    /// Raw command type for this command.
    pub fn raw_id(self, team: bool) -> u8 {
        let base = match self {
            Self::AttributeSet => 0,
            Self::AttributeAdd => 4,
            Self::AttributeMultiply => 5,
        };
        if team { base + 10 } else { base }
    }
}

/// One row of an effect table.
///
/// Negative ids mean "not set", matching the legacy `-1` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectRecord {
    pub command_type: u8,
    #[serde(default = "unset")]
    pub unit_id: i16,
    #[serde(default = "unset")]
    pub class_id: i16,
    pub attribute_id: i16,
    pub amount: f32,
}

fn unset() -> i16 {
    -1
}

impl EffectRecord {
    /// Unit targeted by this effect, if any.
    pub fn target_unit(&self) -> Option<u16> {
        u16::try_from(self.unit_id).ok()
    }

    /// Unit class targeted by this effect, if any.
    pub fn target_class(&self) -> Option<u16> {
        u16::try_from(self.class_id).ok()
    }
}
