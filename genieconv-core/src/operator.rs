//! Member operators and the numeric value domain they act on.
//!
//! A patch never stores the final member value. It stores an operator and an
//! operand, and the target model combines them with the member's current
//! value when the patch is applied.

use geniedata::EffectCommand;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum OperatorError {
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Operand {0} is not finite")]
    NonFinite(MemberValue),
}

/// Numeric member value.
///
/// Legacy fields are small integers or `f32`; both widen losslessly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemberValue {
    Int(i64),
    Float(f64),
}

impl MemberValue {
    /// Widen a legacy effect amount.
    pub fn from_legacy(amount: f32) -> Self {
        MemberValue::Float(f64::from(amount))
    }

    pub fn as_f64(self) -> f64 {
        match self {
            MemberValue::Int(v) => v as f64,
            MemberValue::Float(v) => v,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            MemberValue::Int(v) => v == 0,
            MemberValue::Float(v) => v == 0.0,
        }
    }

    pub fn is_negative(self) -> bool {
        match self {
            MemberValue::Int(v) => v < 0,
            MemberValue::Float(v) => v < 0.0,
        }
    }

    /// True for integers and for finite floats without a fractional part.
    pub fn is_integral(self) -> bool {
        match self {
            MemberValue::Int(_) => true,
            MemberValue::Float(v) => v.is_finite() && v.fract() == 0.0,
        }
    }

    /// Convert into the numeric kind of `other`. Floats truncate toward zero.
    fn coerce_like(self, other: MemberValue) -> MemberValue {
        match (self, other) {
            (MemberValue::Float(v), MemberValue::Int(_)) => MemberValue::Int(v.trunc() as i64),
            (MemberValue::Int(v), MemberValue::Float(_)) => MemberValue::Float(v as f64),
            _ => self,
        }
    }

    fn combine(
        self,
        other: MemberValue,
        int_op: fn(i64, i64) -> i64,
        float_op: fn(f64, f64) -> f64,
    ) -> MemberValue {
        match (self, other) {
            (MemberValue::Int(a), MemberValue::Int(b)) => MemberValue::Int(int_op(a, b)),
            _ => MemberValue::Float(float_op(self.as_f64(), other.as_f64())),
        }
    }
}

impl fmt::Display for MemberValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberValue::Int(v) => write!(f, "{}", v),
            MemberValue::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for MemberValue {
    fn from(v: i64) -> Self {
        MemberValue::Int(v)
    }
}

impl From<f64> for MemberValue {
    fn from(v: f64) -> Self {
        MemberValue::Float(v)
    }
}

/// How a patch operand combines with the member's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberOperator {
    /// Replace, keeping the member's numeric kind.
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
    /// Replace without any type compatibility check.
    Override,
}

impl MemberOperator {
    pub const ALL: [MemberOperator; 6] = [
        MemberOperator::Assign,
        MemberOperator::Add,
        MemberOperator::Subtract,
        MemberOperator::Multiply,
        MemberOperator::Divide,
        MemberOperator::Override,
    ];

    /// Operator symbol in the target model's text format.
    pub fn symbol(self) -> &'static str {
        match self {
            MemberOperator::Assign => "=",
            MemberOperator::Add => "+=",
            MemberOperator::Subtract => "-=",
            MemberOperator::Multiply => "*=",
            MemberOperator::Divide => "/=",
            MemberOperator::Override => "@=",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == s)
    }

    /// Operators whose repeated patches fold into one combined operand.
    pub fn is_accumulating(self) -> bool {
        matches!(
            self,
            MemberOperator::Add
                | MemberOperator::Subtract
                | MemberOperator::Multiply
                | MemberOperator::Divide
        )
    }

    /// Combine `current` with the patch operand `value`.
    pub fn apply(
        self,
        current: MemberValue,
        value: MemberValue,
    ) -> Result<MemberValue, OperatorError> {
        let result = match self {
            MemberOperator::Assign => value.coerce_like(current),
            MemberOperator::Override => value,
            MemberOperator::Add => current.combine(value, i64::saturating_add, |a, b| a + b),
            MemberOperator::Subtract => current.combine(value, i64::saturating_sub, |a, b| a - b),
            MemberOperator::Multiply => current.combine(value, i64::saturating_mul, |a, b| a * b),
            MemberOperator::Divide => {
                if value.is_zero() {
                    return Err(OperatorError::DivisionByZero);
                }
                current.combine(value, i64::saturating_div, |a, b| a / b)
            }
        };
        Ok(result)
    }

    /// Fold two operands of this operator into one.
    ///
    /// Applying the result once is equivalent to applying `first` then
    /// `second`: sums for Add/Subtract, products for Multiply/Divide.
    /// Replacing operators keep the later operand.
    pub fn compose(self, first: MemberValue, second: MemberValue) -> MemberValue {
        match self {
            MemberOperator::Assign | MemberOperator::Override => second,
            MemberOperator::Add | MemberOperator::Subtract => {
                first.combine(second, i64::saturating_add, |a, b| a + b)
            }
            MemberOperator::Multiply | MemberOperator::Divide => {
                first.combine(second, i64::saturating_mul, |a, b| a * b)
            }
        }
    }
}

impl fmt::Display for MemberOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl From<EffectCommand> for MemberOperator {
    fn from(command: EffectCommand) -> Self {
        match command {
            EffectCommand::AttributeSet => MemberOperator::Assign,
            EffectCommand::AttributeAdd => MemberOperator::Add,
            EffectCommand::AttributeMultiply => MemberOperator::Multiply,
        }
    }
}
