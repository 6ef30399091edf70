use std::fmt;

use serde_json::Value;

use crate::{Error, Result};

/// Upper bound on the number of results a query returns.
///
/// Any non-negative integer is accepted and passed through unchanged, zero
/// included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Limit(u64);

impl Limit {
    pub const fn new(limit: u64) -> Self {
        Self(limit)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Limit {
    fn from(limit: u64) -> Self {
        Self(limit)
    }
}

impl From<u32> for Limit {
    fn from(limit: u32) -> Self {
        Self(limit.into())
    }
}

impl From<usize> for Limit {
    fn from(limit: usize) -> Self {
        Self(limit as u64)
    }
}

impl TryFrom<&Value> for Limit {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        check_limit(value)?.ok_or_else(|| invalid(value))
    }
}

fn invalid(value: &Value) -> Error {
    Error::InvalidArgument(format!("Limit ({}) must be an integer", value))
}

/// Strict type gate for loosely typed limits: only JSON integers pass.
///
/// `null` means "no limit". Floats (even `5.0`), numeric strings and
/// negative numbers are rejected, nothing is coerced.
pub fn check_limit(value: &Value) -> Result<Option<Limit>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_u64().map(|n| Some(Limit(n))).ok_or_else(|| invalid(value)),
        _ => Err(invalid(value)),
    }
}
