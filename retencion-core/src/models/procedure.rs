use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when converting a number into a [`Procedure`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProcedureError {
    #[error("unknown withholding procedure {0} (expected 1 or 2)")]
    Unknown(u8),
}

/// Statutory withholding method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Procedure {
    /// Procedure 1: bracket table applied to each month's own base.
    One,
    /// Procedure 2: fixed rate from a reference period applied to each month's base.
    Two,
}

impl Procedure {
    pub fn number(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

impl TryFrom<u8> for Procedure {
    type Error = ProcedureError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(ProcedureError::Unknown(other)),
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "Procedure {}", self.number())
    }
}

/// The rule that produced a Procedure 2 rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateSource {
    /// Rate entered by the user.
    Manual,
    /// Ratio of table withholding to base on the historical reference income.
    Historical,
    /// Same ratio computed on the current month, used when nothing else is set.
    CurrentMonth,
}

impl fmt::Display for RateSource {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let label = match self {
            Self::Manual => "manual",
            Self::Historical => "historical income",
            Self::CurrentMonth => "current month",
        };
        f.write_str(label)
    }
}
