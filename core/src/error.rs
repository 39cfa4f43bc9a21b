use thiserror::Error;

use crate::oracle::OracleError;

/// Why an isochrone computation failed. Every variant is fatal; no partial
/// polygon is ever returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("oracle failure: {0}")]
    OracleFailure(#[from] OracleError),
    #[error("search did not converge within {rounds} rounds")]
    ConvergenceTimeout { rounds: u32 },
}

impl CoreError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        CoreError::InvalidInput(message.into())
    }

    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, CoreError::InvalidInput(_))
    }

    #[must_use]
    pub const fn is_oracle_failure(&self) -> bool {
        matches!(self, CoreError::OracleFailure(_))
    }
}
