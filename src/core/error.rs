use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalcError {
    #[error("{field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("invalid bracket table: {0}")]
    InvalidBracketTable(String),

    #[error("schedule configuration: {0}")]
    Config(String),
}

impl CalcError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type CalcResult<T> = Result<T, CalcError>;
