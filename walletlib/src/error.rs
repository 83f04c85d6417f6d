//! Единый тип ошибок публичного API.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Config error: {0}")]
    Config(#[from] ::config::ConfigError),

    /// Ошибка ввода, исправимая пользователем.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// Запись уже не в том статусе, из которого разрешён переход.
    #[error("{id}: expected status {expected}, found {actual}")]
    Conflict {
        id: String,
        expected: String,
        actual: String,
    },

    #[error("ledger is overdrawn: balance {balance}")]
    Overdrawn { balance: Decimal },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl WalletError {
    /// Повтор имеет смысл только для сбоев хранилища.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WalletError::Io(_) | WalletError::Storage(_))
    }

    /// HTTP-эквивалент класса ошибки.
    pub fn http_status(&self) -> u16 {
        match self {
            WalletError::Validation(_) | WalletError::Parse(_) => 400,
            WalletError::NotFound { .. } => 404,
            WalletError::Conflict { .. } => 409,
            _ => 500,
        }
    }

    pub(crate) fn conflict(id: impl ToString, expected: impl ToString, actual: impl ToString) -> Self {
        WalletError::Conflict {
            id: id.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;
