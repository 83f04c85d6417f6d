//! Настройки леджера: файл TOML (необязательный) + переменные окружения
//! `CLIPVERSE__*`.

use chrono::Weekday;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{
    error::{Result, WalletError},
    ledger::{PAYOUT_HOUR, PAYOUT_WEEKDAY},
};

pub const CONFIG_ENV_PREFIX: &str = "CLIPVERSE";
pub const LOG_ENV_VAR: &str = "CLIPVERSE_LOG";
pub const DEFAULT_DATA_DIR: &str = ".clipverse";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LedgerConfig {
    /// Минимальная сумма вывода.
    pub min_withdrawal: Decimal,
    /// Требовать подтверждённый KYC для вывода.
    pub require_kyc: bool,
    pub payout_weekday: Weekday,
    pub payout_hour: u32,
    pub data_dir: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            min_withdrawal: Decimal::TEN,
            require_kyc: false,
            payout_weekday: PAYOUT_WEEKDAY,
            payout_hour: PAYOUT_HOUR,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl LedgerConfig {
    /// Файл (если задан) перекрывается окружением.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(p) = path {
            builder = builder.add_source(::config::File::from(p).required(true));
        }
        let cfg: LedgerConfig = builder
            .add_source(::config::Environment::with_prefix(CONFIG_ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_withdrawal < Decimal::ZERO {
            return Err(WalletError::Validation(format!(
                "min_withdrawal must not be negative: {}",
                self.min_withdrawal
            )));
        }
        if self.payout_hour > 23 {
            return Err(WalletError::Validation(format!("payout_hour out of range: {}", self.payout_hour)));
        }
        Ok(())
    }
}
