//! walletlib — леджер кошелька креатора: выплаты за клипы, выводы средств,
//! производные балансы и статистика.

pub mod config;
pub mod error;
pub mod ledger;
pub mod model;
pub mod service;
pub mod traits;
pub mod transitions;
pub mod verification;

pub mod stores {
    pub mod json_dir;
    pub mod memory;
}

pub mod formats {
    pub mod csv;
    pub mod json;
    pub mod xml;
}

pub use error::{Result, WalletError};
pub use service::WalletService;
