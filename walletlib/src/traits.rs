//! Порты: хранилище коллекций, проверка KYC, форматы экспорта/импорта.

use crate::{
    error::Result,
    model::{KycStatus, Ledger},
};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::io::{BufRead, Write};

/// Ключ коллекции в хранилище.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKey {
    Payouts,
    Withdrawals,
    Kyc,
}

impl CollectionKey {
    pub const ALL: [CollectionKey; 3] = [CollectionKey::Payouts, CollectionKey::Withdrawals, CollectionKey::Kyc];

    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKey::Payouts => "clipverse_payouts",
            CollectionKey::Withdrawals => "clipverse_withdrawals",
            CollectionKey::Kyc => "clipverse_kyc",
        }
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Хранилище коллекций записей. Отсутствующий ключ читается как пустая коллекция;
/// `save` перезаписывает коллекцию целиком (последняя запись побеждает).
pub trait RecordStore {
    fn load<T: DeserializeOwned>(&self, key: CollectionKey) -> Result<Vec<T>>;
    fn save<T: Serialize>(&self, key: CollectionKey, records: &[T]) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

impl<S: RecordStore> RecordStore for &S {
    fn load<T: DeserializeOwned>(&self, key: CollectionKey) -> Result<Vec<T>> {
        (**self).load(key)
    }

    fn save<T: Serialize>(&self, key: CollectionKey, records: &[T]) -> Result<()> {
        (**self).save(key, records)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

/// Внешняя проверка личности (KYC).
pub trait VerificationService {
    fn kyc_status(&self) -> Result<KycStatus>;
}

impl<V: VerificationService> VerificationService for &V {
    fn kyc_status(&self) -> Result<KycStatus> {
        (**self).kyc_status()
    }
}

pub trait ReadFormat {
    fn read<R: BufRead>(r: R) -> Result<Ledger>;
}

pub trait WriteFormat {
    fn write<W: Write>(w: W, ledger: &Ledger) -> Result<()>;
}

pub trait Format: ReadFormat + WriteFormat {}
impl<T: ReadFormat + WriteFormat> Format for T {}
