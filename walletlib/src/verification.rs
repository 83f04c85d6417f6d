//! Граница с внешней проверкой личности (KYC).

use crate::{
    error::Result,
    model::{KycRecord, KycStatus},
    traits::{CollectionKey, RecordStore, VerificationService},
};

/// Фиксированный статус — для тестов и для отключённой проверки.
#[derive(Debug, Clone, Copy)]
pub struct StaticVerification(pub KycStatus);

impl VerificationService for StaticVerification {
    fn kyc_status(&self) -> Result<KycStatus> {
        Ok(self.0)
    }
}

/// Берёт статус последней поданной KYC-заявки из хранилища.
#[derive(Debug, Clone)]
pub struct StoredVerification<S> {
    store: S,
}

impl<S: RecordStore> StoredVerification<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn submit(&self, record: KycRecord) -> Result<()> {
        let mut records: Vec<KycRecord> = self.store.load(CollectionKey::Kyc)?;
        records.push(record);
        self.store.save(CollectionKey::Kyc, &records)
    }
}

impl<S: RecordStore> VerificationService for StoredVerification<S> {
    fn kyc_status(&self) -> Result<KycStatus> {
        let records: Vec<KycRecord> = self.store.load(CollectionKey::Kyc)?;
        Ok(records
            .iter()
            .max_by_key(|r| r.submitted_at)
            .map(|r| r.status)
            .unwrap_or(KycStatus::NotStarted))
    }
}
