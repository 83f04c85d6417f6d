//! Операции над записями кошелька поверх `RecordStore`.
//!
//! Каждая мутация: загрузить коллекцию, найти запись по id, проверить исходный
//! статус, изменить, сохранить коллекцию целиком.

use chrono::{DateTime, Local, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::LedgerConfig,
    error::{Result, WalletError},
    ledger::{compute_payout_stats, compute_wallet_summary, next_payout_date_on},
    model::{
        KycStatus, Ledger, PayoutRecord, PayoutStats, PayoutStatus, Platform, WalletSummary, WithdrawalMethod,
        WithdrawalRecord, WithdrawalStatus,
    },
    traits::{CollectionKey, RecordStore, VerificationService},
    transitions::Reconcile,
};

/// Верхняя граница суммы одной записи; суммы по леджеру не переполняют `Decimal`.
pub const MAX_RECORD_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

pub struct WalletService<S, V> {
    store: S,
    verifier: V,
    config: LedgerConfig,
}

fn validation(msg: impl Into<String>) -> WalletError {
    let msg = msg.into();
    warn!(reason = %msg, "request rejected");
    WalletError::Validation(msg)
}

fn validate_amount(kind: &str, amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(validation(format!("{kind} amount must be positive: {amount}")));
    }
    if amount > MAX_RECORD_AMOUNT {
        return Err(validation(format!("{kind} amount exceeds {MAX_RECORD_AMOUNT}: {amount}")));
    }
    Ok(())
}

fn find_mut<'a, T>(
    records: &'a mut [T],
    id: Uuid,
    kind: &'static str,
    id_of: impl Fn(&T) -> Uuid,
) -> Result<&'a mut T> {
    records
        .iter_mut()
        .find(|r| id_of(r) == id)
        .ok_or_else(|| WalletError::NotFound { kind, id: id.to_string() })
}

impl<S: RecordStore, V: VerificationService> WalletService<S, V> {
    pub fn new(store: S, verifier: V, config: LedgerConfig) -> Self {
        Self { store, verifier, config }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn payouts(&self) -> Result<Vec<PayoutRecord>> {
        self.store.load(CollectionKey::Payouts)
    }

    pub fn withdrawals(&self) -> Result<Vec<WithdrawalRecord>> {
        self.store.load(CollectionKey::Withdrawals)
    }

    pub fn ledger(&self) -> Result<Ledger> {
        Ok(Ledger {
            payouts: self.payouts()?,
            withdrawals: self.withdrawals()?,
        })
    }

    pub fn summary(&self) -> Result<WalletSummary> {
        compute_wallet_summary(&self.payouts()?, &self.withdrawals()?)
    }

    pub fn stats(&self) -> Result<PayoutStats> {
        Ok(compute_payout_stats(&self.payouts()?))
    }

    pub fn next_payout(&self, reference: DateTime<Local>) -> Result<DateTime<Local>> {
        next_payout_date_on(&reference, self.config.payout_weekday, self.config.payout_hour)
    }

    // ---------- выплаты ----------

    pub fn submit_payout(
        &self,
        campaign_id: &str,
        amount: Decimal,
        platform: Platform,
        at: DateTime<Utc>,
    ) -> Result<PayoutRecord> {
        if campaign_id.trim().is_empty() {
            return Err(validation("campaign id is required"));
        }
        validate_amount("payout", amount)?;
        let record = PayoutRecord::new(campaign_id.trim(), amount, platform, at);
        let mut payouts = self.payouts()?;
        payouts.push(record.clone());
        self.store.save(CollectionKey::Payouts, &payouts)?;
        info!(id = %record.id, campaign = %record.campaign_id, %amount, %platform, "payout submitted");
        Ok(record)
    }

    fn update_payout(&self, id: Uuid, f: impl FnOnce(&mut PayoutRecord) -> Result<()>) -> Result<PayoutRecord> {
        let mut payouts = self.payouts()?;
        let record = find_mut(&mut payouts, id, "payout", |p| p.id)?;
        f(record)?;
        let updated = record.clone();
        self.store.save(CollectionKey::Payouts, &payouts)?;
        info!(%id, status = %updated.status, "payout updated");
        Ok(updated)
    }

    pub fn approve_payout(&self, id: Uuid) -> Result<PayoutRecord> {
        self.update_payout(id, PayoutRecord::approve)
    }

    pub fn reject_payout(&self, id: Uuid, reason: &str) -> Result<PayoutRecord> {
        self.update_payout(id, |p| p.reject(reason))
    }

    pub fn mark_payout_paid(&self, id: Uuid) -> Result<PayoutRecord> {
        self.update_payout(id, PayoutRecord::mark_paid_out)
    }

    /// Переводит все одобренные выплаты в PaidOut. Возвращает число переведённых.
    pub fn run_payout_cycle(&self) -> Result<usize> {
        let mut payouts = self.payouts()?;
        let mut paid = 0;
        for p in payouts.iter_mut().filter(|p| p.status == PayoutStatus::Approved) {
            p.mark_paid_out()?;
            paid += 1;
        }
        if paid > 0 {
            self.store.save(CollectionKey::Payouts, &payouts)?;
        }
        info!(paid, "payout cycle executed");
        Ok(paid)
    }

    // ---------- выводы ----------

    pub fn request_withdrawal(
        &self,
        amount: Decimal,
        method: WithdrawalMethod,
        at: DateTime<Utc>,
    ) -> Result<WithdrawalRecord> {
        validate_amount("withdrawal", amount)?;
        if amount < self.config.min_withdrawal {
            return Err(validation(format!(
                "minimum withdrawal is {}, requested {amount}",
                self.config.min_withdrawal
            )));
        }
        if self.config.require_kyc {
            let kyc = self.verifier.kyc_status()?;
            if kyc != KycStatus::Verified {
                return Err(validation(format!("identity verification required (kyc status: {kyc})")));
            }
        }

        let mut withdrawals = self.withdrawals()?;
        let balance = compute_wallet_summary(&self.payouts()?, &withdrawals)?.current_balance;
        if amount > balance {
            return Err(validation(format!("insufficient balance: requested {amount}, available {balance}")));
        }

        let record = WithdrawalRecord::new(amount, method, at);
        withdrawals.push(record.clone());
        self.store.save(CollectionKey::Withdrawals, &withdrawals)?;
        info!(id = %record.id, %amount, %method, "withdrawal requested");
        Ok(record)
    }

    fn update_withdrawal(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut WithdrawalRecord) -> Result<()>,
    ) -> Result<WithdrawalRecord> {
        let mut withdrawals = self.withdrawals()?;
        let record = find_mut(&mut withdrawals, id, "withdrawal", |w| w.id)?;
        f(record)?;
        let updated = record.clone();
        if updated.status == WithdrawalStatus::Completed {
            // несколько заявок в Pending могли вместе превысить баланс
            if let Err(WalletError::Overdrawn { balance }) = compute_wallet_summary(&self.payouts()?, &withdrawals) {
                return Err(validation(format!(
                    "insufficient balance to complete withdrawal {id}: would leave {balance}"
                )));
            }
        }
        self.store.save(CollectionKey::Withdrawals, &withdrawals)?;
        info!(%id, status = %updated.status, "withdrawal updated");
        Ok(updated)
    }

    pub fn approve_withdrawal(&self, id: Uuid) -> Result<WithdrawalRecord> {
        self.update_withdrawal(id, WithdrawalRecord::complete)
    }

    pub fn reject_withdrawal(&self, id: Uuid, reason: &str) -> Result<WithdrawalRecord> {
        self.update_withdrawal(id, |w| w.fail(reason))
    }

    // ---------- импорт / удаление ----------

    /// Upsert по id. Возвращает (добавлено, обновлено); совпадающие записи не считаются.
    /// При любой ошибке хранилище не меняется.
    pub fn import(&self, ledger: Ledger) -> Result<(usize, usize)> {
        let mut payouts = self.payouts()?;
        let (pa, pu) = upsert(&mut payouts, ledger.payouts, "payout")?;
        let mut withdrawals = self.withdrawals()?;
        let (wa, wu) = upsert(&mut withdrawals, ledger.withdrawals, "withdrawal")?;

        // импорт не должен приводить к отрицательному балансу
        compute_wallet_summary(&payouts, &withdrawals)?;

        self.store.save(CollectionKey::Payouts, &payouts)?;
        self.store.save(CollectionKey::Withdrawals, &withdrawals)?;
        info!(added = pa + wa, updated = pu + wu, "ledger imported");
        Ok((pa + wa, pu + wu))
    }

    pub fn delete_account(&self) -> Result<()> {
        self.store.clear()?;
        warn!("account data deleted");
        Ok(())
    }
}

fn upsert<T: Reconcile>(existing: &mut Vec<T>, incoming: Vec<T>, kind: &str) -> Result<(usize, usize)> {
    let (mut added, mut updated) = (0, 0);
    for rec in incoming {
        validate_amount(kind, rec.record_amount())?;
        let id = rec.record_id();
        match existing.iter_mut().find(|e| e.record_id() == id) {
            Some(slot) => {
                let merged = slot.reconcile(&rec)?;
                if merged != *slot {
                    *slot = merged;
                    updated += 1;
                }
            }
            None => {
                existing.push(rec);
                added += 1;
            }
        }
    }
    Ok((added, updated))
}
