//! Машины состояний выплат и выводов.
//!
//! Запись меняет только `status` и `rejection_reason`; недопустимый переход
//! возвращает `Conflict`, запись при этом не трогается.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    error::{Result, WalletError},
    model::{PayoutRecord, PayoutStatus, WithdrawalRecord, WithdrawalStatus},
};

/// Слияние внешней версии записи с сохранённой (импорт).
///
/// Допускается только та же запись, сдвинутая на один разрешённый шаг
/// машины состояний; неизменяемые поля должны совпадать.
pub trait Reconcile: Clone + PartialEq {
    fn record_id(&self) -> Uuid;
    fn record_amount(&self) -> Decimal;
    fn reconcile(&self, incoming: &Self) -> Result<Self>;
}

impl PayoutStatus {
    pub fn can_transition_to(self, next: PayoutStatus) -> bool {
        use PayoutStatus::*;
        matches!((self, next), (Pending, Approved) | (Pending, Rejected) | (Approved, PaidOut))
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PayoutStatus::Rejected | PayoutStatus::PaidOut)
    }
}

impl WithdrawalStatus {
    pub fn can_transition_to(self, next: WithdrawalStatus) -> bool {
        use WithdrawalStatus::*;
        matches!((self, next), (Pending, Completed) | (Pending, Failed))
    }

    pub fn is_terminal(self) -> bool {
        self != WithdrawalStatus::Pending
    }
}

fn require_reason(reason: &str) -> Result<String> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(WalletError::Validation("rejection reason is required".into()));
    }
    Ok(reason.to_string())
}

impl PayoutRecord {
    fn transition(&mut self, next: PayoutStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            let expected = match next {
                PayoutStatus::PaidOut => PayoutStatus::Approved,
                _ => PayoutStatus::Pending,
            };
            return Err(WalletError::conflict(self.id, expected, self.status));
        }
        self.status = next;
        Ok(())
    }

    pub fn approve(&mut self) -> Result<()> {
        self.transition(PayoutStatus::Approved)
    }

    pub fn reject(&mut self, reason: &str) -> Result<()> {
        let reason = require_reason(reason)?;
        self.transition(PayoutStatus::Rejected)?;
        self.rejection_reason = Some(reason);
        Ok(())
    }

    pub fn mark_paid_out(&mut self) -> Result<()> {
        self.transition(PayoutStatus::PaidOut)
    }
}

impl Reconcile for PayoutRecord {
    fn record_id(&self) -> Uuid {
        self.id
    }

    fn record_amount(&self) -> Decimal {
        self.amount
    }

    fn reconcile(&self, incoming: &Self) -> Result<Self> {
        if incoming == self {
            return Ok(self.clone());
        }
        if incoming.campaign_id != self.campaign_id
            || incoming.amount != self.amount
            || incoming.platform != self.platform
            || incoming.date != self.date
        {
            return Err(WalletError::conflict(self.id, "unchanged record", "modified immutable fields"));
        }
        if self.status.is_terminal() {
            return Err(WalletError::conflict(self.id, "non-terminal status", self.status));
        }
        let mut next = self.clone();
        match incoming.status {
            PayoutStatus::Rejected => next.reject(incoming.rejection_reason.as_deref().unwrap_or(""))?,
            status => next.transition(status)?,
        }
        Ok(next)
    }
}

impl WithdrawalRecord {
    fn transition(&mut self, next: WithdrawalStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(WalletError::conflict(self.id, WithdrawalStatus::Pending, self.status));
        }
        self.status = next;
        Ok(())
    }

    pub fn complete(&mut self) -> Result<()> {
        self.transition(WithdrawalStatus::Completed)
    }

    pub fn fail(&mut self, reason: &str) -> Result<()> {
        let reason = require_reason(reason)?;
        self.transition(WithdrawalStatus::Failed)?;
        self.rejection_reason = Some(reason);
        Ok(())
    }
}

impl Reconcile for WithdrawalRecord {
    fn record_id(&self) -> Uuid {
        self.id
    }

    fn record_amount(&self) -> Decimal {
        self.amount
    }

    fn reconcile(&self, incoming: &Self) -> Result<Self> {
        if incoming == self {
            return Ok(self.clone());
        }
        if incoming.amount != self.amount || incoming.method != self.method || incoming.date != self.date {
            return Err(WalletError::conflict(self.id, "unchanged record", "modified immutable fields"));
        }
        if self.status.is_terminal() {
            return Err(WalletError::conflict(self.id, "non-terminal status", self.status));
        }
        let mut next = self.clone();
        match incoming.status {
            WithdrawalStatus::Failed => next.fail(incoming.rejection_reason.as_deref().unwrap_or(""))?,
            status => next.transition(status)?,
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Platform, WithdrawalMethod};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn payout() -> PayoutRecord {
        PayoutRecord::new("camp-1", Decimal::new(25, 0), Platform::TikTok, Utc::now())
    }

    #[test]
    fn payout_happy_path() {
        let mut p = payout();
        p.approve().unwrap();
        p.mark_paid_out().unwrap();
        assert_eq!(p.status, PayoutStatus::PaidOut);
        assert!(p.status.is_terminal());
    }

    #[test]
    fn pending_cannot_be_paid_out_directly() {
        let mut p = payout();
        let err = p.mark_paid_out().unwrap_err();
        assert!(matches!(err, WalletError::Conflict { .. }));
        assert_eq!(p.status, PayoutStatus::Pending);
    }

    #[test]
    fn nothing_leaves_rejected() {
        let mut p = payout();
        p.reject("watermark visible").unwrap();
        assert_eq!(p.rejection_reason.as_deref(), Some("watermark visible"));
        assert!(p.approve().is_err());
        assert!(p.mark_paid_out().is_err());
    }

    #[test]
    fn blank_reason_is_validation_error() {
        let mut p = payout();
        assert!(matches!(p.reject("  "), Err(WalletError::Validation(_))));
        assert_eq!(p.status, PayoutStatus::Pending);

        let mut w = WithdrawalRecord::new(Decimal::TEN, WithdrawalMethod::PayPal, Utc::now());
        assert!(matches!(w.fail(""), Err(WalletError::Validation(_))));
    }

    #[test]
    fn withdrawal_is_decided_once() {
        let mut w = WithdrawalRecord::new(Decimal::TEN, WithdrawalMethod::BankTransfer, Utc::now());
        w.complete().unwrap();
        assert!(matches!(w.fail("late"), Err(WalletError::Conflict { .. })));
        assert_eq!(w.status, WithdrawalStatus::Completed);
        assert!(w.rejection_reason.is_none());
    }

    #[test]
    fn reconcile_accepts_one_legal_step() {
        let stored = payout();
        let mut incoming = stored.clone();
        incoming.status = PayoutStatus::Approved;
        assert_eq!(stored.reconcile(&incoming).unwrap().status, PayoutStatus::Approved);
        assert_eq!(stored.reconcile(&stored).unwrap(), stored);

        incoming.status = PayoutStatus::PaidOut;
        assert!(matches!(stored.reconcile(&incoming), Err(WalletError::Conflict { .. })));
    }

    #[test]
    fn reconcile_keeps_immutable_fields() {
        let stored = payout();
        let mut incoming = stored.clone();
        incoming.amount = Decimal::new(250, 0);
        assert!(matches!(stored.reconcile(&incoming), Err(WalletError::Conflict { .. })));

        let mut incoming = stored.clone();
        incoming.campaign_id = "camp-2".into();
        assert!(stored.reconcile(&incoming).is_err());
    }

    #[test]
    fn reconcile_never_leaves_terminal_state() {
        let mut stored = WithdrawalRecord::new(Decimal::TEN, WithdrawalMethod::PayPal, Utc::now());
        stored.complete().unwrap();
        assert!(stored.status.is_terminal());
        let mut incoming = stored.clone();
        incoming.status = WithdrawalStatus::Pending;
        assert!(matches!(stored.reconcile(&incoming), Err(WalletError::Conflict { .. })));

        let pending = WithdrawalRecord::new(Decimal::TEN, WithdrawalMethod::PayPal, Utc::now());
        let mut failed = pending.clone();
        failed.status = WithdrawalStatus::Failed;
        // без причины отклонение не принимается
        assert!(matches!(pending.reconcile(&failed), Err(WalletError::Validation(_))));
        failed.rejection_reason = Some("bank rejected".into());
        assert_eq!(pending.reconcile(&failed).unwrap().status, WithdrawalStatus::Failed);
    }
}
