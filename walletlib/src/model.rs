//! Доменные модели — записи леджера и производные сводки.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::WalletError;
use crate::ledger::round_money;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Platform {
    TikTok,
    Instagram,
    #[serde(rename = "YouTube Shorts")]
    YouTubeShorts,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PayoutStatus {
    Pending,
    Approved,
    Rejected,
    PaidOut,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WithdrawalMethod {
    PayPal,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    #[serde(rename = "Crypto (USDT)")]
    CryptoUsdt,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WithdrawalStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum KycStatus {
    NotStarted,
    Pending,
    Verified,
    Rejected,
}

/// Заработок креатора за один клип в рамках кампании.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRecord {
    pub id: Uuid,
    pub campaign_id: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub platform: Platform,
    pub status: PayoutStatus,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

/// Заявка на вывод средств с баланса.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRecord {
    pub id: Uuid,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub method: WithdrawalMethod,
    pub status: WithdrawalStatus,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KycRecord {
    pub status: KycStatus,
    pub full_name: String,
    pub country: String,
    pub submitted_at: DateTime<Utc>,
}

/// Полный снимок леджера — единица экспорта/импорта.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Ledger {
    pub payouts: Vec<PayoutRecord>,
    pub withdrawals: Vec<WithdrawalRecord>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    pub current_balance: Decimal,
    pub pending_approval: Decimal,
    pub lifetime_earnings: Decimal,
    pub approved_clip_count: usize,
    pub rejected_clip_count: usize,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PayoutStats {
    pub avg_payout_per_clip: Decimal,
    /// Проценты, 0..=100.
    pub rejection_rate: Decimal,
    /// Секунды. Не выводится: у записей нет времени ревью.
    pub fastest_approval_secs: Option<i64>,
}

impl PayoutRecord {
    pub fn new(campaign_id: impl Into<String>, amount: Decimal, platform: Platform, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            campaign_id: campaign_id.into(),
            amount,
            platform,
            status: PayoutStatus::Pending,
            date,
            rejection_reason: None,
        }
    }

    /// Учитывается в заработке (Approved или PaidOut).
    pub fn is_earned(&self) -> bool {
        matches!(self.status, PayoutStatus::Approved | PayoutStatus::PaidOut)
    }
}

impl WithdrawalRecord {
    pub fn new(amount: Decimal, method: WithdrawalMethod, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            method,
            status: WithdrawalStatus::Pending,
            date,
            rejection_reason: None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Platform::TikTok => "TikTok",
            Platform::Instagram => "Instagram",
            Platform::YouTubeShorts => "YouTube Shorts",
        })
    }
}

impl fmt::Display for WithdrawalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            WithdrawalMethod::PayPal => "PayPal",
            WithdrawalMethod::BankTransfer => "Bank Transfer",
            WithdrawalMethod::CryptoUsdt => "Crypto (USDT)",
        })
    }
}

impl fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{self:?}"))
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{self:?}"))
    }
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{self:?}"))
    }
}

// Разбор из строк: CLI и CSV принимают и отображаемые имена, и короткие.
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl FromStr for Platform {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "tiktok" => Ok(Platform::TikTok),
            "instagram" | "ig" => Ok(Platform::Instagram),
            "youtubeshorts" | "youtube" | "shorts" => Ok(Platform::YouTubeShorts),
            _ => Err(WalletError::Parse(format!("unknown platform: {s}"))),
        }
    }
}

impl FromStr for WithdrawalMethod {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "paypal" => Ok(WithdrawalMethod::PayPal),
            "banktransfer" | "bank" => Ok(WithdrawalMethod::BankTransfer),
            "cryptousdt" | "usdt" | "crypto" => Ok(WithdrawalMethod::CryptoUsdt),
            _ => Err(WalletError::Parse(format!("unknown withdrawal method: {s}"))),
        }
    }
}

impl FromStr for PayoutStatus {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "pending" => Ok(PayoutStatus::Pending),
            "approved" => Ok(PayoutStatus::Approved),
            "rejected" => Ok(PayoutStatus::Rejected),
            "paidout" => Ok(PayoutStatus::PaidOut),
            _ => Err(WalletError::Parse(format!("unknown payout status: {s}"))),
        }
    }
}

impl FromStr for WithdrawalStatus {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "pending" => Ok(WithdrawalStatus::Pending),
            "completed" => Ok(WithdrawalStatus::Completed),
            "failed" => Ok(WithdrawalStatus::Failed),
            _ => Err(WalletError::Parse(format!("unknown withdrawal status: {s}"))),
        }
    }
}

impl FromStr for KycStatus {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "notstarted" | "none" => Ok(KycStatus::NotStarted),
            "pending" => Ok(KycStatus::Pending),
            "verified" => Ok(KycStatus::Verified),
            "rejected" => Ok(KycStatus::Rejected),
            _ => Err(WalletError::Parse(format!("unknown kyc status: {s}"))),
        }
    }
}

impl fmt::Display for PayoutRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:<8} ${} {} {}",
            self.id,
            self.status,
            round_money(self.amount),
            self.platform,
            self.campaign_id
        )?;
        if let Some(reason) = &self.rejection_reason {
            write!(f, " ({reason})")?;
        }
        Ok(())
    }
}

impl fmt::Display for WithdrawalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:<9} ${} {}", self.id, self.status, round_money(self.amount), self.method)?;
        if let Some(reason) = &self.rejection_reason {
            write!(f, " ({reason})")?;
        }
        Ok(())
    }
}

impl fmt::Display for WalletSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current balance:   ${}", round_money(self.current_balance))?;
        writeln!(f, "Pending approval:  ${}", round_money(self.pending_approval))?;
        writeln!(f, "Lifetime earnings: ${}", round_money(self.lifetime_earnings))?;
        writeln!(f, "Approved clips:    {}", self.approved_clip_count)?;
        write!(f, "Rejected clips:    {}", self.rejected_clip_count)
    }
}

impl fmt::Display for PayoutStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Avg payout per clip: ${}", round_money(self.avg_payout_per_clip))?;
        write!(f, "Rejection rate:      {}%", self.rejection_rate.round_dp(1))?;
        if let Some(secs) = self.fastest_approval_secs {
            write!(f, "\nFastest approval:    {}h", secs / 3600)?;
        }
        Ok(())
    }
}
