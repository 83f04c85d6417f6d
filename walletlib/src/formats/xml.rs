//! Упрощённый XML:
//! <Ledger><payouts><payout>...</payout></payouts><withdrawals><withdrawal>...</withdrawal></withdrawals></Ledger>

use crate::{error::{WalletError, Result}, model::{Ledger, PayoutRecord, WithdrawalRecord}};
use chrono::{DateTime, Utc};
use quick_xml::{de::from_reader, se::to_string};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug)]
struct XmlPayout {
    id: String,
    campaign_id: String,
    #[serde(with = "rust_decimal::serde::str")]
    amount: Decimal,
    platform: String,
    status: String,
    date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejection_reason: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
struct XmlWithdrawal {
    id: String,
    #[serde(with = "rust_decimal::serde::str")]
    amount: Decimal,
    method: String,
    status: String,
    date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejection_reason: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct XmlPayouts {
    #[serde(default)]
    payout: Vec<XmlPayout>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct XmlWithdrawals {
    #[serde(default)]
    withdrawal: Vec<XmlWithdrawal>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename = "Ledger")]
struct XmlLedger {
    #[serde(default)]
    payouts: XmlPayouts,
    #[serde(default)]
    withdrawals: XmlWithdrawals,
}

fn parse_id(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| WalletError::Parse(format!("id {s}: {e}")))
}

fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| WalletError::Parse(format!("date {s}: {e}")))
}

pub struct SimpleXml;

impl crate::traits::ReadFormat for SimpleXml {
    fn read<R: BufRead>(r: R) -> Result<Ledger> {
        let x: XmlLedger = from_reader(r).map_err(|e| WalletError::Xml(format!("{e}")))?;

        let mut payouts = Vec::with_capacity(x.payouts.payout.len());
        for p in x.payouts.payout {
            payouts.push(PayoutRecord {
                id: parse_id(&p.id)?,
                campaign_id: p.campaign_id,
                amount: p.amount,
                platform: p.platform.parse()?,
                status: p.status.parse()?,
                date: parse_date(&p.date)?,
                rejection_reason: p.rejection_reason,
            });
        }

        let mut withdrawals = Vec::with_capacity(x.withdrawals.withdrawal.len());
        for w in x.withdrawals.withdrawal {
            withdrawals.push(WithdrawalRecord {
                id: parse_id(&w.id)?,
                amount: w.amount,
                method: w.method.parse()?,
                status: w.status.parse()?,
                date: parse_date(&w.date)?,
                rejection_reason: w.rejection_reason,
            });
        }

        Ok(Ledger { payouts, withdrawals })
    }
}

impl crate::traits::WriteFormat for SimpleXml {
    fn write<W: Write>(mut w: W, ledger: &Ledger) -> Result<()> {
        let payouts = ledger.payouts.iter().map(|p| XmlPayout {
            id: p.id.to_string(),
            campaign_id: p.campaign_id.clone(),
            amount: p.amount,
            platform: p.platform.to_string(),
            status: p.status.to_string(),
            date: p.date.to_rfc3339(),
            rejection_reason: p.rejection_reason.clone(),
        }).collect();

        let withdrawals = ledger.withdrawals.iter().map(|wd| XmlWithdrawal {
            id: wd.id.to_string(),
            amount: wd.amount,
            method: wd.method.to_string(),
            status: wd.status.to_string(),
            date: wd.date.to_rfc3339(),
            rejection_reason: wd.rejection_reason.clone(),
        }).collect();

        let x = XmlLedger {
            payouts: XmlPayouts { payout: payouts },
            withdrawals: XmlWithdrawals { withdrawal: withdrawals },
        };

        let s = to_string(&x).map_err(|e| WalletError::Xml(format!("{e}")))?;
        w.write_all(s.as_bytes())?;
        Ok(())
    }
}
