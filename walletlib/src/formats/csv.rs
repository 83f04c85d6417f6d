//! Простой CSV: заголовки:
//! kind,id,campaign_id,amount,platform,method,status,date,rejection_reason
//!
//! `kind` — `payout` или `withdrawal`; у выплат пуст `method`, у выводов —
//! `campaign_id` и `platform`.

use crate::{
    error::{WalletError, Result},
    model::{Ledger, PayoutRecord, WithdrawalRecord},
};
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use rust_decimal::Decimal;
use std::io::{BufRead, Write};
use uuid::Uuid;

#[derive(serde::Deserialize)]
struct CsvRow {
    kind: String,
    id: String,
    campaign_id: Option<String>,
    amount: String,
    platform: Option<String>,
    method: Option<String>,
    status: String,
    date: String,
    rejection_reason: Option<String>,
}

#[derive(serde::Serialize)]
struct CsvOutRow<'a> {
    kind: &'a str,
    id: String,
    campaign_id: Option<&'a str>,
    amount: String,
    platform: Option<String>,
    method: Option<String>,
    status: String,
    date: String,
    rejection_reason: Option<&'a str>,
}

pub struct Csv;

fn required<'a>(v: &'a Option<String>, name: &str) -> Result<&'a str> {
    v.as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| WalletError::Parse(format!("missing {name}")))
}

impl crate::traits::ReadFormat for Csv {
    fn read<R: BufRead>(r: R) -> Result<Ledger> {
        let mut rdr = ReaderBuilder::new().flexible(true).from_reader(r);
        let mut ledger = Ledger::default();

        for rec in rdr.deserialize::<CsvRow>() {
            let row = rec?;
            let id = Uuid::parse_str(&row.id).map_err(|e| WalletError::Parse(format!("id: {e}")))?;
            let amount = row
                .amount
                .parse::<Decimal>()
                .map_err(|e| WalletError::Parse(format!("amount: {e}")))?;
            let date = DateTime::parse_from_rfc3339(&row.date)
                .map_err(|e| WalletError::Parse(format!("date: {e}")))?
                .with_timezone(&Utc);
            let rejection_reason = row.rejection_reason.filter(|s| !s.is_empty());

            match row.kind.as_str() {
                "payout" => ledger.payouts.push(PayoutRecord {
                    id,
                    campaign_id: required(&row.campaign_id, "campaign_id")?.to_string(),
                    amount,
                    platform: required(&row.platform, "platform")?.parse()?,
                    status: row.status.parse()?,
                    date,
                    rejection_reason,
                }),
                "withdrawal" => ledger.withdrawals.push(WithdrawalRecord {
                    id,
                    amount,
                    method: required(&row.method, "method")?.parse()?,
                    status: row.status.parse()?,
                    date,
                    rejection_reason,
                }),
                other => return Err(WalletError::Parse(format!("unknown kind: {other}"))),
            }
        }

        Ok(ledger)
    }
}

impl crate::traits::WriteFormat for Csv {
    fn write<W: Write>(mut w: W, ledger: &Ledger) -> Result<()> {
        let mut wrt = WriterBuilder::new().from_writer(&mut w);

        for p in &ledger.payouts {
            wrt.serialize(CsvOutRow {
                kind: "payout",
                id: p.id.to_string(),
                campaign_id: Some(&p.campaign_id),
                amount: p.amount.to_string(),
                platform: Some(p.platform.to_string()),
                method: None,
                status: p.status.to_string(),
                date: p.date.to_rfc3339(),
                rejection_reason: p.rejection_reason.as_deref(),
            })?;
        }
        for wd in &ledger.withdrawals {
            wrt.serialize(CsvOutRow {
                kind: "withdrawal",
                id: wd.id.to_string(),
                campaign_id: None,
                amount: wd.amount.to_string(),
                platform: None,
                method: Some(wd.method.to_string()),
                status: wd.status.to_string(),
                date: wd.date.to_rfc3339(),
                rejection_reason: wd.rejection_reason.as_deref(),
            })?;
        }
        wrt.flush()?;
        Ok(())
    }
}
