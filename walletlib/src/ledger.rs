//! Производные величины кошелька: баланс, ожидающие выплаты, статистика,
//! дата следующей выплаты. Чистые функции без побочных эффектов.

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, NaiveTime, TimeZone, Weekday};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    error::{Result, WalletError},
    model::{PayoutRecord, PayoutStats, PayoutStatus, WalletSummary, WithdrawalRecord, WithdrawalStatus},
};

/// Выплаты идут по пятницам в 17:00 локального времени.
pub const PAYOUT_WEEKDAY: Weekday = Weekday::Fri;
pub const PAYOUT_HOUR: u32 = 17;

/// Округление денежной суммы до центов (только на границе отображения).
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn compute_wallet_summary(payouts: &[PayoutRecord], withdrawals: &[WithdrawalRecord]) -> Result<WalletSummary> {
    let mut lifetime_earnings = Decimal::ZERO;
    let mut pending_approval = Decimal::ZERO;
    let mut approved_clip_count = 0;
    let mut rejected_clip_count = 0;

    for p in payouts {
        match p.status {
            PayoutStatus::Approved | PayoutStatus::PaidOut => {
                lifetime_earnings += p.amount;
                approved_clip_count += 1;
            }
            PayoutStatus::Pending => pending_approval += p.amount,
            PayoutStatus::Rejected => rejected_clip_count += 1,
        }
    }

    let withdrawn: Decimal = withdrawals
        .iter()
        .filter(|w| w.status == WithdrawalStatus::Completed)
        .map(|w| w.amount)
        .sum();

    let current_balance = lifetime_earnings - withdrawn;
    // Отрицательный баланс — нарушение инварианта выше по потоку, не зажимаем в ноль.
    if current_balance < Decimal::ZERO {
        return Err(WalletError::Overdrawn { balance: current_balance });
    }

    Ok(WalletSummary {
        current_balance,
        pending_approval,
        lifetime_earnings,
        approved_clip_count,
        rejected_clip_count,
    })
}

pub fn compute_payout_stats(payouts: &[PayoutRecord]) -> PayoutStats {
    let (earned_sum, earned_count) = payouts
        .iter()
        .filter(|p| p.is_earned())
        .fold((Decimal::ZERO, 0u32), |(sum, n), p| (sum + p.amount, n + 1));

    let avg_payout_per_clip = if earned_count == 0 {
        Decimal::ZERO
    } else {
        earned_sum / Decimal::from(earned_count)
    };

    let rejected = payouts.iter().filter(|p| p.status == PayoutStatus::Rejected).count();
    let rejection_rate = if payouts.is_empty() {
        Decimal::ZERO
    } else {
        Decimal::from(rejected as u64) * Decimal::ONE_HUNDRED / Decimal::from(payouts.len() as u64)
    };

    PayoutStats {
        avg_payout_per_clip,
        rejection_rate,
        fastest_approval_secs: None,
    }
}

/// Ближайшая пятница 17:00 не раньше `reference` (в его часовом поясе).
pub fn next_payout_date<Tz: TimeZone>(reference: &DateTime<Tz>) -> DateTime<Tz> {
    let at = NaiveTime::default() + Duration::hours(i64::from(PAYOUT_HOUR));
    next_payout_at(reference, PAYOUT_WEEKDAY, at)
}

/// То же, но по произвольному расписанию (день недели + час).
pub fn next_payout_date_on<Tz: TimeZone>(reference: &DateTime<Tz>, weekday: Weekday, hour: u32) -> Result<DateTime<Tz>> {
    let at = NaiveTime::from_hms_opt(hour, 0, 0)
        .ok_or_else(|| WalletError::Validation(format!("payout hour out of range: {hour}")))?;
    Ok(next_payout_at(reference, weekday, at))
}

fn next_payout_at<Tz: TimeZone>(reference: &DateTime<Tz>, weekday: Weekday, at: NaiveTime) -> DateTime<Tz> {
    let local = reference.naive_local();
    let days_ahead = (7 + weekday.num_days_from_monday() - local.weekday().num_days_from_monday()) % 7;
    let mut candidate: NaiveDateTime = (local.date() + Duration::days(i64::from(days_ahead))).and_time(at);
    if candidate < local {
        candidate += Duration::days(7);
    }
    resolve_local(&reference.timezone(), candidate)
}

// Локальное время может не существовать (переход на летнее время) — сдвигаемся на час.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, LocalResult, NaiveDate, Timelike, Utc};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(&NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap())
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_money(Decimal::new(12345, 3)), Decimal::new(1235, 2));
        assert_eq!(round_money(Decimal::new(-5, 3)), Decimal::new(-1, 2));
    }

    #[test]
    fn friday_before_cutoff_is_same_day() {
        // 2025-10-17 — пятница
        let next = next_payout_date(&at(2025, 10, 17, 9, 30));
        assert_eq!(next, at(2025, 10, 17, 17, 0));
    }

    #[test]
    fn exactly_at_cutoff_is_same_instant() {
        let d = at(2025, 10, 17, 17, 0);
        assert_eq!(next_payout_date(&d), d);
    }

    #[test]
    fn saturday_rolls_to_next_week() {
        let next = next_payout_date(&at(2025, 10, 18, 1, 0));
        assert_eq!(next, at(2025, 10, 24, 17, 0));
    }

    #[test]
    fn keeps_reference_timezone() {
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();
        let reference = tz.with_ymd_and_hms(2025, 10, 15, 23, 0, 0).unwrap();
        let next = next_payout_date(&reference);
        assert_eq!(next, tz.with_ymd_and_hms(2025, 10, 17, 17, 0, 0).unwrap());
    }

    #[test]
    fn custom_schedule() {
        let next = next_payout_date_on(&at(2025, 10, 15, 12, 0), Weekday::Mon, 9).unwrap();
        assert_eq!(next, at(2025, 10, 20, 9, 0));
        assert!(next_payout_date_on(&at(2025, 10, 15, 12, 0), Weekday::Mon, 24).is_err());
    }

    /// Пояс, переводящий часы с +01:00 на +02:00 в 2025-10-17 17:00 по местному.
    #[derive(Clone, Copy, Debug)]
    struct SpringForward;

    impl SpringForward {
        fn switch() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2025, 10, 17).unwrap().and_hms_opt(16, 0, 0).unwrap()
        }
        fn before() -> FixedOffset {
            FixedOffset::east_opt(3600).unwrap()
        }
        fn after() -> FixedOffset {
            FixedOffset::east_opt(2 * 3600).unwrap()
        }
    }

    impl TimeZone for SpringForward {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            SpringForward
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let early = *local - Duration::hours(1) < Self::switch();
            let late = *local - Duration::hours(2) >= Self::switch();
            match (early, late) {
                (true, true) => LocalResult::Ambiguous(Self::before(), Self::after()),
                (true, false) => LocalResult::Single(Self::before()),
                (false, true) => LocalResult::Single(Self::after()),
                (false, false) => LocalResult::None,
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::switch() { Self::before() } else { Self::after() }
        }
    }

    #[test]
    fn skipped_local_hour_shifts_forward() {
        let reference = SpringForward.from_utc_datetime(&at(2025, 10, 17, 8, 0).naive_utc());
        let next = next_payout_date(&reference);
        assert_eq!(next.naive_local().hour(), 18);
        assert_eq!(next.with_timezone(&Utc), at(2025, 10, 17, 16, 0));
    }
}
