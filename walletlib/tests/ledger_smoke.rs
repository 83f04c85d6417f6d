use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use walletlib::{
    error::WalletError,
    ledger::{compute_payout_stats, compute_wallet_summary, next_payout_date},
    model::{PayoutRecord, PayoutStatus, Platform, WithdrawalMethod, WithdrawalRecord, WithdrawalStatus},
};

fn payout(amount: i64, status: PayoutStatus) -> PayoutRecord {
    let mut p = PayoutRecord::new("camp", Decimal::new(amount, 0), Platform::TikTok, Utc::now());
    p.status = status;
    p
}

fn withdrawal(amount: i64, status: WithdrawalStatus) -> WithdrawalRecord {
    let mut w = WithdrawalRecord::new(Decimal::new(amount, 0), WithdrawalMethod::PayPal, Utc::now());
    w.status = status;
    w
}

#[test]
fn approved_and_pending_are_split() {
    let payouts = vec![payout(25, PayoutStatus::Approved), payout(15, PayoutStatus::Pending)];
    let s = compute_wallet_summary(&payouts, &[]).expect("summary");
    assert_eq!(s.lifetime_earnings, Decimal::new(25, 0));
    assert_eq!(s.pending_approval, Decimal::new(15, 0));
    assert_eq!(s.current_balance, Decimal::new(25, 0));
    assert_eq!(s.approved_clip_count, 1);
    assert_eq!(s.rejected_clip_count, 0);
}

#[test]
fn completed_withdrawals_reduce_balance() {
    let payouts = vec![payout(100, PayoutStatus::PaidOut)];
    let withdrawals = vec![
        withdrawal(40, WithdrawalStatus::Completed),
        withdrawal(30, WithdrawalStatus::Pending),
        withdrawal(50, WithdrawalStatus::Failed),
    ];
    let s = compute_wallet_summary(&payouts, &withdrawals).expect("summary");
    assert_eq!(s.current_balance, Decimal::new(60, 0));
    assert_eq!(s.lifetime_earnings, Decimal::new(100, 0));
}

#[test]
fn empty_inputs_are_zero() {
    let s = compute_wallet_summary(&[], &[]).expect("summary");
    assert_eq!(s.current_balance, Decimal::ZERO);
    assert_eq!(s.pending_approval, Decimal::ZERO);

    let stats = compute_payout_stats(&[]);
    assert_eq!(stats.avg_payout_per_clip, Decimal::ZERO);
    assert_eq!(stats.rejection_rate, Decimal::ZERO);
    assert!(stats.fastest_approval_secs.is_none());
}

#[test]
fn overdrawn_ledger_is_an_error() {
    let payouts = vec![payout(10, PayoutStatus::Approved)];
    let withdrawals = vec![withdrawal(40, WithdrawalStatus::Completed)];
    match compute_wallet_summary(&payouts, &withdrawals) {
        Err(WalletError::Overdrawn { balance }) => assert_eq!(balance, Decimal::new(-30, 0)),
        other => panic!("expected overdrawn, got {other:?}"),
    }
}

#[test]
fn summary_is_pure() {
    let payouts = vec![payout(25, PayoutStatus::Approved), payout(5, PayoutStatus::Rejected)];
    let withdrawals = vec![withdrawal(10, WithdrawalStatus::Completed)];
    let before = (payouts.clone(), withdrawals.clone());
    let a = compute_wallet_summary(&payouts, &withdrawals).unwrap();
    let b = compute_wallet_summary(&payouts, &withdrawals).unwrap();
    assert_eq!(a, b);
    assert_eq!((payouts, withdrawals), before);
}

#[test]
fn approving_never_lowers_earnings() {
    let mut payouts = vec![payout(12, PayoutStatus::Pending), payout(8, PayoutStatus::Approved)];
    let before = compute_wallet_summary(&payouts, &[]).unwrap().lifetime_earnings;
    payouts[0].approve().unwrap();
    let after = compute_wallet_summary(&payouts, &[]).unwrap().lifetime_earnings;
    assert!(after >= before);
    assert_eq!(after, Decimal::new(20, 0));
}

#[test]
fn stats_average_and_rejection_rate() {
    let payouts = vec![
        payout(25, PayoutStatus::Approved),
        payout(15, PayoutStatus::PaidOut),
        payout(40, PayoutStatus::Pending),
        payout(10, PayoutStatus::Rejected),
    ];
    let stats = compute_payout_stats(&payouts);
    assert_eq!(stats.avg_payout_per_clip, Decimal::new(20, 0));
    assert_eq!(stats.rejection_rate, Decimal::new(25, 0));
}

#[test]
fn no_qualifying_payouts_means_zero_average() {
    let payouts = vec![payout(25, PayoutStatus::Pending), payout(10, PayoutStatus::Rejected)];
    let stats = compute_payout_stats(&payouts);
    assert_eq!(stats.avg_payout_per_clip, Decimal::ZERO);
    assert_eq!(stats.rejection_rate, Decimal::new(50, 0));
    assert!(stats.rejection_rate <= Decimal::ONE_HUNDRED);
}

#[test]
fn cents_do_not_drift() {
    // 0.1 * 3 в float даёт 0.30000000000000004
    let payouts: Vec<_> = (0..3)
        .map(|_| {
            let mut p = PayoutRecord::new("c", Decimal::new(1, 1), Platform::Instagram, Utc::now());
            p.status = PayoutStatus::Approved;
            p
        })
        .collect();
    let s = compute_wallet_summary(&payouts, &[]).unwrap();
    assert_eq!(s.lifetime_earnings, Decimal::new(3, 1));
}

#[test]
fn wednesday_goes_to_friday() {
    // 2025-10-15 — среда
    let d = Utc.with_ymd_and_hms(2025, 10, 15, 8, 0, 0).unwrap();
    assert_eq!(next_payout_date(&d), Utc.with_ymd_and_hms(2025, 10, 17, 17, 0, 0).unwrap());
}

#[test]
fn friday_evening_goes_to_next_week() {
    let d = Utc.with_ymd_and_hms(2025, 10, 17, 18, 0, 0).unwrap();
    assert_eq!(next_payout_date(&d), Utc.with_ymd_and_hms(2025, 10, 24, 17, 0, 0).unwrap());
}
