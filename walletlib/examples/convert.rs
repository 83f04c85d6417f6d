use walletlib::{
    formats::{csv::Csv, json::Json},
    ledger::{compute_payout_stats, compute_wallet_summary},
    traits::{ReadFormat, WriteFormat},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Пример: CSV-выгрузка -> сводка в stderr, JSON-снимок в stdout
    let ledger = Csv::read(std::io::BufReader::new(std::io::stdin()))?;
    eprintln!("{}", compute_wallet_summary(&ledger.payouts, &ledger.withdrawals)?);
    eprintln!("{}", compute_payout_stats(&ledger.payouts));
    Json::write(std::io::stdout(), &ledger)?;
    Ok(())
}
