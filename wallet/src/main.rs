use chrono::{Local, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;
use walletlib::{
    config::{LedgerConfig, LOG_ENV_VAR},
    error::{Result, WalletError},
    formats::{csv::Csv, json::Json, xml::SimpleXml},
    model::{KycRecord, KycStatus, Platform, WithdrawalMethod},
    stores::json_dir::JsonDirStore,
    traits::{ReadFormat, WriteFormat},
    verification::StoredVerification,
    WalletService,
};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Fmt {
    Csv,
    Xml,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "wallet", version, about = "Кошелёк креатора: выплаты и выводы")]
struct Cli {
    /// Каталог с данными (по умолчанию из конфигурации)
    #[arg(long = "data-dir", global = true)]
    data_dir: Option<PathBuf>,

    /// Файл конфигурации TOML
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Вывод в JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Баланс, ожидающие и заработанные суммы
    Summary,
    /// Средняя выплата и доля отклонённых
    Stats,
    /// Дата следующей выплаты
    NextPayout,
    /// Заявить выплату за клип
    Submit {
        #[arg(long)]
        campaign: String,
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        platform: Platform,
    },
    /// Одобрить выплату
    Approve { id: Uuid },
    /// Отклонить выплату
    Reject {
        id: Uuid,
        #[arg(long)]
        reason: String,
    },
    /// Отметить выплату как выплаченную
    PayOut { id: Uuid },
    /// Выплатить все одобренные
    PayoutCycle,
    /// Запросить вывод средств
    Withdraw {
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        method: WithdrawalMethod,
    },
    /// Подтвердить вывод
    ApproveWithdrawal { id: Uuid },
    /// Отклонить вывод
    RejectWithdrawal {
        id: Uuid,
        #[arg(long)]
        reason: String,
    },
    /// Записать результат KYC-проверки
    Kyc {
        #[arg(long)]
        status: KycStatus,
        #[arg(long)]
        name: String,
        #[arg(long)]
        country: String,
    },
    /// Экспорт леджера (по умолчанию в stdout)
    Export {
        #[arg(long, value_enum)]
        format: Fmt,
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Импорт леджера (upsert по id; по умолчанию из stdin)
    Import {
        #[arg(long, value_enum)]
        format: Fmt,
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,
    },
    /// Удалить все данные аккаунта
    DeleteAccount {
        #[arg(long)]
        yes: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn print<T: serde::Serialize + std::fmt::Display>(json: bool, value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, value)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{value}")?;
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let mut config = LedgerConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let store = JsonDirStore::open(&config.data_dir)?;
    let verifier = StoredVerification::new(store.clone());
    let service = WalletService::new(&store, &verifier, config);

    match cli.cmd {
        Cmd::Summary => print(cli.json, &service.summary()?)?,
        Cmd::Stats => print(cli.json, &service.stats()?)?,
        Cmd::NextPayout => {
            let next = service.next_payout(Local::now())?;
            println!("{}", next.format("%A %Y-%m-%d %H:%M %Z"));
        }
        Cmd::Submit { campaign, amount, platform } => {
            let rec = service.submit_payout(&campaign, amount, platform, Utc::now())?;
            if cli.json { print_json(&rec)? } else { println!("{}", rec.id) }
        }
        Cmd::Approve { id } => print(cli.json, &service.approve_payout(id)?)?,
        Cmd::Reject { id, reason } => print(cli.json, &service.reject_payout(id, &reason)?)?,
        Cmd::PayOut { id } => print(cli.json, &service.mark_payout_paid(id)?)?,
        Cmd::PayoutCycle => println!("{} payouts paid out", service.run_payout_cycle()?),
        Cmd::Withdraw { amount, method } => {
            let rec = service.request_withdrawal(amount, method, Utc::now())?;
            if cli.json { print_json(&rec)? } else { println!("{}", rec.id) }
        }
        Cmd::ApproveWithdrawal { id } => print(cli.json, &service.approve_withdrawal(id)?)?,
        Cmd::RejectWithdrawal { id, reason } => print(cli.json, &service.reject_withdrawal(id, &reason)?)?,
        Cmd::Kyc { status, name, country } => {
            verifier.submit(KycRecord {
                status,
                full_name: name,
                country,
                submitted_at: Utc::now(),
            })?;
        }
        Cmd::Export { format, output } => {
            let ledger = service.ledger()?;
            let mut writer: Box<dyn Write> = match output {
                Some(path) => Box::new(File::create(path)?),
                None => Box::new(io::stdout()),
            };
            match format {
                Fmt::Csv => Csv::write(&mut writer, &ledger),
                Fmt::Xml => SimpleXml::write(&mut writer, &ledger),
                Fmt::Json => Json::write(&mut writer, &ledger),
            }?;
            writer.flush().map_err(WalletError::from)?;
        }
        Cmd::Import { format, input } => {
            let reader: Box<dyn io::Read> = match input {
                Some(path) => Box::new(File::open(path)?),
                None => Box::new(io::stdin()),
            };
            let br = BufReader::new(reader);
            let ledger = match format {
                Fmt::Csv => Csv::read(br),
                Fmt::Xml => SimpleXml::read(br),
                Fmt::Json => Json::read(br),
            }?;
            let (added, updated) = service.import(ledger)?;
            println!("imported: {added} added, {updated} updated");
        }
        Cmd::DeleteAccount { yes } => {
            if !yes {
                return Err(WalletError::Validation("pass --yes to delete all account data".into()));
            }
            service.delete_account()?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::from(if e.http_status() == 500 { 1 } else { 2 })
        }
    }
}
