// This is the demo entry point for the ledger
// It only drives the library: every rule lives in the core, not here
use clap::Parser;
use log::{error, LevelFilter};
use std::process;
use utxo_ledger::cli::run_demo;
use utxo_ledger::{default_genesis, Amount, Command, Config, Ledger, Opt};

fn main() {
    // Info level by default; RUST_LOG still wins when it's set
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();

    if let Err(e) = run_command(opt) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn load_config(opt: &Opt) -> utxo_ledger::Result<Config> {
    let mut config = match &opt.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_env()?;
    Ok(config)
}

fn run_command(opt: Opt) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&opt)?;

    match &opt.command {
        Command::Genesis => {
            let mut ledger = Ledger::new(config);
            ledger.seed_genesis(&default_genesis());

            if opt.json {
                let utxos: Vec<_> = ledger.utxo_set().iter().collect();
                println!("{}", serde_json::to_string_pretty(&utxos)?);
            } else {
                println!("--- Current UTXO Set ---");
                for (outpoint, output) in ledger.utxo_set().iter() {
                    println!(
                        "[{}] Owner: {} | Amount: {} BTC",
                        outpoint,
                        output.get_owner(),
                        output.get_value()
                    );
                }
                println!();
                println!("=== BALANCES ===");
                for (owner, _) in default_genesis() {
                    if let Some(balance) = ledger.balance_of(owner) {
                        println!("{owner}: {balance} BTC");
                    }
                }
            }
        }
        Command::Demo { miner } => {
            let miner = miner.clone().unwrap_or_else(|| config.miner.clone());
            let mut ledger = Ledger::new(config);
            ledger.seed_genesis(&default_genesis());

            let report = run_demo(&mut ledger, &miner)?;
            if opt.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for (idx, outcome) in report.outcomes.iter().enumerate() {
                    println!(
                        "Test {}: {} - {} ({})",
                        idx + 1,
                        outcome.name,
                        if outcome.accepted { "VALID" } else { "REJECTED" },
                        outcome.detail
                    );
                }
                println!();
                println!("=== FINAL BALANCES ===");
                for (owner, balance) in &report.balances {
                    println!("{owner}: {balance} BTC");
                }
            }
        }
        Command::Pay { from, to, amount } => {
            let amount: Amount = amount.parse()?;
            let mut ledger = Ledger::new(config);
            ledger.seed_genesis(&default_genesis());

            let tx = ledger.build_payment(from, to, amount)?;
            let fee = ledger.submit(tx.clone())?;
            if opt.json {
                println!("{}", serde_json::to_string_pretty(&tx)?);
            } else {
                println!("Transaction {} valid! Fee: {fee} BTC", tx.get_id());
                for (outpoint, output) in tx.output_outpoints() {
                    println!(
                        "[{}] Owner: {} | Amount: {} BTC",
                        outpoint,
                        output.get_owner(),
                        output.get_value()
                    );
                }
            }
        }
        Command::ShowConfig => {
            if opt.json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", toml::to_string(&config)?);
            }
        }
    }
    Ok(())
}
