use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "utxo-ledger")]
pub struct Opt {
    #[arg(long = "config", global = true, help = "TOML file with ledger settings")]
    pub config: Option<PathBuf>,
    #[arg(long = "json", global = true, help = "Print results as JSON")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "genesis", about = "Print the genesis UTXO set and balances")]
    Genesis,
    #[command(name = "demo", about = "Run the reference scenarios against a fresh ledger")]
    Demo {
        #[arg(long = "miner", help = "Label that receives the block reward")]
        miner: Option<String>,
    },
    #[command(name = "pay", about = "Pay from the sender's first UTXO on a fresh genesis ledger")]
    Pay {
        #[arg(long = "from", help = "Sender name")]
        from: String,
        #[arg(long = "to", help = "Recipient name")]
        to: String,
        #[arg(long = "amount", help = "Amount to send, e.g. 10 or \"10.0 BTC\"")]
        amount: String,
    },
    #[command(name = "show-config", about = "Print the effective configuration")]
    ShowConfig,
}
