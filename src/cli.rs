use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cardex")]
#[command(about = "Tracks Steam Card Exchange game prices")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database to use instead of the configured one
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Snapshot label to read and write
    #[arg(long, global = true)]
    pub label: Option<String>,

    /// Debug logging and detailed diagnostics
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch prices once and store what changed
    Update(UpdateArgs),

    /// Fetch prices on a fixed interval
    Watch(WatchArgs),

    /// Display the stored snapshot
    Report(ReportArgs),

    /// Look up one game on the live page
    Lookup(LookupArgs),

    /// Value an owned Steam inventory against stored prices
    Inventory(InventoryArgs),

    /// Serve the stored snapshot over HTTP
    Serve(ServeArgs),
}

#[derive(Parser)]
pub struct UpdateArgs {
    /// Source url (overrides config)
    #[arg(long)]
    pub url: Option<String>,

    /// Output changes as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct WatchArgs {
    /// Time between cycles, e.g. "3m" or "90s"
    #[arg(long)]
    pub interval: Option<String>,

    /// Stop after this many cycles
    #[arg(long)]
    pub cycles: Option<u64>,
}

#[derive(Parser)]
pub struct ReportArgs {
    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct LookupArgs {
    /// Game display name, as listed on the marketplace
    pub game: String,

    /// Page url (overrides config)
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Parser)]
pub struct InventoryArgs {
    /// 64-bit Steam id of the inventory owner
    pub steam_id: String,

    /// Start from a cursor printed by an earlier run
    #[arg(long)]
    pub resume: Option<String>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct ServeArgs {
    /// Address to bind (defaults to 0.0.0.0:$PORT)
    #[arg(long)]
    pub addr: Option<String>,
}
