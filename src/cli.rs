use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Watches product pages and mails a daily price and stock report")]
pub struct Cli {
    /// Directory holding default.toml, <RUN_MODE>.toml and local.toml
    #[arg(short, long, default_value = "config")]
    pub config_dir: PathBuf,

    /// Run a single check immediately and exit
    #[arg(long)]
    pub once: bool,
}
