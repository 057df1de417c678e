//! Command-line surface

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "pftabled-client",
    version,
    about = "Add, delete or flush an entry in a pftabled-managed table"
)]
pub struct Cli {
    /// Host where pftabled is running
    pub host: String,

    /// UDP port at host
    pub port: u16,

    /// Name of table
    pub table: String,

    /// One of: add, del or flush (other names are sent as command 0)
    pub cmd: String,

    /// IP or network to add or delete, as ip[/mask]
    pub ip: Option<String>,

    /// Shared authentication key
    #[arg(conflicts_with = "keyfile")]
    pub key: Option<String>,

    /// Read the authentication key from a file (first 20 bytes)
    #[arg(short = 'k', long)]
    pub keyfile: Option<PathBuf>,

    /// Print the encoded datagram instead of sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
