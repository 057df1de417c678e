//! pftabled-client — send one authenticated command to a pftabled daemon
//!
//! Usage: pftabled-client [-k keyfile] host port table cmd [ip[/mask]] [key]
//!
//! Builds the 64-byte command datagram, signs it with HMAC-SHA1 and sends it
//! as a single UDP packet. Nothing is awaited and nothing is retried.

use anyhow::{Context, Result};
use clap::Parser;
use pftabled_proto::{build_message, unix_timestamp, MessageInputs};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod keyfile;
mod report;
mod transport;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("pftabled-client: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging(cli.log_filter())?;

    let key = keyfile::resolve(cli.key.as_deref(), cli.keyfile.as_deref())?;

    let inputs = MessageInputs {
        table: &cli.table,
        command: &cli.cmd,
        ip: cli.ip.as_deref(),
    };
    let datagram = build_message(&inputs, &key, unix_timestamp())
        .context("Unable to encode message")?;

    if cli.dry_run {
        let report = report::DatagramReport::from_datagram(&cli.host, cli.port, &datagram)?;
        println!("{}", report.to_json()?);
        return Ok(());
    }

    transport::send(&cli.host, cli.port, &datagram)?;
    info!("{} sent to {}:{} (table {})", cli.cmd, cli.host, cli.port, cli.table);
    Ok(())
}

fn init_logging(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}
