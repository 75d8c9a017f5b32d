use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use dot11_sentry::config::SentryConfig;
use dot11_sentry::status::MessageType;
use dot11_sentry::Session;

#[derive(Parser)]
#[command(name = "dot11sentry")]
#[command(author = "Ryan Butler (Ragnt)")]
#[command(about = "Passive 802.11 dissection and anomaly detection.", long_about = None)]
#[command(version)]
struct Arguments {
    #[arg(short, long)]
    /// pcap or pcapng capture with 802.11 or radiotap frames.
    input: PathBuf,

    #[arg(short, long = "wep-key")]
    /// WEP key as BSSID,HEXKEY. Repeat for more networks.
    wep_keys: Vec<String>,

    #[arg(short, long = "alert")]
    /// Alert rate limit as NAME,rate/unit,burst/unit (unit: sec, min, hour, day).
    alerts: Vec<String>,

    #[arg(long)]
    /// Tags hashed into the IE fingerprint, e.g. 0,1,48,221-0050f2-4.
    fingerprint_tags: Option<String>,

    #[arg(long, default_value_t = false)]
    /// Accept a truncated trailing tag instead of marking the frame corrupt.
    weak_dissect: bool,

    #[arg(short, long, default_value_t = false)]
    /// Don't print alerts to the terminal.
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Arguments::parse();
    let config = SentryConfig::build(
        &cli.wep_keys,
        &cli.alerts,
        cli.fingerprint_tags.as_deref(),
        cli.weak_dissect,
        cli.quiet,
    )
    .context("Bad configuration")?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Couldn't install the interrupt handler")?;

    let mut session = Session::new(config)?;
    session.status(
        MessageType::Info,
        format!("{} WEP keys loaded", session.keys.len()),
    );

    session
        .run_capture(&cli.input, &running)
        .with_context(|| format!("Failed to process {}", cli.input.display()))?;

    if !running.load(Ordering::SeqCst) {
        info!("Interrupted, stopping early");
    }
    info!("{}", session.summary()?);
    Ok(())
}
