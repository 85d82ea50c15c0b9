//! `steam-hosts-verify`: check Steam hosts entries against live resolution.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use steam_hosts::{ManagedDomains, Verifier, VerifyConfig, default_hosts_path};
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

/// Exit codes reported to the caller.
#[derive(Debug, Clone, Copy)]
enum VerifyExitCode {
    /// Every domain present and matching.
    Consistent = 0,
    /// Hosts file missing or unreadable, or bad arguments.
    Error = 1,
    /// At least one domain missing or mismatched.
    Inconsistent = 2,
}

impl From<VerifyExitCode> for ExitCode {
    fn from(code: VerifyExitCode) -> Self {
        Self::from(code as u8)
    }
}

#[derive(Parser)]
#[command(name = "steam-hosts-verify", version)]
/// Verify Steam hosts entries.
struct Args {
    /// Hosts file to read (defaults to the platform location)
    #[arg(long = "hosts", env = "STEAM_HOSTS_FILE")]
    hosts_path: Option<PathBuf>,

    /// Comma-separated domains to check instead of the built-in Steam set
    #[arg(long)]
    domains: Option<String>,

    /// Debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn build_config(args: &Args) -> Result<VerifyConfig> {
    let hosts_path = args.hosts_path.clone().unwrap_or_else(default_hosts_path);
    let mut config = VerifyConfig::new(hosts_path);
    if let Some(list) = &args.domains {
        config = config.with_domains(ManagedDomains::parse(list)?);
    }
    Ok(config)
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Per-domain results go to stdout; only diagnostics are logged.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::ERROR })
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let config = match build_config(&args) {
        Ok(c) => c,
        Err(e) => {
            error!("{e:#}");
            return VerifyExitCode::Error.into();
        }
    };

    match Verifier::new(config).run() {
        Ok(report) => {
            for check in &report.checks {
                println!("{check}");
            }
            if report.all_ok() {
                VerifyExitCode::Consistent.into()
            } else {
                VerifyExitCode::Inconsistent.into()
            }
        }
        Err(e) => {
            error!("{e}");
            VerifyExitCode::Error.into()
        }
    }
}
