//! `steam-hosts-update`: rewrite the Steam block of the hosts file.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use steam_hosts::config::{DEFAULT_BACKUP_DIR, DEFAULT_DNS_SERVERS};
use steam_hosts::{
    HostsError, ManagedDomains, ResolutionChain, UpdateConfig, Updater, default_hosts_path,
    parse_dns_servers, util,
};
use tracing::{Level, error, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "steam-hosts-update", version)]
/// Update Steam hosts entries.
struct Args {
    /// Hosts file to rewrite (defaults to the platform location)
    #[arg(long = "hosts", env = "STEAM_HOSTS_FILE")]
    hosts_path: Option<PathBuf>,

    /// Directory for timestamped backups
    #[arg(long, default_value = DEFAULT_BACKUP_DIR)]
    backup_dir: PathBuf,

    /// Comma-separated DNS servers, tried in order
    #[arg(long = "dns", default_value = DEFAULT_DNS_SERVERS)]
    dns_servers: String,

    /// Comma-separated domains to manage instead of the built-in Steam set
    #[arg(long)]
    domains: Option<String>,

    /// Seconds to wait for each dig/nslookup/getent call
    #[arg(long, default_value_t = 5)]
    timeout: u64,

    /// Print the proposed entries without writing the hosts file
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn build_config(args: &Args) -> Result<UpdateConfig> {
    let hosts_path = args.hosts_path.clone().unwrap_or_else(default_hosts_path);
    let domains = match &args.domains {
        Some(list) => ManagedDomains::parse(list)?,
        None => ManagedDomains::steam(),
    };
    Ok(UpdateConfig::new(hosts_path)
        .with_backup_dir(&args.backup_dir)
        .with_dns_servers(parse_dns_servers(&args.dns_servers)?)
        .with_domains(domains)
        .with_dry_run(args.dry_run))
}

fn main() -> ExitCode {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let config = match build_config(&args) {
        Ok(c) => c,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    if !config.dry_run && config.hosts_path.exists() && !util::is_writable(&config.hosts_path) {
        warn!(
            path = %config.hosts_path.display(),
            "Hosts file is not writable by this user, the update will likely fail"
        );
    }

    let chain = ResolutionChain::external_tools(Duration::from_secs(args.timeout));
    match Updater::with_chain(config, chain).run() {
        Ok(report) => {
            if !report.written {
                println!("Proposed entries:");
                for line in &report.entries {
                    println!("{line}");
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if e.is_permission_denied() {
                error!("{e} (try again with administrator privileges)");
            } else if let HostsError::HostsNotFound { .. } = e {
                error!("{e}");
            } else {
                error!("Update failed: {e}");
            }
            ExitCode::FAILURE
        }
    }
}
