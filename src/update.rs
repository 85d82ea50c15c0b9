//! Backup, filter, resolve and rewrite the hosts file.

use crate::config::UpdateConfig;
use crate::error::{HostsError, Result};
use crate::hosts::{HostsFile, ManagedBlock, render_content, strip_block_markers};
use crate::resolve::ResolutionChain;
use std::path::{Path, PathBuf};

/// Outcome of an [`Updater::run`].
#[derive(Debug, Clone)]
pub struct UpdateReport {
    /// Where the pre-update copy was written.
    pub backup_path: PathBuf,
    /// Entry lines removed because they named a managed domain.
    pub removed: usize,
    /// Marker comments from earlier runs that were dropped.
    pub stale_markers: usize,
    /// Generated `address<TAB>domain` lines.
    pub entries: Vec<String>,
    /// Domains for which nothing resolved.
    pub unresolved: Vec<String>,
    /// `false` in preview mode.
    pub written: bool,
}

/// Rewrites the managed block of a hosts file.
///
/// # Example
///
/// ```rust,ignore
/// use steam_hosts::{UpdateConfig, Updater};
///
/// let report = Updater::new(UpdateConfig::new("/etc/hosts")).run()?;
/// println!("{} entries written", report.entries.len());
/// ```
pub struct Updater {
    config: UpdateConfig,
    chain: ResolutionChain,
}

impl Updater {
    /// Creates an updater using the external lookup tools.
    #[must_use]
    pub fn new(config: UpdateConfig) -> Self {
        Self::with_chain(config, ResolutionChain::default())
    }

    /// Creates an updater with a custom resolution chain.
    #[must_use]
    pub const fn with_chain(config: UpdateConfig, chain: ResolutionChain) -> Self {
        Self { config, chain }
    }

    /// The run configuration.
    #[must_use]
    pub const fn config(&self) -> &UpdateConfig {
        &self.config
    }

    /// Performs one update.
    ///
    /// The hosts file is copied to the backup directory before anything
    /// else happens, and is then replaced with a single write. Domains that
    /// do not resolve are logged and left out.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::HostsNotFound`] if the hosts file is missing,
    /// or [`HostsError::Io`] if the backup, read or write fails.
    pub fn run(&self) -> Result<UpdateReport> {
        let hosts_path = &self.config.hosts_path;
        if !hosts_path.exists() {
            return Err(HostsError::HostsNotFound {
                path: hosts_path.clone(),
            });
        }

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let backup_path = backup(hosts_path, &self.config.backup_dir, &timestamp)?;
        tracing::info!(path = %backup_path.display(), "Backup created");

        let raw = std::fs::read(hosts_path)?;
        let content = String::from_utf8_lossy(&raw);
        let filtered = HostsFile::parse(&content).filter_managed(&self.config.domains);
        tracing::info!(removed = filtered.removed, "Removed existing managed host entries");

        let (mut lines, stale_markers) = strip_block_markers(filtered.lines);
        if stale_markers > 0 {
            tracing::info!(count = stale_markers, "Removed stale block markers");
        }

        let mut block = ManagedBlock::new(timestamp);
        let mut unresolved = Vec::new();
        for domain in self.config.domains.iter() {
            let addrs = self.chain.resolve(domain, &self.config.dns_servers);
            if addrs.is_empty() {
                tracing::warn!(
                    domain = %domain,
                    dns = %self.config.dns_servers.join(", "),
                    "Failed to resolve"
                );
                unresolved.push(domain.to_string());
                continue;
            }
            block.push(domain, addrs);
        }

        let entries = block.entry_lines();
        let mut report = UpdateReport {
            backup_path,
            removed: filtered.removed,
            stale_markers,
            entries,
            unresolved,
            written: false,
        };

        if self.config.dry_run {
            tracing::info!("Dry run, hosts file left unchanged");
            return Ok(report);
        }

        lines.extend(block.render());
        std::fs::write(hosts_path, render_content(&lines))?;
        tracing::info!(path = %hosts_path.display(), entries = block.len(), "Hosts updated");
        report.written = true;
        Ok(report)
    }
}

/// Copies `hosts` to `<dir>/hosts_<timestamp>.bak`, never replacing an
/// existing backup.
fn backup(hosts: &Path, dir: &Path, timestamp: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let mut path = dir.join(format!("hosts_{timestamp}.bak"));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("hosts_{timestamp}_{n}.bak"));
        n += 1;
    }
    std::fs::copy(hosts, &path)?;
    Ok(path)
}
