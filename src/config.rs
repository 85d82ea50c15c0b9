//! Run configuration: managed domains, hosts path defaults, DNS servers.

use crate::error::{HostsError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Domains managed when no override is given.
pub const STEAM_DOMAINS: &[&str] = &[
    "api.steampowered.com",
    "steamcommunity.com",
    "store.steampowered.com",
    "help.steampowered.com",
    "login.steampowered.com",
    "steamcdn-a.akamaihd.net",
    "cdn.cloudflare.steamstatic.com",
];

/// DNS servers queried by the updater when none are given.
pub const DEFAULT_DNS_SERVERS: &str = "8.8.8.8,1.1.1.1";

/// Directory backups are written to when none is given.
pub const DEFAULT_BACKUP_DIR: &str = "./hosts_backup";

/// Upper bound on a single external lookup tool invocation.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(5);

/// Ordered, immutable set of domains whose hosts entries are managed.
///
/// # Example
///
/// ```
/// use steam_hosts::ManagedDomains;
///
/// let domains = ManagedDomains::parse("a.example, b.example,,").unwrap();
/// assert_eq!(domains.len(), 2);
/// assert!(domains.contains("A.EXAMPLE"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedDomains {
    domains: Vec<String>,
}

impl ManagedDomains {
    /// Builds a domain set, dropping blanks and duplicates while keeping order.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::InvalidConfig`] if no domain remains.
    pub fn new<I, S>(domains: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for d in domains {
            let d = d.as_ref().trim().to_ascii_lowercase();
            if !d.is_empty() && !out.contains(&d) {
                out.push(d);
            }
        }
        if out.is_empty() {
            return Err(HostsError::InvalidConfig(
                "domain list must not be empty".to_string(),
            ));
        }
        Ok(Self { domains: out })
    }

    /// Parses a comma-separated domain list.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::InvalidConfig`] if the list holds no domain.
    pub fn parse(list: &str) -> Result<Self> {
        Self::new(list.split(','))
    }

    /// The built-in Steam domain set.
    #[must_use]
    pub fn steam() -> Self {
        Self {
            domains: STEAM_DOMAINS.iter().map(|d| (*d).to_string()).collect(),
        }
    }

    /// Returns `true` if `name` is managed (ASCII case-insensitive).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.domains.iter().any(|d| d.eq_ignore_ascii_case(name))
    }

    /// Iterates the domains in configured order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }

    /// Number of managed domains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Always `false`; an empty set cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

impl Default for ManagedDomains {
    fn default() -> Self {
        Self::steam()
    }
}

/// Splits a comma-separated DNS server list, trimming entries and dropping blanks.
///
/// # Errors
///
/// Returns [`HostsError::InvalidConfig`] if no server remains.
pub fn parse_dns_servers(list: &str) -> Result<Vec<String>> {
    let servers: Vec<String> = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if servers.is_empty() {
        return Err(HostsError::InvalidConfig(format!(
            "no DNS servers in {list:?}"
        )));
    }
    Ok(servers)
}

/// Operating system family, as far as hosts file location is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// `%SystemRoot%\System32\drivers\etc\hosts`.
    Windows,
    /// `/etc/hosts`.
    Unix,
}

impl Platform {
    /// The platform this binary was built for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(windows) { Self::Windows } else { Self::Unix }
    }
}

/// Conventional hosts file path for `platform`.
///
/// `system_root` is the Windows `SystemRoot` value; it is ignored elsewhere
/// and defaults to `C:\Windows` when absent.
#[must_use]
pub fn hosts_path_for(platform: Platform, system_root: Option<&str>) -> PathBuf {
    match platform {
        Platform::Windows => {
            let root = system_root
                .filter(|r| !r.is_empty())
                .unwrap_or(r"C:\Windows")
                .trim_end_matches('\\');
            PathBuf::from(format!(r"{root}\System32\drivers\etc\hosts"))
        }
        Platform::Unix => PathBuf::from("/etc/hosts"),
    }
}

/// Hosts file path for the running system.
#[must_use]
pub fn default_hosts_path() -> PathBuf {
    let root = std::env::var("SystemRoot").ok();
    hosts_path_for(Platform::current(), root.as_deref())
}

/// Settings for one updater run.
///
/// # Example
///
/// ```
/// use steam_hosts::UpdateConfig;
///
/// let config = UpdateConfig::new("/tmp/hosts")
///     .with_backup_dir("/tmp/backups")
///     .with_dry_run(true);
///
/// assert!(config.dry_run);
/// assert_eq!(config.dns_servers, vec!["8.8.8.8", "1.1.1.1"]);
/// ```
#[derive(Debug, Clone)]
pub struct UpdateConfig {
    /// Hosts file to rewrite.
    pub hosts_path: PathBuf,

    /// Directory receiving `hosts_<timestamp>.bak` copies.
    pub backup_dir: PathBuf,

    /// DNS servers, tried in order.
    pub dns_servers: Vec<String>,

    /// Print the proposed entries instead of writing.
    pub dry_run: bool,

    /// Domains to manage.
    pub domains: ManagedDomains,
}

impl UpdateConfig {
    /// Creates a config with default backup dir, DNS servers and domains.
    #[must_use]
    pub fn new(hosts_path: impl Into<PathBuf>) -> Self {
        Self {
            hosts_path: hosts_path.into(),
            backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
            dns_servers: DEFAULT_DNS_SERVERS
                .split(',')
                .map(str::to_string)
                .collect(),
            dry_run: false,
            domains: ManagedDomains::steam(),
        }
    }

    /// Overrides the backup directory.
    #[must_use]
    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = dir.into();
        self
    }

    /// Overrides the DNS servers.
    #[must_use]
    pub fn with_dns_servers(mut self, servers: Vec<String>) -> Self {
        self.dns_servers = servers;
        self
    }

    /// Enables or disables preview mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Overrides the managed domains.
    #[must_use]
    pub fn with_domains(mut self, domains: ManagedDomains) -> Self {
        self.domains = domains;
        self
    }
}

/// Settings for one verifier run.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Hosts file to read.
    pub hosts_path: PathBuf,

    /// Domains to check.
    pub domains: ManagedDomains,
}

impl VerifyConfig {
    /// Creates a config checking the built-in domain set.
    #[must_use]
    pub fn new(hosts_path: impl Into<PathBuf>) -> Self {
        Self {
            hosts_path: hosts_path.into(),
            domains: ManagedDomains::steam(),
        }
    }

    /// Overrides the managed domains.
    #[must_use]
    pub fn with_domains(mut self, domains: ManagedDomains) -> Self {
        self.domains = domains;
        self
    }
}
