//! Compare managed hosts entries against live resolution.

use crate::config::VerifyConfig;
use crate::error::{HostsError, Result};
use crate::hosts::HostsFile;
use crate::resolve::{AddrSet, LocalResolver, SystemResolver};
use std::fmt;

/// Verification result for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainStatus {
    /// The hosts address is among the resolved addresses.
    Ok {
        /// Address from the hosts file.
        address: String,
    },
    /// No hosts entry names the domain.
    Missing,
    /// The hosts address was not returned by resolution.
    Mismatch {
        /// Address from the hosts file.
        address: String,
        /// What resolution returned (possibly nothing).
        resolved: AddrSet,
    },
}

impl DomainStatus {
    /// Returns `true` for [`DomainStatus::Ok`].
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

/// One line of a verification report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainCheck {
    /// The managed domain.
    pub domain: String,
    /// Its status.
    pub status: DomainStatus,
}

impl fmt::Display for DomainCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            DomainStatus::Ok { address } => write!(f, "[OK] {} -> {address}", self.domain),
            DomainStatus::Missing => write!(f, "[WARN] hosts missing: {}", self.domain),
            DomainStatus::Mismatch { address, resolved } => {
                write!(f, "[WARN] {} hosts={address} resolved=", self.domain)?;
                if resolved.is_empty() {
                    f.write_str("none")
                } else {
                    let list: Vec<String> = resolved.iter().map(ToString::to_string).collect();
                    write!(f, "{}", list.join(","))
                }
            }
        }
    }
}

/// Per-domain outcomes, in managed-domain order.
#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    /// One check per managed domain.
    pub checks: Vec<DomainCheck>,
}

impl VerifyReport {
    /// Returns `true` if every domain is present and matches.
    #[must_use]
    pub fn all_ok(&self) -> bool {
        self.checks.iter().all(|c| c.status.is_ok())
    }
}

/// Checks hosts entries for the managed domains.
pub struct Verifier {
    config: VerifyConfig,
    resolver: Box<dyn LocalResolver>,
}

impl Verifier {
    /// Creates a verifier using the native system resolver.
    #[must_use]
    pub fn new(config: VerifyConfig) -> Self {
        Self::with_resolver(config, Box::new(SystemResolver))
    }

    /// Creates a verifier with a custom resolver.
    #[must_use]
    pub fn with_resolver(config: VerifyConfig, resolver: Box<dyn LocalResolver>) -> Self {
        Self { config, resolver }
    }

    /// Reads the hosts file and checks each managed domain.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::HostsNotFound`] if the hosts file is missing,
    /// or [`HostsError::Io`] if it cannot be read.
    pub fn run(&self) -> Result<VerifyReport> {
        let path = &self.config.hosts_path;
        if !path.exists() {
            return Err(HostsError::HostsNotFound { path: path.clone() });
        }
        let raw = std::fs::read(path)?;
        let map = HostsFile::parse(&String::from_utf8_lossy(&raw)).address_map();

        let mut report = VerifyReport::default();
        for domain in self.config.domains.iter() {
            let status = match map.get(domain) {
                None => {
                    tracing::warn!(domain = %domain, "Missing from hosts");
                    DomainStatus::Missing
                }
                Some(address) => {
                    let resolved = self.resolver.resolve(domain);
                    if resolved.iter().any(|ip| ip.to_string() == *address) {
                        DomainStatus::Ok {
                            address: address.clone(),
                        }
                    } else {
                        tracing::warn!(domain = %domain, hosts = %address, "Hosts address does not match resolution");
                        DomainStatus::Mismatch {
                            address: address.clone(),
                            resolved,
                        }
                    }
                }
            };
            report.checks.push(DomainCheck {
                domain: domain.to_string(),
                status,
            });
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn display_lines() {
        let ok = DomainCheck {
            domain: "a.test".into(),
            status: DomainStatus::Ok {
                address: "1.2.3.4".into(),
            },
        };
        assert_eq!(ok.to_string(), "[OK] a.test -> 1.2.3.4");

        let missing = DomainCheck {
            domain: "a.test".into(),
            status: DomainStatus::Missing,
        };
        assert_eq!(missing.to_string(), "[WARN] hosts missing: a.test");

        let mismatch = DomainCheck {
            domain: "a.test".into(),
            status: DomainStatus::Mismatch {
                address: "1.2.3.4".into(),
                resolved: [Ipv4Addr::new(5, 6, 7, 8), Ipv4Addr::new(1, 1, 1, 1)]
                    .into_iter()
                    .collect(),
            },
        };
        assert_eq!(
            mismatch.to_string(),
            "[WARN] a.test hosts=1.2.3.4 resolved=1.1.1.1,5.6.7.8"
        );

        let unresolved = DomainCheck {
            domain: "a.test".into(),
            status: DomainStatus::Mismatch {
                address: "1.2.3.4".into(),
                resolved: AddrSet::new(),
            },
        };
        assert_eq!(unresolved.to_string(), "[WARN] a.test hosts=1.2.3.4 resolved=none");
    }

    #[test]
    fn empty_report_is_ok() {
        assert!(VerifyReport::default().all_ok());
    }
}
