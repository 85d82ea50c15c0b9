//! # steam-hosts
//!
//! Keep the Steam entries of the system hosts file pinned to freshly
//! resolved addresses, and check that they still match.
//!
//! The updater backs the hosts file up, removes every entry line naming a
//! managed domain, resolves each domain and appends a marked block:
//!
//! ```text
//! # === Steam hosts (auto-generated) 20240101_120000 ===
//! 203.0.113.5	api.steampowered.com
//! # === End Steam hosts ===
//! ```
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use steam_hosts::{UpdateConfig, Updater, VerifyConfig, Verifier};
//!
//! // Rewrite (requires write access to the hosts file).
//! let report = Updater::new(UpdateConfig::new("/etc/hosts")).run()?;
//! for domain in &report.unresolved {
//!     eprintln!("no address for {domain}");
//! }
//!
//! // Check.
//! let report = Verifier::new(VerifyConfig::new("/etc/hosts")).run()?;
//! assert!(report.all_ok());
//! ```
//!
//! ## Resolution
//!
//! Each DNS server is asked with `dig`, then `nslookup`; the first server
//! with an answer wins. If none answers, `getent ahosts` is consulted. Only
//! IPv4 addresses are kept. Missing tools and timeouts count as "no answer".
//! Strategies are traits ([`ServerResolver`], [`LocalResolver`]) so they can
//! be replaced.
//!
//! ## Permissions
//!
//! Writing the hosts file usually requires root (or Administrator). The
//! caller is responsible for privilege elevation.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod hosts;
pub mod resolve;
pub mod update;
pub mod util;
pub mod verify;

pub use config::{
    ManagedDomains, Platform, UpdateConfig, VerifyConfig, default_hosts_path, hosts_path_for,
    parse_dns_servers,
};
pub use error::{HostsError, Result, ToolError};
pub use hosts::{HostsFile, HostsLine, LineKind, ManagedBlock};
pub use resolve::{AddrSet, LocalResolver, ResolutionChain, ServerResolver, SystemResolver};
pub use update::{UpdateReport, Updater};
pub use verify::{DomainCheck, DomainStatus, Verifier, VerifyReport};
