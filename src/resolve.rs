//! Domain resolution strategies and the fallback chain.
//!
//! Every strategy answers with a (possibly empty) set of IPv4 addresses.
//! Missing tools, timeouts and garbage output all become an empty set; no
//! error crosses this module's boundary.

use crate::config::DEFAULT_TOOL_TIMEOUT;
use crate::util::run_with_timeout;
use std::collections::BTreeSet;
use std::net::{Ipv4Addr, ToSocketAddrs};
use std::time::Duration;

/// Sorted, de-duplicated IPv4 addresses.
pub type AddrSet = BTreeSet<Ipv4Addr>;

/// Resolves a domain by asking a specific DNS server.
pub trait ServerResolver {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Queries `server` for the A records of `domain`.
    fn resolve(&self, domain: &str, server: &str) -> AddrSet;
}

/// Resolves a domain through the local system configuration.
pub trait LocalResolver {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Looks up the IPv4 addresses of `domain`.
    fn resolve(&self, domain: &str) -> AddrSet;
}

/// Runs a lookup tool and folds every failure into `None`.
fn tool_output(program: &str, args: &[&str], timeout: Duration) -> Option<String> {
    match run_with_timeout(program, args, timeout) {
        Ok(out) => Some(out),
        Err(e) => {
            tracing::debug!(error = %e, "Lookup tool produced no answer");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// dig
// ---------------------------------------------------------------------------

/// `dig @<server> +short <domain>`.
#[derive(Debug, Clone)]
pub struct DigResolver {
    timeout: Duration,
}

impl DigResolver {
    /// Creates a resolver with the default 5 second timeout.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    /// Overrides the per-invocation timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for DigResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerResolver for DigResolver {
    fn name(&self) -> &'static str {
        "dig"
    }

    fn resolve(&self, domain: &str, server: &str) -> AddrSet {
        let at = format!("@{server}");
        tool_output("dig", &[&at, "+short", domain], self.timeout)
            .map(|out| parse_dig_short(&out))
            .unwrap_or_default()
    }
}

/// Parses `dig +short` output. CNAME targets and AAAA answers are skipped.
#[must_use]
pub fn parse_dig_short(output: &str) -> AddrSet {
    output
        .lines()
        .filter_map(|l| l.trim().parse::<Ipv4Addr>().ok())
        .collect()
}

// ---------------------------------------------------------------------------
// nslookup
// ---------------------------------------------------------------------------

/// `nslookup <domain> <server>`.
#[derive(Debug, Clone)]
pub struct NslookupResolver {
    timeout: Duration,
}

impl NslookupResolver {
    /// Creates a resolver with the default 5 second timeout.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    /// Overrides the per-invocation timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for NslookupResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerResolver for NslookupResolver {
    fn name(&self) -> &'static str {
        "nslookup"
    }

    fn resolve(&self, domain: &str, server: &str) -> AddrSet {
        tool_output("nslookup", &[domain, server], self.timeout)
            .map(|out| parse_nslookup(&out))
            .unwrap_or_default()
    }
}

/// Parses `nslookup` output.
///
/// Only addresses after the first `Name:` line count; the lines before it
/// describe the server that answered. Handles both the Unix layout (one
/// `Address:` per record) and the Windows layout (`Addresses:` followed by
/// indented continuation lines).
#[must_use]
pub fn parse_nslookup(output: &str) -> AddrSet {
    let mut addrs = AddrSet::new();
    let mut in_answer = false;
    let mut in_list = false;

    for line in output.lines() {
        let trimmed = line.trim();
        let Some((label, value)) = trimmed.split_once(':') else {
            if in_list && line.starts_with(char::is_whitespace) {
                if let Ok(ip) = trimmed.parse::<Ipv4Addr>() {
                    addrs.insert(ip);
                }
            } else {
                in_list = false;
            }
            continue;
        };

        // An IPv6 continuation line contains colons; it is never an IPv4 answer.
        if in_list && line.starts_with(char::is_whitespace) && trimmed.parse::<Ipv4Addr>().is_err() {
            continue;
        }
        in_list = false;

        let label = label.trim().to_ascii_lowercase();
        if label == "name" {
            in_answer = true;
        } else if in_answer && (label == "address" || label == "addresses") {
            if let Ok(ip) = value.trim().parse::<Ipv4Addr>() {
                addrs.insert(ip);
            }
            in_list = label == "addresses";
        }
    }
    addrs
}

// ---------------------------------------------------------------------------
// getent
// ---------------------------------------------------------------------------

/// `getent ahosts <domain>`: the local host database, including `/etc/hosts`
/// and NSS modules.
#[derive(Debug, Clone)]
pub struct GetentResolver {
    timeout: Duration,
}

impl GetentResolver {
    /// Creates a resolver with the default 5 second timeout.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    /// Overrides the per-invocation timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for GetentResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalResolver for GetentResolver {
    fn name(&self) -> &'static str {
        "getent"
    }

    fn resolve(&self, domain: &str) -> AddrSet {
        tool_output("getent", &["ahosts", domain], self.timeout)
            .map(|out| parse_getent_ahosts(&out))
            .unwrap_or_default()
    }
}

/// Parses `getent ahosts` output: the first column of each line.
#[must_use]
pub fn parse_getent_ahosts(output: &str) -> AddrSet {
    output
        .lines()
        .filter_map(|l| l.split_whitespace().next())
        .filter_map(|tok| tok.parse::<Ipv4Addr>().ok())
        .collect()
}

// ---------------------------------------------------------------------------
// System resolver
// ---------------------------------------------------------------------------

/// The process's native address resolution (`getaddrinfo`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl LocalResolver for SystemResolver {
    fn name(&self) -> &'static str {
        "system"
    }

    fn resolve(&self, domain: &str) -> AddrSet {
        match (domain, 0).to_socket_addrs() {
            Ok(addrs) => addrs
                .filter_map(|a| match a.ip() {
                    std::net::IpAddr::V4(v4) => Some(v4),
                    std::net::IpAddr::V6(_) => None,
                })
                .collect(),
            Err(e) => {
                tracing::debug!(domain = %domain, error = %e, "System lookup failed");
                AddrSet::new()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// Ordered fallback over the resolution strategies.
///
/// For each DNS server in turn: the primary tool, then the secondary tool if
/// the primary found nothing. The first server with any answer wins. If no
/// server answers, the local fallback is asked once.
pub struct ResolutionChain {
    primary: Box<dyn ServerResolver>,
    secondary: Box<dyn ServerResolver>,
    fallback: Box<dyn LocalResolver>,
}

impl ResolutionChain {
    /// Builds a chain from explicit strategies.
    #[must_use]
    pub fn new(
        primary: Box<dyn ServerResolver>,
        secondary: Box<dyn ServerResolver>,
        fallback: Box<dyn LocalResolver>,
    ) -> Self {
        Self {
            primary,
            secondary,
            fallback,
        }
    }

    /// `dig`, then `nslookup`, then `getent`, each bounded by `timeout`.
    #[must_use]
    pub fn external_tools(timeout: Duration) -> Self {
        Self::new(
            Box::new(DigResolver::new().with_timeout(timeout)),
            Box::new(NslookupResolver::new().with_timeout(timeout)),
            Box::new(GetentResolver::new().with_timeout(timeout)),
        )
    }

    /// Resolves `domain`, returning an empty set if every strategy fails.
    #[must_use]
    pub fn resolve(&self, domain: &str, servers: &[String]) -> AddrSet {
        for server in servers {
            let mut addrs = self.primary.resolve(domain, server);
            if addrs.is_empty() {
                tracing::debug!(
                    domain = %domain,
                    server = %server,
                    tool = self.primary.name(),
                    "No answer, trying {}",
                    self.secondary.name()
                );
                addrs = self.secondary.resolve(domain, server);
            }
            if !addrs.is_empty() {
                tracing::debug!(domain = %domain, server = %server, count = addrs.len(), "Resolved");
                return addrs;
            }
        }

        tracing::debug!(
            domain = %domain,
            tool = self.fallback.name(),
            "No DNS server answered, using local fallback"
        );
        self.fallback.resolve(domain)
    }
}

impl Default for ResolutionChain {
    fn default() -> Self {
        Self::external_tools(DEFAULT_TOOL_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    type CallLog = Rc<RefCell<Vec<String>>>;

    struct Scripted {
        name: &'static str,
        answers: HashMap<String, Vec<Ipv4Addr>>,
        calls: CallLog,
    }

    impl Scripted {
        fn new(name: &'static str, calls: &CallLog) -> Self {
            Self {
                name,
                answers: HashMap::new(),
                calls: Rc::clone(calls),
            }
        }

        fn answer(mut self, key: &str, ips: &[[u8; 4]]) -> Self {
            self.answers
                .insert(key.to_string(), ips.iter().map(|o| Ipv4Addr::from(*o)).collect());
            self
        }

        fn lookup(&self, key: String) -> AddrSet {
            self.calls.borrow_mut().push(format!("{} {key}", self.name));
            self.answers
                .get(&key)
                .map(|v| v.iter().copied().collect())
                .unwrap_or_default()
        }
    }

    impl ServerResolver for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }
        fn resolve(&self, domain: &str, server: &str) -> AddrSet {
            self.lookup(format!("{domain}@{server}"))
        }
    }

    impl LocalResolver for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }
        fn resolve(&self, domain: &str) -> AddrSet {
            self.lookup(domain.to_string())
        }
    }

    fn servers() -> Vec<String> {
        vec!["8.8.8.8".into(), "1.1.1.1".into()]
    }

    #[test]
    fn primary_answer_stops_chain() {
        let calls = CallLog::default();
        let chain = ResolutionChain::new(
            Box::new(Scripted::new("dig", &calls).answer("a.test@8.8.8.8", &[[1, 2, 3, 4]])),
            Box::new(Scripted::new("ns", &calls)),
            Box::new(Scripted::new("local", &calls)),
        );
        let got = chain.resolve("a.test", &servers());
        assert_eq!(got.into_iter().collect::<Vec<_>>(), vec![Ipv4Addr::new(1, 2, 3, 4)]);
        assert_eq!(*calls.borrow(), vec!["dig a.test@8.8.8.8"]);
    }

    #[test]
    fn secondary_then_next_server() {
        let calls = CallLog::default();
        let chain = ResolutionChain::new(
            Box::new(Scripted::new("dig", &calls)),
            Box::new(Scripted::new("ns", &calls).answer("a.test@1.1.1.1", &[[9, 9, 9, 9], [1, 1, 1, 2]])),
            Box::new(Scripted::new("local", &calls)),
        );
        let got: Vec<_> = chain.resolve("a.test", &servers()).into_iter().collect();
        assert_eq!(got, vec![Ipv4Addr::new(1, 1, 1, 2), Ipv4Addr::new(9, 9, 9, 9)]);
        assert_eq!(
            *calls.borrow(),
            vec![
                "dig a.test@8.8.8.8",
                "ns a.test@8.8.8.8",
                "dig a.test@1.1.1.1",
                "ns a.test@1.1.1.1",
            ]
        );
    }

    #[test]
    fn local_fallback_runs_once() {
        let calls = CallLog::default();
        let chain = ResolutionChain::new(
            Box::new(Scripted::new("dig", &calls)),
            Box::new(Scripted::new("ns", &calls)),
            Box::new(Scripted::new("local", &calls).answer("a.test", &[[5, 5, 5, 5]])),
        );
        assert_eq!(chain.resolve("a.test", &servers()).len(), 1);
        assert_eq!(calls.borrow().iter().filter(|c| c.starts_with("local")).count(), 1);
    }

    #[test]
    fn total_failure_is_empty() {
        let calls = CallLog::default();
        let chain = ResolutionChain::new(
            Box::new(Scripted::new("dig", &calls)),
            Box::new(Scripted::new("ns", &calls)),
            Box::new(Scripted::new("local", &calls)),
        );
        assert!(chain.resolve("a.test", &[]).is_empty());
        assert_eq!(*calls.borrow(), vec!["local a.test"]);
    }

    #[test]
    fn dig_output_skips_cname_and_ipv6() {
        let out = "edge.example.net.\n203.0.113.7\n2001:db8::1\n203.0.113.5\n203.0.113.7\n";
        let got: Vec<_> = parse_dig_short(out).into_iter().collect();
        assert_eq!(
            got,
            vec![Ipv4Addr::new(203, 0, 113, 5), Ipv4Addr::new(203, 0, 113, 7)]
        );
    }

    #[test]
    fn nslookup_unix_output() {
        let out = "Server:\t\t8.8.8.8\nAddress:\t8.8.8.8#53\n\nNon-authoritative answer:\n\
                   Name:\tsteamcommunity.com\nAddress: 104.94.2.3\n\
                   Name:\tsteamcommunity.com\nAddress: 2600:1406::1\n";
        let got: Vec<_> = parse_nslookup(out).into_iter().collect();
        assert_eq!(got, vec![Ipv4Addr::new(104, 94, 2, 3)]);
    }

    #[test]
    fn nslookup_windows_output_skips_server_address() {
        let out = "Server:  dns.google\nAddress:  8.8.8.8\n\nNon-authoritative answer:\n\
                   Name:    steamcommunity.com\nAddresses:  2600:1406::1\n          23.1.1.1\n          23.1.1.2\n";
        let got: Vec<_> = parse_nslookup(out).into_iter().collect();
        assert_eq!(got, vec![Ipv4Addr::new(23, 1, 1, 1), Ipv4Addr::new(23, 1, 1, 2)]);
    }

    #[test]
    fn getent_output_keeps_ipv4_first_column() {
        let out = "23.1.1.1        STREAM store.steampowered.com\n\
                   23.1.1.1        DGRAM\n\
                   2600:1406::1    STREAM\n";
        let got: Vec<_> = parse_getent_ahosts(out).into_iter().collect();
        assert_eq!(got, vec![Ipv4Addr::new(23, 1, 1, 1)]);
    }

    #[test]
    fn system_resolver_handles_unresolvable_name() {
        assert!(SystemResolver.resolve("name.invalid").is_empty());
    }

    #[test]
    fn system_resolver_localhost_is_ipv4_only() {
        let got = SystemResolver.resolve("localhost");
        assert!(got.iter().all(|ip| !ip.to_string().contains(':')));
    }
}
