//! Hosts file tokenizing, filtering and the managed block.
//!
//! Lines are classified once into [`LineKind`] and keep their original text,
//! so everything not removed is written back byte-for-byte.

use crate::config::ManagedDomains;
use std::collections::HashMap;
use std::net::Ipv4Addr;

/// Prefix of the header comment opening a generated block.
const HEADER_PREFIX: &str = "# === Steam hosts (auto-generated)";

/// Footer comment closing a generated block.
const FOOTER: &str = "# === End Steam hosts ===";

/// Classification of a single hosts file line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Empty or whitespace only.
    Blank,
    /// First non-whitespace character is `#`.
    Comment,
    /// An address followed by zero or more hostnames.
    Entry {
        /// First token, kept verbatim (not necessarily a valid IP).
        address: String,
        /// Remaining tokens up to an inline `#`.
        hostnames: Vec<String>,
    },
}

/// A hosts file line with its original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostsLine {
    /// The line as read, without its terminator.
    pub raw: String,
    /// Parsed shape of the line.
    pub kind: LineKind,
}

impl HostsLine {
    /// Tokenizes one line.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let kind = if trimmed.is_empty() {
            LineKind::Blank
        } else if trimmed.starts_with('#') {
            LineKind::Comment
        } else {
            let data = trimmed.split_once('#').map_or(trimmed, |(d, _)| d);
            let mut tokens = data.split_whitespace().map(str::to_string);
            // `trimmed` is non-empty and does not start with '#', so there is
            // at least one token.
            let address = tokens.next().unwrap_or_default();
            LineKind::Entry {
                address,
                hostnames: tokens.collect(),
            }
        };
        Self {
            raw: raw.to_string(),
            kind,
        }
    }

    /// Returns `true` if any token of this entry, address included, is one
    /// of `domains`.
    #[must_use]
    pub fn names_any(&self, domains: &ManagedDomains) -> bool {
        match &self.kind {
            LineKind::Entry { address, hostnames } => {
                domains.contains(address) || hostnames.iter().any(|h| domains.contains(h))
            }
            LineKind::Blank | LineKind::Comment => false,
        }
    }

    /// Returns `true` for a header or footer written by [`ManagedBlock`].
    #[must_use]
    pub fn is_block_marker(&self) -> bool {
        if self.kind != LineKind::Comment {
            return false;
        }
        let t = self.raw.trim();
        t == FOOTER || (t.starts_with(HEADER_PREFIX) && t.ends_with("==="))
    }
}

/// An ordered hosts file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostsFile {
    lines: Vec<HostsLine>,
}

/// Result of [`HostsFile::filter_managed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Lines that survived, in original order.
    pub lines: Vec<String>,
    /// Number of entry lines removed.
    pub removed: usize,
}

impl HostsFile {
    /// Splits `content` into typed lines. Accepts `\n` and `\r\n`.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        Self {
            lines: content.lines().map(HostsLine::parse).collect(),
        }
    }

    /// The tokenized lines.
    #[must_use]
    pub fn lines(&self) -> &[HostsLine] {
        &self.lines
    }

    /// Drops every entry line that names a managed domain.
    ///
    /// Comments and blank lines always pass through, whatever their text.
    #[must_use]
    pub fn filter_managed(&self, domains: &ManagedDomains) -> FilterOutcome {
        let mut removed = 0;
        let mut lines = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            if line.names_any(domains) {
                removed += 1;
            } else {
                lines.push(line.raw.clone());
            }
        }
        FilterOutcome { lines, removed }
    }

    /// Maps each hostname to the address of the last entry naming it.
    ///
    /// Entries with no hostname are ignored.
    #[must_use]
    pub fn address_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for line in &self.lines {
            if let LineKind::Entry { address, hostnames } = &line.kind {
                for host in hostnames {
                    map.insert(host.to_ascii_lowercase(), address.clone());
                }
            }
        }
        map
    }
}

/// Removes header/footer comments left by earlier runs.
///
/// Returns the surviving lines and how many markers were dropped.
#[must_use]
pub fn strip_block_markers(lines: Vec<String>) -> (Vec<String>, usize) {
    let before = lines.len();
    let kept: Vec<String> = lines
        .into_iter()
        .filter(|l| !HostsLine::parse(l).is_block_marker())
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// A generated run of `address<TAB>domain` lines between marker comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedBlock {
    timestamp: String,
    entries: Vec<(Ipv4Addr, String)>,
}

impl ManagedBlock {
    /// Starts an empty block stamped with `timestamp` (`YYYYMMDD_HHMMSS`).
    #[must_use]
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            entries: Vec::new(),
        }
    }

    /// Appends one line per address for `domain`, skipping pairs already present.
    pub fn push<I>(&mut self, domain: &str, addrs: I)
    where
        I: IntoIterator<Item = Ipv4Addr>,
    {
        for addr in addrs {
            let pair = (addr, domain.to_string());
            if !self.entries.contains(&pair) {
                self.entries.push(pair);
            }
        }
    }

    /// The entry lines, without markers.
    #[must_use]
    pub fn entry_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(addr, domain)| format!("{addr}\t{domain}"))
            .collect()
    }

    /// Number of entry lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Header, entries, footer.
    ///
    /// ```text
    /// # === Steam hosts (auto-generated) 20240101_120000 ===
    /// 203.0.113.5	api.steampowered.com
    /// # === End Steam hosts ===
    /// ```
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.entries.len() + 2);
        out.push(format!("{HEADER_PREFIX} {} ===", self.timestamp));
        out.extend(self.entry_lines());
        out.push(FOOTER.to_string());
        out
    }
}

/// Joins lines into file content with a trailing newline.
#[must_use]
pub fn render_content(lines: &[String]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
