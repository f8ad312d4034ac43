//! Candidate-line grammar and typed candidate records.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Candidate type extracted from the `typ` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    Host,
    Srflx,
    Relay,
    Prflx,
    Unknown,
}

impl CandidateKind {
    fn from_token(token: &str) -> Self {
        match token {
            "host" => CandidateKind::Host,
            "srflx" => CandidateKind::Srflx,
            "relay" => CandidateKind::Relay,
            "prflx" => CandidateKind::Prflx,
            _ => CandidateKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateKind::Host => "host",
            CandidateKind::Srflx => "srflx",
            CandidateKind::Relay => "relay",
            CandidateKind::Prflx => "prflx",
            CandidateKind::Unknown => "unknown",
        }
    }
}

/// Address family of a candidate's address token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    V4,
    V6,
    /// The address token was not a literal IP (e.g. an obfuscated hostname).
    Unresolved,
}

/// Bucketing scope of a candidate's address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressScope {
    Public,
    Private,
    /// Loopback/unspecified or non-literal; retained in history only.
    Discarded,
}

/// Full positional grammar of a candidate line:
/// `candidate:<foundation> <component> <transport> <priority> <address> <port> typ <kind> [<key> <value>]...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFields {
    pub foundation: String,
    pub component: u32,
    pub transport: String,
    pub priority: u64,
    pub address: String,
    pub port: u16,
    pub kind: CandidateKind,
    pub extensions: Vec<(String, String)>,
}

/// Parse the full positional grammar. Returns `None` when any mandatory
/// field is missing or malformed; the `typ`-only tier still applies then.
pub fn parse_fields(line: &str) -> Option<CandidateFields> {
    let mut tokens = line.split_whitespace();

    let head = tokens.next()?;
    let foundation = head.strip_prefix("candidate:")?.to_string();
    if foundation.is_empty() {
        return None;
    }

    let component: u32 = tokens.next()?.parse().ok()?;
    let transport = tokens.next()?.to_string();
    let priority: u64 = tokens.next()?.parse().ok()?;
    let address = tokens.next()?.to_string();
    let port: u16 = tokens.next()?.parse().ok()?;

    if tokens.next()? != "typ" {
        return None;
    }
    let kind = CandidateKind::from_token(tokens.next()?);

    let mut extensions = Vec::new();
    while let Some(key) = tokens.next() {
        let value = tokens.next().unwrap_or_default();
        extensions.push((key.to_string(), value.to_string()));
    }

    Some(CandidateFields {
        foundation,
        component,
        transport,
        priority,
        address,
        port,
        kind,
        extensions,
    })
}

/// Best-effort tier: extract the `typ <kind>` token regardless of whether
/// the rest of the line parses.
pub fn extract_kind(line: &str) -> Option<CandidateKind> {
    let mut tokens = line.split_whitespace();
    while let Some(token) = tokens.next() {
        if token == "typ" {
            return tokens.next().map(CandidateKind::from_token);
        }
    }
    None
}

/// Literal IPv4 or IPv6 shape check. Obfuscated hostnames fail this and
/// are excluded from address buckets.
pub fn is_literal_address(s: &str) -> bool {
    s.parse::<Ipv4Addr>().is_ok() || s.parse::<Ipv6Addr>().is_ok()
}

/// Discard-class addresses are dropped from all buckets.
pub fn is_discard_address(s: &str) -> bool {
    matches!(s, "0.0.0.0" | "127.0.0.1" | "::" | "::1")
}

fn is_private_v4(s: &str) -> bool {
    if s.starts_with("10.") || s.starts_with("192.168.") || s.starts_with("169.254.") {
        return true;
    }
    // 172.16.0.0/12
    if let Some(rest) = s.strip_prefix("172.") {
        if let Some(second) = rest.split('.').next() {
            if let Ok(octet) = second.parse::<u8>() {
                return (16..=31).contains(&octet);
            }
        }
    }
    false
}

fn is_private_v6(s: &str) -> bool {
    // Loopback, link-local, unique-local.
    let lower = s.to_ascii_lowercase();
    lower == "::1" || lower.starts_with("fe80:") || lower.starts_with("fc") || lower.starts_with("fd")
}

/// One parsed transport candidate as it appears in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// The line as received; always retained in history.
    pub raw_line: String,
    /// Literal address, if the address token passed the shape check.
    pub address: Option<String>,
    pub family: AddressFamily,
    pub scope: AddressScope,
    pub kind: CandidateKind,
}

impl CandidateRecord {
    /// Classify a candidate line. Never fails: a line with no extractable
    /// address still contributes its kind and raw line.
    pub fn from_line(line: &str) -> Self {
        let kind = extract_kind(line).unwrap_or(CandidateKind::Unknown);

        let address_token = parse_fields(line).map(|f| f.address);
        let (address, family, scope) = match address_token {
            Some(addr) if is_literal_address(&addr) => {
                let family = if addr.contains(':') {
                    AddressFamily::V6
                } else {
                    AddressFamily::V4
                };
                let scope = if is_discard_address(&addr) {
                    AddressScope::Discarded
                } else {
                    let private = match family {
                        AddressFamily::V4 => is_private_v4(&addr),
                        _ => is_private_v6(&addr),
                    };
                    if private {
                        AddressScope::Private
                    } else {
                        AddressScope::Public
                    }
                };
                (Some(addr), family, scope)
            }
            _ => (None, AddressFamily::Unresolved, AddressScope::Discarded),
        };

        Self {
            raw_line: line.to_string(),
            address,
            family,
            scope,
            kind,
        }
    }
}
