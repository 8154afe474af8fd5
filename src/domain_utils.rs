use std::net::Ipv4Addr;
use url::{Host, Url};

/// Minimal host helpers shared by the link analyzers
pub struct DomainUtils;

impl DomainUtils {
    /// Check if host matches any in list (with hierarchy support)
    pub fn matches_domain_list(host: &str, domain_list: &[&str]) -> bool {
        let host_lower = Self::canonicalize_domain(host);

        domain_list.iter().any(|pattern| {
            let pattern_lower = pattern.to_lowercase();
            host_lower == pattern_lower || host_lower.ends_with(&format!(".{}", pattern_lower))
        })
    }

    /// Canonicalize domain (lowercase, remove www prefix and trailing dot)
    pub fn canonicalize_domain(domain: &str) -> String {
        let domain_lower = domain.trim_end_matches('.').to_lowercase();
        match domain_lower.strip_prefix("www.") {
            Some(stripped) => stripped.to_string(),
            None => domain_lower,
        }
    }

    /// Last label of a dotted host, if it has more than one label
    pub fn tld(host: &str) -> Option<String> {
        let trimmed = host.trim_end_matches('.');
        let (_, last) = trimmed.rsplit_once('.')?;
        if last.is_empty() {
            None
        } else {
            Some(last.to_lowercase())
        }
    }

    pub fn is_ipv4_literal(url: &Url) -> bool {
        matches!(url.host(), Some(Host::Ipv4(_)))
            || url
                .host_str()
                .map(|h| h.parse::<Ipv4Addr>().is_ok())
                .unwrap_or(false)
    }

    /// Parse a link that may have been pasted without a scheme.
    pub fn parse_lenient(link: &str) -> Option<Url> {
        let trimmed = link.trim();
        match Url::parse(trimmed) {
            Ok(url) => Some(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Url::parse(&format!("https://{}", trimmed)).ok()
            }
            Err(_) => None,
        }
    }
}
