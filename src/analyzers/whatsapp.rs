use super::{is_blank, ThreatAnalysis, ThreatAnalyzer, ThreatCategory};
use crate::detection::{evaluate, summarize, IndicatorRule, Matcher, RuleSummary};
use crate::domain_utils::DomainUtils;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PHISHING_KEYWORDS: Regex = Regex::new(r"verify|confirm|update|urgent").unwrap();
}

pub const WHATSAPP_DOMAINS: [&str; 3] = ["wa.me", "whatsapp.com", "chat.whatsapp.com"];
const ABUSE_PRONE_TLDS: [&str; 3] = ["tk", "ml", "ga"];

pub struct WhatsAppLink {
    lower: String,
    host: Option<String>,
}

impl WhatsAppLink {
    fn new(link: &str) -> Self {
        let host = DomainUtils::parse_lenient(link)
            .and_then(|url| url.host_str().map(|h| h.to_lowercase()))
            .filter(|h| !h.is_empty());
        Self {
            lower: link.trim().to_lowercase(),
            host,
        }
    }

    fn is_official(&self) -> bool {
        self.host
            .as_deref()
            .map(|h| DomainUtils::matches_domain_list(h, &WHATSAPP_DOMAINS))
            .unwrap_or(false)
    }
}

fn is_foreign_domain(link: &WhatsAppLink) -> bool {
    !link.is_official()
}

fn has_abuse_prone_tld(link: &WhatsAppLink) -> bool {
    match link.host.as_deref() {
        Some(host) => DomainUtils::tld(host)
            .map(|tld| ABUSE_PRONE_TLDS.contains(&tld.as_str()))
            .unwrap_or(false),
        // Without a host, fall back to looking for the suffix anywhere.
        None => ABUSE_PRONE_TLDS
            .iter()
            .any(|tld| link.lower.contains(&format!(".{}", tld))),
    }
}

fn has_phishing_keyword(link: &WhatsAppLink) -> bool {
    PHISHING_KEYWORDS.is_match(&link.lower)
}

fn is_official_domain(link: &WhatsAppLink) -> bool {
    link.is_official()
}

// The bonus rule stays last so it applies after every positive weight.
static WHATSAPP_RULES: &[IndicatorRule<WhatsAppLink>] = &[
    IndicatorRule {
        name: "foreign_domain",
        label: "Domain Validation",
        description: "Legitimate WhatsApp domains are wa.me, whatsapp.com, chat.whatsapp.com",
        weight: 30,
        matcher: Matcher::Once {
            check: is_foreign_domain,
            message: "Not a valid WhatsApp URL format",
        },
    },
    IndicatorRule {
        name: "abuse_prone_tld",
        label: "Suspicious TLDs",
        description: ".tk, .ml, .ga are known for abuse and scams",
        weight: 25,
        matcher: Matcher::Once {
            check: has_abuse_prone_tld,
            message: "Suspicious TLD detected (known for abuse)",
        },
    },
    IndicatorRule {
        name: "phishing_keyword",
        label: "Phishing Keywords",
        description: "URLs containing \"verify\", \"confirm\", \"update\", \"urgent\"",
        weight: 20,
        matcher: Matcher::Once {
            check: has_phishing_keyword,
            message: "Phishing keywords detected in URL",
        },
    },
    IndicatorRule {
        name: "legitimate_domain",
        label: "Legitimate Domain",
        description: "Official WhatsApp host lowers the score, never below zero",
        weight: -10,
        matcher: Matcher::Adjust(is_official_domain),
    },
];

pub fn catalog() -> Vec<RuleSummary> {
    summarize(WHATSAPP_RULES)
}

pub struct WhatsAppAnalyzer;

impl Default for WhatsAppAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl WhatsAppAnalyzer {
    pub fn new() -> Self {
        WhatsAppAnalyzer
    }
}

impl ThreatAnalyzer for WhatsAppAnalyzer {
    type Input = str;

    fn analyze(&self, input: &str) -> ThreatAnalysis {
        if is_blank(input) {
            return ThreatAnalysis::neutral(ThreatCategory::SocialEngineering);
        }

        ThreatAnalysis::from_evaluation(
            ThreatCategory::SocialEngineering,
            evaluate(WHATSAPP_RULES, &WhatsAppLink::new(input)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskLevel;

    #[test]
    fn test_official_link_floors_at_zero() {
        let analysis = WhatsAppAnalyzer::new().analyze("https://wa.me/1234567890");
        assert!(analysis.indicators.is_empty());
        assert_eq!(analysis.matched_rules, vec!["legitimate_domain"]);
        assert_eq!(analysis.score, 0.0);
        assert_eq!(analysis.severity, RiskLevel::Safe);
    }

    #[test]
    fn test_lookalike_domain() {
        let analysis = WhatsAppAnalyzer::new().analyze("https://whatsapp-verify.tk/join");
        assert_eq!(
            analysis.matched_rules,
            vec!["foreign_domain", "abuse_prone_tld", "phishing_keyword"]
        );
        assert_eq!(analysis.score, 0.75);
        assert_eq!(analysis.severity, RiskLevel::High);
    }

    #[test]
    fn test_bonus_applies_after_keywords() {
        let analysis =
            WhatsAppAnalyzer::new().analyze("https://chat.whatsapp.com/invite/urgent-update");
        assert_eq!(analysis.indicators, vec!["Phishing keywords detected in URL"]);
        assert_eq!(analysis.score, 0.1);
    }

    #[test]
    fn test_subdomain_spoof_is_foreign() {
        let analysis = WhatsAppAnalyzer::new().analyze("https://wa.me.promo-offers.ml/claim");
        assert!(analysis.matched_rules.contains(&"foreign_domain".to_string()));
        assert!(analysis.matched_rules.contains(&"abuse_prone_tld".to_string()));
        assert!(!analysis.matched_rules.contains(&"legitimate_domain".to_string()));
    }

    #[test]
    fn test_schemeless_link() {
        let analysis = WhatsAppAnalyzer::new().analyze("wa.me/919876543210");
        assert_eq!(analysis.score, 0.0);
    }

    #[test]
    fn test_idempotent() {
        let analyzer = WhatsAppAnalyzer::new();
        for link in ["https://whatsapp-verify.tk/join", "wa.me/919876543210"] {
            assert_eq!(analyzer.analyze(link), analyzer.analyze(link));
        }
    }

    #[test]
    fn test_blank_is_neutral() {
        let analysis = WhatsAppAnalyzer::new().analyze("");
        assert!(analysis.matched_rules.is_empty());
        assert_eq!(analysis.score, 0.0);
    }
}
