pub mod message;
pub mod phone;
pub mod qr;
pub mod url;
pub mod whatsapp;

use crate::detection::Evaluation;
use crate::risk::RiskLevel;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use self::url::UrlAnalyzer;
pub use message::{MessageAnalyzer, MessageInput};
pub use phone::{CallMetadata, PhoneAnalyzer, PhoneInput};
pub use qr::{QrAnalyzer, QrInput};
pub use whatsapp::WhatsAppAnalyzer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThreatCategory {
    UrlPhishing,
    MalwareLink,
    SocialEngineering,
    QrScam,
    CallFraud,
    CredentialTheft,
    MessageFraud,
}

impl ThreatCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ThreatCategory::UrlPhishing => "url-phishing",
            ThreatCategory::MalwareLink => "malware-link",
            ThreatCategory::SocialEngineering => "social-engineering",
            ThreatCategory::QrScam => "qr-scam",
            ThreatCategory::CallFraud => "call-fraud",
            ThreatCategory::CredentialTheft => "credential-theft",
            ThreatCategory::MessageFraud => "message-fraud",
        }
    }

    /// Static advice shown next to every result of this category.
    pub fn recommendations(self) -> &'static [&'static str] {
        match self {
            ThreatCategory::UrlPhishing => &[
                "Do not visit this website",
                "Do not enter credentials on this page",
                "Report the URL to your security team",
                "Clear browser cache if already visited",
            ],
            ThreatCategory::MalwareLink => &[
                "Do not visit this website",
                "Do not download files from this URL",
                "Report the URL to your security team",
                "Run a malware scan if a file was already opened",
            ],
            ThreatCategory::SocialEngineering => &[
                "Only open WhatsApp links on wa.me or whatsapp.com",
                "Do not share verification codes received over chat",
                "Confirm the contact through a known number",
                "Report the link to WhatsApp",
            ],
            ThreatCategory::QrScam => &[
                "Do not scan QR codes from untrusted sources",
                "Verify the source of the QR code before scanning",
                "Check the destination URL before opening it",
                "Use browser security features for additional protection",
            ],
            ThreatCategory::CallFraud => &[
                "Do not answer calls from unknown numbers",
                "Hang up if asked for personal information",
                "Never provide account numbers or passwords over the phone",
                "Report suspicious calls to authorities",
            ],
            ThreatCategory::CredentialTheft => &[
                "Never share passwords, PINs, OTPs or card numbers",
                "Contact the organisation through its official channel",
                "Change any credentials that were already shared",
                "Report the message to your provider",
            ],
            ThreatCategory::MessageFraud => &[
                "Do not click links or download attachments",
                "Do not provide personal or financial information",
                "Report the message to your provider",
                "Delete the message",
            ],
        }
    }
}

impl fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single analysis. Built fresh per call and owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatAnalysis {
    pub category: ThreatCategory,
    pub score: f64,
    pub severity: RiskLevel,
    pub indicators: Vec<String>,
    /// Names of the catalog rules that fired, in evaluation order.
    pub matched_rules: Vec<String>,
    pub recommendations: Vec<String>,
}

impl ThreatAnalysis {
    pub fn from_evaluation(category: ThreatCategory, evaluation: Evaluation) -> Self {
        let score = evaluation.score();
        Self {
            category,
            score,
            severity: RiskLevel::from_score(score),
            indicators: evaluation.indicators,
            matched_rules: evaluation.fired.iter().map(|r| r.to_string()).collect(),
            recommendations: category
                .recommendations()
                .iter()
                .map(|r| r.to_string())
                .collect(),
        }
    }

    /// Zero-score result for missing primary content.
    pub fn neutral(category: ThreatCategory) -> Self {
        Self::from_evaluation(category, Evaluation::default())
    }
}

/// One analyzer per content type. Implementations hold no state between calls.
pub trait ThreatAnalyzer: Send + Sync {
    type Input: ?Sized;

    fn analyze(&self, input: &Self::Input) -> ThreatAnalysis;
}

/// Blank or whitespace-only content is treated as absent.
pub(crate) fn is_blank(content: &str) -> bool {
    content.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_result() {
        let analysis = ThreatAnalysis::neutral(ThreatCategory::QrScam);
        assert_eq!(analysis.score, 0.0);
        assert_eq!(analysis.severity, RiskLevel::Safe);
        assert!(analysis.indicators.is_empty());
        assert_eq!(analysis.recommendations.len(), 4);
    }

    #[test]
    fn test_category_serializes_kebab_case() {
        let json = serde_json::to_string(&ThreatCategory::UrlPhishing).unwrap();
        assert_eq!(json, "\"url-phishing\"");
        let parsed: ThreatCategory = serde_json::from_str("\"credential-theft\"").unwrap();
        assert_eq!(parsed, ThreatCategory::CredentialTheft);
    }
}
