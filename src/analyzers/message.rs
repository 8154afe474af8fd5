use super::{is_blank, ThreatAnalysis, ThreatAnalyzer, ThreatCategory};
use crate::detection::{evaluate, summarize, IndicatorRule, Matcher, RuleSummary};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref URL_PATTERN: Regex = Regex::new(r"https?://[^\s]+").unwrap();
    static ref IP_URL: Regex = Regex::new(r"^https?://\d+\.\d+\.\d+\.\d+").unwrap();
    static ref CREDENTIAL_REQUEST: Regex =
        Regex::new(r"(?i)password|pin|cvv|ssn|otp|code|token|secret|auth").unwrap();
    static ref URGENCY: Regex = Regex::new(
        r"(?i)(urgent|asap|immediate|today|now|hurry|expired|suspend|close|act now|limited time|rush)"
    )
    .unwrap();
    static ref FINANCIAL: Regex = Regex::new(
        r"(?i)transfer|payment|crypto|bitcoin|wire|bank account|money|send cash|gift card"
    )
    .unwrap();
    static ref BRAND_IMPERSONATION: Regex =
        Regex::new(r"(?i)your bank|apple|amazon|microsoft|google|paypal|ibm").unwrap();
}

const PHISHING_KEYWORDS: [&str; 10] = [
    "verify",
    "confirm",
    "urgent",
    "immediate",
    "account suspended",
    "update payment",
    "click here",
    "limited time",
    "act now",
    "expire",
];

const SHORTENER_MARKERS: [&str; 3] = ["bit.ly", "tinyurl", "short"];
const LEGACY_SEPARATOR: &str = "|||";

/// A received SMS, chat message or email body together with its declared sender.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageInput {
    pub sender: String,
    pub body: String,
}

impl MessageInput {
    pub fn new(sender: &str, body: &str) -> Self {
        Self {
            sender: sender.to_string(),
            body: body.to_string(),
        }
    }

    /// Parse the single-field `sender|||content` form used by older clients.
    /// Without a separator the whole value is the body.
    pub fn from_legacy(value: &str) -> Self {
        match value.split_once(LEGACY_SEPARATOR) {
            Some((sender, body)) => Self::new(sender, body),
            None => Self::new("", value),
        }
    }
}

/// Every `http(s)://` run in `body`, in order of appearance.
pub fn extract_urls(body: &str) -> Vec<String> {
    URL_PATTERN
        .find_iter(body)
        .map(|m| m.as_str().to_string())
        .collect()
}

pub struct MessageSubject {
    sender_lower: String,
    body: String,
    body_lower: String,
    urls: Vec<String>,
}

impl MessageSubject {
    fn new(input: &MessageInput) -> Self {
        Self {
            sender_lower: input.sender.to_lowercase(),
            body: input.body.clone(),
            body_lower: input.body.to_lowercase(),
            urls: extract_urls(&input.body),
        }
    }
}

fn phishing_keywords(subject: &MessageSubject) -> Vec<String> {
    PHISHING_KEYWORDS
        .iter()
        .filter(|kw| subject.body_lower.contains(*kw))
        .map(|kw| format!("Phishing keyword detected: \"{}\"", kw))
        .collect()
}

fn requests_credentials(subject: &MessageSubject) -> bool {
    CREDENTIAL_REQUEST.is_match(&subject.body)
}

fn shortened_urls(subject: &MessageSubject) -> Vec<String> {
    subject
        .urls
        .iter()
        .filter(|url| SHORTENER_MARKERS.iter().any(|m| url.contains(m)))
        .map(|url| {
            let head: String = url.chars().take(30).collect();
            format!("URL shortener in message: {}...", head)
        })
        .collect()
}

fn ip_urls(subject: &MessageSubject) -> Vec<String> {
    subject
        .urls
        .iter()
        .filter(|url| IP_URL.is_match(url))
        .map(|_| "IP address URL detected".to_string())
        .collect()
}

fn has_urgency(subject: &MessageSubject) -> bool {
    URGENCY.is_match(&subject.body)
}

fn requests_money(subject: &MessageSubject) -> bool {
    FINANCIAL.is_match(&subject.body)
}

fn is_auto_generated_sender(subject: &MessageSubject) -> bool {
    subject.sender_lower.contains("no-reply") || subject.sender_lower.contains("noreply")
}

fn impersonates_brand(subject: &MessageSubject) -> bool {
    BRAND_IMPERSONATION.is_match(&subject.body)
}

fn is_short_with_link(subject: &MessageSubject) -> bool {
    subject.body.trim().chars().count() < 20 && subject.body.contains("http")
}

static MESSAGE_RULES: &[IndicatorRule<MessageSubject>] = &[
    IndicatorRule {
        name: "phishing_keyword",
        label: "Phishing Keywords",
        description: "\"verify\", \"confirm\", \"urgent\", \"immediate\", \"limited time\" and similar",
        weight: 10,
        matcher: Matcher::Each(phishing_keywords),
    },
    IndicatorRule {
        name: "credential_request",
        label: "Credential Requests",
        description: "Password, PIN, CVV, SSN, OTP requests",
        weight: 20,
        matcher: Matcher::Once {
            check: requests_credentials,
            message: "Credential request detected",
        },
    },
    IndicatorRule {
        name: "shortened_url",
        label: "URL Shorteners",
        description: "Shortened URLs hiding true destinations",
        weight: 15,
        matcher: Matcher::Each(shortened_urls),
    },
    IndicatorRule {
        name: "ip_address_url",
        label: "IP Address URLs",
        description: "Direct IP addresses in messages",
        weight: 15,
        matcher: Matcher::Each(ip_urls),
    },
    IndicatorRule {
        name: "urgency_language",
        label: "Urgency Language",
        description: "\"Hurry\", \"expire\", \"act now\", \"suspended\"",
        weight: 10,
        matcher: Matcher::Once {
            check: has_urgency,
            message: "Urgency language detected",
        },
    },
    IndicatorRule {
        name: "financial_request",
        label: "Financial Keywords",
        description: "\"transfer\", \"payment\", \"crypto\", \"wire\", \"bank account\"",
        weight: 15,
        matcher: Matcher::Once {
            check: requests_money,
            message: "Financial transaction requested",
        },
    },
    IndicatorRule {
        name: "auto_generated_sender",
        label: "Auto-Generated Senders",
        description: "no-reply, noreply sender addresses",
        weight: 10,
        matcher: Matcher::Once {
            check: is_auto_generated_sender,
            message: "Auto-generated sender address",
        },
    },
    IndicatorRule {
        name: "brand_impersonation",
        label: "Company Impersonation",
        description: "Claiming to be Apple, Amazon, Microsoft, Google, PayPal or your bank",
        weight: 10,
        matcher: Matcher::Once {
            check: impersonates_brand,
            message: "Company impersonation detected",
        },
    },
    IndicatorRule {
        name: "short_message_with_link",
        label: "Suspicious Short Message",
        description: "Messages under 20 characters that carry a link",
        weight: 10,
        matcher: Matcher::Once {
            check: is_short_with_link,
            message: "Suspicious short message with link",
        },
    },
];

pub fn catalog() -> Vec<RuleSummary> {
    summarize(MESSAGE_RULES)
}

pub struct MessageAnalyzer;

impl Default for MessageAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageAnalyzer {
    pub fn new() -> Self {
        MessageAnalyzer
    }
}

impl ThreatAnalyzer for MessageAnalyzer {
    type Input = MessageInput;

    fn analyze(&self, input: &MessageInput) -> ThreatAnalysis {
        if is_blank(&input.body) {
            return ThreatAnalysis::neutral(ThreatCategory::MessageFraud);
        }

        let evaluation = evaluate(MESSAGE_RULES, &MessageSubject::new(input));
        let category = if evaluation.fired.contains(&"credential_request") {
            ThreatCategory::CredentialTheft
        } else {
            ThreatCategory::MessageFraud
        };

        ThreatAnalysis::from_evaluation(category, evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskLevel;

    #[test]
    fn test_noreply_urgent_verify() {
        let analysis = MessageAnalyzer::new().analyze(&MessageInput::new(
            "noreply@example.com",
            "URGENT: verify your account now",
        ));
        assert_eq!(
            analysis.indicators,
            vec![
                "Phishing keyword detected: \"verify\"",
                "Phishing keyword detected: \"urgent\"",
                "Urgency language detected",
                "Auto-generated sender address",
            ]
        );
        assert_eq!(analysis.score, 0.4);
        assert_eq!(analysis.severity, RiskLevel::Medium);
        assert_eq!(analysis.category, ThreatCategory::MessageFraud);
    }

    #[test]
    fn test_each_url_counts() {
        let analysis = MessageAnalyzer::new().analyze(&MessageInput::new(
            "+15550100",
            "Claim here http://bit.ly/x1 or http://tinyurl.com/x2 ok",
        ));
        assert_eq!(analysis.matched_rules, vec!["shortened_url"]);
        assert_eq!(analysis.indicators.len(), 2);
        assert_eq!(analysis.score, 0.3);
    }

    #[test]
    fn test_ip_url_and_shortener() {
        let analysis = MessageAnalyzer::new().analyze(&MessageInput::new(
            "courier",
            "Your parcel is held: http://bit.ly/a1 and http://10.0.0.5/pay",
        ));
        assert_eq!(analysis.matched_rules, vec!["shortened_url", "ip_address_url"]);
        assert_eq!(analysis.indicators[0], "URL shortener in message: http://bit.ly/a1...");
        assert_eq!(analysis.indicators[1], "IP address URL detected");
        assert_eq!(analysis.score, 0.3);
    }

    #[test]
    fn test_credential_theft_category() {
        let analysis = MessageAnalyzer::new().analyze(&MessageInput::new(
            "bank-alerts",
            "Please reply with the OTP we just sent to your phone",
        ));
        assert!(analysis
            .matched_rules
            .contains(&"credential_request".to_string()));
        assert_eq!(analysis.category, ThreatCategory::CredentialTheft);
    }

    #[test]
    fn test_short_message_with_link() {
        let analysis =
            MessageAnalyzer::new().analyze(&MessageInput::new("unknown", "see http://x.io"));
        assert!(analysis
            .matched_rules
            .contains(&"short_message_with_link".to_string()));
    }

    #[test]
    fn test_heavy_phishing_saturates() {
        let body = "URGENT from Amazon: account suspended. Click here to verify and confirm, \
                    update payment via wire transfer immediately, act now, limited time, \
                    enter your password at http://bit.ly/amz or http://192.168.4.4/login";
        let analysis =
            MessageAnalyzer::new().analyze(&MessageInput::new("no-reply@amaz0n.example", body));
        assert_eq!(analysis.score, 1.0);
        assert_eq!(analysis.severity, RiskLevel::Critical);
    }

    #[test]
    fn test_benign_message() {
        let analysis = MessageAnalyzer::new()
            .analyze(&MessageInput::new("Sam", "Lunch at the usual place on Friday?"));
        assert!(analysis.indicators.is_empty());
        assert_eq!(analysis.severity, RiskLevel::Safe);
    }

    #[test]
    fn test_idempotent() {
        let analyzer = MessageAnalyzer::new();
        let input = MessageInput::new(
            "no-reply@paypa1-alerts.com",
            "Your account suspended. Send your password to http://bit.ly/restore",
        );
        assert_eq!(analyzer.analyze(&input), analyzer.analyze(&input));
    }

    #[test]
    fn test_blank_body_is_neutral() {
        let analysis = MessageAnalyzer::new().analyze(&MessageInput::new("noreply@x.com", " "));
        assert_eq!(analysis.score, 0.0);
        assert!(analysis.indicators.is_empty());
    }

    #[test]
    fn test_legacy_format() {
        let input = MessageInput::from_legacy("alerts@bank.example|||Your card is blocked");
        assert_eq!(input.sender, "alerts@bank.example");
        assert_eq!(input.body, "Your card is blocked");

        let bare = MessageInput::from_legacy("just a body");
        assert_eq!(bare.sender, "");
        assert_eq!(bare.body, "just a body");
    }

    #[test]
    fn test_extract_urls() {
        assert_eq!(
            extract_urls("a https://x.io/1 b http://y.io c"),
            vec!["https://x.io/1", "http://y.io"]
        );
    }
}
