use super::{is_blank, ThreatAnalysis, ThreatAnalyzer, ThreatCategory};
use crate::detection::{evaluate, summarize, IndicatorRule, Matcher, RuleSummary};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref SOCIAL_ENGINEERING: Regex =
        Regex::new(r"(?i)verify|confirm|update|urgent|limited time").unwrap();
    static ref CREDENTIAL_REQUEST: Regex =
        Regex::new(r"(?i)account|password|ssn|credit card|card").unwrap();
}

const TEST_PREFIX: &str = "555";

/// Side-channel data about a call. Every field is optional; a missing field
/// only means the matching rule cannot be evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMetadata {
    pub caller_name: Option<String>,
    pub call_duration_secs: Option<u64>,
    pub transcript: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneInput {
    pub number: String,
    #[serde(default)]
    pub metadata: Option<CallMetadata>,
}

impl PhoneInput {
    pub fn new(number: &str) -> Self {
        Self {
            number: number.to_string(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: CallMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

pub struct PhoneSubject {
    digits: String,
    metadata: CallMetadata,
}

impl PhoneSubject {
    fn transcript(&self) -> Option<&str> {
        self.metadata.transcript.as_deref()
    }
}

pub fn normalize_digits(number: &str) -> String {
    number.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn is_too_short(subject: &PhoneSubject) -> bool {
    subject.digits.len() < 10
}

fn has_test_prefix(subject: &PhoneSubject) -> bool {
    subject.digits.starts_with(TEST_PREFIX)
}

fn has_repeated_digits(subject: &PhoneSubject) -> bool {
    let bytes = subject.digits.as_bytes();
    let mut run = 1;
    for pair in bytes.windows(2) {
        if pair[0] == pair[1] {
            run += 1;
            if run >= 4 {
                return true;
            }
        } else {
            run = 1;
        }
    }
    false
}

fn has_digit_triplet(subject: &PhoneSubject) -> bool {
    // The reserved prefix is scored on its own; only the remaining digits count here.
    let digits = subject
        .digits
        .strip_prefix(TEST_PREFIX)
        .unwrap_or(subject.digits.as_str());
    digits
        .as_bytes()
        .windows(3)
        .any(|w| w[0] == w[1] && w[1] == w[2])
}

fn is_unanswered_unknown(subject: &PhoneSubject) -> bool {
    let unknown = subject
        .metadata
        .caller_name
        .as_deref()
        .map(|name| name.trim().eq_ignore_ascii_case("unknown"))
        .unwrap_or(false);
    unknown && subject.metadata.call_duration_secs == Some(0)
}

fn has_social_engineering(subject: &PhoneSubject) -> bool {
    subject
        .transcript()
        .map(|t| SOCIAL_ENGINEERING.is_match(t))
        .unwrap_or(false)
}

fn requests_credentials(subject: &PhoneSubject) -> bool {
    subject
        .transcript()
        .map(|t| CREDENTIAL_REQUEST.is_match(t))
        .unwrap_or(false)
}

static PHONE_RULES: &[IndicatorRule<PhoneSubject>] = &[
    IndicatorRule {
        name: "too_short",
        label: "Invalid Phone Format",
        description: "Fewer than 10 digits after removing formatting",
        weight: 20,
        matcher: Matcher::Once {
            check: is_too_short,
            message: "Phone number too short",
        },
    },
    IndicatorRule {
        name: "test_prefix",
        label: "Spoofing Patterns",
        description: "555 prefix numbers are reserved test numbers",
        weight: 40,
        matcher: Matcher::Once {
            check: has_test_prefix,
            message: "Known test/spoofing number (555 prefix)",
        },
    },
    IndicatorRule {
        name: "repeated_digits",
        label: "Repetitive Digits",
        description: "Four or more identical digits in a row, like 1111",
        weight: 25,
        matcher: Matcher::Once {
            check: has_repeated_digits,
            message: "Repetitive number pattern detected",
        },
    },
    IndicatorRule {
        name: "digit_triplet",
        label: "Sequential Patterns",
        description: "A run of three identical digits (000 through 999)",
        weight: 20,
        matcher: Matcher::Once {
            check: has_digit_triplet,
            message: "Sequential number pattern detected",
        },
    },
    IndicatorRule {
        name: "unanswered_unknown_caller",
        label: "Unanswered Calls",
        description: "Zero-length calls from unknown callers",
        weight: 25,
        matcher: Matcher::Once {
            check: is_unanswered_unknown,
            message: "Unanswered call from unknown number",
        },
    },
    IndicatorRule {
        name: "transcript_social_engineering",
        label: "Social Engineering Language",
        description: "Transcript keywords like \"urgent\", \"verify\", \"confirm\"",
        weight: 20,
        matcher: Matcher::Once {
            check: has_social_engineering,
            message: "Social engineering language in transcript",
        },
    },
    IndicatorRule {
        name: "transcript_credential_request",
        label: "Credential Requests",
        description: "Asking for account numbers, passwords, SSN or card details",
        weight: 25,
        matcher: Matcher::Once {
            check: requests_credentials,
            message: "Credential request detected in call",
        },
    },
];

pub fn catalog() -> Vec<RuleSummary> {
    summarize(PHONE_RULES)
}

pub struct PhoneAnalyzer;

impl Default for PhoneAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl PhoneAnalyzer {
    pub fn new() -> Self {
        PhoneAnalyzer
    }
}

impl ThreatAnalyzer for PhoneAnalyzer {
    type Input = PhoneInput;

    fn analyze(&self, input: &PhoneInput) -> ThreatAnalysis {
        if is_blank(&input.number) {
            return ThreatAnalysis::neutral(ThreatCategory::CallFraud);
        }

        let subject = PhoneSubject {
            digits: normalize_digits(&input.number),
            metadata: input.metadata.clone().unwrap_or_default(),
        };

        ThreatAnalysis::from_evaluation(
            ThreatCategory::CallFraud,
            evaluate(PHONE_RULES, &subject),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskLevel;

    #[test]
    fn test_test_prefix_is_medium() {
        let analysis = PhoneAnalyzer::new().analyze(&PhoneInput::new("5551234567"));
        assert_eq!(analysis.matched_rules, vec!["test_prefix"]);
        assert_eq!(analysis.score, 0.4);
        assert_eq!(analysis.severity, RiskLevel::Medium);
    }

    #[test]
    fn test_formatting_is_stripped() {
        let analyzer = PhoneAnalyzer::new();
        assert_eq!(
            analyzer.analyze(&PhoneInput::new("(555) 123-4567")),
            analyzer.analyze(&PhoneInput::new("5551234567"))
        );
    }

    #[test]
    fn test_repetitive_number() {
        let analysis = PhoneAnalyzer::new().analyze(&PhoneInput::new("111-111-1111"));
        assert_eq!(analysis.matched_rules, vec!["repeated_digits", "digit_triplet"]);
        assert_eq!(analysis.score, 0.45);
        assert_eq!(analysis.severity, RiskLevel::Medium);
    }

    #[test]
    fn test_short_number() {
        let analysis = PhoneAnalyzer::new().analyze(&PhoneInput::new("12345"));
        assert_eq!(analysis.indicators, vec!["Phone number too short"]);
        assert_eq!(analysis.severity, RiskLevel::Low);
    }

    #[test]
    fn test_clean_number_without_metadata() {
        let analysis = PhoneAnalyzer::new().analyze(&PhoneInput::new("+44 20 7946 0958"));
        assert!(analysis.indicators.is_empty());
        assert_eq!(analysis.category, ThreatCategory::CallFraud);
    }

    #[test]
    fn test_metadata_rules() {
        let metadata = CallMetadata {
            caller_name: Some("Unknown".to_string()),
            call_duration_secs: Some(0),
            transcript: Some("This is your bank, please verify your account password".to_string()),
        };
        let analysis =
            PhoneAnalyzer::new().analyze(&PhoneInput::new("4155238761").with_metadata(metadata));
        assert_eq!(
            analysis.matched_rules,
            vec![
                "unanswered_unknown_caller",
                "transcript_social_engineering",
                "transcript_credential_request"
            ]
        );
        assert_eq!(analysis.score, 0.7);
        assert_eq!(analysis.severity, RiskLevel::High);
    }

    #[test]
    fn test_partial_metadata_is_not_negative() {
        let metadata = CallMetadata {
            caller_name: Some("Unknown".to_string()),
            call_duration_secs: None,
            transcript: None,
        };
        let analysis =
            PhoneAnalyzer::new().analyze(&PhoneInput::new("4155238761").with_metadata(metadata));
        assert_eq!(analysis.score, 0.0);
    }

    #[test]
    fn test_idempotent() {
        let analyzer = PhoneAnalyzer::new();
        let metadata = CallMetadata {
            caller_name: Some("Unknown".to_string()),
            call_duration_secs: Some(0),
            transcript: Some("Please confirm your card number".to_string()),
        };
        let input = PhoneInput::new("555-111-2222").with_metadata(metadata);
        assert_eq!(analyzer.analyze(&input), analyzer.analyze(&input));
    }

    #[test]
    fn test_saturates_at_one() {
        let metadata = CallMetadata {
            caller_name: Some("unknown".to_string()),
            call_duration_secs: Some(0),
            transcript: Some("urgent: confirm your card".to_string()),
        };
        let analysis =
            PhoneAnalyzer::new().analyze(&PhoneInput::new("555000").with_metadata(metadata));
        assert_eq!(analysis.score, 1.0);
        assert_eq!(analysis.severity, RiskLevel::Critical);
    }

    #[test]
    fn test_blank_number_is_neutral() {
        let analysis = PhoneAnalyzer::new().analyze(&PhoneInput::new(""));
        assert_eq!(analysis.score, 0.0);
        assert!(analysis.indicators.is_empty());
    }
}
