use crate::aggregate::CombinedAnalysis;
use crate::analyzers::message::extract_urls;
use crate::analyzers::{
    message, phone, qr, url, whatsapp, MessageAnalyzer, MessageInput, PhoneAnalyzer, PhoneInput,
    QrAnalyzer, QrInput, ThreatAnalysis, ThreatAnalyzer, UrlAnalyzer, WhatsAppAnalyzer,
};
use crate::detection::RuleSummary;
use crate::error::SentinelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckType {
    Url,
    Phone,
    Qr,
    Whatsapp,
    Message,
}

impl CheckType {
    pub const ALL: [CheckType; 5] = [
        CheckType::Url,
        CheckType::Phone,
        CheckType::Qr,
        CheckType::Whatsapp,
        CheckType::Message,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CheckType::Url => "url",
            CheckType::Phone => "phone",
            CheckType::Qr => "qr",
            CheckType::Whatsapp => "whatsapp",
            CheckType::Message => "message",
        }
    }

    /// Ordered rule list for this content type.
    pub fn catalog(self) -> Vec<RuleSummary> {
        match self {
            CheckType::Url => url::catalog(),
            CheckType::Phone => phone::catalog(),
            CheckType::Qr => qr::catalog(),
            CheckType::Whatsapp => whatsapp::catalog(),
            CheckType::Message => message::catalog(),
        }
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckType {
    type Err = SentinelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "url" => Ok(CheckType::Url),
            "phone" => Ok(CheckType::Phone),
            "qr" => Ok(CheckType::Qr),
            "whatsapp" => Ok(CheckType::Whatsapp),
            "message" | "email" | "sms" => Ok(CheckType::Message),
            other => Err(SentinelError::InvalidRequest(format!(
                "unknown check type: {}",
                other
            ))),
        }
    }
}

/// One submission, typed per content kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "check_type", rename_all = "lowercase")]
pub enum CheckRequest {
    Url { url: String },
    Phone(PhoneInput),
    Qr(QrInput),
    Whatsapp { url: String },
    Message(MessageInput),
}

impl CheckRequest {
    pub fn check_type(&self) -> CheckType {
        match self {
            CheckRequest::Url { .. } => CheckType::Url,
            CheckRequest::Phone(_) => CheckType::Phone,
            CheckRequest::Qr(_) => CheckType::Qr,
            CheckRequest::Whatsapp { .. } => CheckType::Whatsapp,
            CheckRequest::Message(_) => CheckType::Message,
        }
    }

    /// The value shown back to the user and stored in history.
    pub fn display_value(&self) -> &str {
        match self {
            CheckRequest::Url { url } | CheckRequest::Whatsapp { url } => url,
            CheckRequest::Phone(input) => &input.number,
            CheckRequest::Qr(input) => &input.content,
            CheckRequest::Message(input) => &input.body,
        }
    }

    /// Build a request from the dashboard's `{checkType, inputValue}` pair.
    pub fn from_check(check_type: CheckType, input_value: &str) -> Self {
        match check_type {
            CheckType::Url => CheckRequest::Url {
                url: input_value.to_string(),
            },
            CheckType::Phone => CheckRequest::Phone(PhoneInput::new(input_value)),
            CheckType::Qr => CheckRequest::Qr(QrInput::new(input_value)),
            CheckType::Whatsapp => CheckRequest::Whatsapp {
                url: input_value.to_string(),
            },
            CheckType::Message => CheckRequest::Message(MessageInput::from_legacy(input_value)),
        }
    }
}

/// Stateless dispatcher over the per-type analyzers.
pub struct ThreatEngine {
    url: UrlAnalyzer,
    phone: PhoneAnalyzer,
    qr: QrAnalyzer,
    whatsapp: WhatsAppAnalyzer,
    message: MessageAnalyzer,
}

impl Default for ThreatEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreatEngine {
    pub fn new() -> Self {
        Self {
            url: UrlAnalyzer::new(),
            phone: PhoneAnalyzer::new(),
            qr: QrAnalyzer::new(),
            whatsapp: WhatsAppAnalyzer::new(),
            message: MessageAnalyzer::new(),
        }
    }

    pub fn analyze(&self, request: &CheckRequest) -> ThreatAnalysis {
        let analysis = match request {
            CheckRequest::Url { url } => self.url.analyze(url),
            CheckRequest::Phone(input) => self.phone.analyze(input),
            CheckRequest::Qr(input) => self.qr.analyze(input),
            CheckRequest::Whatsapp { url } => self.whatsapp.analyze(url),
            CheckRequest::Message(input) => self.message.analyze(input),
        };

        log::info!(
            "{} check scored {:.2} ({}) with {} indicator(s)",
            request.check_type(),
            analysis.score,
            analysis.severity,
            analysis.indicators.len()
        );
        analysis
    }

    /// Analyze a message body and, separately, every URL embedded in it.
    pub fn analyze_message_with_links(&self, input: &MessageInput) -> CombinedAnalysis {
        let mut members = vec![self.message.analyze(input)];
        members.extend(
            extract_urls(&input.body)
                .iter()
                .map(|link| self.url.analyze(link)),
        );

        let combined = CombinedAnalysis::new(members);
        log::debug!(
            "message with {} link(s) combined to {:.2}",
            combined.members.len() - 1,
            combined.overall_score
        );
        combined
    }
}
