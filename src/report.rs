use crate::analyzers::ThreatAnalysis;
use crate::engine::{CheckRequest, CheckType};
use crate::risk::{AlertLevel, RiskLevel};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

const RULE: &str =
    "================================================================================";

/// History entry for one completed check. Storage is the caller's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRecord {
    pub check_type: CheckType,
    pub input_value: String,
    pub score: f64,
    pub severity: RiskLevel,
    pub alert_level: AlertLevel,
    pub indicators: Vec<String>,
    pub ai_analysis: String,
}

impl CheckRecord {
    pub fn new(request: &CheckRequest, analysis: &ThreatAnalysis, ai_analysis: String) -> Self {
        Self {
            check_type: request.check_type(),
            input_value: request.display_value().to_string(),
            score: analysis.score,
            severity: analysis.severity,
            alert_level: analysis.severity.presentation(),
            indicators: analysis.indicators.clone(),
            ai_analysis,
        }
    }

    pub fn should_notify(&self) -> bool {
        self.severity.warrants_alert()
    }
}

fn methodology_title(check_type: CheckType) -> &'static str {
    match check_type {
        CheckType::Url => "URL Fraud Detection Methodology",
        CheckType::Phone => "Phone Fraud Detection Methodology",
        CheckType::Qr => "QR Code Fraud Detection Methodology",
        CheckType::Whatsapp => "WhatsApp URL Fraud Detection Methodology",
        CheckType::Message => "Message Fraud Detection Methodology",
    }
}

fn format_weight(weight: f64) -> String {
    let formatted = format!("{:.2}", weight);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if weight >= 0.0 {
        format!("+{}", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Methodology text rendered from the live rule catalog.
pub fn methodology(check_type: CheckType, score: f64, level: RiskLevel) -> String {
    let mut text = format!("{}:\n", methodology_title(check_type));
    for rule in check_type.catalog() {
        let each = if rule.per_match { " each" } else { "" };
        let _ = writeln!(
            text,
            "- {}: {} ({}{})",
            rule.label,
            rule.description,
            format_weight(rule.weight),
            each
        );
    }
    let _ = write!(
        text,
        "\nRisk Score: {:.1}% - {}",
        score * 100.0,
        level.as_str().to_uppercase()
    );
    text
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceReport {
    pub record: CheckRecord,
    pub methodology: String,
}

impl EvidenceReport {
    pub fn new(record: CheckRecord) -> Self {
        let methodology = methodology(record.check_type, record.score, record.severity);
        Self {
            record,
            methodology,
        }
    }

    /// Plain-text export suitable for attaching to a complaint.
    pub fn render_text(&self) -> String {
        let record = &self.record;
        let input: String = record.input_value.chars().take(100).collect();
        let mut out = String::new();

        let _ = writeln!(out, "{}", RULE);
        let _ = writeln!(out, "                      FRAUD SENTINEL EVIDENCE REPORT");
        let _ = writeln!(out, "{}\n", RULE);

        let _ = writeln!(out, "{}\nFRAUD DETECTION SUMMARY\n{}\n", RULE, RULE);
        let _ = writeln!(out, "Check Type: {}", record.check_type.as_str().to_uppercase());
        let _ = writeln!(out, "Input: {}", input);
        let _ = writeln!(out, "Fraud Score: {:.1}/100", record.score * 100.0);
        let _ = writeln!(out, "Risk Level: {}\n", record.severity.as_str().to_uppercase());

        let _ = writeln!(
            out,
            "{}\nDETECTED INDICATORS ({})\n{}",
            RULE,
            record.indicators.len(),
            RULE
        );
        for (idx, indicator) in record.indicators.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", idx + 1, indicator);
        }

        let _ = writeln!(out, "\n{}\nDETECTION METHODOLOGY\n{}", RULE, RULE);
        let _ = writeln!(out, "{}", self.methodology);

        let _ = writeln!(out, "\n{}\nAI ANALYSIS\n{}", RULE, RULE);
        let _ = writeln!(out, "{}\n", record.ai_analysis);

        let _ = writeln!(out, "{}", RULE);
        let _ = writeln!(
            out,
            "DISCLAIMER: This report is generated from pattern analysis and an automated\n\
             assessment. It is intended for fraud prevention; cross-reference official\n\
             sources before filing legal complaints."
        );
        let _ = writeln!(out, "{}", RULE);
        out
    }
}
