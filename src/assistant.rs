//! Natural-language assessments from an external text-generation service.
//!
//! The service is optional and fallible. Every failure path (disabled, HTTP
//! error, timeout, empty reply) degrades to a summary built from the
//! heuristic indicators, so a check always produces a record.

use crate::analyzers::ThreatAnalysis;
use crate::config::AssistantConfig;
use crate::engine::{CheckRequest, ThreatEngine};
use crate::report::CheckRecord;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

pub const FALLBACK_PREFIX: &str = "AI analysis temporarily unavailable. Pattern-based analysis: ";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("text generation unavailable: {0}")]
    Unavailable(String),
}

/// `generate(prompt) -> text`, failing with [`GenerationError::Unavailable`].
pub trait TextGenerator: Send + Sync {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;

    /// False when the generator never produces text, so callers can skip it.
    fn is_available(&self) -> bool {
        true
    }
}

/// Generator used when no service is configured.
pub struct DisabledGenerator;

impl TextGenerator for DisabledGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Unavailable(
            "assistant disabled in configuration".to_string(),
        ))
    }

    fn is_available(&self) -> bool {
        false
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct HttpTextGenerator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpTextGenerator {
    pub fn from_config(config: &AssistantConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("fraud-sentinel/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            log::warn!(
                "{} is not set; requests to {} will be unauthenticated",
                config.api_key_env,
                config.endpoint
            );
        }

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
        })
    }
}

impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(GenerationError::Unavailable(format!(
                "endpoint returned {}",
                response.status()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::Unavailable("empty completion".to_string()))
    }
}

/// Prompt sent to the text-generation service for one analyzed submission.
pub fn build_prompt(request: &CheckRequest, analysis: &ThreatAnalysis) -> String {
    let indicators = analysis.indicators.join(", ");
    let score = analysis.score;

    match request {
        CheckRequest::Url { url } => format!(
            "Analyze this URL for fraud/phishing risks: \"{}\". Risk score: {}. Indicators: {}. \
             Provide a brief security assessment and recommendation.",
            url, score, indicators
        ),
        CheckRequest::Phone(input) => {
            let mut prompt = format!(
                "Analyze this phone number for spoofing/fraud: \"{}\". Risk score: {}. Indicators: {}.",
                input.number, score, indicators
            );
            if let Some(transcript) = input
                .metadata
                .as_ref()
                .and_then(|m| m.transcript.as_deref())
            {
                prompt.push_str(&format!(" Call transcript: \"{}\".", transcript));
            }
            prompt.push_str(" Provide a brief assessment.");
            prompt
        }
        CheckRequest::Qr(input) => format!(
            "Analyze this QR code content for fraud: \"{}\". Risk score: {}. Indicators: {}. \
             Provide recommendations.",
            input.content, score, indicators
        ),
        CheckRequest::Whatsapp { url } => format!(
            "Analyze this WhatsApp URL for fraud: \"{}\". Risk score: {}. Indicators: {}. Is it safe?",
            url, score, indicators
        ),
        CheckRequest::Message(input) => format!(
            "Analyze this message for scams and fraud:\nFrom: {}\nContent: {}\n\n\
             Risk score: {}. Indicators: {}. Provide a brief assessment and safety recommendation.",
            input.sender, input.body, score, indicators
        ),
    }
}

pub fn fallback_summary(analysis: &ThreatAnalysis) -> String {
    format!("{}{}", FALLBACK_PREFIX, analysis.indicators.join("; "))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub text: String,
    /// False when the text is the indicator-based fallback.
    pub generated: bool,
}

pub struct Assistant<G> {
    generator: G,
    timeout: Duration,
}

impl<G: TextGenerator> Assistant<G> {
    pub fn new(generator: G, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub async fn assess(&self, request: &CheckRequest, analysis: &ThreatAnalysis) -> Assessment {
        if !self.generator.is_available() {
            log::debug!("assistant disabled, using pattern-based summary");
            return self.fallback(analysis);
        }

        let prompt = build_prompt(request, analysis);

        match tokio::time::timeout(self.timeout, self.generator.generate(&prompt)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => Assessment {
                text: text.trim().to_string(),
                generated: true,
            },
            Ok(Ok(_)) => {
                log::warn!("assistant returned an empty assessment, using fallback");
                self.fallback(analysis)
            }
            Ok(Err(e)) => {
                log::warn!("assistant failed, using fallback: {}", e);
                self.fallback(analysis)
            }
            Err(_) => {
                log::warn!("assistant timed out after {:?}, using fallback", self.timeout);
                self.fallback(analysis)
            }
        }
    }

    fn fallback(&self, analysis: &ThreatAnalysis) -> Assessment {
        Assessment {
            text: fallback_summary(analysis),
            generated: false,
        }
    }

    /// Full check: heuristic analysis, assessment, and the history record.
    pub async fn review(&self, engine: &ThreatEngine, request: &CheckRequest) -> CheckRecord {
        let analysis = engine.analyze(request);
        let assessment = self.assess(request, &analysis).await;
        CheckRecord::new(request, &analysis, assessment.text)
    }
}
