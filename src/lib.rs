pub mod aggregate;
pub mod analyzers;
pub mod assistant;
pub mod config;
pub mod detection;
pub mod domain_utils;
pub mod engine;
pub mod error;
pub mod mascrow;
pub mod report;
pub mod risk;

pub use aggregate::{combine, CombinedAnalysis};
pub use analyzers::{ThreatAnalysis, ThreatAnalyzer, ThreatCategory};
pub use assistant::{Assistant, GenerationError, TextGenerator};
pub use config::Config;
pub use engine::{CheckRequest, CheckType, ThreatEngine};
pub use error::{SentinelError, SentinelResult};
pub use report::{CheckRecord, EvidenceReport};
pub use risk::{AlertLevel, RiskLevel};
