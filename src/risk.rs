use serde::{Deserialize, Serialize};
use std::fmt;

/// Five-band severity scale shared by every analyzer and by the dashboard.
///
/// Bands are inclusive on the lower bound and exclusive on the upper bound,
/// except `Critical` which has no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 0.8 => RiskLevel::Critical,
            s if s >= 0.6 => RiskLevel::High,
            s if s >= 0.4 => RiskLevel::Medium,
            s if s >= 0.2 => RiskLevel::Low,
            _ => RiskLevel::Safe,
        }
    }

    /// Collapse to the three-level scale used by alert feeds.
    pub fn presentation(self) -> AlertLevel {
        match self {
            RiskLevel::Critical | RiskLevel::High => AlertLevel::Dangerous,
            RiskLevel::Medium => AlertLevel::Warning,
            RiskLevel::Low | RiskLevel::Safe => AlertLevel::Safe,
        }
    }

    /// High and critical results raise a user notification.
    pub fn warrants_alert(self) -> bool {
        self >= RiskLevel::High
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Safe,
    Warning,
    Dangerous,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_score(0.19), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_score(0.2), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.4), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.6), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.8), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(1.0), RiskLevel::Critical);
    }

    #[test]
    fn test_monotonic() {
        let mut previous = RiskLevel::Safe;
        for step in 0..=100 {
            let level = RiskLevel::from_score(step as f64 / 100.0);
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn test_presentation_mapping() {
        assert_eq!(RiskLevel::Critical.presentation(), AlertLevel::Dangerous);
        assert_eq!(RiskLevel::High.presentation(), AlertLevel::Dangerous);
        assert_eq!(RiskLevel::Medium.presentation(), AlertLevel::Warning);
        assert_eq!(RiskLevel::Low.presentation(), AlertLevel::Safe);
        assert_eq!(RiskLevel::Safe.presentation(), AlertLevel::Safe);
        assert!(RiskLevel::High.warrants_alert());
        assert!(!RiskLevel::Medium.warrants_alert());
    }
}
