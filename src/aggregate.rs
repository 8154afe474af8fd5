use crate::analyzers::ThreatAnalysis;
use crate::detection::MAX_POINTS;
use crate::risk::RiskLevel;
use serde::{Deserialize, Serialize};

fn member_points(analysis: &ThreatAnalysis) -> i64 {
    (analysis.score.clamp(0.0, 1.0) * f64::from(MAX_POINTS)).round() as i64
}

/// Mean of the member scores, clamped to `[0, 1]`. An empty slice scores 0.
///
/// Members are summed as whole points and divided once, so a mean that sits
/// exactly on a band edge classifies into that band.
pub fn combine(analyses: &[ThreatAnalysis]) -> f64 {
    if analyses.is_empty() {
        return 0.0;
    }

    let total: i64 = analyses.iter().map(member_points).sum();
    total as f64 / (analyses.len() as f64 * f64::from(MAX_POINTS))
}

/// Several independent analyses of one submission plus their combined figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedAnalysis {
    pub members: Vec<ThreatAnalysis>,
    pub overall_score: f64,
    pub overall_severity: RiskLevel,
}

impl CombinedAnalysis {
    pub fn new(members: Vec<ThreatAnalysis>) -> Self {
        let overall_score = combine(&members);
        Self {
            members,
            overall_score,
            overall_severity: RiskLevel::from_score(overall_score),
        }
    }

    /// Indicators of every member, in member order.
    pub fn indicators(&self) -> Vec<String> {
        self.members
            .iter()
            .flat_map(|m| m.indicators.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::ThreatCategory;

    fn with_score(score: f64) -> ThreatAnalysis {
        let mut analysis = ThreatAnalysis::neutral(ThreatCategory::UrlPhishing);
        analysis.score = score;
        analysis.severity = RiskLevel::from_score(score);
        analysis
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(combine(&[]), 0.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(combine(&[with_score(0.2), with_score(0.8)]), 0.5);
        assert_eq!(combine(&[with_score(1.0)]), 1.0);
    }

    #[test]
    fn test_out_of_range_members_are_clamped() {
        assert_eq!(combine(&[with_score(1.5), with_score(1.0)]), 1.0);
        assert_eq!(combine(&[with_score(-0.4)]), 0.0);
    }

    #[test]
    fn test_combined_severity() {
        let combined = CombinedAnalysis::new(vec![with_score(0.4), with_score(0.8)]);
        assert_eq!(combined.overall_severity, RiskLevel::High);
        assert_eq!(combined.members.len(), 2);
    }

    #[test]
    fn test_mean_on_band_edge() {
        let combined = CombinedAnalysis::new(vec![with_score(0.1), with_score(0.7)]);
        assert_eq!(combined.overall_score, 0.4);
        assert_eq!(combined.overall_severity, RiskLevel::Medium);

        let combined = CombinedAnalysis::new(vec![with_score(0.55), with_score(0.65)]);
        assert_eq!(combined.overall_score, 0.6);
        assert_eq!(combined.overall_severity, RiskLevel::High);

        assert_eq!(combine(&[with_score(0.3), with_score(0.6)]), 0.45);
    }

    #[test]
    fn test_indicators_in_member_order() {
        let mut first = with_score(0.2);
        first.indicators = vec!["Urgency language detected".to_string()];
        let mut second = with_score(0.7);
        second.indicators = vec![
            "IP address used instead of domain".to_string(),
            "Redirect parameter detected".to_string(),
        ];
        let combined = CombinedAnalysis::new(vec![first, second]);
        assert_eq!(
            combined.indicators(),
            vec![
                "Urgency language detected",
                "IP address used instead of domain",
                "Redirect parameter detected",
            ]
        );
    }
}
