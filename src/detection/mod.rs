//! Table-driven indicator catalogs.
//!
//! Each content type declares an ordered slice of [`IndicatorRule`]s. Rules are
//! independent: every rule is evaluated, and the weights of all rules that fire
//! are summed. Evaluation never short-circuits; analyzers that need a structural
//! early return (an unparsable URL) pick a different rule table instead.

use serde::{Deserialize, Serialize};

/// Weights are kept in hundredths so that accumulation is exact at band edges.
pub type Points = i32;

pub const MAX_POINTS: Points = 100;

/// How a rule inspects its subject.
pub enum Matcher<S: ?Sized> {
    /// Fires at most once with a fixed message.
    Once {
        check: fn(&S) -> bool,
        message: &'static str,
    },
    /// Fires once per returned message; every hit contributes the weight.
    Each(fn(&S) -> Vec<String>),
    /// Adjusts the score without surfacing an indicator.
    Adjust(fn(&S) -> bool),
}

pub struct IndicatorRule<S: ?Sized> {
    pub name: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub weight: Points,
    pub matcher: Matcher<S>,
}

impl<S: ?Sized> IndicatorRule<S> {
    fn hits(&self, subject: &S) -> (usize, Vec<String>) {
        match &self.matcher {
            Matcher::Once { check, message } => {
                if check(subject) {
                    (1, vec![message.to_string()])
                } else {
                    (0, Vec::new())
                }
            }
            Matcher::Each(collect) => {
                let messages = collect(subject);
                (messages.len(), messages)
            }
            Matcher::Adjust(check) => (usize::from(check(subject)), Vec::new()),
        }
    }
}

/// Raw outcome of running a catalog over one subject, before clamping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub points: Points,
    pub indicators: Vec<String>,
    pub fired: Vec<&'static str>,
}

impl Evaluation {
    /// Clamped score in `[0, 1]`.
    pub fn score(&self) -> f64 {
        points_to_score(self.points)
    }
}

pub fn points_to_score(points: Points) -> f64 {
    f64::from(points.clamp(0, MAX_POINTS)) / 100.0
}

pub fn evaluate<S: ?Sized>(rules: &[IndicatorRule<S>], subject: &S) -> Evaluation {
    let mut evaluation = Evaluation::default();

    for rule in rules {
        let (count, messages) = rule.hits(subject);
        if count == 0 {
            continue;
        }

        log::debug!(
            "rule {} fired {} time(s), weight {}",
            rule.name,
            count,
            rule.weight
        );
        evaluation.points += rule.weight * count as Points;
        evaluation.indicators.extend(messages);
        evaluation.fired.push(rule.name);
    }

    evaluation
}

/// Public description of one rule, used by methodology reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSummary {
    pub name: String,
    pub label: String,
    pub description: String,
    pub weight: f64,
    pub per_match: bool,
}

pub fn summarize<S: ?Sized>(rules: &[IndicatorRule<S>]) -> Vec<RuleSummary> {
    rules
        .iter()
        .map(|rule| RuleSummary {
            name: rule.name.to_string(),
            label: rule.label.to_string(),
            description: rule.description.to_string(),
            weight: f64::from(rule.weight) / 100.0,
            per_match: matches!(rule.matcher, Matcher::Each(_)),
        })
        .collect()
}
