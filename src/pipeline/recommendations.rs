//! Recommendation Rules
//!
//! Maps ranked insights to actions through an ordered, configurable rule
//! table. The first rule matching an insight wins; a (rule, subject) pair is
//! recommended at most once.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::insights::{Direction, Insight, InsightKind, Subject};

/// One row of the recommendation table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRule {
    pub id: String,
    pub kind: InsightKind,
    /// Required direction; any direction when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub min_magnitude: f64,
    /// Short action heading
    pub action: String,
    /// Body text; `{subject}`, `{magnitude}` and `{count}` are substituted
    pub template: String,
}

impl RecommendationRule {
    pub fn matches(&self, insight: &Insight) -> bool {
        self.kind == insight.kind
            && self.direction.is_none_or(|d| d == insight.direction)
            && insight.magnitude >= self.min_magnitude
    }

    fn render(&self, insight: &Insight) -> String {
        self.template
            .replace("{subject}", &insight.subject.label())
            .replace("{magnitude}", &format!("{:.0}%", insight.magnitude * 100.0))
            .replace("{count}", &insight.stat.current_count.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub rule_id: String,
    pub subject: Subject,
    pub action: String,
    pub text: String,
}

/// Built-in rule table
pub fn default_rules() -> Vec<RecommendationRule> {
    fn rule(
        id: &str,
        kind: InsightKind,
        direction: Option<Direction>,
        min_magnitude: f64,
        action: &str,
        template: &str,
    ) -> RecommendationRule {
        RecommendationRule {
            id: id.to_string(),
            kind,
            direction,
            min_magnitude,
            action: action.to_string(),
            template: template.to_string(),
        }
    }

    vec![
        rule(
            "negative-share-rising",
            InsightKind::NegativeShift,
            Some(Direction::Rising),
            0.10,
            "Conduct a root-cause review",
            "Negative feedback about {subject} grew by {magnitude} of its comments. \
             Review recent process changes and publish a targeted action plan.",
        ),
        rule(
            "negative-concentration",
            InsightKind::NegativeConcentration,
            None,
            0.30,
            "Develop a targeted action plan",
            "{subject} drew {count} comments, {magnitude} of them negative. \
             Identify the most common complaints and communicate planned improvements to residents.",
        ),
        rule(
            "high-volume",
            InsightKind::HighVolume,
            None,
            0.20,
            "Review communication channels",
            "{subject} accounts for {magnitude} of all feedback. \
             Make sure its service channels are efficient and gather detail through targeted surveys.",
        ),
        rule(
            "volume-rising",
            InsightKind::VolumeShift,
            Some(Direction::Rising),
            0.50,
            "Plan resources for demand",
            "Feedback about {subject} rose to {count} comments. \
             Allocate additional capacity ahead of the next period.",
        ),
        rule(
            "negative-share-falling",
            InsightKind::NegativeShift,
            Some(Direction::Falling),
            0.10,
            "Recognize the improvement",
            "Negative feedback about {subject} dropped by {magnitude}. \
             Document what changed so it can be repeated elsewhere.",
        ),
    ]
}

/// Recommendations for `insights`, in insight order
pub fn recommend(insights: &[Insight], rules: &[RecommendationRule]) -> Vec<Recommendation> {
    let mut seen: BTreeSet<(String, String, &'static str)> = BTreeSet::new();
    let mut out = Vec::new();

    for insight in insights {
        let Some(rule) = rules.iter().find(|r| r.matches(insight)) else {
            continue;
        };
        let key = (
            rule.id.clone(),
            insight.subject.label(),
            insight.subject.noun(),
        );
        if !seen.insert(key) {
            continue;
        }
        out.push(Recommendation {
            rule_id: rule.id.clone(),
            subject: insight.subject.clone(),
            action: rule.action.clone(),
            text: rule.render(insight),
        });
    }

    out
}
