//! Keyword Topic Classifier
//!
//! Each topic owns a keyword list; a topic scores one point per distinct
//! keyword or phrase present in the text.

use super::tokenizer::{contains_phrase, tokenize};
use super::{Classifier, FallbackLabel};
use crate::types::{Classification, Fallback, Result, Topic};

/// Keyword list for one topic
#[derive(Debug, Clone, Copy)]
pub struct TopicRule {
    pub topic: Topic,
    pub keywords: &'static [&'static str],
}

/// Built-in rule table, in priority order
pub const TOPIC_RULES: &[TopicRule] = &[
    TopicRule {
        topic: Topic::ParksRecLibrary,
        keywords: &[
            "park", "parks", "playground", "library", "program", "programs",
            "community center", "pool", "trail", "trails", "recreation",
        ],
    },
    TopicRule {
        topic: Topic::Sanitation,
        keywords: &[
            "trash", "recycling", "pickup", "sweeping", "garbage", "compost", "bin", "bins",
            "collection",
        ],
    },
    TopicRule {
        topic: Topic::Transportation,
        keywords: &[
            "pothole", "potholes", "road", "roads", "traffic", "street", "streets", "crosswalk",
            "sidewalk", "sidewalks", "signal", "bus", "parking",
        ],
    },
    TopicRule {
        topic: Topic::CommunityDevelopment,
        keywords: &[
            "zoning", "permit", "permits", "construction", "license", "licence", "inspection",
            "development",
        ],
    },
    TopicRule {
        topic: Topic::WaterResources,
        keywords: &[
            "water", "main break", "quality", "sewer", "drainage", "flooding", "leak",
            "leaking", "pipe",
        ],
    },
    TopicRule {
        topic: Topic::PublicSafety,
        keywords: &[
            "police", "fire", "officer", "officers", "emergency", "ambulance", "crime", "safety",
        ],
    },
    TopicRule {
        topic: Topic::CodeEnforcement,
        keywords: &[
            "yard", "noise", "vehicle", "vehicles", "abandoned", "overgrown", "junk", "violation",
        ],
    },
    TopicRule {
        topic: Topic::Billing,
        keywords: &[
            "bill", "bills", "billing", "charge", "charged", "charges", "fee", "fees", "invoice",
            "payment", "payments", "refund", "overcharged", "rate increase",
        ],
    },
    TopicRule {
        topic: Topic::StaffConduct,
        keywords: &[
            "staff", "rude", "employee", "employees", "clerk", "clerks", "attitude", "courteous",
            "polite", "service", "customer service", "representative",
        ],
    },
    TopicRule {
        topic: Topic::FacilityCleanliness,
        keywords: &[
            "dirty", "clean", "cleaning", "cleanliness", "filthy", "restroom", "restrooms",
            "bathroom", "bathrooms", "mold", "smell", "litter", "graffiti",
        ],
    },
];

/// Stateless keyword topic classifier
#[derive(Debug, Clone)]
pub struct KeywordTopicClassifier {
    rules: Vec<(Topic, Vec<Vec<String>>)>,
    threshold: f64,
}

impl KeywordTopicClassifier {
    pub fn new(threshold: f64) -> Self {
        Self::with_rules(TOPIC_RULES, threshold)
    }

    pub fn with_rules(rules: &[TopicRule], threshold: f64) -> Self {
        let rules = rules
            .iter()
            .map(|rule| {
                let phrases = rule.keywords.iter().map(|k| tokenize(k)).collect();
                (rule.topic, phrases)
            })
            .collect();
        Self { rules, threshold }
    }

    /// Keyword hits per topic, in rule order, topics without hits omitted
    pub fn scores(&self, text: &str) -> Vec<(Topic, usize)> {
        let tokens = tokenize(text);
        self.rules
            .iter()
            .filter_map(|(topic, phrases)| {
                let hits = phrases
                    .iter()
                    .filter(|p| contains_phrase(&tokens, p))
                    .count();
                (hits > 0).then_some((*topic, hits))
            })
            .collect()
    }
}

impl Classifier<Topic> for KeywordTopicClassifier {
    fn name(&self) -> &'static str {
        "topic"
    }

    fn classify(&self, text: &str) -> Result<Classification<Topic>> {
        let scores = self.scores(text);
        let total: usize = scores.iter().map(|(_, hits)| hits).sum();

        // First maximum wins, which keeps rule order as the tie-break
        let best = scores
            .iter()
            .fold(None::<(Topic, usize)>, |best, &(topic, hits)| match best {
                Some((_, best_hits)) if best_hits >= hits => best,
                _ => Some((topic, hits)),
            });

        let Some((topic, hits)) = best else {
            return Ok(Classification::fallback(
                Topic::DEFAULT,
                0.0,
                Fallback::LowConfidence,
            ));
        };

        let confidence = hits as f64 / total as f64;
        if confidence < self.threshold {
            return Ok(Classification::fallback(
                Topic::DEFAULT,
                confidence,
                Fallback::LowConfidence,
            ));
        }

        Ok(Classification::new(topic, confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Classification<Topic> {
        KeywordTopicClassifier::new(0.5).classify(text).unwrap()
    }

    #[test]
    fn test_single_topic() {
        assert_eq!(classify("billing was confusing").label, Topic::Billing);
        assert_eq!(classify("staff were rude").label, Topic::StaffConduct);
        assert_eq!(
            classify("huge pothole on main street").label,
            Topic::Transportation
        );
        assert_eq!(classify("billing was confusing").confidence, 1.0);
    }

    #[test]
    fn test_phrase_keyword() {
        let c = classify("the community center hours changed");
        assert_eq!(c.label, Topic::ParksRecLibrary);
    }

    #[test]
    fn test_no_keyword_maps_to_other() {
        let c = classify("just wanted to say hello");
        assert_eq!(c.label, Topic::Other);
        assert_eq!(c.confidence, 0.0);
        assert_eq!(c.fallback, Some(Fallback::LowConfidence));
    }

    #[test]
    fn test_tie_uses_rule_priority() {
        // water (Water Resources) and bill (Billing) tie at one hit each
        let c = classify("my water bill");
        assert_eq!(c.label, Topic::WaterResources);
        assert_eq!(c.confidence, 0.5);
    }

    #[test]
    fn test_ambiguous_below_threshold() {
        // Three topics with one hit each: confidence 1/3
        let c = classify("trash near the park on the road");
        assert_eq!(c.label, Topic::Other);
        assert!((c.confidence - 1.0 / 3.0).abs() < 1e-9);
        assert!(c.is_fallback());
    }

    #[test]
    fn test_dominant_topic_wins() {
        let classifier = KeywordTopicClassifier::new(0.5);
        let scores = classifier.scores("rude staff and a dirty restroom");
        assert_eq!(
            scores,
            vec![(Topic::StaffConduct, 2), (Topic::FacilityCleanliness, 2)]
        );
        let c = classifier.classify("rude staff, rude clerk, dirty lobby").unwrap();
        assert_eq!(c.label, Topic::StaffConduct);
    }
}
