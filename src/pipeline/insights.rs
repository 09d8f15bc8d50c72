//! Insight Extractor
//!
//! Derives ranked findings from period aggregates. With a previous period the
//! findings are period-over-period shifts; without one they fall back to
//! absolute levels in the current period.
//!
//! ## Salience
//!
//! `magnitude_weight * magnitude + volume_weight * volume_share`, where
//! `volume_share` is the subject's share of current-period records. Ties are
//! broken by larger magnitude, then by subject label.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use tracing::debug;

use super::aggregator::{AggregateStat, Aggregates, BucketKey, PeriodSnapshot};
use crate::config::{RankingConfig, TimeBucket};
use crate::constants::ranking::MIN_MAGNITUDE;
use crate::types::Topic;

// =============================================================================
// Insight Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// Change in record volume versus the previous period
    VolumeShift,
    /// Change in negative share versus the previous period
    NegativeShift,
    /// Share of current-period volume (no history)
    HighVolume,
    /// Negative share within the subject (no history)
    NegativeConcentration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Rising,
    Falling,
    Level,
}

/// What an insight is about
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Topic(Topic),
    Department(String),
}

impl Subject {
    pub fn label(&self) -> String {
        match self {
            Subject::Topic(topic) => topic.display_name().to_string(),
            Subject::Department(dept) => dept.clone(),
        }
    }

    pub fn noun(&self) -> &'static str {
        match self {
            Subject::Topic(_) => "topic",
            Subject::Department(_) => "department",
        }
    }
}

/// Statistic an insight was derived from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatRef {
    pub bucket: Option<BucketKey>,
    pub previous_bucket: Option<BucketKey>,
    pub current_count: usize,
    pub previous_count: Option<usize>,
    /// Metric value in the current period (count or share)
    pub current_value: f64,
    pub previous_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub subject: Subject,
    pub direction: Direction,
    /// Size of the finding in [0, 1]
    pub magnitude: f64,
    pub salience: f64,
    pub stat: StatRef,
    pub summary: String,
}

/// Ordering by salience desc, magnitude desc, subject label asc
pub fn rank_order(a: &Insight, b: &Insight) -> Ordering {
    b.salience
        .total_cmp(&a.salience)
        .then_with(|| b.magnitude.total_cmp(&a.magnitude))
        .then_with(|| a.subject.label().cmp(&b.subject.label()))
        .then_with(|| a.kind.cmp(&b.kind))
        .then_with(|| a.subject.noun().cmp(b.subject.noun()))
}

// =============================================================================
// Extractor
// =============================================================================

pub struct InsightExtractor {
    top_k: usize,
    ranking: RankingConfig,
    granularity: TimeBucket,
}

impl InsightExtractor {
    pub fn new(top_k: usize, ranking: RankingConfig, granularity: TimeBucket) -> Self {
        Self {
            top_k,
            ranking,
            granularity,
        }
    }

    /// Extract insights for the latest period of `aggregates`
    pub fn from_aggregates(&self, aggregates: &Aggregates) -> Vec<Insight> {
        match aggregates.current_and_previous() {
            Some((current, previous)) => self.extract(&current, previous.as_ref()),
            None => Vec::new(),
        }
    }

    /// Ranked insights for `current`, compared against `previous` when given
    pub fn extract(&self, current: &PeriodSnapshot, previous: Option<&PeriodSnapshot>) -> Vec<Insight> {
        let mut insights = match previous {
            Some(previous) => self.shifts(current, previous),
            None => {
                debug!("No previous period, ranking absolute levels");
                self.levels(current)
            }
        };

        insights.retain(|i| i.magnitude > MIN_MAGNITUDE);
        insights.sort_by(rank_order);
        insights.truncate(self.top_k);
        insights
    }

    fn salience(&self, magnitude: f64, current_count: usize, period_total: usize) -> f64 {
        let volume_share = if period_total == 0 {
            0.0
        } else {
            current_count as f64 / period_total as f64
        };
        self.ranking.magnitude_weight * magnitude + self.ranking.volume_weight * volume_share
    }

    fn period_label(&self, snapshot: &PeriodSnapshot) -> String {
        snapshot
            .bucket
            .map(|b| b.long_label(self.granularity))
            .unwrap_or_else(|| "the period".to_string())
    }

    // -------------------------------------------------------------------------
    // Period-over-period shifts
    // -------------------------------------------------------------------------

    fn shifts(&self, current: &PeriodSnapshot, previous: &PeriodSnapshot) -> Vec<Insight> {
        let mut subjects: Vec<(Subject, AggregateStat, AggregateStat)> = Vec::new();

        for topic in Topic::ALL {
            let cur = current.topics.get(&topic).cloned().unwrap_or_default();
            let prev = previous.topics.get(&topic).cloned().unwrap_or_default();
            if cur.count > 0 || prev.count > 0 {
                subjects.push((Subject::Topic(topic), cur, prev));
            }
        }

        let mut departments: Vec<&String> = current
            .departments
            .keys()
            .chain(previous.departments.keys())
            .collect();
        departments.sort();
        departments.dedup();
        for dept in departments {
            let cur = current.departments.get(dept).cloned().unwrap_or_default();
            let prev = previous.departments.get(dept).cloned().unwrap_or_default();
            subjects.push((Subject::Department(dept.clone()), cur, prev));
        }

        let period = self.period_label(current);
        let mut insights = Vec::new();

        for (subject, cur, prev) in subjects {
            let stat = StatRef {
                bucket: current.bucket,
                previous_bucket: previous.bucket,
                current_count: cur.count,
                previous_count: Some(prev.count),
                current_value: cur.count as f64,
                previous_value: Some(prev.count as f64),
            };

            // Symmetric relative change, bounded to [0, 1]
            let larger = cur.count.max(prev.count);
            let volume_magnitude = if larger == 0 {
                0.0
            } else {
                cur.count.abs_diff(prev.count) as f64 / larger as f64
            };
            let direction = direction_of(cur.count as f64, prev.count as f64);
            insights.push(Insight {
                kind: InsightKind::VolumeShift,
                summary: format!(
                    "Feedback about {} {} from {} to {} comments in {}.",
                    subject.label(),
                    verb(direction),
                    prev.count,
                    cur.count,
                    period
                ),
                salience: self.salience(volume_magnitude, cur.count, current.total.count),
                subject: subject.clone(),
                direction,
                magnitude: volume_magnitude,
                stat: stat.clone(),
            });

            if cur.count > 0 && prev.count > 0 {
                let (now, before) = (cur.negative_share(), prev.negative_share());
                let magnitude = (now - before).abs();
                let direction = direction_of(now, before);
                insights.push(Insight {
                    kind: InsightKind::NegativeShift,
                    summary: format!(
                        "Negative sentiment about {} {} from {:.0}% to {:.0}% ({:+.0} pts) in {}.",
                        subject.label(),
                        verb(direction),
                        before * 100.0,
                        now * 100.0,
                        (now - before) * 100.0,
                        period
                    ),
                    salience: self.salience(magnitude, cur.count, current.total.count),
                    subject,
                    direction,
                    magnitude,
                    stat: StatRef {
                        current_value: now,
                        previous_value: Some(before),
                        ..stat
                    },
                });
            }
        }

        insights
    }

    // -------------------------------------------------------------------------
    // Absolute levels (no history)
    // -------------------------------------------------------------------------

    fn levels(&self, current: &PeriodSnapshot) -> Vec<Insight> {
        let total = current.total.count;
        let period = self.period_label(current);
        let mut insights = Vec::new();

        let level_stat = |stat: &AggregateStat, value: f64| StatRef {
            bucket: current.bucket,
            previous_bucket: None,
            current_count: stat.count,
            previous_count: None,
            current_value: value,
            previous_value: None,
        };

        for (topic, stat) in &current.topics {
            let subject = Subject::Topic(*topic);
            let share = if total == 0 {
                0.0
            } else {
                stat.count as f64 / total as f64
            };
            insights.push(Insight {
                kind: InsightKind::HighVolume,
                summary: format!(
                    "{} accounted for {:.0}% of feedback ({} comments) in {}.",
                    subject.label(),
                    share * 100.0,
                    stat.count,
                    period
                ),
                salience: self.salience(share, stat.count, total),
                subject,
                direction: Direction::Level,
                magnitude: share,
                stat: level_stat(stat, share),
            });
        }

        let concentration = current
            .topics
            .iter()
            .map(|(t, s)| (Subject::Topic(*t), s))
            .chain(
                current
                    .departments
                    .iter()
                    .map(|(d, s)| (Subject::Department(d.clone()), s)),
            );

        for (subject, stat) in concentration {
            if stat.sentiment.negative == 0 {
                continue;
            }
            let share = stat.negative_share();
            insights.push(Insight {
                kind: InsightKind::NegativeConcentration,
                summary: format!(
                    "{} {} drew {} negative comments ({:.0}% of its feedback) in {}.",
                    capitalize(subject.noun()),
                    subject.label(),
                    stat.sentiment.negative,
                    share * 100.0,
                    period
                ),
                salience: self.salience(share, stat.count, total),
                subject,
                direction: Direction::Level,
                magnitude: share,
                stat: level_stat(stat, share),
            });
        }

        insights
    }
}

fn direction_of(now: f64, before: f64) -> Direction {
    match now.total_cmp(&before) {
        Ordering::Greater => Direction::Rising,
        Ordering::Less => Direction::Falling,
        Ordering::Equal => Direction::Level,
    }
}

fn verb(direction: Direction) -> &'static str {
    match direction {
        Direction::Rising => "rose",
        Direction::Falling => "fell",
        Direction::Level => "held steady",
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
