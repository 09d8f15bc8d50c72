//! Aggregator
//!
//! Groups classified records by time bucket, department and topic in one
//! pass of counters. Percentages are derived only after every count of a
//! group is final.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;

use tracing::debug;

use crate::config::TimeBucket;
use crate::types::{ClassifiedRecord, PulseError, Result, Sentiment, Topic};

// =============================================================================
// Bucket Keys
// =============================================================================

/// Floor date of a time bucket; undated records share the `Unknown` bucket,
/// which sorts after every dated period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKey {
    Period(NaiveDate),
    Unknown,
}

impl BucketKey {
    /// Bucket containing `date` for the given granularity
    pub fn for_date(date: Option<NaiveDate>, granularity: TimeBucket) -> Result<Self> {
        let Some(date) = date else {
            return Ok(BucketKey::Unknown);
        };
        floor(date, granularity)
            .map(BucketKey::Period)
            .ok_or_else(|| {
                PulseError::Aggregation(format!("cannot compute {} floor of {}", granularity, date))
            })
    }

    /// Immediately preceding bucket (none for `Unknown`)
    pub fn previous(&self, granularity: TimeBucket) -> Option<BucketKey> {
        let BucketKey::Period(start) = self else {
            return None;
        };
        let prev = match granularity {
            TimeBucket::Month => start.checked_sub_months(Months::new(1)),
            TimeBucket::Week => start.checked_sub_days(Days::new(7)),
        };
        prev.map(BucketKey::Period)
    }

    /// Human-readable label, e.g. `2024-01`, `2024-W02`, `unknown`
    pub fn label(&self, granularity: TimeBucket) -> String {
        match (self, granularity) {
            (BucketKey::Unknown, _) => "unknown".to_string(),
            (BucketKey::Period(d), TimeBucket::Month) => d.format("%Y-%m").to_string(),
            (BucketKey::Period(d), TimeBucket::Week) => {
                let week = d.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
        }
    }

    /// Long label for narrative text, e.g. `January 2024`
    pub fn long_label(&self, granularity: TimeBucket) -> String {
        match (self, granularity) {
            (BucketKey::Period(d), TimeBucket::Month) => d.format("%B %Y").to_string(),
            (BucketKey::Period(d), TimeBucket::Week) => format!("week of {}", d.format("%b %d, %Y")),
            (BucketKey::Unknown, _) => "undated records".to_string(),
        }
    }
}

fn floor(date: NaiveDate, granularity: TimeBucket) -> Option<NaiveDate> {
    match granularity {
        TimeBucket::Month => date.with_day(1),
        TimeBucket::Week => {
            date.checked_sub_days(Days::new(date.weekday().num_days_from_monday() as u64))
        }
    }
}

fn next_start(start: NaiveDate, granularity: TimeBucket) -> Option<NaiveDate> {
    match granularity {
        TimeBucket::Month => start.checked_add_months(Months::new(1)),
        TimeBucket::Week => start.checked_add_days(Days::new(7)),
    }
}

/// Verify `key` is a well-formed bucket that contains `date`
fn check_bucket(key: BucketKey, date: Option<NaiveDate>, granularity: TimeBucket) -> Result<()> {
    match (key, date) {
        (BucketKey::Unknown, None) => Ok(()),
        (BucketKey::Period(start), Some(date)) => {
            let aligned = match granularity {
                TimeBucket::Month => start.day() == 1,
                TimeBucket::Week => start.weekday() == Weekday::Mon,
            };
            let contains = start <= date && next_start(start, granularity).is_none_or(|end| date < end);
            if aligned && contains {
                Ok(())
            } else {
                Err(PulseError::Aggregation(format!(
                    "bucket {} does not contain {} at {} granularity",
                    start, date, granularity
                )))
            }
        }
        (key, date) => Err(PulseError::Aggregation(format!(
            "bucket {:?} inconsistent with record date {:?}",
            key, date
        ))),
    }
}

// =============================================================================
// Statistics
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentCounts {
    pub fn get(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        }
    }

    pub fn sum(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    fn increment(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }
}

/// Percentages in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SentimentShares {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

/// Counts and percentages for one group of records
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AggregateStat {
    pub count: usize,
    pub sentiment: SentimentCounts,
    pub topics: BTreeMap<Topic, usize>,
    pub sentiment_pct: SentimentShares,
    pub topic_pct: BTreeMap<Topic, f64>,
}

impl AggregateStat {
    /// Fraction of negative records in [0, 1], 0 for an empty group
    pub fn negative_share(&self) -> f64 {
        ratio(self.sentiment.negative, self.count)
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    ratio(part, whole) * 100.0
}

/// Running counters; never exposed until finished
#[derive(Debug, Default)]
struct Tally {
    count: usize,
    sentiment: SentimentCounts,
    topics: BTreeMap<Topic, usize>,
}

impl Tally {
    fn add(&mut self, record: &ClassifiedRecord) {
        self.count += 1;
        self.sentiment.increment(record.sentiment.label);
        *self.topics.entry(record.topic.label).or_insert(0) += 1;
    }

    fn finish(self) -> AggregateStat {
        let count = self.count;
        AggregateStat {
            count,
            sentiment: self.sentiment,
            sentiment_pct: SentimentShares {
                positive: percent(self.sentiment.positive, count),
                negative: percent(self.sentiment.negative, count),
                neutral: percent(self.sentiment.neutral, count),
            },
            topic_pct: self
                .topics
                .iter()
                .map(|(topic, n)| (*topic, percent(*n, count)))
                .collect(),
            topics: self.topics,
        }
    }
}

fn finish_all<K: Ord>(tallies: BTreeMap<K, Tally>) -> BTreeMap<K, AggregateStat> {
    tallies.into_iter().map(|(k, t)| (k, t.finish())).collect()
}

// =============================================================================
// Aggregates
// =============================================================================

/// All statistics for one period
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PeriodSnapshot {
    pub bucket: Option<BucketKey>,
    pub total: AggregateStat,
    pub departments: BTreeMap<String, AggregateStat>,
    pub topics: BTreeMap<Topic, AggregateStat>,
}

/// Output of the aggregation stage
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub granularity: TimeBucket,
    /// (bucket, department) groups
    pub by_bucket_department: BTreeMap<(BucketKey, String), AggregateStat>,
    /// (bucket, topic) groups
    pub by_bucket_topic: BTreeMap<(BucketKey, Topic), AggregateStat>,
    pub by_bucket: BTreeMap<BucketKey, AggregateStat>,
    /// Topic roll-up across all buckets
    pub by_topic: BTreeMap<Topic, AggregateStat>,
    pub by_department: BTreeMap<String, AggregateStat>,
    pub total: AggregateStat,
}

impl Aggregates {
    /// Dated buckets in chronological order
    pub fn periods(&self) -> Vec<BucketKey> {
        self.by_bucket
            .keys()
            .copied()
            .filter(|k| matches!(k, BucketKey::Period(_)))
            .collect()
    }

    /// Snapshot of one bucket; empty when the bucket holds no records
    pub fn snapshot(&self, bucket: BucketKey) -> PeriodSnapshot {
        PeriodSnapshot {
            bucket: Some(bucket),
            total: self.by_bucket.get(&bucket).cloned().unwrap_or_default(),
            departments: self
                .by_bucket_department
                .iter()
                .filter(|((b, _), _)| *b == bucket)
                .map(|((_, dept), stat)| (dept.clone(), stat.clone()))
                .collect(),
            topics: self
                .by_bucket_topic
                .iter()
                .filter(|((b, _), _)| *b == bucket)
                .map(|((_, topic), stat)| (*topic, stat.clone()))
                .collect(),
        }
    }

    /// Latest period and the period immediately before it
    ///
    /// The latest dated bucket is current; without dated records the unknown
    /// bucket is. The previous snapshot is `None` when no earlier data exists.
    pub fn current_and_previous(&self) -> Option<(PeriodSnapshot, Option<PeriodSnapshot>)> {
        let current = self
            .periods()
            .last()
            .copied()
            .or_else(|| self.by_bucket.keys().next().copied())?;

        let has_history = self.by_bucket.keys().any(|k| *k < current);
        let previous = current
            .previous(self.granularity)
            .filter(|_| has_history)
            .map(|prev| self.snapshot(prev));

        Some((self.snapshot(current), previous))
    }

    /// Bucket with the most records, earliest first on ties
    pub fn peak_period(&self) -> Option<(BucketKey, usize)> {
        self.by_bucket
            .iter()
            .filter(|(k, _)| matches!(k, BucketKey::Period(_)))
            .fold(None, |best: Option<(BucketKey, usize)>, (k, stat)| match best {
                Some((_, n)) if n >= stat.count => best,
                _ => Some((*k, stat.count)),
            })
    }
}

/// Sort records chronologically: dated first by date, then undated; input
/// order breaks ties
pub fn sort_chronologically(records: &mut [ClassifiedRecord]) {
    records.sort_by_key(|r| (r.date().is_none(), r.date(), r.record.index));
}

/// Aggregate classified records at the given granularity
pub fn aggregate(records: &[ClassifiedRecord], granularity: TimeBucket) -> Result<Aggregates> {
    let mut ordered: Vec<&ClassifiedRecord> = records.iter().collect();
    ordered.sort_by_key(|r| (r.date().is_none(), r.date(), r.record.index));

    let mut by_bucket_department: BTreeMap<(BucketKey, String), Tally> = BTreeMap::new();
    let mut by_bucket_topic: BTreeMap<(BucketKey, Topic), Tally> = BTreeMap::new();
    let mut by_bucket: BTreeMap<BucketKey, Tally> = BTreeMap::new();
    let mut by_topic: BTreeMap<Topic, Tally> = BTreeMap::new();
    let mut by_department: BTreeMap<String, Tally> = BTreeMap::new();
    let mut total = Tally::default();

    for record in ordered {
        let key = BucketKey::for_date(record.date(), granularity)?;
        check_bucket(key, record.date(), granularity)?;

        let department = record.department().to_string();
        by_bucket_department
            .entry((key, department.clone()))
            .or_default()
            .add(record);
        by_bucket_topic
            .entry((key, record.topic.label))
            .or_default()
            .add(record);
        by_bucket.entry(key).or_default().add(record);
        by_topic.entry(record.topic.label).or_default().add(record);
        by_department.entry(department).or_default().add(record);
        total.add(record);
    }

    debug!(
        "Aggregated {} records into {} buckets and {} department groups",
        total.count,
        by_bucket.len(),
        by_bucket_department.len()
    );

    Ok(Aggregates {
        granularity,
        by_bucket_department: finish_all(by_bucket_department),
        by_bucket_topic: finish_all(by_bucket_topic),
        by_bucket: finish_all(by_bucket),
        by_topic: finish_all(by_topic),
        by_department: finish_all(by_department),
        total: total.finish(),
    })
}
