//! Fixed bucketing schemes.
//!
//! Each scheme is a closed enum whose variants are listed in report order.
//! Classification is total: every input, including out-of-range and NaN
//! values, lands in exactly one bucket.

use crate::format::percentage;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// A fixed set of labeled ranges.
pub trait Scheme: Copy + Eq + 'static {
    /// Value being classified
    type Value: Copy;

    /// Every bucket, in report order.
    const ALL: &'static [Self];

    /// Bucket containing `value`.
    fn classify(value: Self::Value) -> Self;

    /// Display label (also the JSON key).
    fn label(self) -> &'static str;

    /// Position of this bucket in [`Scheme::ALL`].
    fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|bucket| *bucket == self)
            .unwrap_or_default()
    }
}

/// Label of the bucket `value` falls into under scheme `S`.
pub fn bucket<S: Scheme>(value: S::Value) -> &'static str {
    S::classify(value).label()
}

// ============================================
// Health deciles
// ============================================

/// Ten health-score ranges, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthDecile {
    D90,
    D80,
    D70,
    D60,
    D50,
    D40,
    D30,
    D20,
    D10,
    D0,
}

impl HealthDecile {
    /// Truncates the score toward zero, then picks the highest lower bound
    /// it reaches. Scores below 0 (and NaN) clamp to `0-9`, scores of 100
    /// or more to `90-100`.
    pub fn for_score(score: f64) -> Self {
        // `as` saturates and maps NaN to 0.
        let truncated = score as i64;
        match truncated {
            i64::MIN..=9 => HealthDecile::D0,
            10..=19 => HealthDecile::D10,
            20..=29 => HealthDecile::D20,
            30..=39 => HealthDecile::D30,
            40..=49 => HealthDecile::D40,
            50..=59 => HealthDecile::D50,
            60..=69 => HealthDecile::D60,
            70..=79 => HealthDecile::D70,
            80..=89 => HealthDecile::D80,
            _ => HealthDecile::D90,
        }
    }
}

impl Scheme for HealthDecile {
    type Value = f64;

    const ALL: &'static [Self] = &[
        HealthDecile::D90,
        HealthDecile::D80,
        HealthDecile::D70,
        HealthDecile::D60,
        HealthDecile::D50,
        HealthDecile::D40,
        HealthDecile::D30,
        HealthDecile::D20,
        HealthDecile::D10,
        HealthDecile::D0,
    ];

    fn classify(value: f64) -> Self {
        Self::for_score(value)
    }

    fn label(self) -> &'static str {
        match self {
            HealthDecile::D90 => "90-100",
            HealthDecile::D80 => "80-89",
            HealthDecile::D70 => "70-79",
            HealthDecile::D60 => "60-69",
            HealthDecile::D50 => "50-59",
            HealthDecile::D40 => "40-49",
            HealthDecile::D30 => "30-39",
            HealthDecile::D20 => "20-29",
            HealthDecile::D10 => "10-19",
            HealthDecile::D0 => "0-9",
        }
    }
}

// ============================================
// Health bands
// ============================================

/// Coarse health classification used in team summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthBand {
    /// score >= 80
    Healthy,
    /// 50 <= score < 80
    Warning,
    /// score < 50
    Critical,
}

impl HealthBand {
    pub fn for_score(score: f64) -> Self {
        if score >= 80.0 {
            HealthBand::Healthy
        } else if score >= 50.0 {
            HealthBand::Warning
        } else {
            HealthBand::Critical
        }
    }
}

impl Scheme for HealthBand {
    type Value = f64;

    const ALL: &'static [Self] = &[HealthBand::Healthy, HealthBand::Warning, HealthBand::Critical];

    fn classify(value: f64) -> Self {
        Self::for_score(value)
    }

    fn label(self) -> &'static str {
        match self {
            HealthBand::Healthy => "healthy",
            HealthBand::Warning => "warning",
            HealthBand::Critical => "critical",
        }
    }
}

// ============================================
// Token bands
// ============================================

/// Six contiguous token-usage ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenBand {
    UpTo10k,
    UpTo50k,
    UpTo100k,
    UpTo150k,
    UpTo200k,
    Over200k,
}

impl TokenBand {
    /// Upper bounds are exclusive.
    pub fn for_tokens(tokens: u64) -> Self {
        match tokens {
            0..=9_999 => TokenBand::UpTo10k,
            10_000..=49_999 => TokenBand::UpTo50k,
            50_000..=99_999 => TokenBand::UpTo100k,
            100_000..=149_999 => TokenBand::UpTo150k,
            150_000..=199_999 => TokenBand::UpTo200k,
            _ => TokenBand::Over200k,
        }
    }
}

impl Scheme for TokenBand {
    type Value = u64;

    const ALL: &'static [Self] = &[
        TokenBand::UpTo10k,
        TokenBand::UpTo50k,
        TokenBand::UpTo100k,
        TokenBand::UpTo150k,
        TokenBand::UpTo200k,
        TokenBand::Over200k,
    ];

    fn classify(value: u64) -> Self {
        Self::for_tokens(value)
    }

    fn label(self) -> &'static str {
        match self {
            TokenBand::UpTo10k => "0-10k",
            TokenBand::UpTo50k => "10k-50k",
            TokenBand::UpTo100k => "50k-100k",
            TokenBand::UpTo150k => "100k-150k",
            TokenBand::UpTo200k => "150k-200k",
            TokenBand::Over200k => "200k+",
        }
    }
}

// ============================================
// Counting
// ============================================

/// Per-bucket tallies for one scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketCounts<S: Scheme> {
    counts: Vec<usize>,
    total: usize,
    _scheme: std::marker::PhantomData<S>,
}

impl<S: Scheme> Default for BucketCounts<S> {
    fn default() -> Self {
        Self {
            counts: vec![0; S::ALL.len()],
            total: 0,
            _scheme: std::marker::PhantomData,
        }
    }
}

impl<S: Scheme> BucketCounts<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally every value.
    pub fn from_values(values: impl IntoIterator<Item = S::Value>) -> Self {
        let mut counts = Self::new();
        for value in values {
            counts.add(value);
        }
        counts
    }

    pub fn add(&mut self, value: S::Value) {
        self.counts[S::classify(value).index()] += 1;
        self.total += 1;
    }

    pub fn count(&self, bucket: S) -> usize {
        self.counts[bucket.index()]
    }

    /// Number of values tallied (always the sum of all buckets).
    pub fn total(&self) -> usize {
        self.total
    }

    /// Share of `bucket` in percent, one decimal.
    pub fn percentage(&self, bucket: S) -> f64 {
        percentage(self.count(bucket), self.total)
    }

    /// `(bucket, count)` pairs in report order, empty buckets included.
    pub fn iter(&self) -> impl Iterator<Item = (S, usize)> + '_ {
        S::ALL.iter().map(move |bucket| (*bucket, self.count(*bucket)))
    }

    /// Serializable `label -> count` view.
    pub fn to_counts(&self) -> CountDistribution {
        CountDistribution(self.iter().map(|(b, count)| (b.label(), count)).collect())
    }

    /// Serializable `label -> {count, percentage}` view.
    pub fn to_shares(&self) -> ShareDistribution {
        ShareDistribution(
            self.iter()
                .map(|(b, count)| {
                    (
                        b.label(),
                        BucketShare {
                            count,
                            percentage: self.percentage(b),
                        },
                    )
                })
                .collect(),
        )
    }
}

/// Count and percentage of one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BucketShare {
    pub count: usize,
    pub percentage: f64,
}

/// Ordered `label -> count` map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountDistribution(pub Vec<(&'static str, usize)>);

impl CountDistribution {
    pub fn get(&self, label: &str) -> Option<usize> {
        self.0.iter().find(|(l, _)| *l == label).map(|(_, c)| *c)
    }
}

impl Serialize for CountDistribution {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, count) in &self.0 {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

/// Ordered `label -> {count, percentage}` map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShareDistribution(pub Vec<(&'static str, BucketShare)>);

impl ShareDistribution {
    pub fn get(&self, label: &str) -> Option<BucketShare> {
        self.0.iter().find(|(l, _)| *l == label).map(|(_, s)| *s)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ShareDistribution {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, share) in &self.0 {
            map.serialize_entry(label, share)?;
        }
        map.end()
    }
}
