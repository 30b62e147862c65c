//! Study statistics over card memory state.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::due::due_count;
use crate::error::{Result, ScheduleError};
use crate::types::{Card, Deck, INITIAL_EASINESS};

/// Aggregate counters for a set of cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyStats {
    pub total_cards: usize,
    pub studied_cards: usize,
    pub unstudied_cards: usize,
    pub due_cards: usize,
    pub avg_easiness: f64,
    pub avg_interval: f64,
    /// Sum of current repetition counts.
    pub total_reviews: u64,
    /// Percentage of cards with at least one successful recall.
    pub retention_rate: f64,
}

impl StudyStats {
    pub fn compute(cards: &[Card], now: DateTime<Utc>) -> Self {
        let total = cards.len();
        let studied = cards.iter().filter(|c| c.state.repetitions > 0).count();
        let avg_easiness = mean(cards.iter().map(|c| c.state.easiness_factor)).unwrap_or(INITIAL_EASINESS);
        let avg_interval = mean(cards.iter().map(|c| f64::from(c.state.interval))).unwrap_or(0.0);

        Self {
            total_cards: total,
            studied_cards: studied,
            unstudied_cards: total - studied,
            due_cards: due_count(cards, now),
            avg_easiness: round_to(avg_easiness, 2),
            avg_interval: round_to(avg_interval, 1),
            total_reviews: cards.iter().map(|c| u64::from(c.state.repetitions)).sum(),
            retention_rate: round_to(percent(studied, total), 1),
        }
    }
}

/// Per-deck statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckSummary {
    pub id: i64,
    pub name: String,
    /// Percentage of the deck studied at least once.
    pub progress: f64,
    #[serde(flatten)]
    pub stats: StudyStats,
}

impl DeckSummary {
    pub fn compute(deck: &Deck, cards: &[Card], now: DateTime<Utc>) -> Self {
        let stats = StudyStats::compute(cards, now);
        Self {
            id: deck.id,
            name: deck.name.clone(),
            progress: round_to(percent(stats.studied_cards, stats.total_cards), 1),
            stats,
        }
    }
}

/// Spread of memory state over studied cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericalStats {
    pub ef_mean: f64,
    pub ef_std: f64,
    pub ef_median: f64,
    pub ef_25th: f64,
    pub ef_75th: f64,
    pub interval_mean: f64,
    pub interval_std: f64,
    pub reps_mean: f64,
    pub reps_std: f64,
}

impl Default for NumericalStats {
    fn default() -> Self {
        Self {
            ef_mean: INITIAL_EASINESS,
            ef_std: 0.0,
            ef_median: INITIAL_EASINESS,
            ef_25th: INITIAL_EASINESS,
            ef_75th: INITIAL_EASINESS,
            interval_mean: 0.0,
            interval_std: 0.0,
            reps_mean: 0.0,
            reps_std: 0.0,
        }
    }
}

impl NumericalStats {
    /// Standard deviations are population deviations. Percentiles interpolate
    /// linearly between the closest ranks.
    pub fn compute(cards: &[Card]) -> Self {
        let studied = StudiedColumns::collect(cards);
        if studied.easiness.is_empty() {
            return Self::default();
        }

        let mut sorted = studied.easiness.clone();
        sorted.sort_by(f64::total_cmp);

        Self {
            ef_mean: round_to(mean_of(&studied.easiness), 2),
            ef_std: round_to(std_dev(&studied.easiness), 2),
            ef_median: round_to(percentile(&sorted, 50.0), 2),
            ef_25th: round_to(percentile(&sorted, 25.0), 2),
            ef_75th: round_to(percentile(&sorted, 75.0), 2),
            interval_mean: round_to(mean_of(&studied.intervals), 1),
            interval_std: round_to(std_dev(&studied.intervals), 1),
            reps_mean: round_to(mean_of(&studied.repetitions), 1),
            reps_std: round_to(std_dev(&studied.repetitions), 1),
        }
    }
}

/// Pearson correlations between the memory state columns of studied cards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Correlations {
    pub ef_interval: f64,
    pub ef_reps: f64,
    pub interval_reps: f64,
}

impl Correlations {
    /// Fewer than this many studied cards gives all zeros.
    pub const MIN_SAMPLES: usize = 3;

    /// A column with no variance correlates as 0.
    pub fn compute(cards: &[Card]) -> Self {
        let studied = StudiedColumns::collect(cards);
        if studied.easiness.len() < Self::MIN_SAMPLES {
            return Self::default();
        }

        Self {
            ef_interval: round_to(pearson(&studied.easiness, &studied.intervals), 3),
            ef_reps: round_to(pearson(&studied.easiness, &studied.repetitions), 3),
            interval_reps: round_to(pearson(&studied.intervals, &studied.repetitions), 3),
        }
    }
}

struct StudiedColumns {
    easiness: Vec<f64>,
    intervals: Vec<f64>,
    repetitions: Vec<f64>,
}

impl StudiedColumns {
    fn collect(cards: &[Card]) -> Self {
        let studied: Vec<&Card> = cards.iter().filter(|c| c.state.repetitions > 0).collect();
        Self {
            easiness: studied.iter().map(|c| c.state.easiness_factor).collect(),
            intervals: studied.iter().map(|c| f64::from(c.state.interval)).collect(),
            repetitions: studied.iter().map(|c| f64::from(c.state.repetitions)).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub label: &'static str,
    pub count: usize,
}

const INTERVAL_BUCKETS: [(&str, u32); 5] = [
    ("New", 0),
    ("1 day", 1),
    ("2-7 days", 7),
    ("1-4 weeks", 30),
    ("1-3 months", 90),
];

/// Cards grouped by current interval. Empty buckets are omitted.
pub fn interval_distribution(cards: &[Card]) -> Vec<Bucket> {
    let labels: Vec<&'static str> = INTERVAL_BUCKETS
        .iter()
        .map(|(label, _)| *label)
        .chain(std::iter::once("3+ months"))
        .collect();
    let mut counts = vec![0usize; labels.len()];
    for card in cards {
        let slot = INTERVAL_BUCKETS
            .iter()
            .position(|(_, upper)| card.state.interval <= *upper)
            .unwrap_or(INTERVAL_BUCKETS.len());
        counts[slot] += 1;
    }
    buckets(&labels, &counts)
}

const EASINESS_BUCKETS: [(&str, f64); 3] = [("Very Hard", 1.8), ("Hard", 2.2), ("Medium", 2.8)];

/// Studied cards grouped by easiness. Empty buckets are omitted.
pub fn easiness_distribution(cards: &[Card]) -> Vec<Bucket> {
    let labels: Vec<&'static str> = EASINESS_BUCKETS
        .iter()
        .map(|(label, _)| *label)
        .chain(std::iter::once("Easy"))
        .collect();
    let mut counts = vec![0usize; labels.len()];
    for card in cards.iter().filter(|c| c.state.repetitions > 0) {
        let slot = EASINESS_BUCKETS
            .iter()
            .position(|(_, upper)| card.state.easiness_factor < *upper)
            .unwrap_or(EASINESS_BUCKETS.len());
        counts[slot] += 1;
    }
    buckets(&labels, &counts)
}

fn buckets(labels: &[&'static str], counts: &[usize]) -> Vec<Bucket> {
    labels
        .iter()
        .zip(counts)
        .filter(|(_, count)| **count > 0)
        .map(|(label, count)| Bucket {
            label: *label,
            count: *count,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Number of cards falling due on each of the `days` calendar days (UTC)
/// starting at `today`. Cards already overdue are not counted.
///
/// Fails with [`ScheduleError::CalendarOverflow`] when the window runs past
/// the last representable date.
pub fn upcoming_reviews(cards: &[Card], today: NaiveDate, days: u32) -> Result<Vec<DailyCount>> {
    (0..i64::from(days))
        .map(|offset| -> Result<DailyCount> {
            let date = today
                .checked_add_signed(Duration::days(offset))
                .ok_or(ScheduleError::CalendarOverflow { from: today, days })?;
            let count = cards
                .iter()
                .filter(|c| c.state.next_review.date_naive() == date)
                .count();
            Ok(DailyCount { date, count })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetentionMetrics {
    pub first_review_retention: f64,
    pub second_review_retention: f64,
    pub mature_card_rate: f64,
    /// Cards with three or more consecutive successful recalls.
    pub mature_cards: usize,
    pub total_studied: usize,
}

impl RetentionMetrics {
    pub fn compute(cards: &[Card]) -> Self {
        let at_least = |n: u32| cards.iter().filter(|c| c.state.repetitions >= n).count();
        let passed_first = at_least(1);
        let passed_second = at_least(2);
        let mature = at_least(3);
        let total_studied = passed_first.max(1);

        Self {
            first_review_retention: round_to(percent(passed_first, total_studied), 1),
            second_review_retention: round_to(percent(passed_second, total_studied), 1),
            mature_card_rate: round_to(percent(mature, total_studied), 1),
            mature_cards: mature,
            total_studied,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn mean_of(values: &[f64]) -> f64 {
    mean(values.iter().copied()).unwrap_or(0.0)
}

fn std_dev(values: &[f64]) -> f64 {
    let m = mean_of(values);
    mean(values.iter().map(|v| (v - m).powi(2)))
        .unwrap_or(0.0)
        .sqrt()
}

/// `sorted` must be non-empty and ascending.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let (mx, my) = (mean_of(xs), mean_of(ys));
    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        covariance += (x - mx) * (y - my);
        var_x += (x - mx).powi(2);
        var_y += (y - my).powi(2);
    }
    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        covariance / denominator
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
