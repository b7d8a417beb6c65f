use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{
    Leaderboard, Metric, MovieRecord, RankingEntry, StackedRecord, WeekBucket, WeekSummary,
};

pub const RELEASE_DATE_FORMAT: &str = "%m/%d/%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    fn compare(self, a: f64, b: f64) -> Ordering {
        match self {
            SortDirection::Ascending => a.total_cmp(&b),
            SortDirection::Descending => b.total_cmp(&a),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }
}

/// Options shared by every chart variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregatorOptions {
    pub stack_key: Metric,
    pub direction: SortDirection,
    pub week_start: WeekStart,
    pub top_limit: usize,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            stack_key: Metric::Rating,
            direction: SortDirection::Ascending,
            week_start: WeekStart::Sunday,
            top_limit: 10,
        }
    }
}

impl AggregatorOptions {
    pub fn stack(&self, records: &[MovieRecord]) -> Vec<StackedRecord> {
        bucket_and_stack(
            records,
            week_of(self.week_start),
            self.stack_key.key(),
            self.direction,
        )
    }

    pub fn top(&self, records: &[MovieRecord], metric: Metric) -> Vec<RankingEntry> {
        top_n(records, metric.key(), self.top_limit)
    }

    pub fn leaderboards(&self, records: &[MovieRecord]) -> Vec<Leaderboard> {
        leaderboards(records, &[Metric::Revenue, Metric::Rating], self.top_limit)
    }

    pub fn weekly(&self, records: &[MovieRecord]) -> Vec<WeekSummary> {
        weekly_summaries(records, self.week_start)
    }
}

/// Parses `MM/DD/YYYY`. Anything else is `None`.
pub fn parse_release_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), RELEASE_DATE_FORMAT).ok()
}

/// Latest `start` weekday on or before `date`.
pub fn week_floor(date: NaiveDate, start: WeekStart) -> NaiveDate {
    date.week(start.weekday()).first_day()
}

pub fn week_of(start: WeekStart) -> impl Fn(&MovieRecord) -> WeekBucket {
    move |movie: &MovieRecord| match movie.release_date {
        Some(date) => WeekBucket::Week(week_floor(date, start)),
        None => WeekBucket::Undated,
    }
}

// NaN keys coerce to zero like any other invalid number.
fn sort_key(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

/// Groups records by week and numbers them within each week.
///
/// Buckets come out in ascending week order with `Undated` last. Inside a
/// bucket records are ordered by `key_fn` in `direction`; ties keep their
/// input order. `stack_index` restarts at 0 for every bucket.
pub fn bucket_and_stack<W, K>(
    records: &[MovieRecord],
    week_of: W,
    key_fn: K,
    direction: SortDirection,
) -> Vec<StackedRecord>
where
    W: Fn(&MovieRecord) -> WeekBucket,
    K: Fn(&MovieRecord) -> f64,
{
    let mut buckets: BTreeMap<WeekBucket, Vec<(f64, &MovieRecord)>> = BTreeMap::new();

    for movie in records {
        buckets
            .entry(week_of(movie))
            .or_default()
            .push((sort_key(key_fn(movie)), movie));
    }

    let bucket_count = buckets.len();
    let mut stacked = Vec::with_capacity(records.len());

    for (bucket, mut movies) in buckets {
        // sort_by is stable
        movies.sort_by(|a, b| direction.compare(a.0, b.0));
        for (stack_index, (_, movie)) in movies.into_iter().enumerate() {
            stacked.push(StackedRecord {
                movie: movie.clone(),
                week_bucket: bucket,
                stack_index,
            });
        }
    }

    debug!(
        records = records.len(),
        buckets = bucket_count,
        "stacked records by release week"
    );
    stacked
}

/// Highest values first, ranked from 1. Ties keep input order.
pub fn top_n<K>(records: &[MovieRecord], key_fn: K, n: usize) -> Vec<RankingEntry>
where
    K: Fn(&MovieRecord) -> f64,
{
    let mut keyed: Vec<(f64, &MovieRecord)> = records
        .iter()
        .map(|movie| (sort_key(key_fn(movie)), movie))
        .collect();
    keyed.sort_by(|a, b| SortDirection::Descending.compare(a.0, b.0));

    keyed
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(index, (_, movie))| RankingEntry {
            movie: movie.clone(),
            rank: index + 1,
            shared_across_lists: false,
        })
        .collect()
}

pub fn shared_titles(list_a: &[RankingEntry], list_b: &[RankingEntry]) -> BTreeSet<String> {
    let names_b: BTreeSet<&str> = list_b.iter().map(|entry| entry.movie.name.as_str()).collect();
    list_a
        .iter()
        .filter(|entry| names_b.contains(entry.movie.name.as_str()))
        .map(|entry| entry.movie.name.clone())
        .collect()
}

/// Marks every entry whose name shows up in more than one of `lists`.
pub fn flag_shared(lists: &mut [Vec<RankingEntry>]) {
    let mut appearances: HashMap<String, usize> = HashMap::new();

    for list in lists.iter() {
        let names: BTreeSet<&str> = list.iter().map(|entry| entry.movie.name.as_str()).collect();
        for name in names {
            *appearances.entry(name.to_string()).or_default() += 1;
        }
    }

    for list in lists.iter_mut() {
        for entry in list.iter_mut() {
            entry.shared_across_lists = appearances
                .get(&entry.movie.name)
                .is_some_and(|count| *count > 1);
        }
    }
}

pub fn leaderboards(records: &[MovieRecord], metrics: &[Metric], n: usize) -> Vec<Leaderboard> {
    let mut lists: Vec<Vec<RankingEntry>> = metrics
        .iter()
        .map(|metric| top_n(records, metric.key(), n))
        .collect();
    flag_shared(&mut lists);

    metrics
        .iter()
        .zip(lists)
        .map(|(metric, entries)| Leaderboard {
            metric: *metric,
            entries,
        })
        .collect()
}

pub fn weekly_summaries(records: &[MovieRecord], start: WeekStart) -> Vec<WeekSummary> {
    let bucket_of = week_of(start);
    let mut weeks: BTreeMap<WeekBucket, (usize, f64, f64)> = BTreeMap::new();

    for movie in records {
        let entry = weeks.entry(bucket_of(movie)).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += movie.revenue;
        entry.2 += sort_key(movie.vote_average);
    }

    weeks
        .into_iter()
        .map(|(week_start, (movie_count, total_revenue, total_vote))| WeekSummary {
            week_start,
            movie_count,
            total_revenue,
            avg_vote: if movie_count == 0 {
                0.0
            } else {
                total_vote / movie_count as f64
            },
        })
        .collect()
}

/// Size of the tallest week stack.
pub fn max_stack_height(stacked: &[StackedRecord]) -> usize {
    stacked
        .iter()
        .map(|record| record.stack_index + 1)
        .max()
        .unwrap_or(0)
}

/// First and last dated week bucket.
pub fn timeline_extent(stacked: &[StackedRecord]) -> Option<(NaiveDate, NaiveDate)> {
    date_extent(stacked.iter().filter_map(|record| record.week_bucket.start()))
}

/// Earliest and latest release date.
pub fn release_extent(records: &[MovieRecord]) -> Option<(NaiveDate, NaiveDate)> {
    date_extent(records.iter().filter_map(|movie| movie.release_date))
}

fn date_extent(dates: impl Iterator<Item = NaiveDate>) -> Option<(NaiveDate, NaiveDate)> {
    dates.fold(None, |extent, date| match extent {
        None => Some((date, date)),
        Some((first, last)) => Some((first.min(date), last.max(date))),
    })
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

/// Month boundaries in `[floor_month(first), ceil_month(last))`.
pub fn month_ticks(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    let last_start = month_start(last);
    let stop = if last == last_start {
        last
    } else {
        last_start
            .checked_add_months(Months::new(1))
            .unwrap_or(last)
    };

    let mut ticks = Vec::new();
    let mut cursor = month_start(first);
    while cursor < stop {
        ticks.push(cursor);
        match cursor.checked_add_months(Months::new(1)) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    ticks
}
