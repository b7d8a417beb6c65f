use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw CSV row as it arrives from the data file. Every cell is text so that
/// coercion happens in one place instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieRow {
    #[serde(rename = "Movie_Name", default)]
    pub movie_name: String,
    #[serde(rename = "Release_Date", default)]
    pub release_date: String,
    #[serde(rename = "Vote_Average", default)]
    pub vote_average: String,
    #[serde(rename = "Revenue", alias = "Revenue_$", default)]
    pub revenue: String,
    #[serde(rename = "Poster_URL", default)]
    pub poster_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRecord {
    pub name: String,
    pub release_date: Option<NaiveDate>,
    pub vote_average: f64,
    pub revenue: f64,
    pub poster_url: String,
}

/// Week a record is plotted in. Dated buckets order by their start date and
/// all of them sort before `Undated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum WeekBucket {
    Week(NaiveDate),
    Undated,
}

impl WeekBucket {
    pub fn start(&self) -> Option<NaiveDate> {
        match self {
            WeekBucket::Week(date) => Some(*date),
            WeekBucket::Undated => None,
        }
    }
}

impl std::fmt::Display for WeekBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeekBucket::Week(date) => write!(f, "{}", date),
            WeekBucket::Undated => write!(f, "undated"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedRecord {
    #[serde(flatten)]
    pub movie: MovieRecord,
    pub week_bucket: WeekBucket,
    pub stack_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    #[serde(flatten)]
    pub movie: MovieRecord,
    pub rank: usize,
    pub shared_across_lists: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Leaderboard {
    pub metric: Metric,
    pub entries: Vec<RankingEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekSummary {
    pub week_start: WeekBucket,
    pub movie_count: usize,
    pub total_revenue: f64,
    pub avg_vote: f64,
}

impl WeekSummary {
    pub fn value(&self, metric: WeeklyMetric) -> f64 {
        match metric {
            WeeklyMetric::Releases => self.movie_count as f64,
            WeeklyMetric::TotalRevenue => self.total_revenue,
            WeeklyMetric::AverageRating => self.avg_vote,
        }
    }
}

/// Per-movie field used to stack or rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Rating,
    Revenue,
}

impl Metric {
    pub fn key(self) -> fn(&MovieRecord) -> f64 {
        match self {
            Metric::Rating => rating,
            Metric::Revenue => revenue,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Rating => "rating",
            Metric::Revenue => "revenue",
        }
    }
}

fn rating(movie: &MovieRecord) -> f64 {
    movie.vote_average
}

fn revenue(movie: &MovieRecord) -> f64 {
    movie.revenue
}

/// Bar value for the weekly chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WeeklyMetric {
    Releases,
    #[value(name = "revenue")]
    #[serde(rename = "revenue")]
    TotalRevenue,
    #[value(name = "rating")]
    #[serde(rename = "rating")]
    AverageRating,
}
