use std::fmt::Write;

use crate::aggregate::{release_extent, shared_titles, AggregatorOptions};
use crate::models::{Metric, MovieRecord, RankingEntry, WeekBucket};
use crate::revenue::format_revenue;

fn write_ranking(output: &mut String, entries: &[RankingEntry]) {
    if entries.is_empty() {
        let _ = writeln!(output, "No movies loaded.");
        return;
    }

    for entry in entries {
        let marker = if entry.shared_across_lists { " *" } else { "" };
        let _ = writeln!(
            output,
            "{}. {} ({}, rated {:.1}){}",
            entry.rank,
            entry.movie.name,
            format_revenue(entry.movie.revenue),
            entry.movie.vote_average,
            marker
        );
    }
}

pub fn build_report(
    source_label: &str,
    records: &[MovieRecord],
    options: &AggregatorOptions,
) -> String {
    let weeks = options.weekly(records);
    let boards = options.leaderboards(records);
    let by_revenue = boards
        .iter()
        .find(|board| board.metric == Metric::Revenue)
        .map(|board| board.entries.as_slice())
        .unwrap_or_default();
    let by_rating = boards
        .iter()
        .find(|board| board.metric == Metric::Rating)
        .map(|board| board.entries.as_slice())
        .unwrap_or_default();

    let mut output = String::new();

    let _ = writeln!(output, "# Box Office Weeks");
    match release_extent(records) {
        Some((first, last)) => {
            let _ = writeln!(
                output,
                "Generated from {} ({} movies released {} to {})",
                source_label,
                records.len(),
                first,
                last
            );
        }
        None => {
            let _ = writeln!(
                output,
                "Generated from {} ({} movies)",
                source_label,
                records.len()
            );
        }
    }
    let undated = records
        .iter()
        .filter(|movie| movie.release_date.is_none())
        .count();
    let _ = writeln!(output, "Undated movies: {}", undated);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Weekly Releases");

    if weeks.is_empty() {
        let _ = writeln!(output, "No movies loaded.");
    } else {
        for week in weeks.iter() {
            let label = match week.week_start {
                WeekBucket::Week(start) => format!("Week of {}", start),
                WeekBucket::Undated => "Undated".to_string(),
            };
            let _ = writeln!(
                output,
                "- {}: {} releases, {} total, avg rating {:.1}",
                label,
                week.movie_count,
                format_revenue(week.total_revenue),
                week.avg_vote
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top by Revenue");
    write_ranking(&mut output, by_revenue);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top by Rating");
    write_ranking(&mut output, by_rating);

    let shared = shared_titles(by_revenue, by_rating);
    let _ = writeln!(output);
    let _ = writeln!(output, "## On Both Lists");

    if shared.is_empty() {
        let _ = writeln!(output, "No movie made both lists.");
    } else {
        for name in shared.iter() {
            let _ = writeln!(output, "- {}", name);
        }
    }

    output
}
