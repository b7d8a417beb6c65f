use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use boxoffice_weeks::aggregate::{max_stack_height, month_ticks, release_extent, timeline_extent};
use boxoffice_weeks::config::{Config, Overrides, DEFAULT_CONFIG_FILE};
use boxoffice_weeks::loader;
use boxoffice_weeks::models::{Metric, MovieRecord, RankingEntry, WeeklyMetric};
use boxoffice_weeks::quiz::{self, Side};
use boxoffice_weeks::report;
use boxoffice_weeks::revenue::format_revenue;

#[derive(Parser)]
#[command(name = "boxoffice-weeks")]
#[command(about = "Weekly release stacks and leaderboards from movie CSV data", long_about = None)]
struct Cli {
    /// Config file (defaults to ./boxoffice.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Place every movie in its release week and stack it
    Timeline {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, value_enum)]
        by: Option<Metric>,
        #[arg(long)]
        descending: bool,
        #[arg(long)]
        json: bool,
    },
    /// Rank movies by one metric
    Top {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, value_enum, default_value_t = Metric::Revenue)]
        by: Metric,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Revenue and rating top lists, marking movies on both
    Leaderboard {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Per-week bar values
    Weekly {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, value_enum, default_value_t = WeeklyMetric::Releases)]
        metric: WeeklyMetric,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Rewrite the revenue column as whole numbers
    Clean {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Guess which movie of a pair scored higher
    Quiz {
        #[arg(long)]
        csv: PathBuf,
        /// 1-based number of the first round answered
        #[arg(long, default_value_t = 1)]
        round: usize,
        /// One pick per round, e.g. `--pick left,right,left`
        #[arg(long, value_enum, value_delimiter = ',', required = true)]
        pick: Vec<Side>,
    },
    /// Write a boxoffice.toml with default settings
    InitConfig,
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Ok(Config::load_default()?.unwrap_or_default()),
    }
}

fn print_ranking(title: &str, entries: &[RankingEntry]) {
    println!("{title}:");
    for entry in entries {
        let marker = if entry.shared_across_lists {
            " (on both lists)"
        } else {
            ""
        };
        println!(
            "{:>3}. {} - {}, rated {:.1}{}",
            entry.rank,
            entry.movie.name,
            format_revenue(entry.movie.revenue),
            entry.movie.vote_average,
            marker
        );
    }
}

fn describe(movie: &MovieRecord) -> String {
    match movie.release_date {
        Some(date) => format!("{} ({})", movie.name, date.format("%b. %-d, %Y")),
        None => movie.name.clone(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let mut config = match cli.command {
        Commands::InitConfig => Config::default(),
        _ => load_config(cli.config.as_deref())?,
    };
    let rounding = config.revenue.rounding;

    match cli.command {
        Commands::Timeline {
            csv,
            by,
            descending,
            json,
        } => {
            config.merge_with_args(&Overrides {
                sort_key: by,
                descending,
                limit: None,
            });
            let movies = loader::load_movies(&csv, rounding).await?;
            let stacked = config.aggregator_options().stack(&movies);
            debug!(tallest = max_stack_height(&stacked), "timeline stacked");

            if json {
                println!("{}", serde_json::to_string_pretty(&stacked)?);
                return Ok(());
            }

            if stacked.is_empty() {
                println!("No movies found in {}.", csv.display());
                return Ok(());
            }

            for record in &stacked {
                println!(
                    "{} #{} {} - rated {:.1}, {}",
                    record.week_bucket,
                    record.stack_index,
                    record.movie.name,
                    record.movie.vote_average,
                    format_revenue(record.movie.revenue)
                );
            }
            if let Some((first, last)) = timeline_extent(&stacked) {
                println!(
                    "Weeks {first} to {last}, tallest stack {}.",
                    max_stack_height(&stacked)
                );
            }
            if let Some((first, last)) = release_extent(&movies) {
                let months: Vec<String> = month_ticks(first, last)
                    .iter()
                    .map(|tick| tick.format("%b").to_string())
                    .collect();
                println!("Months: {}", months.join(" "));
            }
        }
        Commands::Top {
            csv,
            by,
            limit,
            json,
        } => {
            config.merge_with_args(&Overrides {
                limit,
                ..Overrides::default()
            });
            let movies = loader::load_movies(&csv, rounding).await?;
            let top = config.aggregator_options().top(&movies, by);

            if json {
                println!("{}", serde_json::to_string_pretty(&top)?);
            } else if top.is_empty() {
                println!("No movies found in {}.", csv.display());
            } else {
                print_ranking(&format!("Top movies by {}", by.label()), &top);
            }
        }
        Commands::Leaderboard { csv, limit, json } => {
            config.merge_with_args(&Overrides {
                limit,
                ..Overrides::default()
            });
            let movies = loader::load_movies(&csv, rounding).await?;
            let boards = config.aggregator_options().leaderboards(&movies);

            if json {
                println!("{}", serde_json::to_string_pretty(&boards)?);
                return Ok(());
            }

            for board in &boards {
                print_ranking(&format!("Top by {}", board.metric.label()), &board.entries);
                println!();
            }
        }
        Commands::Weekly { csv, metric } => {
            let movies = loader::load_movies(&csv, rounding).await?;
            let weeks = config.aggregator_options().weekly(&movies);

            if weeks.is_empty() {
                println!("No movies found in {}.", csv.display());
                return Ok(());
            }

            for week in &weeks {
                let value = week.value(metric);
                let shown = match metric {
                    WeeklyMetric::Releases => format!("{value}"),
                    WeeklyMetric::TotalRevenue => format_revenue(value),
                    WeeklyMetric::AverageRating => format!("{value:.1}"),
                };
                println!("{} {}", week.week_start, shown);
            }
        }
        Commands::Report { csv, out } => {
            let movies = loader::load_movies(&csv, rounding).await?;
            let label = csv.display().to_string();
            let report = report::build_report(&label, &movies, &config.aggregator_options());
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Clean { csv, out } => {
            let rows = loader::clean_revenue_file(&csv, &out).await?;
            println!("Cleaned {rows} rows into {}.", out.display());
        }
        Commands::Quiz { csv, round, pick } => {
            let movies = loader::load_movies(&csv, rounding).await?;
            let rounds = quiz::build_rounds(&movies);
            let Some((outcomes, tally)) = round
                .checked_sub(1)
                .and_then(|first| quiz::play(&rounds, first, &pick))
            else {
                bail!(
                    "{} picks starting at round {round} need more rounds; {} available",
                    pick.len(),
                    rounds.len()
                );
            };

            for (offset, (chosen, outcome)) in rounds[round - 1..].iter().zip(&outcomes).enumerate() {
                println!("Round {}", round + offset);
                println!("  Left:  {} rated {:.1}", describe(&chosen.left), chosen.left.vote_average);
                println!("  Right: {} rated {:.1}", describe(&chosen.right), chosen.right.vote_average);
                match (outcome.correct, outcome.winner) {
                    (_, None) => println!("  A tie. Either answer counts."),
                    (true, Some(_)) => println!("  Correct, by {:.1} points.", outcome.margin),
                    (false, Some(_)) => println!("  Not quite, off by {:.1} points.", outcome.margin),
                }
            }

            info!(answered = tally.answered, correct = tally.correct, "quiz judged");
            println!(
                "Score: {}/{} ({:.0}%)",
                tally.correct,
                tally.answered,
                tally.accuracy() * 100.0
            );
        }
        Commands::InitConfig => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.exists() {
                bail!("{DEFAULT_CONFIG_FILE} already exists; edit or remove it first");
            }
            std::fs::write(path, Config::default_toml())
                .with_context(|| format!("failed to write {DEFAULT_CONFIG_FILE}"))?;
            println!("Created {DEFAULT_CONFIG_FILE} with default settings.");
        }
    }

    Ok(())
}
