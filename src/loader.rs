use std::io::{Read, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::aggregate::parse_release_date;
use crate::error::LoadError;
use crate::models::{MovieRecord, MovieRow};
use crate::revenue::{parse_revenue, parse_revenue_with, RevenueRounding};

const REQUIRED_COLUMNS: [&str; 3] = ["Movie_Name", "Release_Date", "Vote_Average"];
const REVENUE_COLUMN: &str = "Revenue";
const RAW_REVENUE_COLUMN: &str = "Revenue_$";

fn is_revenue_header(header: &str) -> bool {
    header == REVENUE_COLUMN || header == RAW_REVENUE_COLUMN
}

/// Reads movie rows from CSV. Bad cells are coerced, never rejected; only
/// structural problems (missing columns, broken CSV) are errors.
pub fn read_movies<R: Read>(
    reader: R,
    rounding: RevenueRounding,
) -> Result<Vec<MovieRecord>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(LoadError::MissingColumn(column.to_string()));
        }
    }
    if !headers.iter().any(is_revenue_header) {
        return Err(LoadError::MissingColumn(REVENUE_COLUMN.to_string()));
    }

    let mut movies = Vec::new();
    for result in reader.deserialize::<MovieRow>() {
        let row = result?;
        movies.push(movie_from_row(row, rounding));
    }

    Ok(movies)
}

pub fn movie_from_row(row: MovieRow, rounding: RevenueRounding) -> MovieRecord {
    let release_date = parse_release_date(&row.release_date);
    if release_date.is_none() {
        warn!(
            movie = %row.movie_name,
            value = %row.release_date,
            "unparseable release date, placing in undated bucket"
        );
    }

    let vote_average = match row.vote_average.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            warn!(
                movie = %row.movie_name,
                value = %row.vote_average,
                "invalid vote average, using 0"
            );
            0.0
        }
    };

    MovieRecord {
        revenue: parse_revenue_with(&row.revenue, rounding),
        name: row.movie_name,
        release_date,
        vote_average,
        poster_url: row.poster_url,
    }
}

pub async fn load_movies(
    path: &Path,
    rounding: RevenueRounding,
) -> Result<Vec<MovieRecord>, LoadError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let movies = read_movies(bytes.as_slice(), rounding)?;
    info!(path = %path.display(), count = movies.len(), "loaded movies");
    Ok(movies)
}

/// Rewrites the revenue column as whole numbers and renames `Revenue_$` to
/// `Revenue`. Other columns are copied as-is. Returns the number of data rows.
pub fn clean_revenue_column<R: Read, W: Write>(reader: R, writer: W) -> Result<usize, LoadError> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();
    let column = headers
        .iter()
        .position(is_revenue_header)
        .ok_or_else(|| LoadError::MissingColumn(REVENUE_COLUMN.to_string()))?;

    let renamed: csv::StringRecord = headers
        .iter()
        .enumerate()
        .map(|(index, header)| if index == column { REVENUE_COLUMN } else { header })
        .collect();

    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(&renamed)?;

    let mut rows = 0usize;
    for result in reader.records() {
        let record = result?;
        let cleaned: csv::StringRecord = record
            .iter()
            .enumerate()
            .map(|(index, value)| {
                if index == column {
                    parse_revenue(value).to_string()
                } else {
                    value.to_string()
                }
            })
            .collect();
        writer.write_record(&cleaned)?;
        rows += 1;
    }

    writer.flush().map_err(csv::Error::from)?;
    Ok(rows)
}

pub async fn clean_revenue_file(input: &Path, output: &Path) -> Result<usize, LoadError> {
    let bytes = tokio::fs::read(input).await.map_err(|source| LoadError::Io {
        path: input.to_path_buf(),
        source,
    })?;

    let mut cleaned = Vec::with_capacity(bytes.len());
    let rows = clean_revenue_column(bytes.as_slice(), &mut cleaned)?;

    tokio::fs::write(output, cleaned)
        .await
        .map_err(|source| LoadError::Io {
            path: output.to_path_buf(),
            source,
        })?;

    info!(
        input = %input.display(),
        output = %output.display(),
        rows,
        "cleaned revenue column"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE: &str = "\
Movie_Name,Release_Date,Vote_Average,Revenue,Poster_URL
Dune: Part Two,02/29/2024,8.3,$711.8M,https://image.tmdb.org/t/p/w500/dune.jpg
Small Film,03/01/2024,not-a-number,,
Lost Reel,someday,6.1,garbage,https://image.tmdb.org/t/p/w500/lost.jpg
";

    #[test]
    fn reads_and_coerces_rows() {
        let movies = read_movies(SAMPLE.as_bytes(), RevenueRounding::Nearest).unwrap();
        assert_eq!(movies.len(), 3);

        let dune = &movies[0];
        assert_eq!(dune.name, "Dune: Part Two");
        assert_eq!(dune.release_date, NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(dune.vote_average, 8.3);
        assert_eq!(dune.revenue, 711_800_000.0);
        assert_eq!(dune.poster_url, "https://image.tmdb.org/t/p/w500/dune.jpg");

        assert_eq!(movies[1].vote_average, 0.0);
        assert_eq!(movies[1].revenue, 0.0);
        assert_eq!(movies[1].poster_url, "");

        assert_eq!(movies[2].release_date, None);
        assert_eq!(movies[2].revenue, 0.0);
    }

    #[test]
    fn accepts_raw_revenue_header_and_missing_poster_column() {
        let csv = "Movie_Name,Release_Date,Vote_Average,Revenue_$\nA,01/05/2024,7,$2K\n";
        let movies = read_movies(csv.as_bytes(), RevenueRounding::Exact).unwrap();
        assert_eq!(movies[0].revenue, 2_000.0);
        assert_eq!(movies[0].poster_url, "");
    }

    #[test]
    fn missing_column_is_reported() {
        let csv = "Movie_Name,Vote_Average,Revenue\nA,7,1\n";
        let err = read_movies(csv.as_bytes(), RevenueRounding::Nearest).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "Release_Date"));

        let csv = "Movie_Name,Release_Date,Vote_Average\nA,01/05/2024,7\n";
        let err = read_movies(csv.as_bytes(), RevenueRounding::Nearest).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "Revenue"));
    }

    #[test]
    fn ragged_rows_are_csv_errors() {
        let csv = "Movie_Name,Release_Date,Vote_Average,Revenue\nA,01/05/2024,7,1\nB,01/05/2024\n";
        let err = read_movies(csv.as_bytes(), RevenueRounding::Nearest).unwrap_err();
        assert!(matches!(err, LoadError::Csv { .. }));
    }

    #[test]
    fn empty_file_with_headers_is_empty() {
        let csv = "Movie_Name,Release_Date,Vote_Average,Revenue\n";
        let movies = read_movies(csv.as_bytes(), RevenueRounding::Nearest).unwrap();
        assert!(movies.is_empty());
    }

    #[test]
    fn cleans_revenue_column() {
        let input = "Movie_Name,Revenue_$,Vote_Average\nA,$1.5B,7.1\nB,N/A,6.0\nC,\"1,200\",5.5\n";
        let mut output = Vec::new();

        let rows = clean_revenue_column(input.as_bytes(), &mut output).unwrap();

        assert_eq!(rows, 3);
        let text = String::from_utf8(output).unwrap();
        assert_eq!(
            text,
            "Movie_Name,Revenue,Vote_Average\nA,1500000000,7.1\nB,0,6.0\nC,1200,5.5\n"
        );
    }

    #[test]
    fn clean_requires_revenue_column() {
        let mut output = Vec::new();
        let err = clean_revenue_column("Movie_Name\nA\n".as_bytes(), &mut output).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(_)));
    }

    #[test]
    fn bundled_sample_stacks_by_week() {
        use crate::aggregate::AggregatorOptions;
        use crate::models::WeekBucket;

        let sample = include_str!("../data/sample_movies.csv");
        let movies = read_movies(sample.as_bytes(), RevenueRounding::Nearest).unwrap();
        assert_eq!(movies.len(), 10);
        assert_eq!(movies[4].revenue, 1_698_000_000.0);

        let stacked = AggregatorOptions::default().stack(&movies);
        let march_3 = WeekBucket::Week(NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
        let week: Vec<(&str, usize)> = stacked
            .iter()
            .filter(|r| r.week_bucket == march_3)
            .map(|r| (r.movie.name.as_str(), r.stack_index))
            .collect();
        assert_eq!(week, vec![("Imaginary", 0), ("Kung Fu Panda 4", 1)]);

        let last = stacked.last().unwrap();
        assert_eq!(last.movie.name, "Unreleased Cut");
        assert_eq!(last.week_bucket, WeekBucket::Undated);
    }

    #[tokio::test]
    async fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.csv");
        std::fs::write(&path, SAMPLE).unwrap();

        let movies = load_movies(&path, RevenueRounding::Nearest).await.unwrap();
        assert_eq!(movies.len(), 3);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");

        let err = load_movies(&path, RevenueRounding::Nearest).await.unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[tokio::test]
    async fn cleans_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw.csv");
        let output = dir.path().join("clean.csv");
        std::fs::write(&input, "Movie_Name,Revenue_$\nA,$3M\n").unwrap();

        let rows = clean_revenue_file(&input, &output).await.unwrap();

        assert_eq!(rows, 1);
        let text = std::fs::read_to_string(&output).unwrap();
        assert_eq!(text, "Movie_Name,Revenue\nA,3000000\n");
    }
}
