use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV{}: {source}", .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Csv {
        line: Option<u64>,
        #[source]
        source: csv::Error,
    },

    #[error("missing required column `{0}`")]
    MissingColumn(String),
}

impl From<csv::Error> for LoadError {
    fn from(source: csv::Error) -> Self {
        let line = source.position().map(|position| position.line());
        LoadError::Csv { line, source }
    }
}
