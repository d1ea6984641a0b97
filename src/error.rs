use std::path::PathBuf;

/// Everything that can stop a sitemap run. None of these are recoverable.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file missing, unreadable or not valid INI
    #[error("cannot read configuration file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    /// A required setting resolved to an empty value
    #[error("missing required setting: {0}")]
    MissingSetting(&'static str),

    /// A suppression pattern failed to compile
    #[error("invalid filter pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Database host or credentials could not be turned into a URL
    #[error("invalid database location: {0}")]
    InvalidDatabaseUrl(#[from] url::ParseError),

    /// The database could not be reached or refused the credentials
    #[error("cannot connect to database {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    /// The content query failed at the store
    #[error("content query failed: {0}")]
    Query(#[source] sqlx::Error),

    /// A fetched row did not have the expected shape
    #[error("cannot decode content row: {0}")]
    Row(#[source] sqlx::Error),

    /// The sitemap file could not be created, written or moved into place
    #[error("cannot write sitemap {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Sort an error raised while streaming query results into a query or row failure.
    pub(crate) fn from_fetch(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. } => Error::Row(err),
            other => Error::Query(other),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
