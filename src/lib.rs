// Re-export modules
pub mod args;
pub mod config;
pub mod error;
pub mod filter;
pub mod results;
pub mod sitemap;
pub mod source;
pub mod utils;

#[cfg(test)]
mod tests;

// Re-export commonly used types for convenience
pub use config::Settings;
pub use error::{Error, Result};
pub use results::ContentRow;

use filter::PathFilter;
use futures::{Stream, TryStreamExt};
use sitemap::SitemapFile;
use source::ContentSource;
use url::Url;

/// Outcome of one sitemap run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Rows written as `<url>` entries
    pub written: usize,
    /// Rows left out by a suppression pattern
    pub suppressed: usize,
}

/// Builder for one sitemap run
pub struct Generator {
    settings: Settings,
    database_url: Option<Url>,
}

impl Generator {
    /// Create a new generator from resolved settings
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            database_url: None,
        }
    }

    /// Read content from this database instead of the one named by the settings
    pub fn with_database_url(mut self, url: Url) -> Self {
        self.database_url = Some(url);
        self
    }

    /// Write the sitemap. The destination is only replaced when every row made it out.
    pub async fn generate(self) -> Result<Summary> {
        let filter = PathFilter::new(&self.settings.filters)?;

        // Open the output first so a bad destination fails before any database work
        let mut output = SitemapFile::create(&self.settings.sitemap_path, &self.settings.base_url)?;

        let url = match self.database_url {
            Some(url) => url,
            None => self.settings.database.url()?,
        };
        let mut source = ContentSource::connect(&url).await?;

        let summary = write_entries(source.rows(), &filter, &mut output).await?;
        source.close().await?;
        output.commit()?;

        ::log::info!(
            "Sitemap complete - {} entries written, {} suppressed",
            summary.written,
            summary.suppressed
        );
        Ok(summary)
    }
}

/// Drain `rows` into the sitemap, one row at a time, skipping suppressed paths
pub async fn write_entries<S>(
    rows: S,
    filter: &PathFilter,
    output: &mut SitemapFile,
) -> Result<Summary>
where
    S: Stream<Item = Result<ContentRow>>,
{
    let mut rows = std::pin::pin!(rows);
    let mut summary = Summary::default();

    while let Some(row) = rows.try_next().await? {
        if filter.is_suppressed(&row.path) {
            ::log::debug!("Suppressed {}", row.path);
            summary.suppressed += 1;
            continue;
        }
        ::log::debug!("Adding {} ({})", row.path, row.title);
        output.add(&row)?;
        summary.written += 1;
    }

    Ok(summary)
}
