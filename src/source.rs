use crate::config::redact_url;
use crate::error::{Error, Result};
use crate::results::ContentRow;
use futures::{Stream, TryStreamExt};
use sqlx::{AnyConnection, Connection};
use std::sync::Once;
use url::Url;

/// Active, published pages. `modified_date` is cast to text so every backend
/// hands back `YYYY-MM-DD HH:MM:SS`.
pub const CONTENT_QUERY: &str = "SELECT content_name, hierarchy_path, CAST(modified_date AS CHAR) \
     FROM cms_content WHERE type = 'content' AND active = 1";

static INSTALL_DRIVERS: Once = Once::new();

/// Register the compiled-in sqlx drivers, once per process
pub(crate) fn install_drivers() {
    INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);
}

/// Read-only view of the CMS content table over a single connection
pub struct ContentSource {
    conn: AnyConnection,
}

impl ContentSource {
    /// Open one connection to the database at `url`
    pub async fn connect(url: &Url) -> Result<Self> {
        install_drivers();

        let shown = redact_url(url);
        ::log::info!("Connecting to {}", shown);
        let conn = AnyConnection::connect(url.as_str())
            .await
            .map_err(|source| Error::Connect { url: shown, source })?;

        Ok(Self { conn })
    }

    /// Run the content query. Rows are fetched lazily; a fresh call re-runs the query.
    pub fn rows(&mut self) -> impl Stream<Item = Result<ContentRow>> + Send + '_ {
        sqlx::query_as::<_, (String, String, String)>(CONTENT_QUERY)
            .fetch(&mut self.conn)
            .map_ok(ContentRow::from)
            .map_err(Error::from_fetch)
    }

    /// Close the connection cleanly
    pub async fn close(self) -> Result<()> {
        self.conn.close().await.map_err(Error::Query)
    }
}
