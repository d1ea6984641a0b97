use crate::source::install_drivers;
use sqlx::{AnyConnection, Connection};
use std::path::Path;
use url::Url;


/// Minimal `cms_content` table with the columns the content query touches
pub(crate) const CMS_SCHEMA: &str = "CREATE TABLE cms_content (\
    content_name TEXT, hierarchy_path TEXT, modified_date TEXT, type TEXT, active INTEGER)";

/// Create a SQLite database at `path`, run `statements` against it and return its URL
pub(crate) async fn seed_database(path: &Path, statements: &[&str]) -> Url {
    install_drivers();
    let url = Url::parse(&format!("sqlite://{}?mode=rwc", path.display())).unwrap();
    let mut conn = AnyConnection::connect(url.as_str()).await.unwrap();
    for statement in statements {
        sqlx::query(statement).execute(&mut conn).await.unwrap();
    }
    conn.close().await.unwrap();
    url
}
