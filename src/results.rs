/// One published content item as stored by the CMS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRow {
    /// Title of the page
    pub title: String,

    /// Hierarchy path of the page, relative to the site root
    pub path: String,

    /// Last modification time, `YYYY-MM-DD HH:MM:SS`
    pub modified: String,
}

impl ContentRow {
    /// Create a new content row
    pub fn new(
        title: impl Into<String>,
        path: impl Into<String>,
        modified: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
            modified: modified.into(),
        }
    }
}

impl From<(String, String, String)> for ContentRow {
    fn from((title, path, modified): (String, String, String)) -> Self {
        Self {
            title,
            path,
            modified,
        }
    }
}
