use crate::error::{Error, Result};
use crate::results::ContentRow;
use crate::utils::{trim_leading_slashes, trim_trailing_slashes};
use quick_xml::escape::escape;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;

pub const XML_PROLOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

pub const URLSET_OPEN: &str = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://www.sitemaps.org/schemas/sitemap/0.9 http://www.sitemaps.org/schemas/sitemap/0.9/sitemap.xsd">"#;

pub const URLSET_CLOSE: &str = "</urlset>";

pub const CHANGE_FREQUENCY: &str = "daily";

/// Absolute location of a content path: exactly one `/` between base and path
pub fn location(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        trim_trailing_slashes(base_url),
        trim_leading_slashes(path)
    )
}

/// Number of `/` separators below the site root.
///
/// Leading separators are not counted: `/` is depth 0 and `/private/x` is depth 1.
pub fn depth(path: &str) -> usize {
    trim_leading_slashes(path).matches('/').count()
}

/// `1 / (depth + 1)` with two decimals
pub fn priority(path: &str) -> String {
    let value = 1.0 / (depth(path) + 1) as f32;
    format!("{value:.2}")
}

/// `2015-01-07 01:32:39` becomes `2015-01-07T01:32:39+00:00`.
///
/// The stored time is taken to be UTC already; nothing is converted.
pub fn lastmod(modified: &str) -> String {
    match modified.rsplit_once(' ') {
        Some((date, time)) if !date.is_empty() && !time.is_empty() => {
            format!("{date}T{time}+00:00")
        }
        _ => {
            ::log::warn!("Unexpected modification date {:?}, emitted as is", modified);
            modified.to_string()
        }
    }
}

/// Render one `<url>` block, newline terminated
pub fn format_entry(base_url: &str, row: &ContentRow) -> String {
    format!(
        " <url>\n   <loc>{}</loc>\n   <lastmod>{}</lastmod>\n   <changefreq>{}</changefreq>\n   <priority>{}</priority>\n </url>\n",
        escape(location(base_url, &row.path).as_str()),
        escape(lastmod(&row.modified).as_str()),
        CHANGE_FREQUENCY,
        priority(&row.path),
    )
}

/// Serializes a sitemap document into any writer.
///
/// The envelope is written on creation; `finish` closes it and hands the writer back.
pub struct SitemapDocument<W: Write> {
    out: W,
    base_url: String,
}

impl<W: Write> SitemapDocument<W> {
    pub fn new(mut out: W, base_url: impl Into<String>) -> std::io::Result<Self> {
        writeln!(out, "{XML_PROLOG}")?;
        writeln!(out, "{URLSET_OPEN}")?;
        Ok(Self {
            out,
            base_url: base_url.into(),
        })
    }

    /// Append one `<url>` entry for the row
    pub fn add(&mut self, row: &ContentRow) -> std::io::Result<()> {
        self.out
            .write_all(format_entry(&self.base_url, row).as_bytes())
    }

    pub fn finish(mut self) -> std::io::Result<W> {
        writeln!(self.out, "{URLSET_CLOSE}")?;
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Sitemap written beside its destination and moved into place on `commit`.
///
/// Dropping it without committing removes the temporary file and leaves the
/// destination as it was.
pub struct SitemapFile {
    path: PathBuf,
    document: SitemapDocument<BufWriter<NamedTempFile>>,
}

impl SitemapFile {
    /// Create the temporary file and write the document envelope
    pub fn create(path: impl Into<PathBuf>, base_url: &str) -> Result<Self> {
        let path = path.into();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let output_error = |source| Error::Output {
            path: path.clone(),
            source,
        };

        let temp = NamedTempFile::new_in(&dir).map_err(output_error)?;
        ::log::debug!("Writing sitemap through {}", temp.path().display());
        let document =
            SitemapDocument::new(BufWriter::new(temp), base_url).map_err(output_error)?;

        Ok(Self { path, document })
    }

    /// Append one entry
    pub fn add(&mut self, row: &ContentRow) -> Result<()> {
        self.document.add(row).map_err(|source| Error::Output {
            path: self.path.clone(),
            source,
        })
    }

    /// Close the document and atomically replace the destination
    pub fn commit(self) -> Result<()> {
        let Self { path, document } = self;
        let output_error = |source| Error::Output {
            path: path.clone(),
            source,
        };

        let temp = document
            .finish()
            .map_err(output_error)?
            .into_inner()
            .map_err(|err| output_error(err.into_error()))?;
        temp.as_file().sync_all().map_err(output_error)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(temp.path(), std::fs::Permissions::from_mode(0o644))
                .map_err(output_error)?;
        }

        temp.persist(&path)
            .map_err(|err| output_error(err.error))?;
        ::log::info!("Sitemap written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(base_url: &str, rows: &[ContentRow]) -> String {
        let mut document = SitemapDocument::new(Vec::new(), base_url).unwrap();
        for row in rows {
            document.add(row).unwrap();
        }
        String::from_utf8(document.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_priority_by_depth() {
        assert_eq!(priority("foo"), "1.00");
        assert_eq!(priority("foo/bar"), "0.50");
        assert_eq!(priority("foo/bar/baz"), "0.33");
        assert_eq!(priority("a/b/c/d"), "0.25");

        // The root and leading separators do not add depth
        assert_eq!(priority("/"), "1.00");
        assert_eq!(priority("/foo/bar"), "0.50");
        assert_eq!(depth("/"), 0);
        assert_eq!(depth("/private/x"), 1);
        assert_eq!(depth("//private/x"), 1);
    }

    #[test]
    fn test_location_has_one_separator() {
        let expected = "http://example.com/news/today";
        assert_eq!(location("http://example.com", "news/today"), expected);
        assert_eq!(location("http://example.com/", "news/today"), expected);
        assert_eq!(location("http://example.com//", "/news/today"), expected);
        assert_eq!(location("http://example.com", "/"), "http://example.com/");
    }

    #[test]
    fn test_lastmod() {
        assert_eq!(lastmod("2015-01-07 01:32:39"), "2015-01-07T01:32:39+00:00");

        // No calendar validation
        assert_eq!(lastmod("2015-13-45 99:99:99"), "2015-13-45T99:99:99+00:00");

        // Nothing to split on
        assert_eq!(lastmod("2015-01-07"), "2015-01-07");
    }

    #[test]
    fn test_format_entry() {
        let row = ContentRow::new("About", "about/team", "2020-05-01 12:00:00");
        assert_eq!(
            format_entry("http://example.com/", &row),
            " <url>\n   <loc>http://example.com/about/team</loc>\n   <lastmod>2020-05-01T12:00:00+00:00</lastmod>\n   <changefreq>daily</changefreq>\n   <priority>0.50</priority>\n </url>\n"
        );
    }

    #[test]
    fn test_entry_is_escaped() {
        let row = ContentRow::new("Q&A", "faq?a=1&b=2", "2020-05-01 12:00:00");
        let entry = format_entry("http://example.com", &row);
        assert!(entry.contains("<loc>http://example.com/faq?a=1&amp;b=2</loc>"));
    }

    #[test]
    fn test_document_envelope() {
        let xml = render("http://example.com", &[]);
        let lines: Vec<&str> = xml.lines().collect();
        assert_eq!(lines, vec![XML_PROLOG, URLSET_OPEN, URLSET_CLOSE]);

        let rows = [
            ContentRow::new("Home", "home", "2020-01-01 00:00:00"),
            ContentRow::new("News", "home/news", "2020-01-02 00:00:00"),
        ];
        let xml = render("http://example.com", &rows);
        assert!(xml.starts_with(XML_PROLOG));
        assert!(xml.ends_with("</urlset>\n"));
        assert_eq!(xml.matches("<url>").count(), 2);
        let home = xml.find("<loc>http://example.com/home</loc>").unwrap();
        let news = xml.find("<loc>http://example.com/home/news</loc>").unwrap();
        assert!(home < news, "entries keep row order");
    }

    #[test]
    fn test_file_commit_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("sitemap.xml");
        std::fs::write(&dest, "old").unwrap();

        let mut file = SitemapFile::create(&dest, "http://example.com").unwrap();
        file.add(&ContentRow::new("Home", "home", "2020-01-01 00:00:00"))
            .unwrap();

        // Destination untouched until commit
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "old");

        file.commit().unwrap();
        let xml = std::fs::read_to_string(&dest).unwrap();
        assert!(xml.contains("<loc>http://example.com/home</loc>"));

        // Only the sitemap is left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_file_dropped_without_commit() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("sitemap.xml");

        let file = SitemapFile::create(&dest, "http://example.com").unwrap();
        drop(file);

        assert!(!dest.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_file_in_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing").join("sitemap.xml");

        match SitemapFile::create(&dest, "http://example.com") {
            Err(Error::Output { path, .. }) => assert_eq!(path, dest),
            Err(other) => panic!("expected Output error, got {other:?}"),
            Ok(_) => panic!("creating a sitemap in a missing directory should fail"),
        }
    }
}
