use crate::error::{Error, Result};
use regex::Regex;

/// Suppression patterns that keep content paths out of the sitemap
#[derive(Debug)]
pub struct PathFilter {
    exclude_regexes: Vec<Regex>,
}

impl PathFilter {
    /// Compile one matcher per pattern, in order
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut exclude_regexes = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let regex = Regex::new(pattern).map_err(|source| Error::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
            exclude_regexes.push(regex);
        }

        Ok(Self { exclude_regexes })
    }

    /// True if any pattern matches the path
    pub fn is_suppressed(&self, path: &str) -> bool {
        self.exclude_regexes.iter().any(|regex| regex.is_match(path))
    }
}
