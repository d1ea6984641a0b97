use regex::{Captures, Regex};
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]*)\}|\$([A-Za-z0-9_]+)").expect("variable pattern is valid")
});

/// Replace `$VAR` and `${VAR}` with values from `lookup`; unknown variables become empty.
pub fn expand_vars<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ENV_VAR
        .replace_all(input, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str());
            lookup(name).unwrap_or_default()
        })
        .into_owned()
}

/// Expand variables against the process environment
pub fn expand_env(input: &str) -> String {
    expand_vars(input, |name| std::env::var(name).ok())
}

/// Strip every trailing `/` from a base URL
pub fn trim_trailing_slashes(url: &str) -> &str {
    url.trim_end_matches('/')
}

/// Strip every leading `/` from a content path
pub fn trim_leading_slashes(path: &str) -> &str {
    path.trim_start_matches('/')
}
