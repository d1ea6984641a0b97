use clap::Parser;
use std::ffi::{OsStr, OsString};

/// Output path used when the flag is not given
pub const DEFAULT_SITEMAP_PATH: &str = "./sitemap.xml";

/// Configuration file used when the flag is not given
pub const DEFAULT_CONFIG_FILE: &str = "$HOME/.sitemapms.ini";

/// Flags that may be written with a single dash, Go style (`-db cms`)
const LONG_FLAGS: &[&str] = &[
    "ini", "db", "user", "password", "host", "url", "path", "help", "version",
];

const AFTER_HELP: &str = "\
The command line options overrule the configuration file settings: the file is \
loaded first and the command line arguments are applied on top.

Example configuration file:

  ; SiteMapMS Config file
  [Database]
    Database = cms_db
    User     = mabuse
    Password = fkhdb4322rb
  [Site]
    BaseUrl     = http://www.mysite.com
    SiteMapPath = /var/www/sitemap.xml
    Filter      = ^/doc/.*
    Filter      = ^/stats.*";

/// Values given on the command line. Empty strings mean "not given".
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "sitemapms")]
#[command(about = "Sitemap generator that reads the pages straight out of the CMS database")]
#[command(
    long_about = "Sitemap generator for CMS Made Simple sites. It does not crawl the website, \
it reads the pages and their modification dates straight out of the CMS database, so it is \
fast, invisible to analytics tools and well suited to run as a cron job."
)]
#[command(after_help = AFTER_HELP)]
#[command(version)]
pub struct Overrides {
    /// The configuration file to read parameters from
    #[arg(long = "ini", value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: String,

    /// The database name to connect to
    #[arg(long = "db", value_name = "NAME")]
    pub database: Option<String>,

    /// The database user for the connection
    #[arg(long)]
    pub user: Option<String>,

    /// The database user's password
    #[arg(long)]
    pub password: Option<String>,

    /// The database host, optionally with :port
    #[arg(long)]
    pub host: Option<String>,

    /// The base URL of the website (e.g. http://www.example.com)
    #[arg(long = "url", value_name = "URL")]
    pub base_url: Option<String>,

    /// The full path of the sitemap file (e.g. /var/www/sitemap.xml)
    #[arg(long = "path", value_name = "FILE", default_value = DEFAULT_SITEMAP_PATH)]
    pub sitemap_path: String,
}

impl Default for Overrides {
    fn default() -> Self {
        Self {
            config_file: DEFAULT_CONFIG_FILE.to_string(),
            database: None,
            user: None,
            password: None,
            host: None,
            base_url: None,
            sitemap_path: DEFAULT_SITEMAP_PATH.to_string(),
        }
    }
}

impl Overrides {
    /// Parse a raw argument list (program name first) without touching global state
    pub fn try_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_flags(args))
    }
}

/// Rewrite Go-style `-flag` / `-flag=value` into `--flag` for the known flags only.
///
/// A value given as the next argument is joined as `--flag=value`, so a value
/// that starts with `-` is still taken as the value, as Go's `flag` package does.
pub fn normalize_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut normalized: Vec<OsString> = args.next().into_iter().collect();

    while let Some(arg) = args.next() {
        let Some(rest) = known_flag(&arg) else {
            normalized.push(arg);
            continue;
        };
        let mut flag = OsString::from(format!("--{rest}"));
        let takes_value =
            !rest.contains('=') && !matches!(rest.as_str(), "help" | "version");
        if takes_value {
            if let Some(value) = args.next() {
                flag.push("=");
                flag.push(value);
            }
        }
        normalized.push(flag);
    }

    normalized
}

/// The flag text after its dashes, when `arg` names one of the known flags
fn known_flag(arg: &OsStr) -> Option<String> {
    let text = arg.to_str()?;
    let rest = text.strip_prefix('-')?;
    let rest = rest.strip_prefix('-').unwrap_or(rest);
    let name = rest.split_once('=').map_or(rest, |(name, _)| name);
    LONG_FLAGS.contains(&name).then(|| rest.to_string())
}
