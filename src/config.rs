use crate::args::{DEFAULT_SITEMAP_PATH, Overrides};
use crate::error::{Error, Result};
use crate::utils::expand_env;
use ini::{Ini, ParseOption, Properties};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Host used when neither the file nor the command line names one
pub const DEFAULT_HOST: &str = "localhost";

/// Database section of the configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub database: String,
    pub user: String,
    pub password: String,
    pub host: String,
}

/// Site section of the configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteConfig {
    pub base_url: String,
    pub sitemap_path: String,
    /// Any path matching one of these is left out of the sitemap
    pub filters: Vec<String>,
}

/// Values as written in the INI file, before command-line overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub database: DatabaseConfig,
    pub site: SiteConfig,
}

impl FileConfig {
    /// Load configuration from an INI file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let ini = Ini::load_from_file_opt(path, parse_option()).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_ini(&ini))
    }

    /// Load configuration from INI text; `origin` only names the source in errors
    pub fn parse(contents: &str, origin: impl Into<PathBuf>) -> Result<Self> {
        let ini = Ini::load_from_str_opt(contents, parse_option()).map_err(|err| Error::Config {
            path: origin.into(),
            source: ini::Error::Parse(err),
        })?;
        Ok(Self::from_ini(&ini))
    }

    fn from_ini(ini: &Ini) -> Self {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("Database")) {
            config.database = DatabaseConfig {
                database: last_value(section, "Database"),
                user: last_value(section, "User"),
                password: last_value(section, "Password"),
                host: last_value(section, "Host"),
            };
        }

        if let Some(section) = ini.section(Some("Site")) {
            config.site = SiteConfig {
                base_url: last_value(section, "BaseUrl"),
                sitemap_path: last_value(section, "SiteMapPath"),
                filters: section.get_all("Filter").map(clean_value).collect(),
            };
        }

        config
    }
}

/// Backslashes must reach the regex compiler untouched; quotes are handled by `clean_value`
fn parse_option() -> ParseOption {
    ParseOption {
        enabled_escape: false,
        enabled_quote: false,
        ..ParseOption::default()
    }
}

fn last_value(section: &Properties, key: &str) -> String {
    section
        .get_all(key)
        .last()
        .map(clean_value)
        .unwrap_or_default()
}

/// Drop a trailing `;` or `#` comment and the double quotes around any
/// quoted run. Comment characters inside quotes are kept.
fn clean_value(raw: &str) -> String {
    let mut value = String::with_capacity(raw.len());
    let mut quoted = false;
    for ch in raw.chars() {
        match ch {
            '"' => quoted = !quoted,
            ';' | '#' if !quoted => break,
            _ => value.push(ch),
        }
    }
    value.trim().to_string()
}

/// Resolved database credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub name: String,
    pub user: String,
    pub password: String,
    pub host: String,
}

impl DatabaseSettings {
    /// Connection URL for the MySQL server holding the CMS tables
    pub fn url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!("mysql://{}", self.host))?;
        url.set_username(&self.user)
            .map_err(|_| url::ParseError::EmptyHost)?;
        url.set_password(Some(&self.password))
            .map_err(|_| url::ParseError::EmptyHost)?;
        url.set_path(&self.name);
        Ok(url)
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub config_file: PathBuf,
    pub database: DatabaseSettings,
    pub base_url: String,
    pub sitemap_path: PathBuf,
    pub filters: Vec<String>,
}

impl Settings {
    /// Read the configuration file named by the overrides and apply the overrides on top
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let config_file = PathBuf::from(expand_env(&overrides.config_file));
        ::log::info!("Reading configuration from {}", config_file.display());
        let file = FileConfig::from_file(&config_file)?;
        Self::resolve(config_file, file, overrides)
    }

    /// Merge file values with command-line values; flags win when they were given
    pub fn resolve(config_file: PathBuf, file: FileConfig, overrides: &Overrides) -> Result<Self> {
        let FileConfig { database, site } = file;

        let pick = |flag: &Option<String>, from_file: String| match flag {
            Some(value) if !value.is_empty() => value.clone(),
            _ => from_file,
        };

        let host = pick(&overrides.host, database.host);
        let database = DatabaseSettings {
            name: pick(&overrides.database, database.database),
            user: pick(&overrides.user, database.user),
            password: pick(&overrides.password, database.password),
            host: if host.is_empty() {
                DEFAULT_HOST.to_string()
            } else {
                host
            },
        };

        let base_url = pick(&overrides.base_url, site.base_url);

        let sitemap_path =
            if overrides.sitemap_path != DEFAULT_SITEMAP_PATH || site.sitemap_path.is_empty() {
                overrides.sitemap_path.clone()
            } else {
                site.sitemap_path
            };
        let sitemap_path = PathBuf::from(expand_env(&sitemap_path));

        let settings = Self {
            config_file,
            database,
            base_url,
            sitemap_path,
            filters: site.filters,
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.database.name.is_empty() {
            return Err(Error::MissingSetting("Database"));
        }
        if self.database.user.is_empty() {
            return Err(Error::MissingSetting("User"));
        }
        if self.database.password.is_empty() {
            return Err(Error::MissingSetting("Password"));
        }
        if self.sitemap_path.as_os_str().is_empty() {
            return Err(Error::MissingSetting("SiteMapPath"));
        }
        if self.base_url.is_empty() {
            ::log::warn!("BaseUrl is empty, sitemap locations will be relative");
        }
        Ok(())
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ConfigFile: {}", self.config_file.display())?;
        writeln!(f, "Database: {}", self.database.name)?;
        writeln!(f, "Host: {}", self.database.host)?;
        writeln!(f, "User: {}", self.database.user)?;
        writeln!(f, "Password: ***")?;
        writeln!(f, "BaseUrl: {}", self.base_url)?;
        writeln!(f, "SiteMapPath: {}", self.sitemap_path.display())?;
        write!(f, "Filters: {:?}", self.filters)
    }
}

/// Render a database URL for logs and errors with the password hidden
pub fn redact_url(url: &Url) -> String {
    let mut shown = url.clone();
    if shown.password().is_some() {
        let _ = shown.set_password(Some("***"));
    }
    shown.to_string()
}
