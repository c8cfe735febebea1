//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{num::NonZeroU32, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

pub use cli::{CliArgs, Command, Overrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "sleekblog";
const ENV_PREFIX: &str = "SLEEKBLOG";
const DEFAULT_CMS_ORIGIN: &str = "http://localhost:1337";
const DEFAULT_API_PREFIX: &str = "/api";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PLACEHOLDER_IMAGE: &str = "/placeholder.svg";
const DEFAULT_DEBOUNCE_MS: u64 = 300;
const DEFAULT_CORPUS_LIMIT: u64 = 100;
const DEFAULT_HOME_LIMIT: u64 = 9;
const DEFAULT_PAGE_LIMIT: u64 = 10;

#[derive(Debug, Clone)]
pub struct Settings {
    pub cms: CmsSettings,
    pub logging: LoggingSettings,
    pub cache: CacheSettings,
    pub search: SearchSettings,
    pub listing: ListingSettings,
}

#[derive(Debug, Clone)]
pub struct CmsSettings {
    pub origin: Url,
    pub api_prefix: String,
    pub timeout: Duration,
    pub placeholder_image: String,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone, Default)]
pub struct CacheSettings {
    pub stale_after: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub debounce: Duration,
    pub corpus_limit: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct ListingSettings {
    pub home_limit: NonZeroU32,
    pub page_limit: NonZeroU32,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    cms: RawCmsSettings,
    logging: RawLoggingSettings,
    cache: RawCacheSettings,
    search: RawSearchSettings,
    listing: RawListingSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(origin) = overrides.cms_origin.as_ref() {
            self.cms.origin = Some(origin.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            cms,
            logging,
            cache,
            search,
            listing,
        } = raw;

        Ok(Self {
            cms: build_cms_settings(cms)?,
            logging: build_logging_settings(logging)?,
            cache: build_cache_settings(cache)?,
            search: build_search_settings(search)?,
            listing: build_listing_settings(listing)?,
        })
    }
}

fn build_cms_settings(cms: RawCmsSettings) -> Result<CmsSettings, LoadError> {
    let origin_raw = cms
        .origin
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_CMS_ORIGIN.to_string());
    let origin = Url::parse(&origin_raw)
        .map_err(|err| LoadError::invalid("cms.origin", format!("`{origin_raw}`: {err}")))?;
    if !matches!(origin.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "cms.origin",
            format!("unsupported scheme `{}`", origin.scheme()),
        ));
    }

    let api_prefix = cms
        .api_prefix
        .unwrap_or_else(|| DEFAULT_API_PREFIX.to_string());

    let timeout_secs = cms.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "cms.timeout_seconds",
            "must be greater than zero",
        ));
    }

    let placeholder_image = cms
        .placeholder_image
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PLACEHOLDER_IMAGE.to_string());

    Ok(CmsSettings {
        origin,
        api_prefix,
        timeout: Duration::from_secs(timeout_secs),
        placeholder_image,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let stale_after = match cache.stale_after_secs {
        Some(0) => {
            return Err(LoadError::invalid(
                "cache.stale_after_secs",
                "must be greater than zero when set",
            ));
        }
        Some(secs) => Some(Duration::from_secs(secs)),
        None => None,
    };
    Ok(CacheSettings { stale_after })
}

fn build_search_settings(search: RawSearchSettings) -> Result<SearchSettings, LoadError> {
    let debounce_ms = search.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS);
    if debounce_ms == 0 {
        return Err(LoadError::invalid(
            "search.debounce_ms",
            "must be greater than zero",
        ));
    }
    let corpus_limit = non_zero_u32(
        search.corpus_limit.unwrap_or(DEFAULT_CORPUS_LIMIT),
        "search.corpus_limit",
    )?;

    Ok(SearchSettings {
        debounce: Duration::from_millis(debounce_ms),
        corpus_limit,
    })
}

fn build_listing_settings(listing: RawListingSettings) -> Result<ListingSettings, LoadError> {
    Ok(ListingSettings {
        home_limit: non_zero_u32(
            listing.home_limit.unwrap_or(DEFAULT_HOME_LIMIT),
            "listing.home_limit",
        )?,
        page_limit: non_zero_u32(
            listing.page_limit.unwrap_or(DEFAULT_PAGE_LIMIT),
            "listing.page_limit",
        )?,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCmsSettings {
    origin: Option<String>,
    api_prefix: Option<String>,
    timeout_seconds: Option<u64>,
    placeholder_image: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    stale_after_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSearchSettings {
    debounce_ms: Option<u64>,
    corpus_limit: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawListingSettings {
    home_limit: Option<u64>,
    page_limit: Option<u64>,
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}
