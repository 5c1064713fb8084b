use std::path::PathBuf;

use anyhow::{Context, bail};

pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

/// Server settings, read from `ROOMRES_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub catalog_path: PathBuf,
    pub metrics_port: Option<u16>,
    pub compact_threshold: u64,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind = lookup("ROOMRES_BIND").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(&lookup, "ROOMRES_PORT", 8000u16)?;
        let data_dir = PathBuf::from(lookup("ROOMRES_DATA_DIR").unwrap_or_else(|| "./data".into()));
        let catalog_path =
            PathBuf::from(lookup("ROOMRES_CATALOG").unwrap_or_else(|| "./catalog.json".into()));
        let metrics_port = lookup("ROOMRES_METRICS_PORT")
            .map(|s| s.parse::<u16>().with_context(|| format!("ROOMRES_METRICS_PORT: invalid port {s:?}")))
            .transpose()?;
        let compact_threshold = parse_or(&lookup, "ROOMRES_COMPACT_THRESHOLD", 1000u64)?;
        if compact_threshold == 0 {
            bail!("ROOMRES_COMPACT_THRESHOLD must be positive");
        }

        let allowed_origins = lookup("ROOMRES_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.into())
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            bind,
            port,
            data_dir,
            catalog_path,
            metrics_port,
            compact_threshold,
            allowed_origins,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn wal_path(&self) -> PathBuf {
        self.data_dir.join("reservations.wal")
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key}: cannot parse {raw:?}")),
        None => Ok(default),
    }
}
