// etcd-dump/src/config/mod.rs
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::errors::{AppError, Result};

pub const DEFAULT_ETCD_URL: &str = "http://0.0.0.0:2379";
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Backup file
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// etcd url, e.g. https://0.0.0.0:2379
    #[arg(short, long, global = true, env = "ETCD_DUMP_ENDPOINT")]
    pub etcd: Option<String>,

    /// Optional JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verify the store's TLS certificate (off by default)
    #[arg(long, global = true)]
    pub verify_tls: bool,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Max parallel requests (restore only)
    #[arg(short, long, global = true)]
    pub concurrency: Option<usize>,
}

// Structs for deserializing the optional config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawJsonConfig {
    pub etcd_url: Option<String>,
    pub concurrency: Option<usize>,
    pub verify_tls: Option<bool>,
    pub timeout_secs: Option<u64>,
}

impl RawJsonConfig {
    pub fn load_from_json(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .map_err(|e| AppError::filesystem(config_path, e))?;
        serde_json::from_str(&config_content).map_err(|source| AppError::Parse {
            path: config_path.to_path_buf(),
            source,
        })
    }
}

// Application's internal configuration structs
#[derive(Debug, Clone)]
pub struct EtcdConfig {
    pub url: Url,
    pub verify_tls: bool,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct DumpConfig {
    pub file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct RestoreConfig {
    pub file: PathBuf,
    pub concurrency: NonZeroUsize,
}

#[derive(Debug, Clone)]
pub enum OperationConfig {
    Dump(DumpConfig),
    Restore(RestoreConfig),
}

/// Which subcommand the configuration is being resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Dump,
    Restore { concurrency: Option<usize> },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub etcd: EtcdConfig,
    pub operation: OperationConfig,
}

impl AppConfig {
    /// Resolves flags, environment and the optional config file, in that
    /// order of precedence. A missing `--file` is rejected before the config
    /// file is read.
    pub fn resolve(args: &GlobalArgs, operation: Operation) -> Result<Self> {
        let file = require_file(args)?;

        let raw = match &args.config {
            Some(path) => {
                debug!(path = %path.display(), "loading config file");
                RawJsonConfig::load_from_json(path)?
            }
            None => RawJsonConfig::default(),
        };

        let etcd = load_etcd_config(args, &raw)?;
        let operation = match operation {
            Operation::Dump => OperationConfig::Dump(DumpConfig { file }),
            Operation::Restore { concurrency } => OperationConfig::Restore(RestoreConfig {
                file,
                concurrency: resolve_concurrency(concurrency, &raw)?,
            }),
        };

        Ok(AppConfig { etcd, operation })
    }
}

fn require_file(args: &GlobalArgs) -> Result<PathBuf> {
    match &args.file {
        Some(file) if !file.as_os_str().is_empty() => Ok(file.clone()),
        _ => Err(AppError::Usage("missing --file option".to_string())),
    }
}

pub fn load_etcd_config(args: &GlobalArgs, raw: &RawJsonConfig) -> Result<EtcdConfig> {
    let url_str = args
        .etcd
        .as_deref()
        .or(raw.etcd_url.as_deref())
        .unwrap_or(DEFAULT_ETCD_URL);
    let url = Url::parse(url_str.trim())?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::Config(format!(
            "etcd url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    let timeout_secs = args.timeout.or(raw.timeout_secs);
    if timeout_secs == Some(0) {
        return Err(AppError::Config("timeout must be at least 1 second".to_string()));
    }

    Ok(EtcdConfig {
        url,
        verify_tls: args.verify_tls || raw.verify_tls.unwrap_or(false),
        timeout: timeout_secs.map(Duration::from_secs),
    })
}

fn resolve_concurrency(flag: Option<usize>, raw: &RawJsonConfig) -> Result<NonZeroUsize> {
    let concurrency = flag.or(raw.concurrency).unwrap_or(DEFAULT_CONCURRENCY);
    NonZeroUsize::new(concurrency)
        .ok_or_else(|| AppError::Config("concurrency must be at least 1".to_string()))
}
