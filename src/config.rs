//! Configuration types for multilookup.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `MULTILOOKUP_*` environment variables, then command-line flags.

use crate::base::neterror::NetError;
use crate::dns::{DnsResolverWithOverrides, GaiResolver, HickoryResolver, Resolve};
use crate::pipeline::{DEFAULT_CONSUMER_THREADS, DEFAULT_QUEUE_CAPACITY};
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Prefix of the environment variables read by [`Config::load`].
pub const ENV_PREFIX: &str = "MULTILOOKUP";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub resolver: ResolverConfig,
    pub telemetry: TelemetryConfig,
}

/// Pipeline sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of consumer (resolver) threads.
    pub threads: usize,

    /// Maximum number of hostnames waiting between producers and consumers.
    pub queue_capacity: usize,
}

/// Which resolution backend consumers call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    /// The operating system resolver (getaddrinfo).
    #[default]
    System,
    /// hickory-dns, using the system name servers.
    Hickory,
}

/// Resolver configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub backend: ResolverKind,

    /// Static answers consulted before the backend.
    pub overrides: Vec<HostOverride>,
}

/// Telemetry configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub log_level: String,
}

/// A `HOST=IP` pair answering `HOST` without a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct HostOverride {
    pub host: String,
    pub ip: IpAddr,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_CONSUMER_THREADS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), NetError> {
        if self.threads == 0 {
            return Err(NetError::InvalidConfig("threads must be at least 1".into()));
        }
        if self.queue_capacity == 0 {
            return Err(NetError::InvalidConfig("queue_capacity must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl ResolverConfig {
    /// Builds the resolver consumers will share.
    pub fn build(&self) -> Result<Arc<dyn Resolve>, NetError> {
        let backend: Arc<dyn Resolve> = match self.backend {
            ResolverKind::System => Arc::new(GaiResolver::new()),
            ResolverKind::Hickory => Arc::new(HickoryResolver::new()?),
        };

        if self.overrides.is_empty() {
            return Ok(backend);
        }

        let mut table: HashMap<Cow<'static, str>, Vec<IpAddr>> = HashMap::new();
        for o in &self.overrides {
            table.entry(Cow::Owned(o.host.clone())).or_default().push(o.ip);
        }
        Ok(Arc::new(DnsResolverWithOverrides::new(backend, table)))
    }
}

impl FromStr for HostOverride {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, ip) = s
            .split_once('=')
            .ok_or_else(|| format!("expected HOST=IP, got {s:?}"))?;
        let host = host.trim();
        if host.is_empty() {
            return Err(format!("missing host in {s:?}"));
        }
        let ip = ip
            .trim()
            .parse::<IpAddr>()
            .map_err(|e| format!("invalid address in {s:?}: {e}"))?;
        Ok(Self {
            host: host.to_string(),
            ip,
        })
    }
}

impl TryFrom<String> for HostOverride {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for HostOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.host, self.ip)
    }
}

impl Config {
    /// Loads defaults, the optional TOML file at `path` and the
    /// `MULTILOOKUP_*` environment.
    pub fn load(path: Option<&Path>) -> Result<Self, NetError> {
        Self::load_with_env(path, environment())
    }

    fn load_with_env(path: Option<&Path>, env: ::config::Environment) -> Result<Self, NetError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(true),
            );
        }

        builder
            .add_source(env)
            .build()
            .and_then(|c| c.try_deserialize::<Config>())
            .map_err(|e| NetError::InvalidConfig(e.to_string()))
    }
}

/// `MULTILOOKUP_PIPELINE__THREADS=8`, `MULTILOOKUP_RESOLVER__OVERRIDES=a=1.2.3.4,b=::1`.
fn environment() -> ::config::Environment {
    ::config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("resolver.overrides")
        .try_parsing(true)
}
