//! DNS resolver using hickory-dns.
//!
//! hickory-dns is fully async; this backend owns a small tokio runtime and
//! drives each lookup to completion with `block_on`, so consumer threads can
//! call it like any other blocking resolver. Many threads may block on the
//! same runtime at once; their lookups share its connection pools.
//!
//! Unlike `GaiResolver`, this resolver talks to the configured name servers
//! directly and bypasses nsswitch.

use super::{Addrs, Name, Resolve};
use crate::base::neterror::NetError;
use hickory_resolver::{
    config::{LookupIpStrategy, ResolverConfig},
    name_server::TokioConnectionProvider,
    TokioResolver,
};
use std::{io, net::SocketAddr, sync::Arc};
use tokio::runtime::{Builder, Runtime};

/// Blocking DNS resolver backed by hickory-dns.
///
/// Cloning is cheap; clones share the runtime and the resolver cache.
///
/// # Example
///
/// ```rust,ignore
/// use multilookup::dns::{HickoryResolver, Name, Resolve};
///
/// let resolver = HickoryResolver::new()?;
/// let ip = resolver.resolve_first(Name::new("example.com"))?;
/// ```
#[derive(Clone)]
pub struct HickoryResolver {
    runtime: Arc<Runtime>,
    resolver: Arc<TokioResolver>,
}

impl HickoryResolver {
    /// Creates a new `HickoryResolver`.
    ///
    /// It will attempt to read system DNS configuration; if that fails,
    /// it falls back to sensible defaults.
    pub fn new() -> Result<Self, NetError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("hickory-worker")
            .enable_all()
            .build()
            .map_err(|e| NetError::spawn_failed("hickory runtime", e))?;

        let resolver = {
            let _guard = runtime.enter();
            let mut builder = match TokioResolver::builder_tokio() {
                Ok(builder) => {
                    tracing::debug!("Using system DNS configuration");
                    builder
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Failed to read system DNS config, using defaults"
                    );
                    TokioResolver::builder_with_config(
                        ResolverConfig::default(),
                        TokioConnectionProvider::default(),
                    )
                }
            };

            builder.options_mut().ip_strategy = LookupIpStrategy::Ipv4thenIpv6;
            builder.build()
        };

        Ok(Self {
            runtime: Arc::new(runtime),
            resolver: Arc::new(resolver),
        })
    }
}

impl std::fmt::Debug for HickoryResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HickoryResolver").finish_non_exhaustive()
    }
}

impl Resolve for HickoryResolver {
    fn resolve(&self, name: Name) -> Result<Addrs, NetError> {
        let domain = name.as_str();
        tracing::debug!(domain = %domain, "resolving via hickory-dns");

        let lookup = self
            .runtime
            .block_on(self.resolver.lookup_ip(domain))
            .map_err(|e| {
                tracing::debug!(domain = %domain, error = %e, "hickory-dns lookup failed");
                NetError::dns_failed(domain, io::Error::new(io::ErrorKind::NotFound, e.to_string()))
            })?;

        let addrs: Vec<SocketAddr> = lookup.iter().map(|ip| SocketAddr::new(ip, 0)).collect();

        if addrs.is_empty() {
            return Err(NetError::dns_failed(
                domain,
                io::Error::new(io::ErrorKind::NotFound, "No addresses returned"),
            ));
        }

        tracing::debug!(domain = %domain, count = addrs.len(), "hickory-dns resolution complete");
        Ok(Box::new(addrs.into_iter()))
    }
}
