//! Core DNS resolution types and traits.
//!
//! This module defines the `Resolve` trait and supporting types that form
//! the foundation of the DNS abstraction layer.

use crate::base::neterror::NetError;
use std::{
    borrow::Cow,
    collections::HashMap,
    fmt,
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

/// A domain name to resolve into IP addresses.
///
/// This is a lightweight wrapper around a hostname string that provides
/// a type-safe way to pass domain names to resolvers.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct Name {
    host: Box<str>,
}

impl Name {
    /// Creates a new [`Name`] from any string-like type.
    #[inline]
    pub fn new(host: impl Into<Box<str>>) -> Self {
        Self { host: host.into() }
    }

    /// View the hostname as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.host
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::new(value)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.host, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.host, f)
    }
}

/// Alias for an `Iterator` trait object over `SocketAddr`.
pub type Addrs = Box<dyn Iterator<Item = SocketAddr> + Send>;

/// Trait for DNS resolution.
///
/// Implementations block the calling thread until the lookup completes and
/// must be safe to call from many consumer threads at once.
///
/// # Design Notes
///
/// - Uses `&self` for concurrent resolution without mutable access.
/// - The returned addresses carry port 0; only the IP is meaningful.
pub trait Resolve: Send + Sync {
    /// Resolves a domain name to IP addresses.
    fn resolve(&self, name: Name) -> Result<Addrs, NetError>;

    /// Resolves a domain name and keeps only the first address.
    fn resolve_first(&self, name: Name) -> Result<IpAddr, NetError> {
        self.resolve(name)?
            .next()
            .map(|addr| addr.ip())
            .ok_or(NetError::NameNotResolved)
    }
}

/// Blanket implementation for Arc-wrapped resolvers.
impl<R: Resolve + ?Sized> Resolve for Arc<R> {
    fn resolve(&self, name: Name) -> Result<Addrs, NetError> {
        (**self).resolve(name)
    }
}

/// DNS resolver wrapper that supports hostname overrides.
///
/// This resolver first checks a map of hostname-to-address overrides before
/// falling back to the underlying resolver. Useful for:
/// - Testing without real DNS
/// - Forcing specific IPs for certain domains
///
/// # Example
///
/// ```rust,ignore
/// use multilookup::dns::{DnsResolverWithOverrides, GaiResolver};
/// use std::collections::HashMap;
///
/// let mut overrides = HashMap::new();
/// overrides.insert("api.local".into(), vec!["127.0.0.1".parse().unwrap()]);
///
/// let resolver = DnsResolverWithOverrides::new(Arc::new(GaiResolver::new()), overrides);
/// ```
pub struct DnsResolverWithOverrides {
    inner: Arc<dyn Resolve>,
    overrides: Arc<HashMap<Cow<'static, str>, Vec<IpAddr>>>,
}

impl DnsResolverWithOverrides {
    /// Creates a new resolver with the given overrides.
    ///
    /// # Arguments
    ///
    /// * `inner` - The fallback resolver for non-overridden hostnames.
    /// * `overrides` - Map of hostnames to their resolved addresses.
    pub fn new(inner: Arc<dyn Resolve>, overrides: HashMap<Cow<'static, str>, Vec<IpAddr>>) -> Self {
        Self {
            inner,
            overrides: Arc::new(overrides),
        }
    }

    /// Returns the number of configured overrides.
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

impl Resolve for DnsResolverWithOverrides {
    fn resolve(&self, name: Name) -> Result<Addrs, NetError> {
        if let Some(ips) = self.overrides.get(name.as_str()) {
            tracing::debug!(domain = %name, "answering from override table");
            let addrs: Vec<SocketAddr> = ips.iter().map(|ip| SocketAddr::new(*ip, 0)).collect();
            return Ok(Box::new(addrs.into_iter()));
        }
        self.inner.resolve(name)
    }
}

impl fmt::Debug for DnsResolverWithOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DnsResolverWithOverrides")
            .field("override_count", &self.overrides.len())
            .finish_non_exhaustive()
    }
}
