//! System DNS resolver using getaddrinfo.
//!
//! This resolver uses the operating system's native DNS resolution via
//! `getaddrinfo`, called directly on the consumer thread that asked.
//!
//! # When to Use
//!
//! - When you need to respect system DNS configuration (/etc/resolv.conf,
//!   /etc/hosts, nsswitch)
//! - As the default backend; it needs no runtime and no extra sockets

use super::{Addrs, Name, Resolve};
use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use std::{
    io,
    net::{IpAddr, SocketAddr, ToSocketAddrs},
};

/// System DNS resolver backed by `getaddrinfo`.
///
/// Resolution blocks the calling thread for as long as the system resolver
/// takes; there is no timeout beyond the one configured in the system.
#[derive(Clone, Debug, Default)]
pub struct GaiResolver;

impl GaiResolver {
    /// Creates a new `GaiResolver`.
    pub fn new() -> Self {
        Self
    }
}

impl Resolve for GaiResolver {
    fn resolve(&self, name: Name) -> Result<Addrs, NetError> {
        let domain = name.as_str();

        if let Some(addrs) = SocketAddrs::try_parse(domain) {
            return Ok(Box::new(addrs));
        }

        tracing::debug!(domain = %domain, "resolving via getaddrinfo");
        let addrs: Vec<SocketAddr> = (domain, 0u16)
            .to_socket_addrs()
            .dns_context(domain)
            .inspect_err(|e| tracing::debug!(domain = %domain, error = %e, "DNS resolution failed"))?
            .collect();

        if addrs.is_empty() {
            return Err(NetError::dns_failed(
                domain,
                io::Error::new(io::ErrorKind::NotFound, "No addresses returned by getaddrinfo"),
            ));
        }

        tracing::debug!(domain = %domain, count = addrs.len(), "DNS resolution complete");
        Ok(Box::new(addrs.into_iter()))
    }
}

/// Utility for parsing IP address strings directly.
///
/// Bypasses DNS resolution if the host is already an IP address.
pub struct SocketAddrs {
    addrs: std::vec::IntoIter<SocketAddr>,
}

impl SocketAddrs {
    /// Attempts to parse a host string as an IP address.
    ///
    /// Returns `Some` if the host is a valid IPv4 or IPv6 address,
    /// `None` if it's a hostname that requires DNS resolution.
    pub fn try_parse(host: &str) -> Option<Self> {
        let ip = host.parse::<IpAddr>().ok()?;
        Some(Self {
            addrs: vec![SocketAddr::new(ip, 0)].into_iter(),
        })
    }

    /// Returns the number of addresses.
    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    /// Returns true if no addresses are available.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Iterator for SocketAddrs {
    type Item = SocketAddr;

    fn next(&mut self) -> Option<Self::Item> {
        self.addrs.next()
    }
}
