//! DNS Resolution Module
//!
//! Provides the blocking resolution primitive used by consumer threads:
//! - System resolver (getaddrinfo on the calling thread)
//! - hickory-dns resolver driven by an owned runtime
//! - Hostname-to-IP override mechanism
//!
//! # Architecture
//!
//! The `Resolve` trait is the core abstraction that allows different
//! resolver implementations to be used interchangeably. The pipeline only
//! ever sees `Arc<dyn Resolve>`.
//!
//! # Example
//!
//! ```rust,ignore
//! use multilookup::dns::{GaiResolver, Name, Resolve};
//!
//! let resolver = GaiResolver::new();
//! for addr in resolver.resolve(Name::new("example.com"))? {
//!     println!("Resolved: {}", addr.ip());
//! }
//! ```

mod gai;
mod hickory;
mod resolve;

pub use gai::{GaiResolver, SocketAddrs};
pub use hickory::HickoryResolver;
pub use resolve::{Addrs, DnsResolverWithOverrides, Name, Resolve};
