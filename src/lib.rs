//! # multilookup
//!
//! Bulk hostname resolution over a bounded producer/consumer pipeline.
//!
//! Hostnames are read from any number of input files, one thread per file,
//! resolved by a fixed pool of worker threads, and written to a single
//! output file as `"<hostname>, <address>"` lines.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use multilookup::config::PipelineConfig;
//! use multilookup::dns::GaiResolver;
//! use multilookup::pipeline::Pipeline;
//! use std::sync::Arc;
//!
//! let pipeline = Pipeline::new(PipelineConfig::default(), Arc::new(GaiResolver::new()));
//! let report = pipeline.run_to_path(&inputs, Path::new("results.txt"))?;
//! println!("{} resolved, {} failed", report.resolved, report.unresolved);
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error definitions
//! - [`config`] - Layered configuration
//! - [`dns`] - The blocking resolution primitive and its backends
//! - [`pipeline`] - Queue, producer and consumer pools, output writer
//! - [`telemetry`] - tracing subscriber setup

pub mod base;
pub mod config;
pub mod dns;
pub mod pipeline;
pub mod telemetry;

pub use base::neterror::NetError;
pub use config::Config;
pub use pipeline::{Pipeline, RunReport};
