//! Resolver worker threads.

use super::output::{OutputWriter, ResultRecord};
use super::PipelineContext;
use crate::base::neterror::NetError;
use crate::dns::{Name, Resolve};
use std::net::IpAddr;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Consumer threads started when nothing else is configured.
pub const DEFAULT_CONSUMER_THREADS: usize = 4;

/// Per-consumer counters, summed over the pool by [`ConsumerPool::join`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerStats {
    pub resolved: usize,
    pub unresolved: usize,
    pub write_failures: usize,
}

impl ConsumerStats {
    /// Hostnames taken off the queue.
    pub fn processed(&self) -> usize {
        self.resolved + self.unresolved
    }

    fn merge(&mut self, other: ConsumerStats) {
        self.resolved += other.resolved;
        self.unresolved += other.unresolved;
        self.write_failures += other.write_failures;
    }
}

/// Looks up `hostname`, treating a panicking resolver as a failed lookup.
fn lookup(resolver: &dyn Resolve, hostname: &str) -> Option<Result<IpAddr, NetError>> {
    panic::catch_unwind(AssertUnwindSafe(|| resolver.resolve_first(Name::new(hostname)))).ok()
}

fn run_consumer(
    context: &PipelineContext,
    resolver: &dyn Resolve,
    output: &OutputWriter,
) -> ConsumerStats {
    let mut stats = ConsumerStats::default();

    // No lock is held between iterations: the queue lock is released inside
    // next_hostname, before the lookup and the write.
    while let Some(hostname) = context.next_hostname() {
        let address = match lookup(resolver, &hostname) {
            Some(Ok(ip)) => {
                tracing::debug!(hostname = %hostname, address = %ip, "resolved");
                stats.resolved += 1;
                Some(ip)
            }
            Some(Err(e)) => {
                tracing::warn!(hostname = %hostname, code = e.as_i32(), error = %e, "dnslookup error");
                stats.unresolved += 1;
                None
            }
            None => {
                tracing::warn!(hostname = %hostname, "dnslookup error: resolver panicked");
                stats.unresolved += 1;
                None
            }
        };

        let record = ResultRecord { hostname, address };
        if let Err(e) = output.write_record(&record) {
            tracing::error!(
                hostname = %record.hostname,
                code = e.as_i32(),
                error = %e,
                "failed to write result"
            );
            stats.write_failures += 1;
        }
    }

    tracing::debug!(
        resolved = stats.resolved,
        unresolved = stats.unresolved,
        "all producers finished and queue drained, consumer exiting"
    );
    stats
}

/// A fixed-size pool of resolver threads.
///
/// The pool size is independent of the number of input files.
pub struct ConsumerPool {
    handles: Vec<JoinHandle<ConsumerStats>>,
}

impl ConsumerPool {
    /// Starts `size` consumers, all at once.
    ///
    /// Fails if `size` is zero or if not a single thread could be spawned;
    /// a partial failure only shrinks the pool.
    pub fn spawn(
        size: usize,
        context: &Arc<PipelineContext>,
        resolver: Arc<dyn Resolve>,
        output: &Arc<OutputWriter>,
    ) -> Result<Self, NetError> {
        if size == 0 {
            return Err(NetError::InvalidConfig(
                "consumer pool needs at least one thread".into(),
            ));
        }

        let mut handles = Vec::with_capacity(size);
        let mut last_error = None;
        for index in 0..size {
            let context = Arc::clone(context);
            let resolver = Arc::clone(&resolver);
            let output = Arc::clone(output);

            match thread::Builder::new()
                .name(format!("consumer-{index}"))
                .spawn(move || run_consumer(&context, resolver.as_ref(), &output))
            {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    tracing::warn!(index, error = %e, "failed to spawn consumer");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if handles.is_empty() => Err(NetError::spawn_failed("consumer", e)),
            _ => Ok(Self { handles }),
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// True once every consumer has exited.
    pub fn is_finished(&self) -> bool {
        self.handles.iter().all(JoinHandle::is_finished)
    }

    /// Waits for every consumer and sums their counters.
    pub fn join(self) -> ConsumerStats {
        let mut total = ConsumerStats::default();
        for handle in self.handles {
            match handle.join() {
                Ok(stats) => total.merge(stats),
                Err(_) => tracing::error!("consumer thread panicked"),
            }
        }
        total
    }
}

impl std::fmt::Debug for ConsumerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumerPool")
            .field("threads", &self.handles.len())
            .finish()
    }
}
