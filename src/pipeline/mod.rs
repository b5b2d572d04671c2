//! Producer/consumer resolution pipeline.
//!
//! ```text
//! input files ─▶ ProducerPool ─▶ BoundedQueue ─▶ ConsumerPool ─▶ OutputWriter ─▶ output file
//! ```
//!
//! One producer thread per input file pushes hostname tokens onto a
//! [`BoundedQueue`]. A pool of consumer threads, sized independently of the
//! number of files, pops them, resolves each through [`Resolve`] and writes
//! one line per hostname. Consumers leave once every producer has finished
//! and the queue is empty.
//!
//! # Locking
//!
//! There are three locks: the queue, the termination counter and the
//! output stream. A consumer checks termination while holding the queue
//! lock (queue, then tracker). A producer reports completion under the
//! tracker lock alone and only afterwards takes the queue lock to wake
//! sleeping consumers. The output lock is never held with the queue lock,
//! and no lock is held while a hostname is being resolved.

mod consumer;
mod output;
mod producer;
mod queue;
mod termination;
mod tokenizer;

pub use consumer::{ConsumerPool, ConsumerStats, DEFAULT_CONSUMER_THREADS};
pub use output::{OutputWriter, ResultRecord};
pub use producer::{ProducerOutcome, ProducerPool};
pub use queue::{BoundedQueue, DEFAULT_QUEUE_CAPACITY};
pub use termination::TerminationTracker;
pub use tokenizer::{tokens, Tokens, MAX_TOKEN_LEN};

use crate::base::neterror::NetError;
use crate::config::PipelineConfig;
use crate::dns::Resolve;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// State shared by both pools for the duration of one run.
#[derive(Debug)]
pub struct PipelineContext {
    queue: BoundedQueue<String>,
    tracker: TerminationTracker,
}

impl PipelineContext {
    pub fn new(queue_capacity: usize, producers: usize) -> Self {
        Self {
            queue: BoundedQueue::new(queue_capacity),
            tracker: TerminationTracker::new(producers),
        }
    }

    pub fn queue(&self) -> &BoundedQueue<String> {
        &self.queue
    }

    pub fn tracker(&self) -> &TerminationTracker {
        &self.tracker
    }

    /// Records that one producer is done and wakes every waiting consumer.
    pub fn producer_finished(&self) {
        self.tracker.mark_finished();
        self.queue.wake_all();
    }

    /// Next hostname to resolve, or `None` once no more work can arrive.
    pub fn next_hostname(&self) -> Option<String> {
        self.queue.pop_until_done(|| self.tracker.all_finished())
    }

    /// Every producer finished and nothing is left in the queue.
    pub fn is_drained(&self) -> bool {
        self.queue.is_empty() && self.tracker.all_finished()
    }
}

/// Totals for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub files: usize,
    /// Files that could not be opened or were not read to the end.
    pub files_failed: usize,
    pub hostnames_read: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub write_failures: usize,
    pub lines_written: usize,
}

/// Runs producers and consumers over a set of input files.
pub struct Pipeline {
    config: PipelineConfig,
    resolver: Arc<dyn Resolve>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, resolver: Arc<dyn Resolve>) -> Self {
        Self { config, resolver }
    }

    /// Creates `output_path` and resolves every hostname in `inputs` into it.
    pub fn run_to_path(&self, inputs: &[PathBuf], output_path: &Path) -> Result<RunReport, NetError> {
        self.config.validate()?;
        let output = OutputWriter::create(output_path)?;
        self.run(inputs, output)
    }

    /// Resolves every hostname in `inputs` and writes the results to `output`.
    ///
    /// Returns once all consumers have exited. Missing input files and
    /// unresolvable names are recorded in the report, not returned as
    /// errors.
    pub fn run(&self, inputs: &[PathBuf], output: OutputWriter) -> Result<RunReport, NetError> {
        self.config.validate()?;

        let output = Arc::new(output);
        let context = Arc::new(PipelineContext::new(self.config.queue_capacity, inputs.len()));

        tracing::debug!(
            files = inputs.len(),
            threads = self.config.threads,
            queue_capacity = self.config.queue_capacity,
            "starting pipeline"
        );

        // Consumers first: if none can start, producers would block on a
        // full queue forever.
        let consumers = ConsumerPool::spawn(
            self.config.threads,
            &context,
            Arc::clone(&self.resolver),
            &output,
        )?;
        let producers = ProducerPool::spawn(inputs, &context);

        let outcomes = producers.join();
        let stats = consumers.join();
        let lines_written = output.finish()?;

        let report = RunReport {
            files: outcomes.len(),
            files_failed: outcomes.iter().filter(|o| o.error.is_some()).count(),
            hostnames_read: outcomes.iter().map(|o| o.hostnames).sum(),
            resolved: stats.resolved,
            unresolved: stats.unresolved,
            write_failures: stats.write_failures,
            lines_written,
        };

        tracing::info!(
            files = report.files,
            files_failed = report.files_failed,
            hostnames = report.hostnames_read,
            resolved = report.resolved,
            unresolved = report.unresolved,
            peak_queue_len = context.queue().peak_len(),
            "all files have been processed"
        );

        Ok(report)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
