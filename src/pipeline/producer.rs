//! File-reading producer threads.

use super::tokenizer::tokens;
use super::PipelineContext;
use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// What one producer did with its input file.
#[derive(Debug, Clone)]
pub struct ProducerOutcome {
    pub path: PathBuf,
    /// Hostnames pushed onto the queue.
    pub hostnames: usize,
    /// Set when the file could not be opened or read to the end.
    pub error: Option<NetError>,
}

/// Per-producer state: the assigned file and its completion flag.
///
/// Completion is reported to the tracker exactly once, at the latest when
/// the record is dropped, so a producer that fails early or panics still
/// counts as finished.
struct ProducerRecord {
    path: PathBuf,
    context: Arc<PipelineContext>,
    complete: bool,
}

impl ProducerRecord {
    fn new(path: PathBuf, context: Arc<PipelineContext>) -> Self {
        Self {
            path,
            context,
            complete: false,
        }
    }

    fn complete(&mut self) {
        if !self.complete {
            self.complete = true;
            self.context.producer_finished();
        }
    }
}

impl Drop for ProducerRecord {
    fn drop(&mut self) {
        self.complete();
    }
}

fn run_producer(mut record: ProducerRecord) -> ProducerOutcome {
    let path = record.path.clone();
    let mut hostnames = 0;
    let error = match read_into_queue(&record.path, &record.context, &mut hostnames) {
        Ok(()) => None,
        Err(e) => {
            tracing::error!(path = %path.display(), code = e.as_i32(), error = %e, "producer failed");
            Some(e)
        }
    };

    record.complete();
    tracing::info!(
        path = %path.display(),
        hostnames,
        finished = record.context.tracker().finished(),
        total = record.context.tracker().total(),
        "producer finished"
    );

    ProducerOutcome {
        path,
        hostnames,
        error,
    }
}

fn read_into_queue(
    path: &Path,
    context: &PipelineContext,
    hostnames: &mut usize,
) -> Result<(), NetError> {
    let file = File::open(path).open_context(path)?;
    tracing::debug!(path = %path.display(), "reading hostnames");

    for token in tokens(BufReader::new(file)) {
        let hostname = token.read_context(path)?;
        context.queue().push(hostname);
        *hostnames += 1;
    }
    Ok(())
}

/// One producer thread per input file.
pub struct ProducerPool {
    workers: Vec<(PathBuf, Option<JoinHandle<ProducerOutcome>>)>,
}

impl ProducerPool {
    /// Starts a producer for every path.
    ///
    /// `context` must have been created for exactly `paths.len()` producers.
    /// A thread that cannot be spawned is reported at `join` and still
    /// counts as finished.
    pub fn spawn(paths: &[PathBuf], context: &Arc<PipelineContext>) -> Self {
        debug_assert_eq!(context.tracker().total(), paths.len());

        let workers = paths
            .iter()
            .enumerate()
            .map(|(index, path)| {
                let record = ProducerRecord::new(path.clone(), Arc::clone(context));
                // An unspawned closure is dropped, which completes its record.
                let handle = thread::Builder::new()
                    .name(format!("producer-{index}"))
                    .spawn(move || run_producer(record))
                    .inspect_err(|e| {
                        tracing::error!(path = %path.display(), error = %e, "failed to spawn producer");
                    })
                    .ok();
                (path.clone(), handle)
            })
            .collect();

        Self { workers }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Waits for every producer and returns their outcomes in input order.
    pub fn join(self) -> Vec<ProducerOutcome> {
        self.workers
            .into_iter()
            .map(|(path, handle)| {
                let Some(handle) = handle else {
                    return ProducerOutcome {
                        path,
                        hostnames: 0,
                        error: Some(NetError::Aborted),
                    };
                };
                handle.join().unwrap_or_else(|_| {
                    tracing::error!(path = %path.display(), "producer thread panicked");
                    ProducerOutcome {
                        path,
                        hostnames: 0,
                        error: Some(NetError::Aborted),
                    }
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_producers_fill_queue_and_finish() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "a.com b.com\n").unwrap();
        fs::write(&b, "c.com\n").unwrap();

        let context = Arc::new(PipelineContext::new(8, 2));
        let pool = ProducerPool::spawn(&[a, b], &context);
        assert_eq!(pool.len(), 2);

        let outcomes = pool.join();
        assert_eq!(outcomes[0].hostnames, 2);
        assert_eq!(outcomes[1].hostnames, 1);
        assert!(outcomes.iter().all(|o| o.error.is_none()));

        assert!(context.tracker().all_finished());
        assert_eq!(context.queue().len(), 3);
    }

    #[test]
    fn test_missing_file_still_finishes() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");

        let context = Arc::new(PipelineContext::new(4, 1));
        let outcomes = ProducerPool::spawn(&[missing.clone()], &context).join();

        assert_eq!(outcomes[0].path, missing);
        assert_eq!(outcomes[0].hostnames, 0);
        assert!(matches!(outcomes[0].error, Some(NetError::FileOpenFailed { .. })));
        assert!(context.tracker().all_finished());
        assert!(context.is_drained());
    }

    #[test]
    fn test_dropped_record_completes_once() {
        let context = Arc::new(PipelineContext::new(1, 2));
        let mut record = ProducerRecord::new(PathBuf::from("x"), Arc::clone(&context));
        record.complete();
        drop(record);
        assert_eq!(context.tracker().finished(), 1);
    }
}
