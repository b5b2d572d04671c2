//! Pipeline Tests
//!
//! Covers:
//! - Line count and hostname multiset across pool sizes and capacities
//! - Missing input files
//! - Consumers waiting on a slow producer
//! - Slow resolution not serializing consumers
//! - A panicking resolver not stalling the run

use multilookup::config::PipelineConfig;
use multilookup::dns::{Addrs, Name, Resolve};
use multilookup::pipeline::{ConsumerPool, OutputWriter, Pipeline, PipelineContext};
use multilookup::NetError;

use std::collections::HashMap;
use std::fs;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

/// Resolves `*.invalid` to an error and everything else to 192.0.2.1,
/// optionally sleeping first.
struct MockResolver {
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockResolver {
    fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

impl Resolve for MockResolver {
    fn resolve(&self, name: Name) -> Result<Addrs, NetError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if name.as_str().ends_with(".invalid") {
            return Err(NetError::dns_failed(
                name.as_str(),
                io::Error::new(io::ErrorKind::NotFound, "nxdomain"),
            ));
        }
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)), 0);
        Ok(Box::new(std::iter::once(addr)))
    }
}

fn write_input(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn config(threads: usize, queue_capacity: usize) -> PipelineConfig {
    PipelineConfig {
        threads,
        queue_capacity,
    }
}

/// Parses the output into hostname -> occurrences, checking line syntax.
fn read_output(path: &Path) -> HashMap<String, usize> {
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.is_empty() || contents.ends_with('\n'));

    let mut seen = HashMap::new();
    for line in contents.lines() {
        let (host, address) = line.split_once(", ").expect("line has a separator");
        assert!(!host.is_empty());
        assert!(address.is_empty() || address.parse::<IpAddr>().is_ok(), "bad line {line:?}");
        *seen.entry(host.to_string()).or_insert(0) += 1;
    }
    seen
}

#[test]
fn test_two_files_capacity_one() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_input(dir.path(), "A.txt", "a.com b.com");
    let b = write_input(dir.path(), "B.txt", "c.com");
    let out = dir.path().join("out.txt");

    let pipeline = Pipeline::new(config(2, 1), Arc::new(MockResolver::new()));
    let report = pipeline.run_to_path(&[a, b], &out).unwrap();

    assert_eq!(report.hostnames_read, 3);
    assert_eq!(report.lines_written, 3);

    let contents = fs::read_to_string(&out).unwrap();
    let mut lines: Vec<_> = contents.lines().collect();
    lines.sort_unstable();
    assert_eq!(lines, vec!["a.com, 192.0.2.1", "b.com, 192.0.2.1", "c.com, 192.0.2.1"]);
}

#[test]
fn test_every_hostname_written_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut inputs = Vec::new();
    let mut expected: HashMap<String, usize> = HashMap::new();

    for file in 0..6 {
        let mut contents = String::new();
        for i in 0..150 {
            // Repeat some names across files so the multiset matters.
            let host = format!("host-{}.example.com", (file * 150 + i) % 700);
            contents.push_str(&host);
            contents.push(if i % 3 == 0 { '\n' } else { ' ' });
            *expected.entry(host).or_insert(0) += 1;
        }
        inputs.push(write_input(dir.path(), &format!("in-{file}.txt"), &contents));
    }

    for (threads, capacity) in [(1, 1), (2, 3), (4, 16), (9, 2)] {
        let out = dir.path().join(format!("out-{threads}-{capacity}.txt"));
        let pipeline = Pipeline::new(config(threads, capacity), Arc::new(MockResolver::new()));
        let report = pipeline.run_to_path(&inputs, &out).unwrap();

        assert_eq!(report.hostnames_read, 900);
        assert_eq!(report.resolved, 900);
        assert_eq!(report.lines_written, 900);
        assert_eq!(read_output(&out), expected, "threads={threads} capacity={capacity}");
    }
}

#[test]
fn test_unresolvable_names_get_empty_address() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "in.txt", "good.com bad.invalid\nworse.invalid\n");
    let out = dir.path().join("out.txt");

    let pipeline = Pipeline::new(config(3, 4), Arc::new(MockResolver::new()));
    let report = pipeline.run_to_path(&[input], &out).unwrap();

    assert_eq!(report.resolved, 1);
    assert_eq!(report.unresolved, 2);

    let contents = fs::read_to_string(&out).unwrap();
    assert!(contents.lines().any(|l| l == "good.com, 192.0.2.1"));
    assert!(contents.lines().any(|l| l == "bad.invalid, "));
    assert!(contents.lines().any(|l| l == "worse.invalid, "));
}

#[test]
fn test_missing_input_file_does_not_stall() {
    let dir = tempfile::tempdir().unwrap();
    let present = write_input(dir.path(), "present.txt", "x.com y.com");
    let missing = dir.path().join("missing.txt");
    let out = dir.path().join("out.txt");

    let pipeline = Pipeline::new(config(2, 1), Arc::new(MockResolver::new()));
    let report = pipeline.run_to_path(&[missing, present], &out).unwrap();

    assert_eq!(report.files, 2);
    assert_eq!(report.files_failed, 1);
    assert_eq!(report.lines_written, 2);
}

#[test]
fn test_all_inputs_missing_yields_empty_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.txt");

    let pipeline = Pipeline::new(config(4, 16), Arc::new(MockResolver::new()));
    let report = pipeline
        .run_to_path(&[dir.path().join("a"), dir.path().join("b")], &out)
        .unwrap();

    assert_eq!(report.files_failed, 2);
    assert_eq!(fs::read_to_string(&out).unwrap(), "");
}

#[test]
fn test_invalid_config_rejected_before_output_created() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "in.txt", "a.com");
    let out = dir.path().join("out.txt");

    let pipeline = Pipeline::new(config(0, 16), Arc::new(MockResolver::new()));
    let err = pipeline.run_to_path(&[input], &out).unwrap_err();

    assert!(matches!(err, NetError::InvalidConfig(_)));
    assert!(!out.exists());
}

#[test]
fn test_consumers_wait_for_delayed_producer() {
    let context = Arc::new(PipelineContext::new(2, 2));
    let output = Arc::new(OutputWriter::new(io::sink()));
    let consumers =
        ConsumerPool::spawn(3, &context, Arc::new(MockResolver::new()), &output).unwrap();

    // First producer delivers its work and finishes.
    context.queue().push("first.com".to_string());
    context.producer_finished();

    // The second producer is still outstanding: queue drains, nobody leaves.
    thread::sleep(Duration::from_millis(100));
    assert!(context.queue().is_empty());
    assert!(!consumers.is_finished());
    assert_eq!(output.lines_written(), 1);

    // It pushes once more and finishes; consumers drain and exit promptly.
    context.queue().push("late.com".to_string());
    context.producer_finished();

    let start = Instant::now();
    let stats = consumers.join();
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(stats.processed(), 2);
    assert_eq!(output.lines_written(), 2);
    assert!(context.is_drained());
}

#[test]
fn test_resolution_runs_in_parallel() {
    let dir = tempfile::tempdir().unwrap();
    let hosts: Vec<String> = (0..8).map(|i| format!("slow-{i}.com")).collect();
    let input = write_input(dir.path(), "in.txt", &hosts.join("\n"));
    let out = dir.path().join("out.txt");

    let resolver = Arc::new(MockResolver::with_delay(Duration::from_millis(100)));
    let pipeline = Pipeline::new(config(4, 16), resolver.clone());
    let report = pipeline.run_to_path(&[input], &out).unwrap();

    assert_eq!(report.lines_written, 8);
    // With the queue lock released during lookups, several run at once.
    assert!(resolver.max_in_flight.load(Ordering::SeqCst) > 1);
}

/// Panics on one hostname and answers 192.0.2.1 for everything else.
struct PanickingResolver {
    trigger: &'static str,
}

impl Resolve for PanickingResolver {
    fn resolve(&self, name: Name) -> Result<Addrs, NetError> {
        if name.as_str() == self.trigger {
            panic!("resolver failed on {}", self.trigger);
        }
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)), 0);
        Ok(Box::new(std::iter::once(addr)))
    }
}

#[test]
fn test_resolver_panic_does_not_stall_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "in.txt", "boom.com a.com b.com c.com");
    let out = dir.path().join("out.txt");

    // One consumer and a one-slot queue: a dead consumer would leave the
    // producer blocked on push forever.
    let (tx, rx) = mpsc::channel();
    {
        let out = out.clone();
        thread::spawn(move || {
            let pipeline = Pipeline::new(
                config(1, 1),
                Arc::new(PanickingResolver { trigger: "boom.com" }),
            );
            let _ = tx.send(pipeline.run_to_path(&[input], &out));
        });
    }

    let report = rx
        .recv_timeout(Duration::from_secs(10))
        .expect("pipeline finished")
        .unwrap();
    assert_eq!(report.hostnames_read, 4);
    assert_eq!(report.resolved, 3);
    assert_eq!(report.unresolved, 1);
    assert_eq!(report.lines_written, 4);

    let contents = fs::read_to_string(&out).unwrap();
    let mut lines: Vec<_> = contents.lines().collect();
    lines.sort_unstable();
    assert_eq!(
        lines,
        vec!["a.com, 192.0.2.1", "b.com, 192.0.2.1", "boom.com, ", "c.com, 192.0.2.1"]
    );
}
