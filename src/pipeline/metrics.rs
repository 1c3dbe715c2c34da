//! Periodic performance snapshots.
//!
//! The driver feeds counters into a [`MetricsReporter`], which decides when to
//! take a snapshot and hands it to a [`MetricsSink`].

use std::time::{Duration, Instant};

use crate::models::{RunCounters, Termination};

/// Linux `USER_HZ`, fixed by the kernel ABI.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
const CLOCK_TICKS_PER_SEC: u64 = 100;

/// Point-in-time view of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub counters: RunCounters,
    pub elapsed: Duration,
    pub items_per_sec: f64,
    /// Resident set size, when the platform exposes it
    pub resident_bytes: Option<u64>,
    /// User + system CPU time, when the platform exposes it
    pub cpu_time: Option<Duration>,
    /// Set on the snapshot taken at termination
    pub termination: Option<Termination>,
}

/// Destination for snapshots.
pub trait MetricsSink: Send + Sync {
    fn record(&self, snapshot: &MetricsSnapshot);
}

/// Writes snapshots to the log.
#[derive(Debug, Default)]
pub struct LogMetricsSink;

impl MetricsSink for LogMetricsSink {
    fn record(&self, snapshot: &MetricsSnapshot) {
        let memory = snapshot
            .resident_bytes
            .map(|b| format!("{:.1} MiB", b as f64 / (1024.0 * 1024.0)))
            .unwrap_or_else(|| "n/a".to_string());
        let cpu = snapshot
            .cpu_time
            .map(|t| format!("{:.2}s", t.as_secs_f64()))
            .unwrap_or_else(|| "n/a".to_string());

        let prefix = match &snapshot.termination {
            Some(termination) => format!("Final metrics ({termination})"),
            None => "Metrics".to_string(),
        };
        log::info!(
            "{}: pages={} items={} flagged={} deleted={} delete_failures={} rate_limited={} elapsed={:.1}s rate={:.2} items/s rss={} cpu={}",
            prefix,
            snapshot.counters.pages_fetched,
            snapshot.counters.items_processed,
            snapshot.counters.items_flagged,
            snapshot.counters.deletions_succeeded,
            snapshot.counters.deletions_failed,
            snapshot.counters.rate_limit_retries,
            snapshot.elapsed.as_secs_f64(),
            snapshot.items_per_sec,
            memory,
            cpu
        );
    }
}

/// Decides when snapshots are taken.
pub struct MetricsReporter<'a> {
    sink: &'a dyn MetricsSink,
    interval_pages: u64,
    started: Instant,
}

impl<'a> MetricsReporter<'a> {
    /// `interval_pages == 0` disables periodic snapshots; the final one is
    /// always taken.
    pub fn new(sink: &'a dyn MetricsSink, interval_pages: u64) -> Self {
        Self {
            sink,
            interval_pages,
            started: Instant::now(),
        }
    }

    /// Called after the driver advances to a new page.
    pub fn on_page(&self, counters: &RunCounters) {
        let pages = counters.pages_fetched;
        if self.interval_pages > 0 && pages > 0 && pages % self.interval_pages == 0 {
            self.sink.record(&self.snapshot(counters, None));
        }
    }

    /// Called once at termination.
    pub fn finish(&self, counters: &RunCounters, termination: &Termination) {
        self.sink
            .record(&self.snapshot(counters, Some(termination.clone())));
    }

    fn snapshot(
        &self,
        counters: &RunCounters,
        termination: Option<Termination>,
    ) -> MetricsSnapshot {
        let elapsed = self.started.elapsed();
        let secs = elapsed.as_secs_f64();
        let items_per_sec = if secs > 0.0 {
            counters.items_processed as f64 / secs
        } else {
            0.0
        };
        let process = ProcessSample::current();

        MetricsSnapshot {
            counters: *counters,
            elapsed,
            items_per_sec,
            resident_bytes: process.resident_bytes,
            cpu_time: process.cpu_time,
            termination,
        }
    }
}

/// Resource usage of the current process.
#[derive(Debug, Clone, Copy, Default)]
struct ProcessSample {
    resident_bytes: Option<u64>,
    cpu_time: Option<Duration>,
}

impl ProcessSample {
    #[cfg(target_os = "linux")]
    fn current() -> Self {
        let resident_bytes = std::fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|status| parse_vm_rss(&status));
        let cpu_time = std::fs::read_to_string("/proc/self/stat")
            .ok()
            .and_then(|stat| parse_cpu_ticks(&stat))
            .map(|ticks| Duration::from_millis(ticks * 1000 / CLOCK_TICKS_PER_SEC));
        Self {
            resident_bytes,
            cpu_time,
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn current() -> Self {
        Self::default()
    }
}

/// `VmRSS` from `/proc/self/status`, in bytes.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_vm_rss(status: &str) -> Option<u64> {
    let line = status.lines().find(|line| line.starts_with("VmRSS:"))?;
    let kib: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kib * 1024)
}

/// `utime + stime` from `/proc/self/stat`, in clock ticks.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_cpu_ticks(stat: &str) -> Option<u64> {
    // The command name may contain spaces; fields resume after the last ')'.
    let rest = &stat[stat.rfind(')')? + 1..];
    let fields: Vec<&str> = rest.split_whitespace().collect();
    let utime: u64 = fields.get(11)?.parse().ok()?;
    let stime: u64 = fields.get(12)?.parse().ok()?;
    Some(utime + stime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Budget;
    use crate::pipeline::testing::RecordingSink;

    fn counters(pages: u64) -> RunCounters {
        RunCounters {
            pages_fetched: pages,
            items_processed: pages * 10,
            ..RunCounters::default()
        }
    }

    #[test]
    fn test_snapshots_follow_page_interval() {
        let sink = RecordingSink::default();
        let reporter = MetricsReporter::new(&sink, 2);

        for pages in 1..=5 {
            reporter.on_page(&counters(pages));
        }

        let recorded = sink.snapshots();
        let pages: Vec<u64> = recorded.iter().map(|s| s.counters.pages_fetched).collect();
        assert_eq!(pages, vec![2, 4]);
        assert!(recorded.iter().all(|s| s.termination.is_none()));
    }

    #[test]
    fn test_zero_interval_only_reports_final() {
        let sink = RecordingSink::default();
        let reporter = MetricsReporter::new(&sink, 0);

        reporter.on_page(&counters(1));
        reporter.finish(
            &counters(1),
            &Termination::BudgetExhausted(Budget::Items),
        );

        let recorded = sink.snapshots();
        assert_eq!(recorded.len(), 1);
        assert_eq!(
            recorded[0].termination,
            Some(Termination::BudgetExhausted(Budget::Items))
        );
        assert_eq!(recorded[0].counters.items_processed, 10);
    }

    #[test]
    fn test_parse_vm_rss() {
        let status = "Name:\tcat\nVmPeak:\t  8000 kB\nVmRSS:\t  1024 kB\nThreads:\t1\n";
        assert_eq!(parse_vm_rss(status), Some(1024 * 1024));
        assert_eq!(parse_vm_rss("Name:\tcat\n"), None);
    }

    #[test]
    fn test_parse_cpu_ticks_handles_spaces_in_name() {
        let stat = "4242 (my (odd) proc) S 1 4242 4242 0 -1 4194560 100 0 0 0 37 5 0 0 20 0 1 0 1000 0 0";
        assert_eq!(parse_cpu_ticks(stat), Some(42));
    }
}
