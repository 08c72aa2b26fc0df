use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde_json::json;

/// Aggregated timing report across instrumented operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingReport {
    /// Per-operation timing statistics.
    pub operations: Vec<OpTiming>,
}

/// Timing statistics for a single named operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpTiming {
    /// Human-readable operation name.
    pub name: String,
    /// 50th percentile latency.
    pub p50: Duration,
    /// 95th percentile latency.
    pub p95: Duration,
    /// Number of samples collected for this operation.
    pub count: usize,
    /// Number of samples whose operation returned an error.
    pub errors: usize,
}

#[derive(Debug, Clone)]
struct Sample {
    name: String,
    elapsed: Duration,
    failed: bool,
}

thread_local! {
    static SAMPLES: RefCell<Vec<Sample>> = const { RefCell::new(Vec::new()) };
}

static TIMING_ENABLED: AtomicBool = AtomicBool::new(false);

/// Returns true when `HS_TIMING` enables timing collection.
///
/// Supported truthy values: `1`, `true`, `yes`, `on` (case-insensitive).
#[must_use]
pub fn timing_enabled_from_env() -> bool {
    std::env::var("HS_TIMING")
        .ok()
        .is_some_and(|value| is_truthy(value.as_str()))
}

/// Enable or disable timing collection.
pub fn set_timing_enabled(enabled: bool) {
    TIMING_ENABLED.store(enabled, Ordering::Relaxed);
    if !enabled {
        clear_timings();
    }
}

/// Returns true when timing collection is currently enabled.
#[must_use]
pub fn is_timing_enabled() -> bool {
    TIMING_ENABLED.load(Ordering::Relaxed)
}

/// Clears all recorded timings for the current thread.
pub fn clear_timings() {
    SAMPLES.with(|samples| samples.borrow_mut().clear());
}

/// Execute a closure while recording its duration.
///
/// Timing is recorded only when enabled via [`set_timing_enabled`].
pub fn timed<R>(name: &str, f: impl FnOnce() -> R) -> R {
    if !is_timing_enabled() {
        return f();
    }

    let started = Instant::now();
    let result = f();
    record_sample(name, started.elapsed(), false);
    result
}

/// Execute a fallible closure, recording its duration and outcome.
///
/// The result is returned untouched. A debug event with the elapsed time is
/// emitted whether or not sample collection is enabled.
pub fn timed_result<T, E: std::fmt::Display>(
    name: &str,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    let started = Instant::now();
    let result = f();
    let elapsed = started.elapsed();

    match &result {
        Ok(_) => tracing::debug!(op = name, elapsed_us = elapsed.as_micros(), "ok"),
        Err(err) => {
            tracing::debug!(op = name, elapsed_us = elapsed.as_micros(), error = %err, "failed");
        }
    }

    if is_timing_enabled() {
        record_sample(name, elapsed, result.is_err());
    }
    result
}

/// Collect all recorded timings from thread-local storage into a report.
///
/// This drains the current thread's sample buffer.
#[must_use]
pub fn collect_report() -> TimingReport {
    let samples = SAMPLES.with(|samples| std::mem::take(&mut *samples.borrow_mut()));

    let mut grouped: BTreeMap<String, (Vec<Duration>, usize)> = BTreeMap::new();
    for sample in samples {
        let entry = grouped.entry(sample.name).or_default();
        entry.0.push(sample.elapsed);
        if sample.failed {
            entry.1 += 1;
        }
    }

    let operations = grouped
        .into_iter()
        .map(|(name, (mut values, errors))| {
            values.sort_unstable();
            let count = values.len();

            OpTiming {
                name,
                p50: percentile(&values, 50),
                p95: percentile(&values, 95),
                count,
                errors,
            }
        })
        .collect();

    TimingReport { operations }
}

impl TimingReport {
    /// Returns true when no timing samples were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Render the timing report as JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let operations = self
            .operations
            .iter()
            .map(|op| {
                json!({
                    "name": op.name,
                    "count": op.count,
                    "errors": op.errors,
                    "p50_us": op.p50.as_micros(),
                    "p95_us": op.p95.as_micros(),
                })
            })
            .collect::<Vec<_>>();

        json!({ "operations": operations })
    }

    /// Render the timing report as a simple table for terminal output.
    #[must_use]
    pub fn display_table(&self) -> String {
        if self.operations.is_empty() {
            return "No timing samples recorded.".to_string();
        }

        let mut out = String::new();
        out.push_str("operation                    count   errors      p50      p95\n");
        out.push_str("--------------------------------------------------------------\n");

        for op in &self.operations {
            out.push_str(&format!(
                "{:<28} {:>6} {:>8} {:>8} {:>8}\n",
                op.name,
                op.count,
                op.errors,
                format_duration(op.p50),
                format_duration(op.p95),
            ));
        }

        out
    }
}

fn record_sample(name: &str, elapsed: Duration, failed: bool) {
    SAMPLES.with(|samples| {
        samples.borrow_mut().push(Sample {
            name: name.to_string(),
            elapsed,
            failed,
        });
    });
}

fn percentile(sorted: &[Duration], pct: u32) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }

    let pct_usize = usize::try_from(pct).unwrap_or(100).min(100);
    let rank = pct_usize.saturating_mul(sorted.len()).saturating_add(99) / 100;
    let index = rank.saturating_sub(1).min(sorted.len().saturating_sub(1));

    sorted[index]
}

fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();

    if micros >= 1_000_000 {
        let secs = micros / 1_000_000;
        let millis = (micros % 1_000_000) / 1_000;
        format!("{secs}.{millis:03}s")
    } else if micros >= 1_000 {
        let millis = micros / 1_000;
        let rem = micros % 1_000;
        format!("{millis}.{rem:03}ms")
    } else {
        format!("{micros}µs")
    }
}

fn is_truthy(value: &str) -> bool {
    value.eq_ignore_ascii_case("1")
        || value.eq_ignore_ascii_case("true")
        || value.eq_ignore_ascii_case("yes")
        || value.eq_ignore_ascii_case("on")
}
