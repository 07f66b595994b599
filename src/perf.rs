//! Benchmark harness: wall time and peak resident memory per question/strategy.
//!
//! Memory is sampled from a background thread while the measured closure runs,
//! so the peak is approximate (sampling interval `SAMPLE_EVERY`).

use crate::pipeline::{Question, Strategy, TweetStats};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use sysinfo::{Pid, ProcessExt, System, SystemExt};

const SAMPLE_EVERY: Duration = Duration::from_millis(100);

#[derive(Clone, Debug)]
pub struct Measurement {
    pub label: String,
    pub elapsed: Duration,
    pub baseline_rss_bytes: u64,
    pub peak_rss_bytes: u64,
}

impl Measurement {
    /// Peak growth over the resident size seen just before the run.
    pub fn peak_delta_bytes(&self) -> u64 {
        self.peak_rss_bytes.saturating_sub(self.baseline_rss_bytes)
    }
}

fn rss_bytes(sys: &mut System, pid: Pid) -> u64 {
    sys.refresh_process(pid);
    sys.process(pid).map(|p| p.memory()).unwrap_or(0)
}

/// Raises the sampler's stop flag when dropped, including while unwinding.
struct StopSampler<'a>(&'a AtomicBool);

impl Drop for StopSampler<'_> {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Run `f` once, timing it and tracking the process's peak resident memory.
pub fn measure<T>(label: &str, f: impl FnOnce() -> T) -> (T, Measurement) {
    let pid = sysinfo::get_current_pid().ok();
    let baseline = pid.map(|p| rss_bytes(&mut System::new(), p)).unwrap_or(0);
    let peak = AtomicU64::new(baseline);
    let stop = AtomicBool::new(false);

    let started = Instant::now();
    let out = std::thread::scope(|s| {
        if let Some(pid) = pid {
            let (peak, stop) = (&peak, &stop);
            s.spawn(move || {
                let mut sys = System::new();
                loop {
                    peak.fetch_max(rss_bytes(&mut sys, pid), Ordering::Relaxed);
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }
                    std::thread::sleep(SAMPLE_EVERY);
                }
            });
        }
        let _stop = StopSampler(&stop);
        f()
    });
    let elapsed = started.elapsed();

    let m = Measurement {
        label: label.to_string(),
        elapsed,
        baseline_rss_bytes: baseline,
        peak_rss_bytes: peak.load(Ordering::Relaxed),
    };
    tracing::info!(
        label,
        elapsed_ms = m.elapsed.as_millis() as u64,
        peak_mib = m.peak_rss_bytes as f64 / (1024.0 * 1024.0),
        "measured"
    );
    (out, m)
}

pub struct BenchRow {
    pub question: Question,
    pub strategy: Strategy,
    pub measurement: Measurement,
    /// Number of result rows, or the error message.
    pub outcome: Result<usize, String>,
}

/// Run every question with every strategy over `location`, one after another.
pub fn bench(stats: &TweetStats, location: &str) -> Vec<BenchRow> {
    let mut rows = Vec::with_capacity(Question::ALL.len() * Strategy::ALL.len());
    for question in Question::ALL {
        for strategy in Strategy::ALL {
            let label = format!("{question}_{strategy}");
            let (res, measurement) = measure(&label, || stats.run(question, strategy, location));
            let outcome = res.map(|a| a.len()).map_err(|e| e.to_string());
            rows.push(BenchRow { question, strategy, measurement, outcome });
        }
    }
    rows
}
