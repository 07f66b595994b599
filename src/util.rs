use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::sync::Once;
use std::thread::sleep;
use std::time::Duration;

static TRACING: Once = Once::new();

/// Install the stderr `fmt` subscriber, filtered by `RUST_LOG` (default `info`).
/// Later calls, or a subscriber installed by the host, win silently.
pub fn init_tracing_once() {
    TRACING.call_once(|| {
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .try_init();
    });
}

/// Size the global rayon pool once; later calls (or a pool built elsewhere) are ignored.
pub fn init_rayon_once(threads: Option<usize>) {
    if let Some(n) = threads.filter(|&n| n > 0) {
        if rayon::ThreadPoolBuilder::new().num_threads(n).build_global().is_err() {
            tracing::debug!(threads = n, "rayon pool already initialized");
        }
    }
}

// Windows: sharing/lock violations and access-denied raised by scanners holding the file.
#[cfg(windows)]
const TRANSIENT_OS_CODES: &[i32] = &[5, 21, 32, 33, 1117];
#[cfg(not(windows))]
const TRANSIENT_OS_CODES: &[i32] = &[];

fn is_transient(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock)
        || e.raw_os_error().map_or(false, |c| TRANSIENT_OS_CODES.contains(&c))
}

/// Retry `op` on transient errors, sleeping `delay_ms * attempt` between tries.
fn retry_io<T>(tries: usize, delay_ms: u64, mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let tries = tries.max(1);
    let mut attempt = 1;
    loop {
        match op() {
            Err(e) if attempt < tries && is_transient(&e) => {
                tracing::debug!(attempt, error = %e, "transient I/O error, retrying");
                sleep(Duration::from_millis(delay_ms.saturating_mul(attempt as u64)));
                attempt += 1;
            }
            res => return res,
        }
    }
}

pub fn open_with_backoff(path: &Path, tries: usize, delay_ms: u64) -> io::Result<File> {
    retry_io(tries, delay_ms, || File::open(path))
}

/// Create (truncate) `path`, making its parent directories first.
pub fn create_with_backoff(path: &Path, tries: usize, delay_ms: u64) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    retry_io(tries, delay_ms, || File::create(path))
}
