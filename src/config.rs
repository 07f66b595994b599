use std::path::{Path, PathBuf};

/// Environment variable naming the local mirror used for `scheme://bucket/key` inputs.
pub const OBJECT_ROOT_ENV: &str = "TWEETSTATS_OBJECT_ROOT";

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct Options {
    pub top_k: usize,                 // entries kept by every ranking step
    pub parallelism: Option<usize>,   // Some(N) to set rayon threads, None to use default
    pub progress: bool,               // show a byte progress bar while reading
    pub progress_label: Option<String>,
    pub object_root: Option<PathBuf>, // <root>/<bucket>/<key> for object references

    // IO tuning
    pub read_buffer_bytes: usize,     // BufReader capacity
    pub batch_chunk_lines: usize,     // lines decoded per parallel chunk by the columnar loader
}

impl Default for Options {
    fn default() -> Self {
        Self {
            top_k: 10,
            parallelism: None,
            progress: false,
            progress_label: None,
            object_root: None,
            read_buffer_bytes: 256 * 1024,
            batch_chunk_lines: 64 * 1024,
        }
    }
}

impl Options {
    /// Defaults plus overrides taken from the environment.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Ok(root) = std::env::var(OBJECT_ROOT_ENV) {
            if !root.trim().is_empty() {
                opts.object_root = Some(PathBuf::from(root.trim()));
            }
        }
        opts
    }

    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }
    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
    pub fn with_object_root(mut self, dir: impl AsRef<Path>) -> Self {
        self.object_root = Some(dir.as_ref().to_path_buf());
        self
    }

    // IO buffers tuning
    pub fn with_io_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_batch_chunk_lines(mut self, lines: usize) -> Self {
        self.batch_chunk_lines = lines.max(1);
        self
    }
}
