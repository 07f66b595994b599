//! Record source: resolve a location, open it (optionally zstd-compressed), and
//! hand out NDJSON lines. `for_each_tweet` is the streaming scan: lines that do
//! not decode are counted and dropped, never surfaced.

use crate::config::{Options, OBJECT_ROOT_ENV};
use crate::error::{Error, Result};
use crate::progress::{make_progress_bar_labeled, ProgressReader};
use crate::record::{parse_tweet, Tweet};
use crate::util::open_with_backoff;
use std::fmt;
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// Where an input lives: a local path, or a `scheme://bucket/key` object reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Location {
    Local(PathBuf),
    Object { scheme: String, bucket: String, key: String },
}

impl Location {
    pub fn object(scheme: impl Into<String>, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Location::Object { scheme: scheme.into(), bucket: bucket.into(), key: key.into() }
    }

    /// Local path, or `<root>/<bucket>/<key>` for object references.
    pub fn resolve(&self, object_root: Option<&Path>) -> Result<PathBuf> {
        match self {
            Location::Local(p) => Ok(p.clone()),
            Location::Object { bucket, key, .. } => {
                let root = object_root.ok_or_else(|| Error::SourceUnreachable {
                    location: self.to_string(),
                    source: io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("no object store configured (set {OBJECT_ROOT_ENV})"),
                    ),
                })?;
                Ok(root.join(bucket).join(key))
            }
        }
    }

    pub fn is_zstd(&self) -> bool {
        match self {
            Location::Local(p) => p.extension().map_or(false, |e| e == "zst"),
            Location::Object { key, .. } => key.ends_with(".zst"),
        }
    }
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidLocation("empty location".into()));
        }
        let Some((scheme, rest)) = s.split_once("://") else {
            return Ok(Location::Local(PathBuf::from(s)));
        };
        if scheme.eq_ignore_ascii_case("file") {
            return Ok(Location::Local(PathBuf::from(rest)));
        }
        match rest.split_once('/') {
            Some((bucket, key)) if !scheme.is_empty() && !bucket.is_empty() && !key.is_empty() => {
                let escapes = Path::new(key)
                    .components()
                    .any(|c| !matches!(c, Component::Normal(_)));
                if escapes {
                    return Err(Error::InvalidLocation(format!("object key must be relative: {s}")));
                }
                Ok(Location::object(scheme, bucket, key))
            }
            _ => Err(Error::InvalidLocation(format!("expected scheme://bucket/key, got {s}"))),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local(p) => write!(f, "{}", p.display()),
            Location::Object { scheme, bucket, key } => write!(f, "{scheme}://{bucket}/{key}"),
        }
    }
}

/// Buffered NDJSON line reader over a boxed (possibly decompressing) stream.
pub struct NdjsonReader {
    rdr: Box<dyn BufRead + Send>,
    location: String,
    line_no: u64,
}

impl NdjsonReader {
    pub fn open(location: &Location, opts: &Options) -> Result<Self> {
        let unreachable = |source: io::Error| Error::SourceUnreachable { location: location.to_string(), source };
        let read_err = |source: io::Error| Error::Read { location: location.to_string(), source };

        let path = location.resolve(opts.object_root.as_deref())?;
        let meta = fs::metadata(&path).map_err(unreachable)?;
        if !meta.is_file() {
            return Err(unreachable(io::Error::new(io::ErrorKind::InvalidInput, "not a regular file")));
        }
        let file = open_with_backoff(&path, 16, 50).map_err(unreachable)?;

        let pb = if opts.progress {
            Some(make_progress_bar_labeled(meta.len(), opts.progress_label.as_deref()))
        } else {
            None
        };
        let raw = ProgressReader::new(file, pb);
        let cap = opts.read_buffer_bytes.max(8 * 1024);

        let rdr: Box<dyn BufRead + Send> = if location.is_zstd() {
            let mut dec = zstd::stream::read::Decoder::new(raw).map_err(read_err)?;
            dec.window_log_max(31).map_err(read_err)?;
            Box::new(BufReader::with_capacity(cap, dec))
        } else {
            Box::new(BufReader::with_capacity(cap, raw))
        };

        tracing::debug!(%location, path = %path.display(), bytes = meta.len(), "opened source");
        Ok(Self { rdr, location: location.to_string(), line_no: 0 })
    }

    /// Read the next line into `buf`, without its `\r?\n` terminator.
    /// Returns the 1-based line number, or `None` at EOF.
    pub fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<Option<u64>> {
        buf.clear();
        let n = self.rdr.read_until(b'\n', buf).map_err(|source| Error::Read {
            location: self.location.clone(),
            source,
        })?;
        if n == 0 {
            return Ok(None);
        }
        if buf.ends_with(b"\n") {
            buf.pop();
            if buf.ends_with(b"\r") {
                buf.pop();
            }
        }
        self.line_no += 1;
        Ok(Some(self.line_no))
    }
}

#[inline]
pub(crate) fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub lines: u64,
    pub records: u64,
    pub skipped: u64,
}

/// Stream every decodable record to `on_tweet`, one at a time.
pub fn for_each_tweet(location: &Location, opts: &Options, mut on_tweet: impl FnMut(&Tweet)) -> Result<ScanStats> {
    let mut rdr = NdjsonReader::open(location, opts)?;
    let mut stats = ScanStats::default();
    let mut buf = Vec::with_capacity(16 * 1024);

    while let Some(line_no) = rdr.read_line(&mut buf)? {
        stats.lines += 1;
        if is_blank(&buf) {
            continue;
        }
        match parse_tweet(&buf) {
            Ok(tweet) => {
                stats.records += 1;
                on_tweet(&tweet);
            }
            Err(e) => {
                stats.skipped += 1;
                tracing::trace!(line = line_no, error = %e, "skipping malformed line");
            }
        }
    }

    if stats.skipped > 0 {
        tracing::debug!(%location, skipped = stats.skipped, "malformed lines skipped");
    }
    Ok(stats)
}
