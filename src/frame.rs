//! Columnar, fully materialized batch of tweets.
//!
//! The loader reads lines in chunks, decodes each chunk in parallel and
//! appends only the projected columns. Unlike the streaming scan, a line that
//! is not a JSON object aborts the load with `DecodeFatal`; field-level type
//! mismatches still coerce to null.

use crate::config::Options;
use crate::error::{Error, Result};
use crate::record::{parse_tweet, Mention, Row, Tweet};
use crate::source::{is_blank, Location, NdjsonReader};
use rayon::prelude::*;
use time::Date;

/// Which record fields the frame keeps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Columns {
    pub date: bool,
    pub username: bool,
    pub content: bool,
    pub mentions: bool,
}

impl Columns {
    pub const ALL: Columns = Columns { date: true, username: true, content: true, mentions: true };
    pub const DATE_USERNAME: Columns = Columns { date: true, username: true, content: false, mentions: false };
    pub const CONTENT: Columns = Columns { date: false, username: false, content: true, mentions: false };
    pub const MENTIONS: Columns = Columns { date: false, username: false, content: false, mentions: true };
}

#[derive(Debug, Default)]
pub struct TweetFrame {
    columns: Columns,
    len: usize,
    date: Vec<Option<Date>>,
    username: Vec<Option<String>>,
    content: Vec<Option<String>>,
    // list column: mentions of row i are mention_values[mention_offsets[i]..mention_offsets[i + 1]]
    mention_offsets: Vec<usize>,
    mention_values: Vec<Mention>,
}

impl TweetFrame {
    pub fn new(columns: Columns) -> Self {
        let mut frame = Self { columns, ..Default::default() };
        if columns.mentions {
            frame.mention_offsets.push(0);
        }
        frame
    }

    /// Read the whole input into a frame holding `columns`.
    pub fn load(location: &Location, columns: Columns, opts: &Options) -> Result<Self> {
        let mut rdr = NdjsonReader::open(location, opts)?;
        let mut frame = Self::new(columns);
        let chunk_lines = opts.batch_chunk_lines.max(1);
        let mut chunk: Vec<(u64, Vec<u8>)> = Vec::with_capacity(chunk_lines);

        loop {
            let mut buf = Vec::new();
            match rdr.read_line(&mut buf)? {
                Some(line_no) => {
                    if !is_blank(&buf) {
                        chunk.push((line_no, buf));
                    }
                    if chunk.len() >= chunk_lines {
                        frame.append_chunk(&chunk)?;
                        chunk.clear();
                    }
                }
                None => break,
            }
        }
        frame.append_chunk(&chunk)?;

        tracing::debug!(%location, rows = frame.len, "columnar frame loaded");
        Ok(frame)
    }

    fn append_chunk(&mut self, chunk: &[(u64, Vec<u8>)]) -> Result<()> {
        let decoded: Vec<(u64, serde_json::Result<Tweet>)> = chunk
            .par_iter()
            .map(|(line_no, bytes)| (*line_no, parse_tweet(bytes)))
            .collect();
        // first failure in input order, regardless of which thread hit it
        for (line_no, res) in decoded {
            match res {
                Ok(tweet) => self.push(&tweet),
                Err(source) => return Err(Error::DecodeFatal { line: line_no, source }),
            }
        }
        Ok(())
    }

    /// Append one record, keeping only the projected columns.
    pub fn push(&mut self, tweet: &Tweet) {
        let row = tweet.row();
        if self.columns.date {
            self.date.push(row.date);
        }
        if self.columns.username {
            self.username.push(row.username.map(str::to_owned));
        }
        if self.columns.content {
            self.content.push(row.content.map(str::to_owned));
        }
        if self.columns.mentions {
            self.mention_values.extend_from_slice(row.mentions);
            self.mention_offsets.push(self.mention_values.len());
        }
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn columns(&self) -> Columns {
        self.columns
    }

    /// Row view at `i`; columns that were not loaded read as empty.
    pub fn row(&self, i: usize) -> Row<'_> {
        let mentions: &[Mention] = match (self.mention_offsets.get(i), self.mention_offsets.get(i + 1)) {
            (Some(&lo), Some(&hi)) => &self.mention_values[lo..hi],
            _ => &[],
        };
        Row {
            date: self.date.get(i).copied().flatten(),
            username: self.username.get(i).and_then(|u| u.as_deref()),
            content: self.content.get(i).and_then(|c| c.as_deref()),
            mentions,
        }
    }
}
