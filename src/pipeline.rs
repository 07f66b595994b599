use crate::aggregate::{Accumulator, Aggregator, StreamAggregator};
use crate::config::Options;
use crate::error::Result;
use crate::frame::{Columns, TweetFrame};
use crate::questions::{active_dates, top_emojis, top_mentions, ActiveDate, Ranking};
use crate::source::Location;
use crate::util::{init_rayon_once, init_tracing_once};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

/// Execution strategy: `Time` materializes a columnar frame and folds in
/// parallel; `Memory` streams the input record by record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    Time,
    Memory,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Question {
    /// Most active dates and their top user.
    Q1,
    /// Most used emojis.
    Q2,
    /// Most mentioned users.
    Q3,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::Time, Strategy::Memory];
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Time => "time",
            Strategy::Memory => "memory",
        }
    }
}

impl Question {
    pub const ALL: [Question; 3] = [Question::Q1, Question::Q2, Question::Q3];
    pub fn as_str(self) -> &'static str {
        match self {
            Question::Q1 => "q1",
            Question::Q2 => "q2",
            Question::Q3 => "q3",
        }
    }

    /// Columns the columnar frame must load to answer this question.
    pub fn columns(self) -> Columns {
        match self {
            Question::Q1 => Columns::DATE_USERNAME,
            Question::Q2 => Columns::CONTENT,
            Question::Q3 => Columns::MENTIONS,
        }
    }
}

impl FromStr for Strategy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "time" => Ok(Strategy::Time),
            "memory" => Ok(Strategy::Memory),
            other => Err(format!("unknown strategy: {other} (expected time|memory)")),
        }
    }
}

impl FromStr for Question {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "q1" => Ok(Question::Q1),
            "q2" => Ok(Question::Q2),
            "q3" => Ok(Question::Q3),
            other => Err(format!("unknown question: {other} (expected q1|q2|q3)")),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any question's result, serialized as its bare list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    ActiveDates(Vec<ActiveDate>),
    Emojis(Ranking),
    Mentions(Ranking),
}

impl Answer {
    pub fn len(&self) -> usize {
        match self {
            Answer::ActiveDates(v) => v.len(),
            Answer::Emojis(v) | Answer::Mentions(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug)]
pub struct TweetStats {
    pub(crate) opts: Options,
}

impl Default for TweetStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TweetStats {
    pub fn new() -> Self {
        Self { opts: Options::from_env() }
    }

    pub fn with_options(opts: Options) -> Self {
        Self { opts }
    }

    // -------- Builder methods --------
    pub fn top_k(mut self, k: usize) -> Self { self.opts = self.opts.with_top_k(k); self }
    pub fn parallelism(mut self, threads: usize) -> Self { self.opts = self.opts.with_parallelism(threads); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }
    pub fn object_root(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_object_root(dir); self }
    pub fn io_read_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_read_buffer(bytes); self }
    pub fn batch_chunk_lines(mut self, lines: usize) -> Self { self.opts = self.opts.with_batch_chunk_lines(lines); self }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    // -------- Questions --------

    pub fn active_dates(&self, location: &str, strategy: Strategy) -> Result<Vec<ActiveDate>> {
        self.execute(Question::Q1, strategy, location, |b, k| active_dates(b, k))
    }

    pub fn top_emojis(&self, location: &str, strategy: Strategy) -> Result<Ranking> {
        self.execute(Question::Q2, strategy, location, |b, k| top_emojis(b, k))
    }

    pub fn top_mentions(&self, location: &str, strategy: Strategy) -> Result<Ranking> {
        self.execute(Question::Q3, strategy, location, |b, k| top_mentions(b, k))
    }

    /// Answer `question` over the input at `location` with `strategy`.
    pub fn run(&self, question: Question, strategy: Strategy, location: &str) -> Result<Answer> {
        Ok(match question {
            Question::Q1 => Answer::ActiveDates(self.active_dates(location, strategy)?),
            Question::Q2 => Answer::Emojis(self.top_emojis(location, strategy)?),
            Question::Q3 => Answer::Mentions(self.top_mentions(location, strategy)?),
        })
    }

    fn execute<T>(
        &self,
        question: Question,
        strategy: Strategy,
        location: &str,
        answer: impl FnOnce(&Backend<'_>, usize) -> Result<T>,
    ) -> Result<T> {
        init_tracing_once();
        init_rayon_once(self.opts.parallelism);

        let location: Location = location.parse()?;
        let k = self.opts.top_k;
        let started = Instant::now();
        tracing::info!(%question, %strategy, %location, k, "query started");

        let res = match strategy {
            Strategy::Memory => answer(&Backend::Stream(StreamAggregator::new(&location, &self.opts)), k),
            Strategy::Time => TweetFrame::load(&location, question.columns(), &self.opts)
                .and_then(|frame| answer(&Backend::Frame(frame), k)),
        };

        match &res {
            Ok(_) => tracing::info!(%question, %strategy, elapsed_ms = started.elapsed().as_millis() as u64, "query finished"),
            Err(e) => tracing::warn!(%question, %strategy, error = %e, "query failed"),
        }
        res
    }
}

/// The two execution strategies behind one `Aggregator`.
enum Backend<'a> {
    Stream(StreamAggregator<'a>),
    Frame(TweetFrame),
}

impl Aggregator for Backend<'_> {
    fn fold<A, F>(&self, init: F) -> Result<A>
    where
        A: Accumulator,
        F: Fn() -> A + Send + Sync,
    {
        match self {
            Backend::Stream(s) => s.fold(init),
            Backend::Frame(f) => f.fold(init),
        }
    }
}
