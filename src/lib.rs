mod config;
mod date;
mod error;
mod record;
mod source;
mod progress;
mod util;

mod emoji;
mod topk;
mod counting;
mod frame;
mod aggregate;
mod questions;
mod pipeline;

mod entrypoint;
mod perf;

pub use crate::config::{Options, OBJECT_ROOT_ENV};
pub use crate::error::{Error, Result};
pub use crate::pipeline::{Answer, Question, Strategy, TweetStats};
pub use crate::questions::{active_dates, top_emojis, top_mentions, ActiveDate, Ranking};

// strategies and the capability they share, for callers writing their own accumulators
pub use crate::aggregate::{Accumulator, Aggregator, StreamAggregator};
pub use crate::frame::{Columns, TweetFrame};
pub use crate::record::{parse_tweet, Mention, Row, Tweet, User};
pub use crate::source::{for_each_tweet, Location, NdjsonReader, ScanStats};

pub use crate::counting::FrequencyTable;
pub use crate::emoji::emoji_clusters;
pub use crate::topk::top_k;

pub use crate::entrypoint::{output_object_name, Entrypoint, Response, ResultSink};
pub use crate::perf::{bench, measure, BenchRow, Measurement};

// progress and logging helpers for the binary
pub use crate::progress::make_progress_bar_labeled;
pub use crate::util::{create_with_backoff, init_tracing_once, open_with_backoff};
