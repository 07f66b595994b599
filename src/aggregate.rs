//! The shared aggregation capability.
//! Questions implement `Accumulator` once; each execution strategy implements
//! `Aggregator` by folding accumulators over its own view of the input.

use crate::config::Options;
use crate::error::Result;
use crate::frame::TweetFrame;
use crate::record::Row;
use crate::source::{for_each_tweet, Location};
use rayon::prelude::*;

pub trait Accumulator: Send {
    fn ingest(&mut self, row: &Row<'_>);
    fn merge(&mut self, other: Self);
}

/// A backend that can fold an accumulator over every record of one input.
/// Every call is a full pass.
pub trait Aggregator {
    fn fold<A, F>(&self, init: F) -> Result<A>
    where
        A: Accumulator,
        F: Fn() -> A + Send + Sync;
}

/// Memory strategy: re-reads the source on every pass, one record at a time,
/// into a single accumulator.
pub struct StreamAggregator<'a> {
    location: &'a Location,
    opts: &'a Options,
}

impl<'a> StreamAggregator<'a> {
    pub fn new(location: &'a Location, opts: &'a Options) -> Self {
        Self { location, opts }
    }
}

impl Aggregator for StreamAggregator<'_> {
    fn fold<A, F>(&self, init: F) -> Result<A>
    where
        A: Accumulator,
        F: Fn() -> A + Send + Sync,
    {
        let mut acc = init();
        let stats = for_each_tweet(self.location, self.opts, |tweet| acc.ingest(&tweet.row()))?;
        tracing::debug!(lines = stats.lines, records = stats.records, skipped = stats.skipped, "streaming pass done");
        Ok(acc)
    }
}

/// Rows per rayon task; keeps the number of partial accumulators small.
const MIN_ROWS_PER_TASK: usize = 4 * 1024;

/// Time strategy: folds in parallel over the materialized columns and merges
/// the partial accumulators.
impl Aggregator for TweetFrame {
    fn fold<A, F>(&self, init: F) -> Result<A>
    where
        A: Accumulator,
        F: Fn() -> A + Send + Sync,
    {
        let acc = (0..self.len())
            .into_par_iter()
            .with_min_len(MIN_ROWS_PER_TASK)
            .fold(&init, |mut acc, i| {
                acc.ingest(&self.row(i));
                acc
            })
            .reduce(&init, |mut a, b| {
                a.merge(b);
                a
            });
        Ok(acc)
    }
}
