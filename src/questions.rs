//! The three questions, written once against `Aggregator`.
//!
//! - `active_dates`: top-k dates by tweet volume and the most active user on each (two passes).
//! - `top_emojis`: top-k emoji clusters in tweet content.
//! - `top_mentions`: top-k mentioned usernames, case-insensitive.

use crate::aggregate::{Accumulator, Aggregator};
use crate::counting::FrequencyTable;
use crate::date::serialize_iso_date;
use crate::emoji::emoji_clusters;
use crate::error::Result;
use crate::record::Row;
use ahash::{AHashMap, AHashSet};
use serde::Serialize;
use time::Date;

/// One Q1 result line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActiveDate {
    #[serde(serialize_with = "serialize_iso_date")]
    pub date: Date,
    pub top_user: String,
}

/// `(key, count)` pairs, count descending then key ascending.
pub type Ranking = Vec<(String, u64)>;

// ----------------------------- Q1 ------------------------------------

#[derive(Default)]
pub struct DateCounts(pub FrequencyTable<Date>);

impl Accumulator for DateCounts {
    fn ingest(&mut self, row: &Row<'_>) {
        if let Some(d) = row.date {
            self.0.add(d);
        }
    }
    fn merge(&mut self, other: Self) {
        self.0.merge(other.0);
    }
}

/// Per-(date, username) counts, restricted to the winning dates of the first pass.
pub struct DateUserCounts<'w> {
    winners: &'w AHashSet<Date>,
    pub counts: FrequencyTable<(Date, String)>,
}

impl<'w> DateUserCounts<'w> {
    pub fn new(winners: &'w AHashSet<Date>) -> Self {
        Self { winners, counts: FrequencyTable::new() }
    }
}

impl Accumulator for DateUserCounts<'_> {
    fn ingest(&mut self, row: &Row<'_>) {
        let (Some(date), Some(user)) = (row.date, row.username) else { return };
        if user.is_empty() || !self.winners.contains(&date) {
            return;
        }
        self.counts.add((date, user.to_owned()));
    }
    fn merge(&mut self, other: Self) {
        self.counts.merge(other.counts);
    }
}

/// Most active user per date: highest count, smallest username on ties.
pub fn top_user_per_date(counts: &FrequencyTable<(Date, String)>) -> AHashMap<Date, (&str, u64)> {
    let mut best: AHashMap<Date, (&str, u64)> = AHashMap::new();
    for ((date, user), n) in counts.iter() {
        let candidate = (user.as_str(), n);
        best.entry(*date)
            .and_modify(|cur| {
                if n > cur.1 || (n == cur.1 && candidate.0 < cur.0) {
                    *cur = candidate;
                }
            })
            .or_insert(candidate);
    }
    best
}

pub fn active_dates<A: Aggregator>(agg: &A, k: usize) -> Result<Vec<ActiveDate>> {
    let DateCounts(per_date) = agg.fold(DateCounts::default)?;
    let mut winners = per_date.top_k(k);
    // volume descending, then date descending
    winners.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));
    tracing::debug!(dates = per_date.len(), selected = winners.len(), "first pass done");

    let selected: AHashSet<Date> = winners.iter().map(|(d, _)| *d).collect();
    let per_user = agg.fold(|| DateUserCounts::new(&selected))?;
    let best = top_user_per_date(&per_user.counts);

    Ok(winners
        .into_iter()
        .filter_map(|(date, _)| {
            best.get(&date).map(|(user, _)| ActiveDate { date, top_user: (*user).to_owned() })
        })
        .collect())
}

// ----------------------------- Q2 ------------------------------------

#[derive(Default)]
pub struct EmojiCounts(pub FrequencyTable<String>);

impl Accumulator for EmojiCounts {
    fn ingest(&mut self, row: &Row<'_>) {
        let Some(content) = row.content else { return };
        for e in emoji_clusters(content) {
            self.0.add_ref(e);
        }
    }
    fn merge(&mut self, other: Self) {
        self.0.merge(other.0);
    }
}

pub fn top_emojis<A: Aggregator>(agg: &A, k: usize) -> Result<Ranking> {
    let EmojiCounts(counts) = agg.fold(EmojiCounts::default)?;
    tracing::debug!(distinct = counts.len(), "emoji pass done");
    Ok(counts.top_k(k))
}

// ----------------------------- Q3 ------------------------------------

#[derive(Default)]
pub struct MentionCounts(pub FrequencyTable<String>);

impl Accumulator for MentionCounts {
    fn ingest(&mut self, row: &Row<'_>) {
        for m in row.mentions {
            match m.username.as_deref() {
                Some(name) if !name.is_empty() => self.0.add(name.to_lowercase()),
                _ => {}
            }
        }
    }
    fn merge(&mut self, other: Self) {
        self.0.merge(other.0);
    }
}

pub fn top_mentions<A: Aggregator>(agg: &A, k: usize) -> Result<Ranking> {
    let MentionCounts(counts) = agg.fold(MentionCounts::default)?;
    tracing::debug!(distinct = counts.len(), "mention pass done");
    Ok(counts.top_k(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    #[test]
    fn top_user_prefers_count_then_smaller_name() {
        let d = Date::from_calendar_date(2021, Month::February, 12).unwrap();
        let mut t = FrequencyTable::new();
        t.add((d, "userB".to_string()));
        t.add((d, "userA".to_string()));
        assert_eq!(top_user_per_date(&t)[&d], ("userA", 1));
        t.add((d, "userB".to_string()));
        assert_eq!(top_user_per_date(&t)[&d], ("userB", 2));
    }
}
