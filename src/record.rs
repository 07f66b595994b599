//! Loosely-typed tweet records.
//!
//! Every field is optional. A field that is present with the wrong JSON type
//! decodes as `None` instead of failing the whole line, so a record is only
//! skipped for the question that needs the broken field. Unknown fields are ignored.

use crate::date::tweet_date;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use time::Date;

#[derive(Debug, Default, Deserialize)]
pub struct Tweet {
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub user: Option<User>,
    #[serde(default, rename = "mentionedUsers", deserialize_with = "lenient_list")]
    pub mentioned_users: Option<Vec<Mention>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "lenient")]
    pub username: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Mention {
    #[serde(default, deserialize_with = "lenient")]
    pub username: Option<String>,
}

fn lenient<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Value::deserialize(de)?;
    Ok(serde_json::from_value(v).ok())
}

/// Non-array values become `None`; array elements of the wrong shape are dropped.
fn lenient_list<'de, D, T>(de: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(de)? {
        Value::Array(items) => Ok(Some(
            items.into_iter().filter_map(|v| serde_json::from_value(v).ok()).collect(),
        )),
        _ => Ok(None),
    }
}

/// Decode one NDJSON line.
#[inline]
pub fn parse_tweet(line: &[u8]) -> serde_json::Result<Tweet> {
    serde_json::from_slice(line)
}

/// The normalized view every accumulator ingests, whichever backend produced it.
/// Columns a backend did not load read as `None` / empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct Row<'a> {
    pub date: Option<Date>,
    pub username: Option<&'a str>,
    pub content: Option<&'a str>,
    pub mentions: &'a [Mention],
}

impl Tweet {
    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.username.as_deref())
    }

    pub fn row(&self) -> Row<'_> {
        Row {
            date: self.date.as_deref().and_then(tweet_date),
            username: self.username(),
            content: self.content.as_deref(),
            mentions: self.mentioned_users.as_deref().unwrap_or(&[]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_types_become_none() {
        let t = parse_tweet(br#"{"date": 5, "content": null, "user": "bob", "mentionedUsers": {"a": 1}}"#).unwrap();
        assert!(t.date.is_none());
        assert!(t.content.is_none());
        assert!(t.user.is_none());
        assert!(t.mentioned_users.is_none());
    }

    #[test]
    fn bad_mention_entries_are_dropped() {
        let t = parse_tweet(br#"{"mentionedUsers": [{"username": "A"}, 7, {"username": null}, {}]}"#).unwrap();
        let m = t.mentioned_users.unwrap();
        assert_eq!(m.len(), 3);
        assert_eq!(m[0].username.as_deref(), Some("A"));
        assert!(m[1].username.is_none());
    }

    #[test]
    fn broken_json_is_an_error() {
        assert!(parse_tweet(br#"{"date": "BROKEN "#).is_err());
        assert!(parse_tweet(b"42").is_err());
    }
}
