#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tweetstats::{Options, TweetStats};

pub const FAMILY: &str = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}\u{200D}\u{1F466}";
pub const HEART: &str = "\u{2764}\u{FE0F}";
pub const PRAY: &str = "\u{1F64F}";
pub const FLAG_AR: &str = "\u{1F1E6}\u{1F1F7}";

/// One tweet line. `mentions: None` writes `"mentionedUsers": null`.
pub fn tweet(date: &str, username: &str, content: &str, mentions: Option<&[&str]>) -> String {
    let mentioned = match mentions {
        Some(ms) => Value::Array(ms.iter().map(|m| json!({ "username": m })).collect()),
        None => Value::Null,
    };
    json!({
        "url": "https://twitter.com/x/status/1",
        "date": date,
        "content": content,
        "id": 1,
        "user": { "username": username, "followersCount": 10 },
        "mentionedUsers": mentioned,
        "lang": "es",
    })
    .to_string()
}

/// Write plain NDJSON lines (one per entry, newline-terminated).
pub fn write_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = File::create(path).unwrap();
    for l in lines {
        writeln!(f, "{}", l).unwrap();
    }
}

/// Write a compressed `.zst` file containing the provided NDJSON lines.
pub fn write_zst_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let f = File::create(path).unwrap();
    let mut enc = zstd::stream::write::Encoder::new(f, 3).unwrap();
    for l in lines {
        writeln!(&mut enc, "{}", l).unwrap();
    }
    enc.finish().unwrap();
}

/// Lines in a fresh temp dir; keep the `TempDir` alive for the test's duration.
pub fn ndjson_file(lines: &[String]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tweets.json");
    write_lines(&path, lines);
    (dir, path)
}

/// Facade with default options, ignoring the caller's environment.
pub fn stats() -> TweetStats {
    TweetStats::with_options(Options::default())
}

pub fn s(path: &Path) -> String {
    path.to_str().unwrap().to_string()
}

/// A small corpus touching every question:
/// - 2021-02-12: alice x2, bob x1 (volume 3)
/// - 2021-02-13: carol x1, dave x1 (volume 2, tie on top user)
/// - 2021-02-14: erin x1, written with a -03:00 offset
///
/// Emojis: heart x2, pray x2, flag x1, family x1.
/// Mentions: latam x2 (mixed case), bob x1, erin x1, plus null/empty entries.
pub fn corpus_basic() -> Vec<String> {
    vec![
        tweet("2021-02-12T10:00:00+00:00", "alice", &format!("hola {HEART} {HEART}"), Some(&["LATAM"])),
        tweet("2021-02-12T11:00:00+00:00", "bob", &format!("{PRAY} gracias"), Some(&["latam", "Bob"])),
        tweet("2021-02-12T12:00:00+00:00", "alice", FAMILY, Some(&[])),
        tweet("2021-02-13T09:00:00+00:00", "dave", "no emoji here", None),
        json!({
            "date": "2021-02-13T10:00:00+00:00",
            "content": format!("{FLAG_AR} {PRAY}"),
            "user": { "username": "carol" },
            "mentionedUsers": [{ "username": null }, { "username": "" }, 42],
        })
        .to_string(),
        json!({
            "date": "2021-02-14T23:30:00-03:00",
            "content": null,
            "user": { "username": "erin" },
            "mentionedUsers": [{ "username": "erin" }],
        })
        .to_string(),
    ]
}

/// Assert `(key, count)` pairs are in count-descending, key-ascending order.
pub fn assert_ranked(rows: &[(String, u64)]) {
    for w in rows.windows(2) {
        let (a, b) = (&w[0], &w[1]);
        assert!(a.1 > b.1 || (a.1 == b.1 && a.0 < b.0), "bad order: {:?} before {:?}", a, b);
    }
}
