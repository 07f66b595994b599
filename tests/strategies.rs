#[path = "common/mod.rs"]
mod common;

use common::*;
use tweetstats::{for_each_tweet, Error, Location, Options, Question, Strategy, TweetStats};

/// A larger synthetic corpus, big enough to span several decode chunks and rayon tasks.
fn corpus_large() -> Vec<String> {
    let emojis = [HEART, PRAY, FLAG_AR, FAMILY, "\u{1F602}", "\u{1F44D}\u{1F3FD}"];
    let mut lines = Vec::with_capacity(20_000);
    for i in 0..20_000usize {
        let day = 1 + (i * 7 % 28);
        let user = format!("user{}", i % 37);
        let content = format!("tweet {i} {} {}", emojis[i % emojis.len()], emojis[(i / 3) % emojis.len()]);
        let m1 = format!("Mention{}", i % 11);
        let m2 = format!("mention{}", i % 5);
        let mentions = [m1.as_str(), m2.as_str()];
        lines.push(tweet(&format!("2021-02-{day:02}T12:00:00+00:00"), &user, &content, Some(&mentions)));
        if i % 1000 == 0 {
            lines.push(String::new());
        }
    }
    lines
}

#[test]
fn strategies_agree_on_well_formed_input() {
    let (_dir, path) = ndjson_file(&corpus_large());
    let st = stats().batch_chunk_lines(1024);
    for q in Question::ALL {
        let time = st.run(q, Strategy::Time, &s(&path)).unwrap();
        let memory = st.run(q, Strategy::Memory, &s(&path)).unwrap();
        assert_eq!(time, memory, "question {q}");
        assert!(!time.is_empty());
    }
}

/// Twelve March dates: 3..=9 with distinct volumes, 1 and 2 tied at 10,
/// 10 and 11 tied at 5 across the tenth/eleventh slots, 12 with 3.
fn corpus_many_dates() -> Vec<String> {
    let volume = |d: u32| match d {
        1 | 2 => 10,
        3..=9 => 20 - d,
        10 | 11 => 5,
        _ => 3,
    };
    let mut per_day: Vec<Vec<String>> = (1..=12u32)
        .map(|d| {
            (0..volume(d))
                .map(|i| {
                    // one user per day outnumbers the rest
                    let user = if i % 2 == 0 { format!("top{d:02}") } else { format!("u{i}") };
                    tweet(&format!("2021-03-{d:02}T{:02}:00:00+00:00", i % 24), &user, "x", None)
                })
                .collect()
        })
        .collect();
    // interleave days so every decode chunk mixes them
    let mut lines = Vec::new();
    while per_day.iter().any(|v| !v.is_empty()) {
        for day in per_day.iter_mut() {
            if let Some(l) = day.pop() {
                lines.push(l);
            }
        }
    }
    lines
}

#[test]
fn strategies_agree_on_active_dates_past_the_cut() {
    let (_dir, path) = ndjson_file(&corpus_many_dates());
    let st = stats().batch_chunk_lines(7);
    let time = st.active_dates(&s(&path), Strategy::Time).unwrap();
    let memory = st.active_dates(&s(&path), Strategy::Memory).unwrap();
    assert_eq!(time, memory);

    let days: Vec<String> = time.iter().map(|a| a.date.to_string()).collect();
    assert_eq!(
        days,
        vec![
            "2021-03-03", "2021-03-04", "2021-03-05", "2021-03-06", "2021-03-07",
            "2021-03-08", "2021-03-09", "2021-03-02", "2021-03-01",
            // tied with 2021-03-11 at the cut; the earlier date is kept
            "2021-03-10",
        ]
    );
    for a in &time {
        assert_eq!(a.top_user, format!("top{}", &a.date.to_string()[8..]));
    }
}

#[test]
fn repeated_runs_are_identical() {
    let (_dir, path) = ndjson_file(&corpus_large());
    let st = stats().parallelism(4);
    for q in Question::ALL {
        let first = st.run(q, Strategy::Time, &s(&path)).unwrap();
        for _ in 0..3 {
            assert_eq!(st.run(q, Strategy::Time, &s(&path)).unwrap(), first);
        }
    }
}

#[test]
fn rankings_respect_ordering_invariant() {
    let (_dir, path) = ndjson_file(&corpus_large());
    for strategy in Strategy::ALL {
        let emojis = stats().top_emojis(&s(&path), strategy).unwrap();
        let mentions = stats().top_mentions(&s(&path), strategy).unwrap();
        assert_eq!(emojis.len(), 6);
        assert_eq!(mentions.len(), 10);
        assert_ranked(&emojis);
        assert_ranked(&mentions);
    }
}

#[test]
fn empty_and_blank_inputs_give_empty_results() {
    for lines in [vec![], vec![String::new(), "   ".to_string()]] {
        let (_dir, path) = ndjson_file(&lines);
        for q in Question::ALL {
            for strategy in Strategy::ALL {
                assert!(stats().run(q, strategy, &s(&path)).unwrap().is_empty(), "{q} {strategy}");
            }
        }
    }
}

#[test]
fn corrupt_line_is_skipped_by_memory_and_fatal_for_time() {
    let lines = vec![
        tweet("2021-02-12T10:00:00+00:00", "alice", "x", Some(&["a"])),
        "{\"date\": \"2021-02-12T11:00:00+00:00\", \"user\": {".to_string(),
        tweet("2021-02-12T12:00:00+00:00", "bob", "y", Some(&["a"])),
    ];
    let (_dir, path) = ndjson_file(&lines);

    let scan = for_each_tweet(&Location::Local(path.clone()), &Options::default(), |_| {}).unwrap();
    assert_eq!((scan.lines, scan.records, scan.skipped), (3, 2, 1));

    let got = stats().top_mentions(&s(&path), Strategy::Memory).unwrap();
    assert_eq!(got, vec![("a".to_string(), 2)]);

    let err = stats().top_mentions(&s(&path), Strategy::Time).unwrap_err();
    assert!(matches!(err, Error::DecodeFatal { line: 2, .. }), "got {err:?}");
    assert!(err.is_strategy_specific());
}

#[test]
fn missing_input_is_unreachable_for_both_strategies() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    for q in Question::ALL {
        for strategy in Strategy::ALL {
            let err = stats().run(q, strategy, &s(&missing)).unwrap_err();
            assert!(matches!(err, Error::SourceUnreachable { .. }), "{q} {strategy}: {err:?}");
        }
    }
    // a directory is not a readable input either
    let err = stats().run(Question::Q1, Strategy::Memory, &s(dir.path())).unwrap_err();
    assert!(matches!(err, Error::SourceUnreachable { .. }));
}

#[test]
fn zstd_input_matches_plain_input() {
    let lines = corpus_basic();
    let (dir, plain) = ndjson_file(&lines);
    let packed = dir.path().join("tweets.json.zst");
    write_zst_lines(&packed, &lines);
    for q in Question::ALL {
        for strategy in Strategy::ALL {
            assert_eq!(
                stats().run(q, strategy, &s(&packed)).unwrap(),
                stats().run(q, strategy, &s(&plain)).unwrap(),
                "{q} {strategy}"
            );
        }
    }
}

#[test]
fn object_locations_resolve_under_object_root() {
    let root = tempfile::tempdir().unwrap();
    write_lines(&root.path().join("tweets-bucket/input/tweets.json"), &corpus_basic());

    let st = stats().object_root(root.path());
    let got = st.top_mentions("gs://tweets-bucket/input/tweets.json", Strategy::Time).unwrap();
    assert_eq!(got[0], ("latam".to_string(), 2));

    let file_url = format!("file://{}", root.path().join("tweets-bucket/input/tweets.json").display());
    assert_eq!(st.top_mentions(&file_url, Strategy::Memory).unwrap(), got);

    // without a root the object store is unreachable
    let err = TweetStats::with_options(Options::default())
        .top_mentions("gs://tweets-bucket/input/tweets.json", Strategy::Memory)
        .unwrap_err();
    assert!(matches!(err, Error::SourceUnreachable { .. }));
}

#[test]
fn malformed_locations_are_rejected() {
    for bad in ["", "gs://bucket-only", "gs://bucket/../escape.json", "gs:///key"] {
        let err = stats().run(Question::Q3, Strategy::Memory, bad).unwrap_err();
        assert!(matches!(err, Error::InvalidLocation(_)), "{bad:?}: {err:?}");
    }
    assert_eq!(
        "s3://b/k/tweets.json".parse::<Location>().unwrap(),
        Location::object("s3", "b", "k/tweets.json")
    );
}
