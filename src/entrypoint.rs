//! Invocation routing for the cloud-function style entrypoint.
//!
//! Two triggers:
//!  - HTTP-style parameters `q`, `strategy`, `file`;
//!  - storage events (`{"message":{"data":<base64 {"bucket","name"}>}}`), which
//!    always run Q1 with the time strategy and persist the result through the sink.
//!
//! No server lives here: callers hand over the decoded request and get a status
//! code plus a JSON body back.

use crate::error::Error;
use crate::pipeline::{Question, Strategy, TweetStats};
use crate::source::Location;
use crate::util::create_with_backoff;
use anyhow::{anyhow, Context, Result};
use data_encoding::BASE64;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }
    fn error(status: u16, message: impl Into<String>) -> Self {
        Self { status, body: json!({ "status": "error", "message": message.into() }) }
    }
}

/// Writes JSON results to object locations in the local object-store mirror.
#[derive(Clone, Debug, Default)]
pub struct ResultSink {
    object_root: Option<PathBuf>,
}

impl ResultSink {
    pub fn new(object_root: Option<PathBuf>) -> Self {
        Self { object_root }
    }

    /// Serialize `value` to `location`; returns the location written, as a string.
    pub fn put<T: Serialize>(&self, location: &Location, value: &T) -> Result<String> {
        let path = location.resolve(self.object_root.as_deref())?;
        let file = create_with_backoff(&path, 16, 50).with_context(|| format!("create {}", path.display()))?;
        let mut w = BufWriter::new(file);
        serde_json::to_writer(&mut w, value)?;
        w.flush().with_context(|| format!("flush {}", path.display()))?;
        tracing::info!(%location, "result written");
        Ok(location.to_string())
    }
}

#[derive(Debug, serde::Deserialize)]
struct StorageEvent {
    bucket: Option<String>,
    name: Option<String>,
}

pub struct Entrypoint {
    stats: TweetStats,
    sink: ResultSink,
}

impl Entrypoint {
    pub fn new(stats: TweetStats) -> Self {
        let sink = ResultSink::new(stats.options().object_root.clone());
        Self { stats, sink }
    }

    /// Route a request: a JSON body carrying `message` is a storage event,
    /// anything else is an HTTP query.
    pub fn handle(&self, body: Option<&Value>, params: &HashMap<String, String>) -> Response {
        match body {
            Some(b) if b.get("message").is_some() => self.handle_event(b),
            _ => self.handle_http(params),
        }
    }

    pub fn handle_http(&self, params: &HashMap<String, String>) -> Response {
        let q = params.get("q").map(String::as_str).unwrap_or("q1");
        let strategy = params.get("strategy").map(String::as_str).unwrap_or("time");
        let Some(file) = params.get("file").filter(|f| !f.trim().is_empty()) else {
            return Response::error(400, "Missing required parameter: file");
        };

        let (question, strategy) = match (q.parse::<Question>(), strategy.parse::<Strategy>()) {
            (Ok(q), Ok(s)) => (q, s),
            (Err(e), _) | (_, Err(e)) => return Response::error(400, format!("Invalid question or strategy: {e}")),
        };

        match self.stats.run(question, strategy, file) {
            Ok(answer) => Response::ok(json!({
                "status": "success",
                "question": question.as_str(),
                "strategy": strategy.as_str(),
                "file": file,
                "result": answer,
            })),
            Err(e @ Error::InvalidLocation(_)) => Response::error(400, e.to_string()),
            Err(e) => {
                if e.is_strategy_specific() {
                    tracing::warn!(error = %e, "input rejected by the columnar decoder; the memory strategy skips malformed lines");
                }
                Response::error(500, error_chain(&e))
            }
        }
    }

    pub fn handle_event(&self, payload: &Value) -> Response {
        let event = match decode_event(payload) {
            Ok(ev) => ev,
            Err(e) => {
                tracing::warn!(error = %e, "undecodable storage event");
                return Response::error(400, "Invalid Pub/Sub payload");
            }
        };
        let (Some(bucket), Some(name)) = (
            event.bucket.filter(|b| !b.is_empty()),
            event.name.filter(|n| !n.is_empty()),
        ) else {
            return Response::error(400, "Invalid Pub/Sub payload");
        };

        let output_name = output_object_name(&name);
        if output_name == name {
            tracing::warn!(%bucket, %name, "event object outside input/, skipped");
            return Response::error(400, format!("Object name must contain input/: {name}"));
        }

        match self.process_object(&bucket, &name, &output_name) {
            Ok((input, output)) => Response::ok(json!({
                "status": "success",
                "trigger": "pubsub",
                "input": input,
                "output": output,
            })),
            Err(e) => Response::error(500, format!("{e:#}")),
        }
    }

    fn process_object(&self, bucket: &str, name: &str, output_name: &str) -> Result<(String, String)> {
        let input = Location::object("gs", bucket, name);
        let result = self
            .stats
            .active_dates(&input.to_string(), Strategy::Time)
            .with_context(|| format!("q1 over {input}"))?;
        let output = Location::object("gs", bucket, output_name);
        let written = self.sink.put(&output, &result)?;
        Ok((input.to_string(), written))
    }
}

/// `input/foo.json` -> `output/result_foo.json`.
pub fn output_object_name(name: &str) -> String {
    name.replace("input/", "output/result_")
}

/// Accepts a Pub/Sub envelope with base64 `data`, or the bare `{bucket, name}` object.
fn decode_event(payload: &Value) -> Result<StorageEvent> {
    let Some(message) = payload.get("message") else {
        return Ok(serde_json::from_value(payload.clone())?);
    };
    let data = message
        .get("data")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("message carries no data"))?;
    let raw = BASE64.decode(data.trim().as_bytes()).context("decode base64 data")?;
    serde_json::from_slice(&raw).context("decode event json")
}

fn error_chain(e: &Error) -> String {
    let mut msg = e.to_string();
    let mut src = std::error::Error::source(e);
    while let Some(s) = src {
        msg.push_str(": ");
        msg.push_str(&s.to_string());
        src = s.source();
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_names() {
        assert_eq!(output_object_name("input/tweets.json"), "output/result_tweets.json");
        assert_eq!(output_object_name("tweets.json"), "tweets.json");
    }

    #[test]
    fn envelope_and_bare_events_decode() {
        let data = BASE64.encode(br#"{"bucket":"b","name":"input/t.json"}"#);
        let ev = decode_event(&json!({"message": {"data": data}})).unwrap();
        assert_eq!(ev.bucket.as_deref(), Some("b"));
        assert_eq!(ev.name.as_deref(), Some("input/t.json"));

        let bare = decode_event(&json!({"bucket": "b", "name": "n"})).unwrap();
        assert_eq!(bare.name.as_deref(), Some("n"));

        assert!(decode_event(&json!({"message": {}})).is_err());
        assert!(decode_event(&json!({"message": {"data": "!!notbase64"}})).is_err());
    }
}
