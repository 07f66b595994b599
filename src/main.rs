use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tweetstats::{bench, init_tracing_once, Entrypoint, Question, Strategy, TweetStats, OBJECT_ROOT_ENV};

#[derive(Parser)]
#[command(name = "tweetstats", version, about = "Top-k tweet statistics over NDJSON corpora")]
struct Cli {
    /// Worker threads for the time strategy (default: all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Local directory mirroring the object store (`<root>/<bucket>/<key>`)
    #[arg(long, global = true, env = OBJECT_ROOT_ENV)]
    object_root: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Answer one question and print the JSON result
    Run(RunArgs),
    /// Time every question under both strategies
    Bench {
        file: String,
    },
    /// Feed a request through the cloud entrypoint and print its response
    Invoke {
        /// JSON body of a storage event (Pub/Sub envelope or bare {bucket,name})
        #[arg(long)]
        event: Option<PathBuf>,
        /// Query parameter, repeatable: --param q=q2 --param file=...
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
}

#[derive(Args)]
struct RunArgs {
    file: String,
    #[arg(short, long, default_value = "q1")]
    question: Question,
    #[arg(short, long, default_value = "time")]
    strategy: Strategy,
    #[arg(short = 'k', long, default_value_t = 10)]
    top_k: usize,
    #[arg(long)]
    progress: bool,
}

fn main() -> Result<()> {
    init_tracing_once();
    let cli = Cli::parse();

    let mut stats = TweetStats::new();
    if let Some(n) = cli.threads {
        stats = stats.parallelism(n);
    }
    if let Some(root) = &cli.object_root {
        stats = stats.object_root(root);
    }

    match cli.cmd {
        Cmd::Run(args) => {
            let answer = stats
                .top_k(args.top_k)
                .progress(args.progress)
                .progress_label(format!("{} ({})", args.question, args.strategy))
                .run(args.question, args.strategy, &args.file)
                .with_context(|| format!("{} over {}", args.question, args.file))?;
            println!("{}", serde_json::to_string_pretty(&answer)?);
        }
        Cmd::Bench { file } => {
            println!("{:<10} {:>12} {:>14} {:>8}", "run", "elapsed_ms", "peak_delta_mib", "rows");
            for row in bench(&stats, &file) {
                let rows = match &row.outcome {
                    Ok(n) => n.to_string(),
                    Err(e) => format!("error: {e}"),
                };
                println!(
                    "{:<10} {:>12} {:>14.1} {:>8}",
                    format!("{}_{}", row.question, row.strategy),
                    row.measurement.elapsed.as_millis(),
                    row.measurement.peak_delta_bytes() as f64 / (1024.0 * 1024.0),
                    rows
                );
            }
        }
        Cmd::Invoke { event, params } => {
            let body: Option<Value> = match &event {
                Some(p) => {
                    let raw = fs::read(p).with_context(|| format!("read {}", p.display()))?;
                    Some(serde_json::from_slice(&raw).with_context(|| format!("parse {}", p.display()))?)
                }
                None => None,
            };
            let mut query = HashMap::new();
            for kv in &params {
                let Some((k, v)) = kv.split_once('=') else {
                    bail!("--param expects KEY=VALUE, got {kv}");
                };
                query.insert(k.to_string(), v.to_string());
            }
            let resp = Entrypoint::new(stats).handle(body.as_ref(), &query);
            println!("{}", resp.status);
            println!("{}", serde_json::to_string_pretty(&resp.body)?);
            if resp.status >= 400 {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
