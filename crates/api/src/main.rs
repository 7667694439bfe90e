//! SearchLog - keystroke search deduplication
//!
//! Reads one query fragment per line from stdin (or replays a scripted demo
//! with `--demo`) and prints the words that ended up stored.

use std::io::Write;

use anyhow::{bail, Context};
use searchlog_api::demo::{self, DemoPacing};
use searchlog_api::utils::logging::init_tracing;
use searchlog_api::AppContext;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

const USAGE: &str = "usage: searchlog [--demo] [--json]

  --demo   replay scripted typing sessions against an in-memory store
  --json   print full records as JSON lines instead of bare words";

#[derive(Debug, Clone, Copy, Default)]
struct Options {
    demo: bool,
    json: bool,
}

impl Options {
    fn parse(args: impl Iterator<Item = String>) -> anyhow::Result<Option<Self>> {
        let mut options = Self::default();
        for arg in args {
            match arg.as_str() {
                "--demo" => options.demo = true,
                "--json" => options.json = true,
                "-h" | "--help" => return Ok(None),
                other => bail!("unknown argument: {other}\n\n{USAGE}"),
            }
        }
        Ok(Some(options))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(options) = Options::parse(std::env::args().skip(1))? else {
        writeln!(std::io::stdout(), "{USAGE}")?;
        return Ok(());
    };

    let dotenv = dotenvy::dotenv();
    let config = searchlog_infra::config::load_or_default().context("loading configuration")?;
    init_tracing(&config.logging)?;
    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(err) => debug!(error = %err, "No .env file loaded"),
    }

    let ctx = if options.demo {
        AppContext::new_in_memory(config).await?
    } else {
        AppContext::new(config).await?
    };
    info!(timeout = ?ctx.logger.engine().timeout(), "SearchLog started");

    let outcome = run(&ctx, options).await;
    ctx.shutdown().await?;
    outcome
}

async fn run(ctx: &AppContext, options: Options) -> anyhow::Result<()> {
    if options.demo {
        let pacing = DemoPacing::from_timeout(ctx.config.dedup.completion_timeout());
        demo::run(&ctx.logger, pacing).await?;
    } else {
        ingest_stdin(ctx).await?;
    }
    print_results(ctx, options.json).await
}

async fn ingest_stdin(ctx: &AppContext) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut submitted = 0_u64;

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        match ctx.logger.submit(&line).await {
            Ok(()) => submitted += 1,
            Err(err) => warn!(error = %err, kind = err.label(), "Submit failed"),
        }
    }

    // Give the last words one full quiet period plus a sweep to land.
    let dedup = &ctx.config.dedup;
    tokio::time::sleep(dedup.completion_timeout() + dedup.sweep_interval() * 2).await;
    info!(submitted, "Input exhausted");
    Ok(())
}

async fn print_results(ctx: &AppContext, json: bool) -> anyhow::Result<()> {
    let lines = if json {
        ctx.logger
            .list_records()
            .await?
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?
    } else {
        ctx.logger.list_stored_words().await?
    };

    let mut out = std::io::stdout().lock();
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
