use anyhow::{Context, Result};
use feed_ranking::config::LogFormat;
use feed_ranking::{Config, EvaluationJournal, FeedRanker, RankRequest};
use std::io::{self, Read};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .init(),
        LogFormat::Pretty => registry.with(fmt::layer().with_writer(io::stderr)).init(),
    }
}

fn read_request(path: Option<&str>) -> Result<RankRequest> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request file {path}"))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read request from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("invalid ranking request")
}

fn main() -> Result<()> {
    let config = Config::from_env().context("failed to load config")?;
    init_tracing(config.log_format);

    let path = std::env::args().nth(1);
    let request = read_request(path.as_deref())?;

    info!(
        item_count = request.items.len(),
        mode = request.mode.as_str(),
        previous_count = request.previous.len(),
        "Ranking request loaded"
    );

    let ranker = FeedRanker::new(&config);
    let page = ranker.next_page(&request.pass(), &request.signals);

    EvaluationJournal::new().record(page.evaluation.as_ref());

    let output = serde_json::to_string_pretty(&page).context("failed to encode response")?;
    println!("{output}");
    Ok(())
}
