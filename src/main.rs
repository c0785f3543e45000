use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::{env, fs};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use vhiscraper::{
    cli::{self, Command},
    dataset, fetch, Config, QueryEngine,
};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) parse arguments ──────────────────────────────────────────
    let args: Vec<String> = env::args().skip(1).collect();
    let invocation = match cli::parse_args(&args) {
        Ok(inv) => inv,
        Err(e) => {
            eprintln!("{}\n\n{}", e, cli::USAGE);
            std::process::exit(2);
        }
    };

    // ─── 3) configure dirs ───────────────────────────────────────────
    let cfg = Config::load()?;
    fs::create_dir_all(&cfg.data_dir)
        .with_context(|| format!("creating {}", cfg.data_dir.display()))?;
    info!(data_dir = %cfg.data_dir.display(), "startup");

    // ─── 4) optional download pass ───────────────────────────────────
    if invocation.fetch {
        let summary = fetch::download_all(&Client::new(), &cfg).await?;
        if !summary.failed.is_empty() {
            warn!(failed = ?summary.failed, "continuing with the files on disk");
        }
    }

    // ─── 5) build the dataset off the async runtime ──────────────────
    let (data, report) = tokio::task::spawn_blocking({
        let cfg = cfg.clone();
        move || dataset::build_from_dir(&cfg)
    })
    .await??;

    // ─── 6) run the query ────────────────────────────────────────────
    let engine = QueryEngine::new(&data);
    match &invocation.command {
        Command::Summary => {
            #[derive(Serialize)]
            struct Summary<'a> {
                rows: usize,
                regions: usize,
                report: &'a dataset::BuildReport,
            }
            print_json(&Summary {
                rows: data.len(),
                regions: data.region_ids().len(),
                report: &report,
            })?;
        }
        Command::Series(p) => print_json(&engine.point_lookup(p)?)?,
        Command::Stats(p) => print_json(&engine.grouped_statistics(p)?)?,
        Command::Range(p) => print_json(&engine.ranged_series(p)?)?,
        Command::Drought(p) => print_json(&engine.drought_years(p)?)?,
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
