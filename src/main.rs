use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;

use pageswap::browser::MemoryBrowser;
use pageswap::config::Config;
use pageswap::initial::NavigationType;
use pageswap::logging::init_tracing;
use pageswap::render::StaticRenderer;
use pageswap::router::{Capabilities, Router};
use pageswap::transport::HttpTransport;
use pageswap::{Page, VisitParams};

/// Perform one visit against a page-protocol server and print the result.
#[derive(Debug, Parser)]
#[command(name = "pageswap", version)]
struct Cli {
    /// URL to visit, absolute or relative to the configured base URL.
    url: String,

    /// Config file (defaults to the platform config dir).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Asset version to announce.
    #[arg(long)]
    asset_version: Option<String>,

    /// Only request these props (comma separated).
    #[arg(long, value_delimiter = ',')]
    only: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading config")?;

    let transport = HttpTransport::new(config.protocol.clone(), &config.transport)
        .context("building transport")?;

    let base = config.transport.base_url.clone();
    let browser = Arc::new(MemoryBrowser::new(base.clone()));
    let mut initial = Page::new("", base);
    initial.version = cli.asset_version.clone();

    let caps = Capabilities::in_memory(
        browser.clone(),
        Arc::new(StaticRenderer::new()),
        Arc::new(transport),
    );
    let router = Router::new(&config, initial, caps);
    router.init(NavigationType::Navigate).await;

    let only: Vec<&str> = cli.only.iter().map(String::as_str).collect();
    let mut params = VisitParams::get(cli.url.clone());
    if !only.is_empty() {
        params = params.only(&only);
    }
    router.visit(params).await.context("visit failed")?;

    for content in browser.modal_contents() {
        eprintln!("Non-protocol response:\n{}", content);
    }
    println!("{}", serde_json::to_string_pretty(&router.page())?);
    Ok(())
}
