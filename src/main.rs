// Category CLI: Site Metadata
//
// Reads a URL list, renders every site in headless Chrome and prints the
// extracted metadata as a JSON array on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use kodegen_tools_sitemeta::input::read_urls;
use kodegen_tools_sitemeta::{BatchOrchestrator, ChromiumEngine, load_yaml_config};
use tracing::info;
use tracing_subscriber::EnvFilter;

const INPUT_PATH_ENV: &str = "INPUT_PATH";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_yaml_config(None).context("Failed to load configuration")?;

    let source = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(INPUT_PATH_ENV).ok())
        .context("No input source: pass a path or URL, or set INPUT_PATH")?;

    let urls = read_urls(&source)
        .await
        .with_context(|| format!("Failed to read URL list from {source}"))?;

    info!(
        urls = urls.len(),
        batch_size = config.batch_size,
        max_urls = ?config.max_urls,
        "Starting run"
    );

    let engine = ChromiumEngine::prepare(config.browser.clone())
        .await
        .context("No usable Chrome/Chromium executable")?;
    let orchestrator = BatchOrchestrator::new(engine, config);
    let results = orchestrator.run(&urls).await;

    println!("{}", serde_json::to_string_pretty(&results)?);

    Ok(())
}
