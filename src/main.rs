use anyhow::Result;
use frontkg::llm::ChatClient;
use frontkg::server::HttpServer;
use frontkg::{Assistant, Config, KnowledgeGraph};
use std::sync::Arc;

/// Load the graph and wire the chat client and assistant around it.
/// Shared by the serve and verify paths.
fn build_assistant(config: &Config) -> Result<(Arc<KnowledgeGraph>, Arc<Assistant>)> {
    let graph = Arc::new(KnowledgeGraph::from_csv_path(config.data_path())?);

    let client = ChatClient::new(config.api_url(), config.api_key()?, config.llm.model.clone())?;
    let assistant = Arc::new(Assistant::from_config(graph.clone(), Arc::new(client), config));

    Ok((graph, assistant))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Config first: it loads .env and carries the default log level
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", config.frontkg.log_level.as_str())
    ).init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("serve");

    match command {
        "verify" => run_verification(&config)?,
        _ => run_http_server(&config).await?,
    }

    Ok(())
}

/// Run the HTTP API server
async fn run_http_server(config: &Config) -> Result<()> {
    log::info!("Starting frontkg v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Knowledge data: {}", config.data_path().display());
    log::info!("Chat model: {} at {}", config.llm.model, config.api_url());

    let (graph, assistant) = build_assistant(config)?;

    let server = HttpServer::new(graph, assistant, config);
    server.run().await?;

    Ok(())
}

/// Load the graph and report what the server would serve
fn run_verification(config: &Config) -> Result<()> {
    log::info!("Verifying frontkg v{} configuration", env!("CARGO_PKG_VERSION"));

    let (graph, _assistant) = build_assistant(config)?;

    if graph.node_count() == 0 {
        anyhow::bail!("Knowledge graph is empty: {}", config.data_path().display());
    }

    log::info!("✓ {} entities, {} relations", graph.node_count(), graph.edge_count());

    let top = graph.top(config.graph.default_limit.min(10));
    for node in &top.nodes {
        log::info!("  {} (degree {})", node.label, graph.degree(&node.id));
    }

    log::info!("✓ Chat endpoint configured: {}", config.api_url());
    Ok(())
}
