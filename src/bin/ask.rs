use anyhow::Result;
use clap::Parser;
use frontkg::llm::ChatClient;
use frontkg::{Assistant, Config, KnowledgeGraph, Mode};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "ask")]
#[command(about = "Ask the frontend knowledge graph a question from the command line")]
struct Args {
    /// Question text, or the entity name with --learning-path
    query: String,

    /// Answer mode: quick or deep
    #[arg(short, long, default_value = "quick")]
    mode: String,

    /// Generate a learning path for QUERY instead of answering it
    #[arg(short, long)]
    learning_path: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "warn")
    ).init();

    let args = Args::parse();
    let config = Config::load()?;

    let graph = Arc::new(KnowledgeGraph::from_csv_path(config.data_path())?);
    let client = ChatClient::new(config.api_url(), config.api_key()?, config.llm.model.clone())?;
    let assistant = Assistant::from_config(graph, Arc::new(client), &config);

    let output = if args.learning_path {
        assistant.learning_path(&args.query).await
    } else {
        let answer = assistant.answer(&args.query, Mode::parse(&args.mode)).await;
        serde_json::to_value(answer)?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
