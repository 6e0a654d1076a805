//! wordvec command line entry point
//!
//! One-shot queries print their result to stdout. `serve` answers JSON-RPC
//! requests over stdio until stdin closes. Logs always go to stderr.

use anyhow::Context;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wordvec_core::provider::{is_snapshot_path, save_snapshot, save_text};
use wordvec_core::QueryEngine;
use wordvec_server::output::Report;
use wordvec_server::rpc::{LineTransport, QueryServer};
use wordvec_server::{Cli, Command, QueryBackend, TableConfig, TableWatcher};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wordvec=info,wordvec_server=info,wordvec_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = TableConfig::resolve(cli.table.table.as_deref(), cli.table.load_options())
        .context("Failed to locate vector table")?;

    let backend = QueryBackend::load(config.provider())
        .await
        .with_context(|| format!("Failed to load {}", config.path.display()))?;
    let backend = Arc::new(backend);

    if let Command::Serve { watch } = cli.command {
        return serve(backend, &config.path, watch).await;
    }

    let report = execute(&cli.command, &backend.engine())?;
    println!("{}", report.render(cli.json));
    Ok(())
}

/// Run a one-shot command against the loaded table
fn execute(command: &Command, engine: &QueryEngine) -> anyhow::Result<Report> {
    let report = match command {
        Command::Similarity { a, b } => Report::Similarity {
            a: a.clone(),
            b: b.clone(),
            similarity: engine.similarity(a, b)?,
        },
        Command::MostSimilar { .. } => {
            let query = command
                .neighbor_query()
                .context("most-similar without a query")?;
            Report::Neighbors(engine.most_similar(&query)?)
        }
        Command::DoesntMatch { tokens } => Report::Outlier(engine.doesnt_match(tokens)?),
        Command::Contains { token } => Report::Contains {
            token: token.clone(),
            contains: engine.contains(token),
        },
        Command::Vector { token } => Report::Vector {
            token: token.clone(),
            vector: engine.vector(token)?.to_vec(),
        },
        Command::Rank { a, b } => Report::Rank {
            a: a.clone(),
            b: b.clone(),
            rank: engine.rank(a, b)?,
        },
        Command::Stats => Report::Stats(engine.table().stats()),
        Command::Convert { output } => {
            let table = engine.table();
            let written = if is_snapshot_path(output) {
                save_snapshot(table, output)
            } else {
                save_text(table, output)
            };
            written.with_context(|| format!("Failed to write {}", output.display()))?;
            tracing::info!("Converted table to {}", output.display());
            Report::Converted {
                path: output.clone(),
                entries: table.len(),
            }
        }
        Command::Serve { .. } => anyhow::bail!("serve is not a one-shot command"),
    };
    Ok(report)
}

async fn serve(backend: Arc<QueryBackend>, table_path: &Path, watch: bool) -> anyhow::Result<()> {
    // Held for the lifetime of the server; dropping it stops watching
    let _watcher = if watch {
        Some(
            TableWatcher::new(table_path, Arc::clone(&backend))
                .with_context(|| format!("Failed to watch {}", table_path.display()))?,
        )
    } else {
        None
    };

    tracing::info!("Starting wordvec query server");
    let server = QueryServer::new(backend);
    let mut transport = LineTransport::stdio();
    server
        .run(&mut transport)
        .await
        .context("Query server stopped")?;
    Ok(())
}
