//! `kg-schema` command-line front end for the schema pattern registry.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::collections::BTreeMap;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use dotenvy::dotenv;
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use kg_schema_registry::config::{AppConfig, Cli, Command, MergeArgs};
use kg_schema_registry::persistence::{load_selection, persist_selection};
use kg_schema_registry::schema::{
    BuilderOptions, CombinedView, Origin, PatternSet, SharedRegistry, parse_pattern,
};
use kg_schema_registry::sources::{
    FileTripletSource, StaticTripletSource, TripletSource, import::import_patterns, load_origin,
};
use kg_schema_registry::telemetry;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MergeReport<'a> {
    connection: &'a str,
    origins: BTreeMap<Origin, PatternSet>,
    combined: CombinedView,
    builder_options: BuilderOptions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let cli = Cli::parse();
    let config = AppConfig::from_cli(&cli).context("failed to load configuration")?;
    telemetry::init(&config.telemetry);

    match cli.command {
        Some(Command::Parse { patterns }) => parse(&patterns),
        Some(Command::Merge(args)) => merge(&config, &args).await,
        Some(Command::Catalog) => catalog(&config),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

fn parse(patterns: &[String]) -> anyhow::Result<()> {
    let mut triples = Vec::new();
    for pattern in patterns {
        match parse_pattern(pattern) {
            Some(triple) => triples.push(triple),
            None => warn!(name: "cli.parse.rejected", pattern = %pattern, "Not a valid pattern"),
        }
    }
    println!("{}", serde_json::to_string_pretty(&triples)?);
    Ok(())
}

fn catalog(config: &AppConfig) -> anyhow::Result<()> {
    let catalog = config.catalog.load().context("failed to load schema catalog")?;
    println!("{}", serde_json::to_string_pretty(catalog.schemas())?);
    Ok(())
}

async fn merge(config: &AppConfig, args: &MergeArgs) -> anyhow::Result<()> {
    let connection = config.persistence.connection.as_str();
    let gateway = if args.persist || args.restore {
        Some(config.persistence.open().context("failed to open persistence")?)
    } else {
        None
    };

    let registry = SharedRegistry::new(config.registry.duplicate_scope);

    if !args.predefined.is_empty() {
        let catalog = config.catalog.load().context("failed to load schema catalog")?;
        let patterns = catalog.patterns_for(&args.predefined)?;
        registry.merge_origin(Origin::Predefined, &patterns);
    }

    let mut sources: Vec<(Origin, Box<dyn TripletSource>)> = Vec::new();
    for (origin, path) in [
        (Origin::User, &args.user),
        (Origin::Database, &args.database),
        (Origin::Text, &args.text),
    ] {
        if let Some(path) = path {
            sources.push((origin, Box::new(FileTripletSource::new(path))));
        }
    }
    if let Some(path) = &args.import {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let patterns = import_patterns(&text)
            .with_context(|| format!("failed to import {}", path.display()))?;
        sources.push((
            Origin::Imported,
            Box::new(StaticTripletSource::new(path.display().to_string(), patterns)),
        ));
    }

    // All sources load concurrently; each origin is applied as it resolves.
    let results = join_all(
        sources
            .iter()
            .map(|(origin, source)| load_origin(&registry, *origin, source.as_ref())),
    )
    .await;
    for ((origin, source), result) in sources.iter().zip(results) {
        if let Err(e) = result {
            warn!(
                name: "cli.merge.source_failed",
                origin = %origin,
                source = source.name(),
                error = %e,
                "Source skipped"
            );
        }
    }

    // Restored patterns are merged on top of a loaded user file, not replaced by it.
    if let (true, Some(gateway)) = (args.restore, &gateway) {
        let saved = load_selection(gateway.as_ref(), connection)?;
        let restored = registry.merge_origin(Origin::User, &saved);
        info!(
            name: "cli.merge.restored",
            connection,
            saved = saved.len(),
            restored,
            "Saved selection merged into user patterns"
        );
    }

    let store = registry.snapshot();
    if let (true, Some(gateway)) = (args.persist, &gateway) {
        persist_selection(gateway.as_ref(), connection, store.combined())?;
        info!(name: "cli.merge.persisted", connection, "Selection saved");
    }

    let report = MergeReport {
        connection,
        origins: Origin::ALL
            .into_iter()
            .filter(|o| !store.slot(*o).is_empty())
            .map(|o| (o, store.slot(o).clone()))
            .collect(),
        combined: store.combined().clone(),
        builder_options: store.builder_options().clone(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
