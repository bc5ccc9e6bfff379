mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cesta_core::classifier::{Classification, Classifier, Source};
use cesta_core::config::AppConfig;
use cesta_core::corrections::CorrectionStore;
use cesta_core::remote::RestCorrectionSource;
use cesta_core::shared::{refresh_shared, share_correction};
use cesta_core::storage::SqliteStore;
use cesta_core::{anchor_slug, classify_by_keywords, normalize, Category, CestaError};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<(), CestaError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AppConfig::load()?;
    tracing::debug!(path = %AppConfig::config_path().display(), "Loaded config");

    match cli.command {
        Command::Categories => {
            for category in Category::ALL {
                let meta = category.meta();
                println!("{} {:<22} #{}", meta.icon, category, category.anchor_slug());
            }
            Ok(())
        }
        Command::Slug { name } => {
            println!("{}", anchor_slug(&name));
            Ok(())
        }
        Command::Normalize { text } => {
            println!("{}", normalize(&text));
            Ok(())
        }
        Command::Classify {
            names,
            keywords_only: true,
        } => {
            for name in names {
                println!("{name}\t{}", classify_by_keywords(&name));
            }
            Ok(())
        }
        command => run_with_store(command, &config, cli.offline).await,
    }
}

/// Commands that need the correction store (and possibly the shared backend).
async fn run_with_store(command: Command, config: &AppConfig, offline: bool) -> Result<(), CestaError> {
    let db_path = config.ensure_db_path()?;
    let mut store = CorrectionStore::load(SqliteStore::open(&db_path)?);
    let source = if offline {
        None
    } else {
        RestCorrectionSource::from_config(&config.shared)?
    };
    let classifier = Classifier::with_lexicon(config.lexicon());

    match command {
        Command::Classify { names, .. } => {
            if let Some(source) = &source {
                refresh_shared(&mut store, source, config.shared.fetch_limit).await;
            }
            for name in names {
                println!("{name}\t{}", classifier.classify(&name, &store));
            }
        }
        Command::Explain { name, json } => {
            if let Some(source) = &source {
                refresh_shared(&mut store, source, config.shared.fetch_limit).await;
            }
            let result = classifier.explain(&name, &store);
            if json {
                println!("{}", serde_json::to_string_pretty(&explain_json(&result))?);
            } else {
                print_explanation(&result);
            }
        }
        Command::Learn {
            name,
            category,
            share,
        } => {
            if !store.record_local(&name, &category) {
                return Err(CestaError::Unsupported(format!(
                    "\"{category}\" cannot be learned for \"{name}\""
                )));
            }
            println!("{} → {}", normalize(&name), cesta_core::normalize_category(&category));

            if share {
                let Some(source) = &source else {
                    tracing::warn!("Shared backend not configured; kept the correction locally");
                    return Ok(());
                };
                let shared =
                    share_correction(source, &name, &category, &config.learning.collaborator)
                        .await;
                println!("shared: {}", if shared { "yes" } else { "no" });
            }
        }
        Command::Forget => {
            let count = store.local_len();
            store.clear_local()?;
            println!("forgot {count} correction(s)");
        }
        Command::Sync { limit } => {
            let Some(source) = &source else {
                return Err(CestaError::Config(
                    "shared backend is disabled (set [shared] enabled = true)".into(),
                ));
            };
            let limit = if limit == 0 {
                config.shared.fetch_limit
            } else {
                limit
            };
            let installed = refresh_shared(&mut store, source, limit).await;
            println!("{installed} shared correction(s)");
        }
        Command::Categories | Command::Slug { .. } | Command::Normalize { .. } => {
            unreachable!("handled without a store")
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "cesta=debug" } else { "cesta=info" };
    let filter = if verbose {
        EnvFilter::new(default)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_explanation(result: &Classification) {
    println!("normalized: {}", result.normalized);
    println!("category:   {}", result.category);
    match &result.source {
        Source::Empty => println!("source:     empty name"),
        Source::Correction => println!("source:     learned correction"),
        Source::Keywords(ranked) => {
            println!("source:     keywords");
            for (category, score) in ranked.iter().filter(|(_, s)| *s > 0) {
                println!("  {score:>3}  {category}");
            }
        }
    }
}

fn explain_json(result: &Classification) -> serde_json::Value {
    let (source, scores) = match &result.source {
        Source::Empty => ("empty", Vec::new()),
        Source::Correction => ("correction", Vec::new()),
        Source::Keywords(ranked) => ("keywords", ranked.clone()),
    };
    serde_json::json!({
        "normalized": result.normalized,
        "category": result.category,
        "source": source,
        "scores": scores
            .iter()
            .map(|(category, score)| serde_json::json!({ "category": category, "score": score }))
            .collect::<Vec<_>>(),
    })
}
