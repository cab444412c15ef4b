use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use review_insights::analysis::{progress_channel, AnalysisCache, InsightEngine};
use review_insights::cli::{load_reviews, Args, Command, OutputFormat};
use review_insights::config::Config;
use review_insights::render::{render_diagnosis, render_json, render_outcome};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    args.apply_overrides(&mut config)?;

    let input = args.input();
    let reviews = load_reviews(&input.reviews)?;
    info!(
        "Loaded {} reviews for {} from {}",
        reviews.len(),
        input.product,
        input.reviews.display()
    );

    let engine = InsightEngine::from_config(&config, Arc::new(AnalysisCache::new()))?;
    info!("Engine: {}", engine.kind());

    match &args.command {
        Command::Analyze { input, format } => {
            let (tx, mut rx) = progress_channel();
            let observer = tokio::spawn(async move {
                while let Some(update) = rx.recv().await {
                    info!("[{:>3}%] {}", update.percent(), update.label);
                }
            });

            let outcome = engine.analyze(&reviews, &input.product, Some(tx)).await?;
            observer.await?;

            match format {
                OutputFormat::Json => println!("{}", render_json(&input.product, &outcome)?),
                OutputFormat::Text => print!("{}", render_outcome(&input.product, &outcome)),
            }
        }
        Command::Ask { input, query } => {
            let answer = engine.ask(&reviews, &input.product, query).await?;
            println!("{}", answer);
        }
        Command::Refund { input, format } => {
            let diagnosis = engine.refund(&reviews, &input.product).await?;
            match format {
                OutputFormat::Json => println!("{}", render_json(&input.product, &diagnosis)?),
                OutputFormat::Text => print!("{}", render_diagnosis(&input.product, &diagnosis)),
            }
        }
    }

    Ok(())
}
