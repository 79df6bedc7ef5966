use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use placetag::config::Config;
use placetag::db::PlaceStore;
use placetag::hashtags::frequency::{AggregationMode, Decomposition};
use placetag::output::terminal;
use placetag::ranking::config::QueryMode;
use placetag::service::{RankRequest, Recommender};
use placetag::session::RequestContext;
use placetag::spatial::{ViewportBound, ViewportInput};

/// placetag: hashtag-driven place recommendations for map viewports.
///
/// Ranks the places inside a viewport by how close their hashtags'
/// embeddings are to the tags you pick.
#[derive(Parser)]
#[command(name = "placetag", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Viewport rectangle. Bounds are inclusive and may be negative.
#[derive(Args)]
struct ViewportArgs {
    #[arg(long, allow_hyphen_values = true)]
    min_x: String,
    #[arg(long, allow_hyphen_values = true)]
    min_y: String,
    #[arg(long, allow_hyphen_values = true)]
    max_x: String,
    #[arg(long, allow_hyphen_values = true)]
    max_y: String,
}

impl ViewportArgs {
    fn input(&self) -> ViewportInput {
        ViewportInput {
            min_x: ViewportBound::from(self.min_x.as_str()),
            min_y: ViewportBound::from(self.min_y.as_str()),
            max_x: ViewportBound::from(self.max_x.as_str()),
            max_y: ViewportBound::from(self.max_y.as_str()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Import places, hashtags, and links from a JSON dataset
    Import {
        /// Path to the dataset file
        file: PathBuf,
    },

    /// List hashtags attached to places in a viewport
    Hashtags {
        /// Place category (cafe, hotel, restaurant, tour, transport, or an alias)
        category: String,
        #[command(flatten)]
        viewport: ViewportArgs,
        /// Plain unique set instead of a frequency ranking
        #[arg(long)]
        unique: bool,
        /// Split stored values into their #tokens
        #[arg(long)]
        tokens: bool,
    },

    /// List places of a category in a viewport
    Places {
        category: String,
        #[command(flatten)]
        viewport: ViewportArgs,
    },

    /// Recommend places by hashtag similarity
    Recommend {
        category: String,
        /// Selected hashtag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[command(flatten)]
        viewport: ViewportArgs,
        /// Number of results (default from PLACETAG_TOP_K)
        #[arg(long)]
        top_k: Option<usize>,
        /// Average the selected tags into one query
        #[arg(long)]
        averaged: bool,
    },

    /// Show the hashtags used anywhere in a region
    Region {
        /// Region name, e.g. "jeju" or "제주"
        name: String,
    },

    /// Show a place's details
    Place {
        /// Place name (exact match preferred, partial accepted)
        name: String,
    },

    /// Show database status
    Status,

    /// Run the JSON API server
    #[cfg(feature = "web")]
    Serve {
        #[arg(long, default_value = "3000")]
        port: u16,
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("placetag=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            info!("Initializing placetag database...");
            let store = placetag::db::initialize_store(&config.db_path)?;
            let table_count = store.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nNext step: placetag import <dataset.json>");
        }

        Commands::Import { file } => {
            let store = placetag::db::initialize_store(&config.db_path)?;
            let dataset = placetag::pipeline::import::read_dataset(&file)?;
            println!(
                "Importing {} hashtags and {} places from {}...",
                dataset.hashtags.len(),
                dataset.places.len(),
                file.display()
            );
            let report = placetag::pipeline::import::run(store.as_ref(), &dataset, true).await?;

            println!("\n{}", "Import complete.".bold());
            println!("  Hashtags: {}", report.hashtags);
            println!("  Places: {}", report.places);
            println!("  Links: {}", report.links);
            if report.skipped_places > 0 {
                println!(
                    "  {} {} places skipped (unrecognized category)",
                    "Warning:".yellow(),
                    report.skipped_places
                );
            }
        }

        Commands::Hashtags {
            category,
            viewport,
            unique,
            tokens,
        } => {
            let recommender = open_recommender(&config)?;
            let mode = if unique {
                AggregationMode::UniqueSet
            } else {
                AggregationMode::FrequencyRanked
            };
            let decomposition = if tokens {
                Decomposition::HashTokens
            } else {
                Decomposition::WholeText
            };
            let summary = recommender
                .compute_hashtag_frequency(
                    &category,
                    &viewport.input(),
                    mode,
                    decomposition,
                    &RequestContext::anonymous(),
                )
                .await?;
            terminal::display_hashtags(&category, &summary);
        }

        Commands::Places { category, viewport } => {
            let recommender = open_recommender(&config)?;
            let places = recommender
                .places_in_viewport(&category, &viewport.input(), &RequestContext::anonymous())
                .await?;
            terminal::display_places(&category, &places);
        }

        Commands::Recommend {
            category,
            tags,
            viewport,
            top_k,
            averaged,
        } => {
            let recommender = open_recommender(&config)?;
            let request = RankRequest {
                category: category.clone(),
                selected_hashtags: tags,
                viewport: viewport.input(),
                k: top_k,
                query_mode: averaged.then_some(QueryMode::Averaged),
            };
            let results = recommender
                .rank_by_hashtag_similarity(&request, &RequestContext::anonymous())
                .await?;
            terminal::display_recommendations(&category, &results);
        }

        Commands::Region { name } => {
            let recommender = open_recommender(&config)?;
            let hashtags = recommender.resolve_region_hashtags(&name).await?;
            terminal::display_region_hashtags(&name, &hashtags);
        }

        Commands::Place { name } => {
            let recommender = open_recommender(&config)?;
            let detail = recommender.place_detail(&name).await?;
            terminal::display_place_detail(&detail);
        }

        Commands::Status => {
            if !placetag::status::is_initialized(&config.db_path) {
                println!("Database: not initialized");
                println!("\nRun `placetag init` to set up the database.");
                return Ok(());
            }
            let store = placetag::db::open_store(&config.db_path)?;
            placetag::status::show(&store, &config.db_path).await?;
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let store = placetag::db::open_store(&config.db_path)?;
            placetag::web::run_server(config, store, port, &bind).await?;
        }
    }

    Ok(())
}

fn open_recommender(config: &Config) -> Result<Recommender> {
    let store: Arc<dyn PlaceStore> = placetag::db::open_store(&config.db_path)?;
    Ok(Recommender::from_config(store, config))
}
