//! versedex CLI application
//!
//! Command-line interface for the versedex library.

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use versedex::api::BatchProgress;
use versedex::config::load_dotenv;
use versedex::utils::{format_file_size, highlight_to_ansi, highlighted_terms, strip_highlight};
use versedex::{Config, ElasticClient, Indexer, QueryService, VerseDatabase, export};

#[derive(Parser)]
#[command(name = "versedex")]
#[command(about = "Index a Bible verse database into Elasticsearch and search it")]
#[command(version)]
struct Cli {
    /// JSON configuration file (environment variables still override it)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Elasticsearch URL
    #[arg(long, global = true)]
    url: Option<String>,

    /// Index name
    #[arg(long, global = true)]
    index: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the verse index from the bible database
    Index {
        /// Bible database (SQLite)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Verses per bulk request
        #[arg(long)]
        batch_size: Option<usize>,

        /// Write the run report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Search verses
    Search {
        /// Search query
        query: String,

        /// Number of results to return
        #[arg(short = 'k', long, default_value = "10")]
        top_k: usize,

        /// Print fragments without highlighting
        #[arg(long)]
        raw: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether Elasticsearch is reachable
    Status,

    /// Export the bible database as a nested JSON summary
    Export {
        /// Bible database (SQLite)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Output file
        #[arg(short, long, default_value = "data/bible_summary.json")]
        output: PathBuf,
    },

    /// Print a verse range from the bible database
    Verses {
        /// Book name as stored in the database
        book: String,

        /// Chapter number
        chapter: u32,

        /// First verse
        #[arg(long, default_value = "1")]
        from: u32,

        /// Last verse (defaults to --from)
        #[arg(long)]
        to: Option<u32>,

        /// Bible database (SQLite)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    match cli.command {
        Commands::Index {
            db,
            batch_size,
            report,
        } => {
            if let Some(db) = db {
                config.source.db_path = db;
            }
            if let Some(batch_size) = batch_size {
                config.indexing.batch_size = batch_size;
            }
            config.validate()?;
            index_command(config, report).await
        }
        Commands::Search {
            query,
            top_k,
            raw,
            json,
        } => search_command(config, query, top_k, raw, json).await,
        Commands::Status => status_command(config).await,
        Commands::Export { db, output } => {
            if let Some(db) = db {
                config.source.db_path = db;
            }
            export_command(config, output)
        }
        Commands::Verses {
            book,
            chapter,
            from,
            to,
            db,
        } => {
            if let Some(db) = db {
                config.source.db_path = db;
            }
            verses_command(config, book, chapter, from, to)
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    load_dotenv()?;
    config.apply_env(|key| std::env::var(key).ok())?;

    if let Some(url) = &cli.url {
        config.elasticsearch.url = url.clone();
    }
    if let Some(index) = &cli.index {
        config.elasticsearch.index_name = index.clone();
    }

    config.validate()?;
    Ok(config)
}

async fn index_command(config: Config, report_path: Option<PathBuf>) -> anyhow::Result<ExitCode> {
    println!("📖 Using database path: {}", config.source.db_path.display());

    let db = VerseDatabase::open(&config.source.db_path)
        .with_context(|| format!("Cannot open {}", config.source.db_path.display()))?;
    let client = ElasticClient::from_config(&config.elasticsearch)?;

    println!(
        "🔧 Rebuilding index {} at {}...",
        config.elasticsearch.index_name, config.elasticsearch.url
    );

    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} verses {msg}")
            .context("Invalid progress bar template")?,
    );

    let indexer = Indexer::new(client, config);
    let report = indexer
        .run_with_progress(&db, |p: &BatchProgress| {
            progress_bar.set_length(p.total as u64);
            progress_bar.set_position(p.processed as u64);
            progress_bar.set_message(format!(
                "(batch {}/{}, {} errors)",
                p.batch, p.total_batches, p.errors
            ));
        })
        .await;
    progress_bar.finish_and_clear();

    let report = match report {
        Ok(report) => report,
        Err(e) => {
            eprintln!("❌ Error during indexing process: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let summary = &report.summary;
    println!("✅ Indexing complete!");
    println!("   📊 Verses: {}", report.total_verses);
    println!("   ✔️  Indexed: {}", summary.success);
    println!("   ⚠️  Errors: {}", summary.errors);
    println!("   📦 Batches: {} ({} failed)", summary.batches, summary.failed_batches);
    println!("   ⏱️  Time: {:.2}s", summary.elapsed_secs);

    if !summary.samples.is_empty() {
        println!("   First errors:");
        for sample in &summary.samples {
            println!(
                "     - {} [{}]: {}",
                sample.document.reference,
                sample
                    .status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "request".to_string()),
                sample.error
            );
        }
    }

    if let Some(path) = report_path {
        report.write_json(&path)?;
        println!("   📋 Report: {}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}

async fn search_command(
    config: Config,
    query: String,
    top_k: usize,
    raw: bool,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let client = ElasticClient::from_config(&config.elasticsearch)?;
    let service = QueryService::new(client, &config.elasticsearch.index_name);

    let results = match service.search(&query, top_k).await {
        Ok(results) => results,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("❌ Search unavailable. Is Elasticsearch running at {}?", config.elasticsearch.url);
            return Ok(ExitCode::FAILURE);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(ExitCode::SUCCESS);
    }

    if results.is_empty() {
        println!("❌ No matches for \"{}\"", query.trim());
        return Ok(ExitCode::SUCCESS);
    }

    println!("📋 Found {} results:", results.len());
    println!();

    for (i, hit) in results.iter().enumerate() {
        let text = if raw {
            strip_highlight(&hit.text)
        } else {
            highlight_to_ansi(&hit.text)
        };
        println!("{}. {} (score: {:.3})", i + 1, hit.reference, hit.score.unwrap_or_default());
        println!("   {}", text);
        let terms = highlighted_terms(&hit.text);
        if !raw && !terms.is_empty() {
            println!("   matched: {}", terms.join(", "));
        }
        println!();
    }

    Ok(ExitCode::SUCCESS)
}

async fn status_command(config: Config) -> anyhow::Result<ExitCode> {
    let client = ElasticClient::from_config(&config.elasticsearch)?;
    let service = QueryService::new(client, &config.elasticsearch.index_name);

    if service.check_status().await {
        println!("✅ Elasticsearch is available at {}", config.elasticsearch.url);
        Ok(ExitCode::SUCCESS)
    } else {
        println!("❌ Elasticsearch is not available at {}", config.elasticsearch.url);
        Ok(ExitCode::FAILURE)
    }
}

fn export_command(config: Config, output: PathBuf) -> anyhow::Result<ExitCode> {
    println!("📖 Using database path: {}", config.source.db_path.display());

    let db = VerseDatabase::open(&config.source.db_path)
        .with_context(|| format!("Cannot open {}", config.source.db_path.display()))?;
    let stats = export::write_summary(&db, &output)?;

    println!("✅ Summary written: {}", output.display());
    println!("   📚 Books: {}", stats.books);
    println!("   📑 Chapters: {}", stats.chapters);
    println!("   📜 Verses: {}", stats.verses);
    println!("   💾 Size: {}", format_file_size(stats.file_size_bytes));

    Ok(ExitCode::SUCCESS)
}

fn verses_command(
    config: Config,
    book: String,
    chapter: u32,
    from: u32,
    to: Option<u32>,
) -> anyhow::Result<ExitCode> {
    let db = VerseDatabase::open(&config.source.db_path)
        .with_context(|| format!("Cannot open {}", config.source.db_path.display()))?;
    let verses = db.verses_in_range(&book, chapter, from, to)?;

    if verses.is_empty() {
        println!("❌ No verses found for {} {}:{}", book, chapter, from);
        return Ok(ExitCode::SUCCESS);
    }

    for verse in verses {
        println!("{} {}", verse.reference(), verse.text);
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["versedex", "search", "beginning", "-k", "5"]);
        assert!(cli.is_ok());

        let cli = Cli::try_parse_from(["versedex", "--index", "verses_kjv", "index", "--batch-size", "100"]).unwrap();
        assert_eq!(cli.index.as_deref(), Some("verses_kjv"));
        match cli.command {
            Commands::Index { batch_size, .. } => assert_eq!(batch_size, Some(100)),
            _ => panic!("Expected index command"),
        }
    }

    #[test]
    fn test_verses_range_arguments() {
        let cli = Cli::try_parse_from(["versedex", "verses", "Genesis", "1", "--from", "3", "--to", "5"]).unwrap();
        match cli.command {
            Commands::Verses { book, chapter, from, to, .. } => {
                assert_eq!(book, "Genesis");
                assert_eq!(chapter, 1);
                assert_eq!(from, 3);
                assert_eq!(to, Some(5));
            }
            _ => panic!("Expected verses command"),
        }
    }
}
