use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, Subcommand};
use imdb_scrap::{
    config::{CrawlConfig, ProfileConfig, ProxyConfig},
    crawl::Crawler,
    info_time,
    profile::run_profile,
    Result,
};

#[derive(Parser)]
#[command(name = "imdb-scrap", about = "IMDb scrapers: top 250 crawl and profile JSON fetch")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the archived top 250 listing into JSON Lines
    Movies {
        /// Listing page to start from
        #[arg(long, default_value = imdb_scrap::SEED_URL)]
        seed: String,
        /// Domains links may point to (repeatable)
        #[arg(long = "allowed-domain", default_value = imdb_scrap::ALLOWED_DOMAIN)]
        allowed_domains: Vec<String>,
        /// User-Agent sent with every request
        #[arg(long, default_value = imdb_scrap::CRAWL_USER_AGENT)]
        user_agent: String,
        /// Output file, one record per line
        #[arg(short, long, default_value = imdb_scrap::MOVIES_FILE_PATH)]
        out: PathBuf,
        /// Stop after this many pages (default: follow pagination to the end)
        #[arg(short = 'n', long)]
        max_pages: Option<usize>,
        /// Pages fetched at the same time
        #[arg(long, default_value_t = imdb_scrap::CRAWL_CONCURRENCY)]
        concurrency: usize,
    },
    /// Fetch a profile page through the proxy and print the image caption.
    /// Proxy settings come from IMDB_PROXY_HOST, IMDB_PROXY_USERNAME and IMDB_PROXY_PASSWORD.
    Profile {
        /// Profile page to fetch
        #[arg(long, default_value = imdb_scrap::PROFILE_URL)]
        url: String,
        /// Where the raw HTML goes
        #[arg(long, default_value = imdb_scrap::HTML_FILE_PATH)]
        html_out: PathBuf,
        /// Where the pretty printed __NEXT_DATA__ goes
        #[arg(long, default_value = imdb_scrap::JSON_FILE_PATH)]
        json_out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let start_time = Local::now();
    let cli = Cli::parse();

    match cli.command {
        Commands::Movies {
            seed,
            allowed_domains,
            user_agent,
            out,
            max_pages,
            concurrency,
        } => {
            let crawler = Crawler::new(CrawlConfig {
                seed_url: seed,
                allowed_domains,
                user_agent,
                out_path: out,
                max_pages,
                concurrency,
            })?;
            let stats = crawler.run().await?;
            info_time!(
                "{} records, {} offsite links, {} duplicate links",
                stats.records,
                stats.offsite,
                stats.duplicates
            );
        }
        Commands::Profile {
            url,
            html_out,
            json_out,
        } => {
            let config = ProfileConfig {
                url,
                proxy: ProxyConfig::from_env()?,
                html_path: html_out,
                json_path: json_out,
                ..Default::default()
            };
            run_profile(&config).await;
        }
    }

    info_time!(start_time, "Full program time:");
    Ok(())
}
