use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use squadgraph::cache::PlayerCache;
use squadgraph::crawl::{CrawlPlan, Crawler};
use squadgraph::progress::{Notifier, ProgressEvent};
use squadgraph::scrape::HttpFetcher;
use squadgraph::{Config, Season};

#[derive(Parser, Debug)]
#[command(name = "crawl")]
#[command(about = "Crawl league rosters into the local cache (resumes where a previous run stopped)")]
struct Args {
    /// First season to crawl, by start year
    #[arg(long)]
    from: Option<i32>,

    /// Season to stop at, by start year (exclusive)
    #[arg(long)]
    to: Option<i32>,

    /// Country code to crawl (repeatable); defaults to every country
    #[arg(long = "country")]
    countries: Vec<String>,

    /// Team rosters of one league fetched at once
    #[arg(long)]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = Config::load()?;
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", &config.squadgraph.log_level),
    )
    .init();

    if let Some(from) = args.from {
        config.crawler.start_season = from;
    }
    if let Some(to) = args.to {
        config.crawler.end_season = to;
    }
    if !args.countries.is_empty() {
        config.crawler.countries = args.countries;
    }
    if let Some(n) = args.concurrency {
        config.crawler.team_concurrency = n;
    }
    config.validate()?;

    let plan = CrawlPlan {
        start: Season::new(config.crawler.start_season),
        end: Season::new(config.crawler.end_season),
        countries: config.countries()?,
    };
    log::info!(
        "Crawling seasons {}..{} for {} countries into {}",
        config.crawler.start_season,
        config.crawler.end_season,
        plan.countries.len(),
        config.cache_dir().display()
    );

    let (notifier, rx) = Notifier::channel();
    let progress = std::thread::spawn(move || {
        for event in rx {
            match event {
                ProgressEvent::Message(msg) => log::info!("{}", msg),
                other => log::debug!("{:?}", other),
            }
        }
    });

    let fetcher = HttpFetcher::new(&config.crawler)?;
    let crawler = Crawler::new(fetcher, PlayerCache::new(config.cache_dir()), notifier)
        .with_team_concurrency(config.crawler.team_concurrency);

    let start = Instant::now();
    let result = crawler.run(&plan).await;
    // Closes the progress channel.
    drop(crawler);
    let _ = progress.join();

    let report = result?;
    log::info!(
        "Crawl finished in {:.1}s: {} leagues crawled, {} skipped; {} teams fetched, {} skipped; {} players",
        start.elapsed().as_secs_f64(),
        report.leagues_crawled,
        report.leagues_skipped,
        report.teams_fetched,
        report.teams_skipped,
        report.players.len()
    );

    Ok(())
}
