use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use squadgraph::cache::PlayerCache;
use squadgraph::progress::{Notifier, ProgressEvent};
use squadgraph::{Config, GameGraph, GraphLoader, PathSearch, Player, PlayerPath};

#[derive(Parser, Debug)]
#[command(name = "search")]
#[command(about = "Find the chain of teammates linking two players")]
struct Args {
    /// Player to start from: name tokens, optionally with a date of birth
    player: String,

    /// Player to reach; defaults to search.default_target
    #[arg(long)]
    target: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    source: &'a Player,
    target: &'a Player,
    degree: Option<usize>,
    path: &'a PlayerPath,
}

fn resolve<'g>(graph: &'g GameGraph, query: &str) -> Result<&'g Player> {
    let matches = graph.find_players_by_name(query);
    let first = matches
        .first()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("No player matches '{}'", query))?;
    if matches.len() > 1 {
        log::warn!(
            "{} players match '{}', using {}; add a date of birth to narrow it down",
            matches.len(),
            query,
            first
        );
    }
    Ok(first)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", &config.squadgraph.log_level),
    )
    .init();

    let target_query = args
        .target
        .unwrap_or_else(|| config.search.default_target.clone());

    let (notifier, rx) = Notifier::channel();
    let progress = std::thread::spawn(move || {
        for event in rx {
            match event {
                ProgressEvent::Message(msg) => log::info!("{}", msg),
                ProgressEvent::Step(step) => log::debug!("{}", step),
                other => log::trace!("{:?}", other),
            }
        }
    });

    let graph = GraphLoader::new(PlayerCache::new(config.cache_dir()), notifier.clone())
        .load()
        .await?;

    let source = resolve(&graph, &args.player)?;
    let target = resolve(&graph, &target_query)?;
    let path = PathSearch::new(&graph, notifier).find_path(source, target);
    let _ = progress.join();

    if args.json {
        let output = SearchOutput {
            source,
            target,
            degree: path.degree(),
            path: &path,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match path.degree() {
        Some(degree) => {
            println!("{} has a {} degree of {}", source.name(), target.name(), degree);
            println!("{}", path);
        }
        None => println!("No path found"),
    }

    Ok(())
}
