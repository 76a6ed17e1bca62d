use anyhow::Result;
use clap::{Parser, Subcommand};
use squadgraph::cache::PlayerCache;
use squadgraph::progress::Notifier;
use squadgraph::{Config, GraphLoader};

#[derive(Parser, Debug)]
#[command(name = "squadgraph", version)]
#[command(about = "Degrees of separation between football players")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the cached graph and print its statistics (default)
    Stats {
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every cached player matching a name or date-of-birth query
    Find { query: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", &config.squadgraph.log_level),
    )
    .init();

    log::info!("Cache root: {}", config.cache_dir().display());

    let graph = GraphLoader::new(PlayerCache::new(config.cache_dir()), Notifier::silent())
        .load()
        .await?;

    match cli.command.unwrap_or(Command::Stats { json: false }) {
        Command::Stats { json: true } => {
            println!("{}", serde_json::to_string_pretty(&graph.stats())?);
        }
        Command::Stats { json: false } => {
            let stats = graph.stats();
            println!("\n=== SquadGraph Statistics ===\n");
            println!("{:-<40}", "");
            println!("{:<28} {:>10}", "Players", stats.players);
            println!("{:<28} {:>10}", "Teams", stats.teams);
            println!("{:<28} {:>10}", "Memberships", stats.memberships);
            println!("{:<28} {:>10}", "Rosters loaded", stats.player_sets);
            println!("{:<28} {:>10}", "Identifier collisions", stats.collisions);
            println!("{:-<40}", "");
        }
        Command::Find { query } => {
            let players = graph.find_players_by_name(&query);
            if players.is_empty() {
                println!("No player matches '{}'", query);
            }
            for player in players {
                let teams: Vec<String> = graph
                    .find_teams(player.id())
                    .iter()
                    .map(|t| t.to_string())
                    .collect();
                println!("{}: {}", player, teams.join(", "));
            }
        }
    }

    Ok(())
}
