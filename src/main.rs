use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use league_engine::api::state::AppState;
use league_engine::config::AppConfig;
use league_engine::service::{LeaderboardService, LinkageService, PlayerMergeService};
use league_engine::storage::{JsonlStore, LeagueStore, StorageConfig};

#[derive(Parser)]
#[command(name = "league-engine")]
#[command(about = "Darts league placement scoring and leaderboard engine")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides config)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error; overrides config)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Recalculate all tournament results and the leaderboard for a league
    Recalculate {
        /// League ID
        league: String,

        /// Recompute tournaments even when already calculated
        #[arg(long)]
        force: bool,
    },

    /// Link a tournament to a league (scores it immediately if completed)
    Link {
        league: String,
        tournament: String,
    },

    /// Unlink a tournament from a league and drop its contribution
    Unlink {
        league: String,
        tournament: String,
    },

    /// Manually override a player's cached leaderboard total
    SetPoints {
        league: String,
        player: String,
        points: i64,
    },

    /// Merge a duplicate player into a canonical one
    MergePlayers {
        /// Player to merge away (deleted on success)
        source: String,

        /// Player that absorbs all references
        target: String,
    },

    /// Print a league's leaderboard
    Leaderboard { league: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&PathBuf::from(&cli.config))?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(data_dir);
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    config.logging.json |= cli.json_logs;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));
    if config.logging.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let store: Arc<dyn LeagueStore> = Arc::new(JsonlStore::new(StorageConfig::new(
        config.data_dir.clone(),
    )));

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let state = AppState::new(store);
            let app = league_engine::api::build_router(state);
            let addr = config.server.bind_addr();
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("API listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Recalculate { league, force } => {
            let service = LeaderboardService::new(store);
            let report = service.full_update(&league.as_str().into(), force)?;
            println!(
                "Processed {} tournament(s): {} recorded, {} skipped, {} failed",
                report.attempted,
                report.recorded,
                report.skipped,
                report.failures.len()
            );
            for failure in &report.failures {
                println!("  FAILED {}: {}", failure.tournament_id, failure.error);
            }
        }
        Commands::Link { league, tournament } => {
            let service = LinkageService::new(store);
            service.link(&league.as_str().into(), &tournament.as_str().into())?;
            println!("Linked tournament {} to league {}", tournament, league);
        }
        Commands::Unlink { league, tournament } => {
            let service = LinkageService::new(store);
            service.unlink(&league.as_str().into(), &tournament.as_str().into())?;
            println!("Unlinked tournament {} from league {}", tournament, league);
        }
        Commands::SetPoints {
            league,
            player,
            points,
        } => {
            let service = LeaderboardService::new(store);
            service.set_points(&league.as_str().into(), &player.as_str().into(), points)?;
            println!(
                "Set {} total points for player {} in league {}",
                points, player, league
            );
        }
        Commands::MergePlayers { source, target } => {
            let service = PlayerMergeService::new(store);
            let report = service.merge(&source.as_str().into(), &target.as_str().into())?;
            if report.already_merged {
                println!("Player {} was already merged", source);
            } else {
                for migration in &report.tables {
                    match &migration.outcome {
                        league_engine::service::MigrationOutcome::Migrated { rows } => {
                            if *rows > 0 {
                                println!("  {}: {} row(s)", migration.table, rows);
                            }
                        }
                        league_engine::service::MigrationOutcome::Failed { error } => {
                            println!("  {}: FAILED ({})", migration.table, error);
                        }
                    }
                }
                if report.source_deleted {
                    println!("Merged {} into {}", source, target);
                } else {
                    println!(
                        "Merge incomplete; player {} kept for retry (see failures above)",
                        source
                    );
                }
            }
        }
        Commands::Leaderboard { league } => {
            let league_id = league.as_str().into();
            let entries = store.read_leaderboard(&league_id)?;
            if entries.is_empty() {
                println!("No leaderboard entries for league {}", league);
            }
            for (i, entry) in entries.iter().enumerate() {
                println!(
                    "{:>3}. {:<20} {:>5} pts  ({} played, best {}, avg {})",
                    i + 1,
                    entry.player_id,
                    entry.total_points,
                    entry.tournaments_played,
                    entry
                        .best_placement
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    entry
                        .avg_placement
                        .map(|a| format!("{:.2}", a))
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
        }
    }

    Ok(())
}
