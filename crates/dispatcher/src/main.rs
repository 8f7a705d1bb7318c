use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use dispatch::notify::LogNotifier;
use dispatch::{Config, Engine, Scheduler};
use store_postgres::{DatabaseConnectionInfo, PgDatabase};
use tokio::sync::watch;

/// CLI overrides for the dispatch round. Anything left unset falls back to
/// `Config::from_env`, which itself falls back to `Config::default`.
#[derive(Parser, Debug)]
#[command(name = "dispatcher", version, about = "Ride-share and delivery dispatch engine")]
struct Args {
    /// Seconds between dispatch rounds.
    #[arg(long)]
    interval: Option<u64>,

    /// Minimum cluster size before DBSCAN runs instead of the singleton path.
    #[arg(long)]
    min_cluster_size: Option<usize>,

    /// DBSCAN neighborhood radius, in the scaled feature space.
    #[arg(long)]
    eps: Option<f64>,

    /// DBSCAN minimum samples to form a core point.
    #[arg(long)]
    min_samples: Option<usize>,
}

impl Args {
    fn apply(self, mut config: Config) -> Config {
        if let Some(interval) = self.interval {
            config.interval_seconds = interval;
        }
        if let Some(min_cluster_size) = self.min_cluster_size {
            config.min_cluster_size = min_cluster_size;
        }
        if let Some(eps) = self.eps {
            config.dbscan_eps = eps;
        }
        if let Some(min_samples) = self.min_samples {
            config.dbscan_min_samples = min_samples;
        }
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    let config = args.apply(Config::from_env());

    if let Err(why) = config.validate() {
        log::error!("invalid configuration: {why}");
        return ExitCode::FAILURE;
    }

    let connection_info = match DatabaseConnectionInfo::from_env() {
        Some(info) => info,
        None => {
            log::error!("missing DATABASE_USER/DATABASE_PASSWORD/DATABASE_HOST/DATABASE_PORT/DATABASE_NAME in env");
            return ExitCode::FAILURE;
        }
    };

    let database = match PgDatabase::connect(&connection_info).await {
        Ok(database) => database,
        Err(why) => {
            log::error!("could not connect to database: {why}");
            return ExitCode::FAILURE;
        }
    };

    let round_deadline = config.round_deadline();
    let interval = std::time::Duration::from_secs(config.interval_seconds);

    let engine = Arc::new(Engine::new(
        database,
        config,
        Arc::new(dispatch::clock::SystemClock),
        Arc::new(LogNotifier),
    ));
    let scheduler = Scheduler::new(engine, interval, round_deadline);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        log::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    scheduler.run(shutdown_rx).await;
    ExitCode::SUCCESS
}
