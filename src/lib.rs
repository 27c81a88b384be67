pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::resolver::RateResolver;
use crate::core::series::DateRange;
use crate::core::snapshot::KeyValueSnapshotRepository;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, info};

const RATES_COLLECTION: &str = "rates";
const SNAPSHOTS_COLLECTION: &str = "snapshots";

pub enum AppCommand {
    Rate,
    ClearRate,
    Record { path: PathBuf },
    Series { range: DateRange },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("ratefold starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let data_path = config.default_data_path()?;
    let store = store::KeyValueStore::open(&data_path.join("store"))
        .with_context(|| format!("Failed to open data store under {}", data_path.display()))?;

    let resolver = RateResolver::new(
        providers::rate_provider(&config.rate),
        store.collection(RATES_COLLECTION)?,
        config.rate.resolver_settings(),
    );

    match command {
        AppCommand::Rate => cli::rate::run(&resolver).await,
        AppCommand::ClearRate => cli::rate::clear(&resolver).await,
        AppCommand::Record { path } => {
            let repository =
                KeyValueSnapshotRepository::new(store.collection(SNAPSHOTS_COLLECTION)?);
            cli::record::run(&repository, &config.user, &path).await
        }
        AppCommand::Series { range } => {
            let repository =
                KeyValueSnapshotRepository::new(store.collection(SNAPSHOTS_COLLECTION)?);
            cli::series::run(&repository, &resolver, &config.user, range).await
        }
    }
}
