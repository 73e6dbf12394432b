use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};

use dreamlog::adapters::AppSyncCollectionStore;
use dreamlog::application::{DefaultCollectionReconciler, ReconcileOutcome};
use dreamlog::config::{AppConfig, BackendOutputs};
use dreamlog::telemetry;

const ARG_USER_ID: &str = "user-id";
const ARG_OUTPUTS: &str = "outputs";

fn command() -> Command {
    Command::new("dreamlog")
        .about("Ensure a user owns exactly one default collection")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new(ARG_USER_ID)
                .long("user-id")
                .help("Owner id of the collections to reconcile")
                .env("DREAMLOG_USER_ID")
                .required(true),
        )
        .arg(
            Arg::new(ARG_OUTPUTS)
                .long("outputs")
                .value_name("PATH")
                .help("Backend outputs JSON supplying the data endpoint and API key")
                .env("DREAMLOG_OUTPUTS")
                .value_parser(clap::value_parser!(PathBuf)),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = command().get_matches();

    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    telemetry::init_tracing(&config.log_level, config.is_production())?;

    run(&config, &matches).await
}

async fn run(config: &AppConfig, matches: &ArgMatches) -> Result<()> {
    let user_id = matches
        .get_one::<String>(ARG_USER_ID)
        .context("--user-id is required")?;

    let mut data = config.data.clone();
    if let Some(path) = matches.get_one::<PathBuf>(ARG_OUTPUTS) {
        let outputs = BackendOutputs::from_path(path)?;
        data = data.with_outputs(&outputs);
    }

    let store = AppSyncCollectionStore::new(data.store_config()?)
        .context("Failed to create data API client")?;
    let reconciler = DefaultCollectionReconciler::with_settings(
        Arc::new(store),
        config.collections.reconciler_settings(),
    );

    tracing::info!(user_id = %user_id, "Reconciling default collection");

    match reconciler.ensure_default_collection(user_id).await? {
        ReconcileOutcome::Skipped => println!("skipped: no user id"),
        ReconcileOutcome::Created(collection) => println!("created {}", collection.id),
        ReconcileOutcome::AlreadySatisfied { collection_id } => {
            println!("ok {}", collection_id)
        }
        ReconcileOutcome::Pruned { survivor, deleted } => {
            println!("kept {}, deleted {}", survivor, deleted.len())
        }
    }

    Ok(())
}
