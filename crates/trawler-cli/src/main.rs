//! trawler CLI: runs the backlog search against a seeded in-memory catalog.

use std::sync::Arc;

use anyhow::Context;
use chrono::{Days, NaiveDate};
use clap::{Parser, Subcommand};
use trawler_core::app::{CycleScheduler, SearchCycle};
use trawler_core::config::SchedulerConfig;
use trawler_core::domain::{Candidate, ItemKey, ItemState, Show, ShowId, Status};
use trawler_core::impls::{InMemoryItemStore, InMemoryViews, ScriptedProvider};
use trawler_core::observability::init_tracing;
use trawler_core::ports::{Clock, IdGenerator, SystemClock, UlidGenerator};

#[derive(Parser)]
#[command(name = "trawler", about = "Periodic backlog search for tracked episodes")]
struct Cli {
    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log: String,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the scheduler until Ctrl-C
    Serve {
        /// Wait one full interval before the first cycle
        #[arg(long)]
        no_run_at_start: bool,
    },
    /// Run a single search cycle and print its report
    Once,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log).context("initializing tracing")?;

    match cli.command.unwrap_or(Command::Serve {
        no_run_at_start: false,
    }) {
        Command::Serve { no_run_at_start } => cmd_serve(no_run_at_start).await,
        Command::Once => cmd_once().await,
    }
}

async fn cmd_serve(no_run_at_start: bool) -> anyhow::Result<()> {
    let mut config = SchedulerConfig::from_env().context("loading scheduler config")?;
    if no_run_at_start {
        config.run_at_start = false;
    }
    let run_at_start = config.run_at_start;

    let cycle = build_cycle().await;
    let scheduler = CycleScheduler::new(cycle, config)?;
    scheduler.start(run_at_start);
    tracing::info!("trawler running, press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("listening for Ctrl-C")?;
    tracing::info!("shutting down");
    scheduler.stop_and_join().await;

    println!("{}", serde_json::to_string_pretty(&scheduler.status().await)?);
    Ok(())
}

async fn cmd_once() -> anyhow::Result<()> {
    let cycle = build_cycle().await;
    let report = cycle.run().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn build_cycle() -> Arc<SearchCycle> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(InMemoryItemStore::new());
    let ids: Arc<dyn IdGenerator> = Arc::new(UlidGenerator::new(Arc::clone(&clock)));
    let provider = Arc::new(ScriptedProvider::new(store.clone(), Arc::clone(&ids)));

    seed_catalog(&store, &provider, clock.today()).await;

    let views = Arc::new(InMemoryViews::new(store.clone(), Arc::clone(&clock)));
    Arc::new(SearchCycle::new(store, views, provider, ids, clock))
}

/// Two shows with a mix of past, current and future episodes.
async fn seed_catalog(store: &InMemoryItemStore, provider: &ScriptedProvider, today: NaiveDate) {
    let ago = |n| today.checked_sub_days(Days::new(n)).unwrap_or(today);
    let ahead = |n| today.checked_add_days(Days::new(n)).unwrap_or(today);

    store
        .add_show(
            Show::new(ShowId(101), "Harbor Lights")
                .with_item(1, 1, "Pilot", ItemState::new(Status::Snatched, ago(21)))
                .with_item(1, 2, "Low Tide", ItemState::new(Status::Missed, ago(14)))
                .with_item(1, 3, "Fog Bank", ItemState::new(Status::Unaired, ago(7)))
                .with_item(1, 4, "Beacon", ItemState::new(Status::Unaired, today))
                .with_item(1, 5, "Undertow", ItemState::new(Status::Unaired, ahead(7))),
        )
        .await;
    store
        .add_show(
            Show::new(ShowId(202), "Night Shift")
                .with_item(2, 9, "Graveyard", ItemState::new(Status::Unaired, ago(1)))
                .with_item(2, 10, "Dawn", ItemState::new(Status::Unaired, ahead(3))),
        )
        .await;

    let release = |key: ItemKey, group: &str| {
        Candidate::new(format!("{key}-{group}"), key, format!("{key}.720p.{group}"))
    };
    let low_tide = ItemKey::new(ShowId(101), 1, 2);
    let beacon = ItemKey::new(ShowId(101), 1, 4);
    provider
        .script(low_tide, vec![release(low_tide, "KiNGS"), release(low_tide, "SVA")])
        .await;
    provider.script(beacon, vec![release(beacon, "NTb")]).await;
}
