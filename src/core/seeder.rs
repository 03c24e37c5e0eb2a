use std::future::{pending, Future};

use futures::FutureExt;

use crate::{
    core::{
        db::{with_store, MongoStore, TournamentStore},
        settings::DatabaseSettings,
        tournament::{Tournament, TournamentSeed},
    },
    error::Error,
};

/// Outcome of a successful seeding run
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct SeedReport {
    pub inserted: usize,
}

/// Builds every document up front, so a bad seed aborts before anything is written.
pub fn build_tournaments(
    seeds: Vec<TournamentSeed>,
    cost: u32,
) -> Result<Vec<Tournament>, Error> {
    seeds
        .into_iter()
        .map(|seed| {
            log::debug!("Hashing password for {}", seed.title);
            seed.into_tournament(cost)
        })
        .collect()
}

/// Runs [`build_tournaments`] on the blocking pool, keeping bcrypt off the runtime thread.
pub async fn build_tournaments_blocking(
    seeds: Vec<TournamentSeed>,
    cost: u32,
) -> Result<Vec<Tournament>, Error> {
    tokio::task::spawn_blocking(move || build_tournaments(seeds, cost)).await?
}

/// Resolves on the first Ctrl-C. Never resolves if the handler cannot be installed.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for Ctrl-C: {}", e);
        pending::<()>().await;
    }
}

async fn build_and_insert<S: TournamentStore>(
    store: &S,
    seeds: Vec<TournamentSeed>,
    cost: u32,
) -> Result<SeedReport, Error> {
    let tournaments = build_tournaments_blocking(seeds, cost).await?;

    log::info!("Inserting {} tournaments", tournaments.len());
    let inserted = store.insert_many(&tournaments).await?;

    if inserted != tournaments.len() {
        return Err(Error::PartialInsert {
            expected: tournaments.len(),
            inserted,
        });
    }

    Ok(SeedReport { inserted })
}

/// Builds the tournaments and appends them to the store in one bulk insert.
///
/// If `interrupt` resolves first, whether during hashing or during the insert,
/// the run is abandoned with [`Error::Interrupted`].
pub async fn seed_tournaments<S, I>(
    store: &S,
    seeds: Vec<TournamentSeed>,
    cost: u32,
    interrupt: I,
) -> Result<SeedReport, Error>
where
    S: TournamentStore,
    I: Future<Output = ()>,
{
    tokio::select! {
        biased;
        _ = interrupt => {
            log::warn!("Interrupted, abandoning seeding");
            Err(Error::Interrupted)
        }
        res = build_and_insert(store, seeds, cost) => res,
    }
}

/// Seeds the configured collection, closing the connection on every exit path.
pub async fn run_seed(
    settings: &DatabaseSettings,
    uri: &str,
    seeds: Vec<TournamentSeed>,
) -> Result<SeedReport, Error> {
    let store = MongoStore::connect(uri, &settings.database, &settings.collection).await?;
    let cost = settings.bcrypt_cost;

    with_store(store, move |store| {
        seed_tournaments(store, seeds, cost, ctrl_c()).boxed_local()
    })
    .await
}
