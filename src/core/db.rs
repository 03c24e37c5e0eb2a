use std::panic::{resume_unwind, AssertUnwindSafe};

use futures::{future::LocalBoxFuture, FutureExt};
use mongodb::{Client, Collection};

use crate::{core::tournament::Tournament, error::Error};

/// A collection tournaments can be appended to.
pub trait TournamentStore: Sized {
    /// Appends all tournaments in a single bulk insert and returns how many were inserted.
    async fn insert_many(&self, tournaments: &[Tournament]) -> Result<usize, Error>;

    /// Releases the underlying connection.
    async fn close(self);
}

pub struct MongoStore {
    client: Client,
    collection: Collection<Tournament>,
}

impl MongoStore {
    /// Opens a client. `mongodb+srv` URIs resolve their SRV and TXT records here,
    /// so DNS failures surface as [`Error::Connect`] as well as parse errors.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, Error> {
        log::debug!("Opening client for {}.{}", database, collection);
        let client = Client::with_uri_str(uri).await.map_err(Error::Connect)?;
        let collection = client.database(database).collection::<Tournament>(collection);

        Ok(MongoStore { client, collection })
    }
}

impl TournamentStore for MongoStore {
    async fn insert_many(&self, tournaments: &[Tournament]) -> Result<usize, Error> {
        let result = self.collection.insert_many(tournaments).await?;
        Ok(result.inserted_ids.len())
    }

    async fn close(self) {
        log::debug!("Shutting down database client");
        self.client.shutdown().await;
    }
}

/// Runs `op` against the store, then closes the store exactly once.
///
/// The store is closed whether `op` succeeds, fails or panics. Panics are
/// resumed once the store has been closed.
pub async fn with_store<S, T, F>(store: S, op: F) -> Result<T, Error>
where
    S: TournamentStore,
    F: for<'a> FnOnce(&'a S) -> LocalBoxFuture<'a, Result<T, Error>>,
{
    let result = AssertUnwindSafe(op(&store)).catch_unwind().await;
    store.close().await;

    match result {
        Ok(result) => result,
        Err(panic) => resume_unwind(panic),
    }
}


#[cfg(test)]
mod tests {
    use super::{memory::MemoryStore, *};

    #[tokio::test]
    async fn test_close_on_success() {
        let store = MemoryStore::default();
        let counts = store.clone();

        let count = with_store(store, |s| async move { s.insert_many(&[]).await }.boxed_local())
            .await
            .unwrap();

        assert_eq!(count, 0);
        assert_eq!(counts.close_count(), 1);
    }

    #[tokio::test]
    async fn test_close_on_error() {
        let store = MemoryStore::failing("connection reset");
        let counts = store.clone();

        let res = with_store(store, |s| async move { s.insert_many(&[]).await }.boxed_local()).await;

        assert!(res.unwrap_err().to_string().contains("connection reset"));
        assert_eq!(counts.close_count(), 1);
    }

    #[tokio::test]
    async fn test_connect_error_is_environmental() {
        let res = MongoStore::connect("postgres://localhost:5432", "final-project", "tournaments").await;

        match res {
            Err(err @ Error::Connect(_)) => assert!(err.is_environmental()),
            Err(other) => panic!("expected a connect error, got {:?}", other),
            Ok(_) => panic!("connected with a non-mongodb uri"),
        }
    }

    #[tokio::test]
    async fn test_close_on_panic() {
        let store = MemoryStore::default();
        let counts = store.clone();

        let res = AssertUnwindSafe(with_store(store, |_| {
            async move {
                if true {
                    panic!("insert blew up");
                }
                Ok(())
            }
            .boxed_local()
        }))
        .catch_unwind()
        .await;

        assert!(res.is_err());
        assert_eq!(counts.close_count(), 1);
    }
}
