use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid settings: {0}")]
    Settings(String),

    #[error("No database URI configured, set MONGODB_URI or database.uri in the settings file")]
    MissingDatabaseUri,

    #[error("No login credentials configured, pass --email and --password or set them in the settings file")]
    MissingCredentials,

    #[error("Could not open the database client: {0}")]
    Connect(mongodb::error::Error),

    #[error("Password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Invalid sport reference {0}: {1}")]
    InvalidSport(String, mongodb::bson::oid::Error),

    #[error("Invalid date for {0}")]
    InvalidDate(String),

    #[error("Expected {expected} inserted documents, database reported {inserted}")]
    PartialInsert { expected: usize, inserted: usize },

    #[error("Interrupted before the operation completed")]
    Interrupted,

    #[error("Malformed login response: {0}")]
    MalformedResponse(String),

    #[error("Could not reach {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("HTTP Error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error means the program never got to perform its operation,
    /// as opposed to the operation itself failing.
    pub fn is_environmental(&self) -> bool {
        matches!(
            self,
            Error::Settings(_)
                | Error::MissingDatabaseUri
                | Error::MissingCredentials
                | Error::Connect(_)
                | Error::Interrupted
                | Error::Transport { .. }
                | Error::Io(_)
        )
    }
}
