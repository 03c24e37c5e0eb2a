use std::{fs::read_to_string, io::ErrorKind, path::Path};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;

/// Environment variable that overrides `database.uri`.
pub const DATABASE_URI_VAR: &str = "MONGODB_URI";

/// Json struct for settings shared by the seeder and the login probe
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub login: LoginSettings,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DatabaseSettings {
    /// Connection string of the document store. Never has a compiled-in value.
    pub uri: Option<String>,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    /// bcrypt work factor used when hashing tournament passwords
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LoginSettings {
    #[serde(default = "default_login_url")]
    pub url: Url,
    /// Login credentials. Like the database URI, these have no compiled-in value.
    pub email: Option<String>,
    pub password: Option<String>,
}

fn default_database() -> String {
    "final-project".to_owned()
}

fn default_collection() -> String {
    "tournaments".to_owned()
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_login_url() -> Url {
    Url::parse("http://localhost:4000/api/users/login").expect("static login url is valid")
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            uri: None,
            database: default_database(),
            collection: default_collection(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

impl Default for LoginSettings {
    fn default() -> Self {
        LoginSettings {
            url: default_login_url(),
            email: None,
            password: None,
        }
    }
}

impl Settings {
    /// Loads settings from a json file, falling back to defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let mut settings = match read_to_string(path) {
            Ok(file) => serde_json::from_str::<Settings>(&file)
                .map_err(|e| Error::Settings(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("Settings file {} does not exist, using defaults", path.display());
                Settings::default()
            }
            Err(e) => Err(e)?,
        };

        if let Ok(uri) = std::env::var(DATABASE_URI_VAR) {
            log::debug!("Using database URI from {}", DATABASE_URI_VAR);
            settings.database.uri = Some(uri);
        }

        Ok(settings)
    }

    pub fn database_uri(&self) -> Result<&str, Error> {
        self.database
            .uri
            .as_deref()
            .filter(|uri| !uri.trim().is_empty())
            .ok_or(Error::MissingDatabaseUri)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.database.database, "final-project");
        assert_eq!(settings.database.collection, "tournaments");
        assert_eq!(settings.database.bcrypt_cost, 12);
        assert_eq!(
            settings.login.url.as_str(),
            "http://localhost:4000/api/users/login"
        );
        assert!(settings.login.email.is_none());
        assert!(settings.login.password.is_none());
        assert!(matches!(
            settings.database_uri(),
            Err(Error::MissingDatabaseUri)
        ));
    }

    #[test]
    fn test_partial_file() {
        let json = r#"{ "database": { "uri": "mongodb://db.local:27017", "collection": "events" } }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.database_uri().unwrap(), "mongodb://db.local:27017");
        assert_eq!(settings.database.collection, "events");
        assert_eq!(settings.database.database, "final-project");
        assert_eq!(settings.login, LoginSettings::default());
    }

    #[test]
    fn test_login_credentials_from_file() {
        let json = r#"{ "login": { "email": "john@example.com", "password": "password123" } }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.login.email.as_deref(), Some("john@example.com"));
        assert_eq!(settings.login.password.as_deref(), Some("password123"));
        assert_eq!(
            settings.login.url.as_str(),
            "http://localhost:4000/api/users/login"
        );
    }

    #[test]
    fn test_blank_uri() {
        let mut settings = Settings::default();
        settings.database.uri = Some("  ".to_owned());
        assert!(settings.database_uri().is_err());
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ \"login\": {{ \"url\": \"not a url\" }} }}").unwrap();

        assert!(matches!(
            Settings::load(file.path()),
            Err(Error::Settings(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings.login, LoginSettings::default());
    }
}
