use std::{fs::read_to_string, path::Path};

use chrono::NaiveDate;
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::{
    core::password::{hash_password, verify_password},
    error::Error,
};

/// Plaintext description of a tournament, before its password is hashed.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct TournamentSeed {
    pub title: String,
    pub city: String,
    pub state: String,
    pub country: String,

    /// Hex ObjectId of a document in the sports collection.
    /// This is never checked against the database.
    pub sport: String,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    /// Plaintext password, only ever leaves the process hashed
    pub password: String,
}

/// A tournament document as stored in the tournaments collection
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub title: String,

    #[serde(rename = "City")]
    pub city: String,

    #[serde(rename = "State")]
    pub state: String,

    #[serde(rename = "Country")]
    pub country: String,

    #[serde(rename = "Sport")]
    pub sport: ObjectId,

    #[serde(rename = "startDate")]
    pub start_date: DateTime,

    #[serde(rename = "endDate")]
    pub end_date: DateTime,

    /// bcrypt hash of the tournament password
    password: String,
}

fn seed(
    title: &str,
    (city, state, country): (&str, &str, &str),
    sport: &str,
    start: (i32, u32, u32),
    end: (i32, u32, u32),
    password: &str,
) -> Option<TournamentSeed> {
    Some(TournamentSeed {
        title: title.to_owned(),
        city: city.to_owned(),
        state: state.to_owned(),
        country: country.to_owned(),
        sport: sport.to_owned(),
        start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2)?,
        end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2)?,
        password: password.to_owned(),
    })
}

impl TournamentSeed {
    /// The three sample tournaments, in insertion order.
    pub fn default_seeds() -> Vec<TournamentSeed> {
        [
            seed(
                "Spring Soccer Championship",
                ("Los Angeles", "CA", "USA"),
                "67553f570073492b5b0ed126",
                (2024, 3, 1),
                (2024, 3, 10),
                "soccer123",
            ),
            seed(
                "Summer Tennis Open",
                ("New York", "NY", "USA"),
                "67554dfc011416dbd70be9c3",
                (2024, 6, 15),
                (2024, 6, 20),
                "tennis2024",
            ),
            seed(
                "Winter Basketball League",
                ("Chicago", "IL", "USA"),
                "67554d8b011416dbd70be9bf",
                (2024, 12, 1),
                (2024, 12, 15),
                "basketball2024",
            ),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Reads a json array of seeds.
    pub fn load(path: &Path) -> Result<Vec<TournamentSeed>, Error> {
        Ok(serde_json::from_str(&read_to_string(path)?)?)
    }

    /// Builds the stored document, hashing the password with a fresh salt.
    pub fn into_tournament(self, cost: u32) -> Result<Tournament, Error> {
        let sport = ObjectId::parse_str(&self.sport)
            .map_err(|e| Error::InvalidSport(self.sport.clone(), e))?;

        Ok(Tournament {
            sport,
            start_date: midnight_utc(self.start_date, &self.title)?,
            end_date: midnight_utc(self.end_date, &self.title)?,
            password: hash_password(&self.password, cost)?,
            title: self.title,
            city: self.city,
            state: self.state,
            country: self.country,
        })
    }
}

fn midnight_utc(date: NaiveDate, title: &str) -> Result<DateTime, Error> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| DateTime::from_chrono(dt.and_utc()))
        .ok_or_else(|| Error::InvalidDate(title.to_owned()))
}

impl Tournament {
    pub fn password_hash(&self) -> &str {
        &self.password
    }

    pub fn verify_password(&self, plaintext: &str) -> Result<bool, Error> {
        verify_password(plaintext, &self.password)
    }
}
