use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::{Parser, Subcommand};
use url::Url;

use crate::{
    core::{
        seeder::{build_tournaments_blocking, run_seed, SeedReport},
        settings::Settings,
        tournament::TournamentSeed,
    },
    error::Error,
    integrations::login::{Credentials, LoginOutcome, LoginProbe},
};

mod core;
mod error;
mod integrations;

const SUCCESS: u8 = 0;

/// Exit code for an operation that ran but failed, such as a rejected login.
const OPERATION_FAILURE: u8 = 1;

/// Exit code for failures that happen before or around the operation itself,
/// such as bad settings or an unreachable endpoint.
const ENVIRONMENT_FAILURE: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "tourney")]
#[command(version = "0.1")]
#[command(about = "Seeds sample tournaments and probes the login route.", long_about = None)]
struct Args {
    /// Location of the json settings file.
    /// Missing files fall back to defaults.
    #[arg(short, long, global = true, default_value = "settings.json")]
    settings: PathBuf,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: RunType,
}

#[derive(Subcommand, Debug)]
enum RunType {
    /// Insert the sample tournaments into the tournaments collection.
    Seed {
        /// Database connection string, overriding the settings file and MONGODB_URI.
        #[arg(long)]
        uri: Option<String>,

        /// A json array of tournaments to insert instead of the built-in samples.
        #[arg(short, long)]
        tournaments: Option<PathBuf>,

        /// Build and hash the tournaments and print them without connecting.
        #[arg(long)]
        dry_run: bool,
    },

    /// Send one login request and print the result.
    Login {
        #[arg(long)]
        url: Option<Url>,

        #[arg(short, long)]
        email: Option<String>,

        #[arg(short, long)]
        password: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn failure_status(err: &Error) -> u8 {
    if err.is_environmental() {
        ENVIRONMENT_FAILURE
    } else {
        OPERATION_FAILURE
    }
}

fn seed_status(res: &Result<SeedReport, Error>) -> u8 {
    match res {
        Ok(_) => SUCCESS,
        Err(err) => failure_status(err),
    }
}

fn login_status(res: &Result<LoginOutcome, Error>) -> u8 {
    match res {
        Ok(outcome) if outcome.is_success() => SUCCESS,
        Ok(_) => OPERATION_FAILURE,
        Err(err) => failure_status(err),
    }
}

/// Errors that stop a subcommand before it produces an outcome are environmental.
fn exit_status(res: &anyhow::Result<u8>) -> u8 {
    match res {
        Ok(status) => *status,
        Err(_) => ENVIRONMENT_FAILURE,
    }
}

async fn seed(
    settings: Settings,
    uri: Option<String>,
    tournaments: Option<PathBuf>,
    dry_run: bool,
) -> anyhow::Result<u8> {
    let seeds = match &tournaments {
        Some(path) => TournamentSeed::load(path)
            .with_context(|| format!("Failed to load tournaments from {}", path.display()))?,
        None => TournamentSeed::default_seeds(),
    };

    if dry_run {
        let built = build_tournaments_blocking(seeds, settings.database.bcrypt_cost).await?;
        println!("{}", serde_json::to_string_pretty(&built)?);
        return Ok(SUCCESS);
    }

    let uri = match uri {
        Some(uri) => uri,
        None => settings.database_uri()?.to_owned(),
    };

    let res = run_seed(&settings.database, &uri, seeds).await;
    match &res {
        Ok(report) => {
            log::info!("Inserted {} tournaments", report.inserted);
            println!("All tournaments created successfully!");
        }
        Err(err) => {
            log::error!("{:?}", err);
            println!("Error creating tournaments: {}", err);
        }
    }

    Ok(seed_status(&res))
}

async fn login(
    settings: Settings,
    url: Option<Url>,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<u8> {
    let url = url.unwrap_or(settings.login.url);
    let credentials = Credentials {
        email: email
            .or(settings.login.email)
            .ok_or(Error::MissingCredentials)?,
        password: password
            .or(settings.login.password)
            .ok_or(Error::MissingCredentials)?,
    };

    let res = LoginProbe::new().login(&url, &credentials).await;
    match &res {
        Ok(outcome) => outcome.report(&mut std::io::stdout().lock())?,
        Err(err) => println!("Login request failed: {}", err),
    }

    Ok(login_status(&res))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let res = match Settings::load(&args.settings) {
        Ok(settings) => match args.command {
            RunType::Seed {
                uri,
                tournaments,
                dry_run,
            } => seed(settings, uri, tournaments, dry_run).await,
            RunType::Login {
                url,
                email,
                password,
            } => login(settings, url, email, password).await,
        },
        Err(err) => Err(err).context("Failed to load settings"),
    };

    if let Err(err) = &res {
        log::error!("{:#}", err);
    }

    ExitCode::from(exit_status(&res))
}
