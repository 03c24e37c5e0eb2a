use std::io::{self, Write};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::Error;

/// Json body sent to the login route
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Login route return type on HTTP 200
#[derive(Deserialize)]
struct LoginSuccessJson {
    data: LoginData,
}

#[derive(Deserialize)]
struct LoginData {
    token: String,
    #[serde(default)]
    user: Value,
}

/// Login route return type on any other status
#[derive(Deserialize)]
struct LoginFailureJson {
    message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Success { token: String, user: Value },
    Rejected { status: StatusCode, message: Option<String> },
}

impl LoginOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success { .. })
    }

    pub fn report(&self, out: &mut impl Write) -> io::Result<()> {
        match self {
            LoginOutcome::Success { token, user } => {
                writeln!(out, "Login successful")?;
                writeln!(out, "Token: {}", token)?;
                writeln!(out, "User Info: {}", user)
            }
            LoginOutcome::Rejected { status, message } => {
                writeln!(out, "Login failed")?;
                match message {
                    Some(message) => writeln!(out, "Error message: {}", message),
                    None => writeln!(out, "Error message: None (HTTP {})", status),
                }
            }
        }
    }
}

/// Sends a single login request per call. The token is never kept.
#[derive(Default)]
pub struct LoginProbe {
    client: reqwest::Client,
}

impl LoginProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn login(&self, url: &Url, credentials: &Credentials) -> Result<LoginOutcome, Error> {
        log::info!("Logging in as {} at {}", credentials.email, url);
        let response = self
            .client
            .post(url.clone())
            .json(credentials)
            .send()
            .await
            .map_err(|source| Error::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        log::debug!("Login returned {}", status);

        if status == StatusCode::OK {
            let body: LoginSuccessJson = response
                .json()
                .await
                .map_err(|e| Error::MalformedResponse(e.to_string()))?;

            Ok(LoginOutcome::Success {
                token: body.data.token,
                user: body.data.user,
            })
        } else {
            let body = response.text().await?;
            let message = match serde_json::from_str::<LoginFailureJson>(&body) {
                Ok(json) => json.message,
                Err(e) => {
                    log::warn!("Failed to parse login error body: {}", e);
                    None
                }
            };

            Ok(LoginOutcome::Rejected { status, message })
        }
    }
}
