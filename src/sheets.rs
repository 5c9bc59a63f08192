//! Google Sheets values API client authenticated as a service account.
//!
//! Every fetch signs a fresh RS256 assertion, trades it for a bearer token
//! at the key's token URI and reads the range with it. Nothing is cached
//! between fetches.

use async_trait::async_trait;
use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use ring::{
    rand::SystemRandom,
    signature::{RSA_PKCS1_SHA256, RsaKeyPair},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{
    config::Config,
    source::{FetchError, RowSource},
};

pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const JWT_HEADER: &str = r#"{"alg":"RS256","typ":"JWT"}"#;
const TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Absent `values` means the range is empty.
#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

pub struct SheetsClient {
    http: Client,
    key_pair: RsaKeyPair,
    rng: SystemRandom,
    client_email: String,
    token_uri: String,
    spreadsheet_id: String,
    api_base: String,
}

impl SheetsClient {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let account = &config.service_account;
        let der = pem_to_der(&account.private_key)?;
        let key_pair = RsaKeyPair::from_pkcs8(&der).map_err(|e| FetchError::Key(e.to_string()))?;

        Ok(Self {
            http: Client::new(),
            key_pair,
            rng: SystemRandom::new(),
            client_email: account.client_email.clone(),
            token_uri: account.token_uri.clone(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            api_base: config.sheets_api_base.trim_end_matches('/').to_string(),
        })
    }

    fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String, FetchError> {
        let iat = now.timestamp();
        let claims = Claims {
            iss: self.client_email.clone(),
            scope: SPREADSHEETS_SCOPE.to_string(),
            aud: self.token_uri.clone(),
            iat,
            exp: iat + TOKEN_LIFETIME_SECS,
        };

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(JWT_HEADER),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
        );

        let mut signature = vec![0; self.key_pair.public().modulus_len()];
        self.key_pair
            .sign(
                &RSA_PKCS1_SHA256,
                &self.rng,
                signing_input.as_bytes(),
                &mut signature,
            )
            .map_err(|_| FetchError::Signing)?;

        Ok(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    async fn access_token(&self) -> Result<String, FetchError> {
        let assertion = self.signed_assertion(Utc::now())?;

        let response = self
            .http
            .post(&self.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let token: TokenResponse = ensure_success(response).await?.json().await?;
        Ok(token.access_token)
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.api_base, self.spreadsheet_id, range
        )
    }
}

#[async_trait]
impl RowSource for SheetsClient {
    async fn fetch_rows(&self, range: &str) -> Result<Vec<Vec<String>>, FetchError> {
        let token = self.access_token().await?;

        let response = self
            .http
            .get(self.values_url(range))
            .bearer_auth(token)
            .send()
            .await?;

        let value_range: ValueRange = ensure_success(response).await?.json().await?;
        debug!(range, rows = value_range.values.len(), "Fetched sheet range");

        Ok(value_range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }
}

async fn ensure_success(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(FetchError::Status { status, body })
}

/// Formatted values arrive as strings; anything else is rendered as JSON.
fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn pem_to_der(pem: &str) -> Result<Vec<u8>, FetchError> {
    let body: String = pem
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("-----"))
        .collect();

    if body.is_empty() {
        return Err(FetchError::Key("no PEM body found".to_string()));
    }

    STANDARD
        .decode(body)
        .map_err(|e| FetchError::Key(e.to_string()))
}
