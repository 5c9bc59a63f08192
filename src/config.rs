use std::{env, fmt::Display, str::FromStr};

use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key} value: {message}")]
    Invalid { key: &'static str, message: String },
}

/// The service-account key fields that take part in signing.
#[derive(Debug, Clone)]
pub struct ServiceAccount {
    pub private_key: String,
    pub client_email: String,
    pub token_uri: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub spreadsheet_id: String,
    pub api_secret: String,
    pub sheets_api_base: String,
    pub service_account: ServiceAccount,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        Ok(Self {
            port: vars.parsed("PORT", DEFAULT_PORT)?,
            spreadsheet_id: vars.required("SHEET_ID")?,
            api_secret: vars.required("API_SECRET")?,
            sheets_api_base: sheets_api_base(&vars),
            service_account: ServiceAccount::from_vars(&vars)?,
        })
    }
}

impl ServiceAccount {
    fn from_vars<F>(vars: &Vars<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let encoded_key = vars.required("PRIVATE_KEY")?;

        Ok(Self {
            private_key: decode_private_key(&encoded_key)?,
            client_email: vars.required("CLIENT_EMAIL")?,
            token_uri: vars.or_default("TOKEN_URI", DEFAULT_TOKEN_URI),
        })
    }
}

/// An explicit `SHEETS_API_BASE` wins. Otherwise the key's universe domain
/// picks the host, `googleapis.com` when unset.
fn sheets_api_base<F>(vars: &Vars<F>) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(base) = vars.optional("SHEETS_API_BASE") {
        return base;
    }

    match vars.optional("UNIVERSE_DOMAIN") {
        Some(domain) => format!("https://sheets.{}", domain.trim()),
        None => {
            info!("SHEETS_API_BASE not set, using default: {DEFAULT_SHEETS_API_BASE}");
            DEFAULT_SHEETS_API_BASE.to_string()
        }
    }
}

/// `PRIVATE_KEY` holds the PEM text base64-encoded. Key files exported
/// through JSON often carry literal `\n` sequences instead of newlines.
pub fn decode_private_key(encoded: &str) -> Result<String, ConfigError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| ConfigError::Invalid {
            key: "PRIVATE_KEY",
            message: e.to_string(),
        })?;

    let pem = String::from_utf8(bytes).map_err(|e| ConfigError::Invalid {
        key: "PRIVATE_KEY",
        message: e.to_string(),
    })?;

    Ok(pem.replace("\\n", "\n"))
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.optional(key).ok_or(ConfigError::Missing(key))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
    }

    fn parsed<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr + Display,
        T::Err: Display,
    {
        match self.optional(key) {
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                message: e.to_string(),
            }),
            None => {
                info!("{key} not set, using default: {default}");
                Ok(default)
            }
        }
    }
}
