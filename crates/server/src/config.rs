use std::{collections::HashMap, path::Path};

use anyhow::Context;
use config::{Config, Environment, File};
use impersonation::{DEFAULT_EXPIRES_IN, DEFAULT_ISSUER};
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_BIND: &str = "127.0.0.1:8787";
pub const SETTINGS_FILE: &str = "server.toml";

/// Unprefixed variable names shared with the hosted backend deployment.
const BARE_ENV_KEYS: [(&str, &str); 3] = [
    ("JWT_SECRET", "jwt_secret"),
    ("SUPABASE_URL", "issuer"),
    ("SERVER_BIND", "server_bind"),
];

#[derive(Debug)]
pub struct Settings {
    pub server_bind: String,
    pub jwt_secret: Option<SecretString>,
    pub issuer: Url,
    pub default_expires_in: String,
}

#[derive(Deserialize)]
struct RawSettings {
    server_bind: String,
    #[serde(default)]
    jwt_secret: Option<String>,
    issuer: Url,
    default_expires_in: String,
}

impl From<RawSettings> for Settings {
    fn from(raw: RawSettings) -> Self {
        Self {
            server_bind: raw.server_bind,
            jwt_secret: raw.jwt_secret.map(SecretString::from),
            issuer: raw.issuer,
            default_expires_in: raw.default_expires_in,
        }
    }
}

pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(std::env::vars().collect(), Some(Path::new(SETTINGS_FILE)))
}

/// Defaults, then the optional settings file, then bare variables, then
/// `APP__*` variables; later sources win.
pub(crate) fn load_settings_from(
    env: HashMap<String, String>,
    file: Option<&Path>,
) -> anyhow::Result<Settings> {
    let bare: HashMap<String, String> = BARE_ENV_KEYS
        .iter()
        .filter_map(|(var, key)| env.get(*var).map(|value| (key.to_string(), value.clone())))
        .collect();

    let mut builder = Config::builder()
        .set_default("server_bind", DEFAULT_BIND)?
        .set_default("issuer", DEFAULT_ISSUER)?
        .set_default("default_expires_in", DEFAULT_EXPIRES_IN)?;
    if let Some(path) = file {
        builder = builder.add_source(File::from(path).required(false));
    }

    builder
        .add_source(Environment::default().source(Some(bare)))
        .add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .source(Some(env)),
        )
        .build()
        .context("failed to assemble server settings")?
        .try_deserialize::<RawSettings>()
        .map(Settings::from)
        .context("invalid server settings")
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
