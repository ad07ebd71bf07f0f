use config::Environment;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to load or parse configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("required setting missing from environment: {0}")]
    Missing(&'static str),
}

/// Settings for the IMAP tools, sourced from `CLIMAP_*` environment
/// variables (optionally seeded from a TOML file).
#[derive(Debug, Clone)]
pub struct ClimapSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    /// Base directory for downloaded messages. Only required when a tool
    /// actually downloads something.
    pub base: Option<String>,
    /// Overrides the TLS SNI/verification name, for servers whose
    /// certificate does not match the connection host.
    pub tls_servername: Option<String>,
}

// Raw shape as deserialized by the config crate; required fields are
// validated afterwards so the error can name the exact variable.
#[derive(Debug, Deserialize)]
struct RawClimapSettings {
    host: Option<String>,
    port: u16,
    user: Option<String>,
    pass: Option<String>,
    base: Option<String>,
    tls_servername: Option<String>,
}

impl ClimapSettings {
    pub fn new(config_path: Option<&str>) -> Result<Self, SettingsError> {
        let mut builder = config::Config::builder()
            // IMAPS default
            .set_default("port", 993)?;

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // e.g. `CLIMAP_HOST=...` sets `host`
        builder = builder.add_source(Environment::with_prefix("CLIMAP").ignore_empty(true));

        let raw: RawClimapSettings = builder.build()?.try_deserialize()?;

        Ok(Self {
            host: raw.host.ok_or(SettingsError::Missing("CLIMAP_HOST"))?,
            port: raw.port,
            user: raw.user.ok_or(SettingsError::Missing("CLIMAP_USER"))?,
            pass: raw.pass.ok_or(SettingsError::Missing("CLIMAP_PASS"))?,
            base: raw.base,
            tls_servername: raw.tls_servername,
        })
    }
}

/// Settings for the SparkPost sender. The API key comes from
/// `SPARKPOST_API_KEY`; the base URL is a command-line concern.
#[derive(Debug, Clone)]
pub struct SparksSettings {
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
struct RawSparksSettings {
    api_key: Option<String>,
}

impl SparksSettings {
    pub fn new() -> Result<Self, SettingsError> {
        let raw: RawSparksSettings = config::Config::builder()
            .add_source(Environment::with_prefix("SPARKPOST").ignore_empty(true))
            .build()?
            .try_deserialize()?;

        let api_key = raw
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(SettingsError::Missing("SPARKPOST_API_KEY"))?;

        Ok(Self { api_key })
    }
}
