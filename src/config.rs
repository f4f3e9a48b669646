use crate::prelude::Result;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Represents the application's configuration.
///
#[derive(Debug, Deserialize)]
pub struct Config {
    pub proxmox: ProxmoxEnv,
}

impl Config {
    /// Loads the configuration from environment variables.
    ///
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv()?;
        tracing::info!(target: "config", ".env loaded.");

        let config_dir =
            std::path::Path::new(&std::env::var("CARGO_MANIFEST_DIR")?).join("configuration");
        let env_filename = Environment::from(&*std::env::var("APP_ENVIRONMENT")?).as_filename();

        let config = config::Config::builder()
            .add_source(config::File::from(config_dir.join("base.yaml")))
            .add_source(config::File::from(config_dir.join(env_filename)))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize::<Config>()?;

        tracing::info!(target: "config", ?config, "Configuration loaded.");

        Ok(config)
    }
}

// -----------------------------------------------------------------------------

/// All settings required to work with Proxmox.
///
#[derive(Debug, Clone, Deserialize)]
pub struct ProxmoxEnv {
    pub url: String,
    pub auth_header: SecretString,
}

// -----------------------------------------------------------------------------

/// Represents the different environments the application can run in.
///
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    /// Returns the filename for the environment-specific configuration file.
    ///
    pub fn as_filename(&self) -> String {
        serde_json::to_string(self)
            .expect("Environment should always serialize successfully")
            .trim_matches('"')
            .to_owned()
            + ".yaml"
    }
}

impl From<&str> for Environment {
    fn from(value: &str) -> Self {
        match serde_json::from_str::<Self>(&format!("\"{value}\"")) {
            Ok(environment) => environment,
            Err(error) => {
                tracing::warn!(target: "config", value, ?error, "Incorrect environment format. Use either `local` or `production`.");
                Self::Local
            }
        }
    }
}
