use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Directory holding the JSON collection files
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Address the HTTP API binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:3001".to_string()
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // Parse environment variables into Config struct
        let config = envy::from_env::<Config>()?;

        Ok(config)
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    // Ensure .env file is loaded
    dotenv().ok();

    // Load the configuration
    let config = Config::load()?;

    Ok(config)
}
