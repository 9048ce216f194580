// Runtime configuration
// Every store location and credential is injected from the environment at
// process start; defaults reproduce the original deployment.

use std::env;
use std::path::PathBuf;

/// Configuration for the loaders and the lookup server.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file for the relational tables.
    pub database_path: PathBuf,
    /// MongoDB connection string for the document collections.
    pub mongo_uri: String,
    /// MongoDB database holding the three list collections.
    pub mongo_database: String,
    /// Directory holding the taxpayer-list workbooks.
    pub data_dir: PathBuf,
    /// Directory holding `{bin}.json` lookup cache files.
    pub cache_dir: PathBuf,
    /// Base URL of the upstream registry API.
    pub registry_base_url: String,
    /// Listen address for the lookup server.
    pub listen_addr: String,
}

impl Config {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        Config {
            database_path: env_path("REGISTRY_DATABASE_PATH", "registry.db"),
            mongo_uri: env_or("REGISTRY_MONGO_URI", "mongodb://localhost:27017"),
            mongo_database: env_or("REGISTRY_MONGO_DATABASE", "business_lists"),
            data_dir: env_path("REGISTRY_DATA_DIR", "."),
            cache_dir: env_path("REGISTRY_CACHE_DIR", "."),
            registry_base_url: env_or("REGISTRY_BASE_URL", "https://old.stat.gov.kz"),
            listen_addr: env_or("REGISTRY_LISTEN_ADDR", "0.0.0.0:3000"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_path(key: &str, default: &str) -> PathBuf {
    PathBuf::from(env_or(key, default))
}
