// src/common/config.rs
//! Runtime configuration read from the environment (and `.env` via dotenv)

use std::env;

const DEFAULT_DATABASE_URL: &str = "sqlite://donations.db";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub reset_db: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        let cors_origins = parse_origins(
            &env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
        );

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|n| n.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(5);

        let reset_db = env::var("RESET_DB")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        Self {
            database_url,
            port,
            cors_origins,
            db_max_connections,
            reset_db,
        }
    }

    /// Filesystem path of the SQLite database, if the URL names a file
    pub fn database_file(&self) -> Option<&str> {
        let path_part = self.database_url.strip_prefix("sqlite://")?;
        let path = path_part.split('?').next().unwrap_or("");
        if path.is_empty() || path.starts_with(':') {
            None
        } else {
            Some(path)
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
