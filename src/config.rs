use sqlx::postgres::PgConnectOptions;
use std::net::SocketAddr;

use crate::shared::AppError;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_CLIENT_ORIGIN: &str = "https://car-doctor-fdee9.web.app";
const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_NAME: &str = "car_doctor";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Which document store backs the service
pub enum StoreConfig {
    /// Process-local store, contents are lost on exit
    Memory,
    Postgres {
        options: PgConnectOptions,
        max_connections: u32,
    },
}

/// Process configuration, read once at startup
pub struct Config {
    pub port: u16,
    pub token_secret: String,
    pub client_origin: String,
    pub store: StoreConfig,
}

impl Config {
    /// Loads configuration from the process environment
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| AppError::Config(format!("PORT is not a valid port: {raw}")))?,
            None => DEFAULT_PORT,
        };

        let token_secret = lookup("ACCESS_TOKEN_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| AppError::Config("ACCESS_TOKEN_SECRET must be set".to_string()))?;

        let client_origin =
            lookup("CLIENT_ORIGIN").unwrap_or_else(|| DEFAULT_CLIENT_ORIGIN.to_string());

        let store = match lookup("DOCUMENT_STORE").as_deref() {
            Some("memory") => StoreConfig::Memory,
            None | Some("postgres") => postgres_config(&lookup)?,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "DOCUMENT_STORE must be `postgres` or `memory`, got `{other}`"
                )))
            }
        };

        Ok(Self {
            port,
            token_secret,
            client_origin,
            store,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn postgres_config<F>(lookup: &F) -> Result<StoreConfig, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let max_connections = match lookup("DB_MAX_CONNECTIONS") {
        Some(raw) => raw.parse().map_err(|_| {
            AppError::Config(format!("DB_MAX_CONNECTIONS is not a number: {raw}"))
        })?,
        None => DEFAULT_DB_MAX_CONNECTIONS,
    };

    if let Some(url) = lookup("DATABASE_URL") {
        let options = url
            .parse::<PgConnectOptions>()
            .map_err(|e| AppError::Config(format!("DATABASE_URL is not a valid URL: {e}")))?;
        return Ok(StoreConfig::Postgres {
            options,
            max_connections,
        });
    }

    let (Some(user), Some(pass)) = (lookup("DB_USER"), lookup("DB_PASS")) else {
        return Err(AppError::Config(
            "either DATABASE_URL or DB_USER and DB_PASS must be set".to_string(),
        ));
    };
    let host = lookup("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string());
    let name = lookup("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string());

    // Credentials are passed as-is, never spliced into a URL
    let options = PgConnectOptions::new()
        .host(&host)
        .username(&user)
        .password(&pass)
        .database(&name);

    Ok(StoreConfig::Postgres {
        options,
        max_connections,
    })
}
