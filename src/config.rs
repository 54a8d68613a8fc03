use std::env;
use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_VALIDITY_MINUTES: i64 = 30;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable {name} has invalid value '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub base_url: String,
    pub default_validity_minutes: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };
        let base_url = match lookup("BASE_URL") {
            Some(value) => {
                Url::parse(&value).map_err(|_| ConfigError::InvalidValue {
                    name: "BASE_URL",
                    value: value.clone(),
                })?;
                value.trim_end_matches('/').to_string()
            }
            None => format!("http://localhost:{port}"),
        };
        let default_validity_minutes = match lookup("DEFAULT_VALIDITY_MINUTES") {
            Some(value) => value
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|minutes| *minutes > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: "DEFAULT_VALIDITY_MINUTES",
                    value,
                })?,
            None => DEFAULT_VALIDITY_MINUTES,
        };

        Ok(Self {
            host,
            port,
            base_url,
            default_validity_minutes,
        })
    }

    pub fn server_address(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                name: "HOST",
                value: self.host.clone(),
            })
    }
}
