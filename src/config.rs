use std::env;

use crate::error::{Result, RowBindError};

/// Environment variable holding the connection string.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Connection settings for [`RowBindClient`](crate::RowBindClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
}

impl Config {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// Reads the configuration from the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup(DATABASE_URL_ENV)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| RowBindError::Config(format!("{DATABASE_URL_ENV} is not set")))?;
        Ok(Self { database_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lookup() {
        let config =
            Config::from_lookup(|_| Some(" postgres://localhost/app ".to_string())).unwrap();
        assert_eq!(config, Config::new("postgres://localhost/app"));
    }

    #[test]
    fn test_missing_or_blank_url() {
        assert!(matches!(
            Config::from_lookup(|_| None),
            Err(RowBindError::Config(_))
        ));
        assert!(matches!(
            Config::from_lookup(|_| Some("  ".to_string())),
            Err(RowBindError::Config(_))
        ));
    }
}
