use crate::error::{BadEnvVarSnafu, ParseEnvNumberSnafu, RosterResult};
use snafu::ResultExt;
use std::{env::VarError, sync::Arc};

const DEFAULT_DATABASE_URL: &str = "sqlite://roster.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SERVER_IP: &str = "127.0.0.1:8080";

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    db_config: Arc<DbConfig>,
    server_ip: String,
}

impl RuntimeConfiguration {
    pub fn new() -> RosterResult<Self> {
        Self::from_lookup(dotenvy::var)
    }

    /// Builds the configuration from any env-var-shaped lookup.
    ///
    /// Missing variables fall back to defaults.
    fn from_lookup(
        lookup: impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    ) -> RosterResult<Self> {
        let get_env_var = |name| match lookup(name) {
            Ok(value) => Ok(Some(value)),
            Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(None),
            Err(source) => Err(source).context(BadEnvVarSnafu { name }),
        };

        let url = get_env_var("ROSTER_DATABASE_URL")?
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let max_connections = match get_env_var("ROSTER_MAX_CONNECTIONS")? {
            Some(original) => original.trim().parse().context(ParseEnvNumberSnafu {
                name: "ROSTER_MAX_CONNECTIONS",
                original,
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let server_ip =
            get_env_var("ROSTER_SERVER_IP")?.unwrap_or_else(|| DEFAULT_SERVER_IP.to_string());

        Ok(Self {
            db_config: Arc::new(DbConfig {
                url,
                max_connections,
            }),
            server_ip,
        })
    }

    pub fn db_config(&self) -> Arc<DbConfig> {
        self.db_config.clone()
    }

    pub fn server_ip(&self) -> &str {
        &self.server_ip
    }
}

#[derive(Debug)]
pub struct DbConfig {
    url: String,
    max_connections: u32,
}

impl DbConfig {
    #[cfg(test)]
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 1,
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::with_url("sqlite::memory:")
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub const fn max_connections(&self) -> u32 {
        self.max_connections
    }
}
