use crate::{
    config::DbConfig,
    data::student::Student,
    error::{GetDatabaseConnectionSnafu, OpenDatabaseSnafu, ParseDatabaseUrlSnafu, RosterResult},
};
use snafu::ResultExt;
use sqlx::{
    Pool, Sqlite,
    pool::PoolConnection,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;

/// Shared handle given to every request. Holds the pool and nothing mutable.
#[derive(Clone, Debug)]
pub struct RosterState {
    pool: Pool<Sqlite>,
}

impl RosterState {
    pub async fn new(options: SqlitePoolOptions, db_config: &DbConfig) -> RosterResult<Self> {
        let connect_options = SqliteConnectOptions::from_str(db_config.url())
            .context(ParseDatabaseUrlSnafu {
                url: db_config.url(),
            })?
            .create_if_missing(true);

        let pool = options
            .connect_with(connect_options)
            .await
            .context(OpenDatabaseSnafu)?;

        let mut conn = pool.acquire().await.context(GetDatabaseConnectionSnafu)?;
        Student::create_table_if_missing(&mut conn).await?;
        drop(conn);

        Ok(Self { pool })
    }

    /// Hands out a connection for a single request.
    ///
    /// The connection goes back to the pool when the returned guard is dropped, which happens on
    /// every exit path of the handler holding it, including `?` returns and a cancelled future.
    pub async fn get_connection(&self) -> RosterResult<PoolConnection<Sqlite>> {
        let conn = self
            .pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)?;
        trace!(idle = self.pool.num_idle(), "acquired db connection");
        Ok(conn)
    }

    pub async fn sensible_shutdown(&self) {
        self.pool.close().await;
        info!("db pool closed");
    }
}

#[cfg(test)]
impl RosterState {
    /// A private in-memory database on a one-connection pool.
    ///
    /// With a single connection any session that is not released makes the next acquire time out.
    pub async fn in_memory() -> Self {
        let options = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(2))
            .idle_timeout(None)
            .max_lifetime(None);

        Self::new(options, &DbConfig::in_memory())
            .await
            .expect("unable to open in-memory db")
    }
}
