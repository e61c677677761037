//! Connection settings of the Mongo match store and the first-ping back-off.

use std::time::Duration;

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tokio::time::sleep;
use tracing::{debug, warn};

use super::error::{MongoDaoError, MongoResult};

const DEFAULT_DATABASE: &str = "matchday";

/// Back-off applied while a freshly built client waits for its first successful ping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectRetry {
    /// Pings attempted before giving up.
    pub max_attempts: u32,
    /// Wait after the first failed ping.
    pub initial_delay: Duration,
    /// Upper bound of the doubling wait.
    pub max_delay: Duration,
}

impl Default for ConnectRetry {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl ConnectRetry {
    /// Wait after the failed ping number `attempt`, counting from 1.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Where the match store lives and how hard to try reaching it.
#[derive(Clone)]
pub struct MongoConfig {
    /// Parsed driver options.
    pub options: ClientOptions,
    /// Database holding the `matches` and `tournaments` collections.
    pub database_name: String,
    /// Back-off used by [`MongoConfig::open`].
    pub retry: ConnectRetry,
}

impl MongoConfig {
    /// Parse `uri`; `db_name` defaults to `matchday`.
    pub async fn from_uri(uri: &str, db_name: Option<&str>) -> MongoResult<Self> {
        let options =
            ClientOptions::parse(uri)
                .await
                .map_err(|source| MongoDaoError::InvalidUri {
                    uri: uri.to_owned(),
                    source,
                })?;

        Ok(Self {
            options,
            database_name: db_name.unwrap_or(DEFAULT_DATABASE).to_owned(),
            retry: ConnectRetry::default(),
        })
    }

    /// Build a client and wait until the match store database answers a ping.
    pub async fn open(&self) -> MongoResult<(Client, Database)> {
        let client = Client::with_options(self.options.clone())
            .map_err(|source| MongoDaoError::ClientConstruction { source })?;
        let database = client.database(&self.database_name);

        let mut attempt = 0;
        loop {
            attempt += 1;
            match database.run_command(doc! { "ping": 1 }).await {
                Ok(_) => {
                    debug!(database = %self.database_name, attempt, "match store reachable");
                    return Ok((client, database));
                }
                Err(source) if attempt >= self.retry.max_attempts => {
                    return Err(MongoDaoError::InitialPing {
                        attempts: attempt,
                        source,
                    });
                }
                Err(err) => {
                    let delay = self.retry.delay_after(attempt);
                    warn!(
                        database = %self.database_name,
                        attempt,
                        retry_in_ms = delay.as_millis() as u64,
                        error = %err,
                        "match store ping failed"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_up_to_the_cap() {
        let retry = ConnectRetry::default();
        let delays: Vec<u64> = (1..=7)
            .map(|attempt| retry.delay_after(attempt).as_millis() as u64)
            .collect();
        assert_eq!(delays, [250, 500, 1_000, 2_000, 4_000, 5_000, 5_000]);
    }

    #[test]
    fn large_attempt_numbers_stay_capped() {
        let retry = ConnectRetry::default();
        assert_eq!(retry.delay_after(u32::MAX), retry.max_delay);
    }
}
