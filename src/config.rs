use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::Parser;
use uuid::Uuid;

use crate::{
    calendar::{CalendarClient, CalendarClientBuilder, GOOGLE_CALENDAR_API, GOOGLE_TOKEN_URL},
    euler::DEFAULT_PROBLEM_ID,
};

/// Backend for the personal site: activities, calendar events and the
/// project euler problem of the day.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3001")]
    pub listen: SocketAddr,

    /// PostgreSQL connection string. Without it everything is kept in memory.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    #[arg(long, env = "DATABASE_POOL_SIZE", default_value_t = 16)]
    pub pool_size: usize,

    /// Base URL the frontend uses to reach this server
    #[arg(long, env = "API_URL", default_value = "http://localhost:3001")]
    pub api_url: String,

    /// Directory with the site's static files
    #[arg(long, env = "STATIC_DIR", default_value = "public")]
    pub static_dir: PathBuf,

    /// Id of the seeded project_euler row
    #[arg(long, env = "EULER_PROBLEM_ID", default_value = DEFAULT_PROBLEM_ID)]
    pub problem_id: Uuid,

    /// Problem number used when running without a database
    #[arg(long, env = "EULER_START_NUMBER", default_value_t = 1)]
    pub start_number: i64,

    #[arg(long, env = "EULER_BASE_URL", default_value = crate::euler::fetcher::PROJECT_EULER_URL)]
    pub euler_base_url: String,

    /// Timeout for a single problem page request, in seconds
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = 10)]
    pub fetch_timeout_secs: u64,

    #[arg(long, env = "OAUTH_CLIENT_ID")]
    pub oauth_client_id: Option<String>,

    #[arg(long, env = "OAUTH_CLIENT_SECRET", hide_env_values = true)]
    pub oauth_client_secret: Option<String>,

    #[arg(long, env = "OAUTH_REFRESH_TOKEN", hide_env_values = true)]
    pub oauth_refresh_token: Option<String>,

    #[arg(long, env = "CALENDAR_ID")]
    pub calendar_id: Option<String>,

    #[arg(long, env = "OAUTH_TOKEN_URL", default_value = GOOGLE_TOKEN_URL)]
    pub oauth_token_url: String,

    #[arg(long, env = "CALENDAR_API_URL", default_value = GOOGLE_CALENDAR_API)]
    pub calendar_api_url: String,
}

impl Config {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// The calendar client, when every credential it needs is present.
    pub fn calendar_client(&self) -> Option<CalendarClient> {
        let (Some(client_id), Some(client_secret), Some(refresh_token), Some(calendar_id)) = (
            &self.oauth_client_id,
            &self.oauth_client_secret,
            &self.oauth_refresh_token,
            &self.calendar_id,
        ) else {
            return None;
        };

        CalendarClientBuilder::default()
            .client_id(client_id)
            .client_secret(client_secret)
            .refresh_token(refresh_token)
            .calendar_id(calendar_id)
            .token_url(&self.oauth_token_url)
            .api_base_url(&self.calendar_api_url)
            .build()
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_should_apply() {
        let config = Config::parse_from(["personal-site"]);

        assert_eq!(config.listen.port(), 3001);
        assert_eq!(config.problem_id.to_string(), DEFAULT_PROBLEM_ID);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.euler_base_url, "https://projecteuler.net");
    }

    #[test]
    fn calendar_client_should_need_all_credentials() {
        let partial = Config::parse_from([
            "personal-site",
            "--oauth-client-id",
            "id",
            "--calendar-id",
            "me@example.com",
        ]);
        assert!(partial.calendar_client().is_none());

        let full = Config::parse_from([
            "personal-site",
            "--oauth-client-id",
            "id",
            "--oauth-client-secret",
            "secret",
            "--oauth-refresh-token",
            "refresh",
            "--calendar-id",
            "me@example.com",
        ]);
        assert!(full.calendar_client().is_some());
    }
}
