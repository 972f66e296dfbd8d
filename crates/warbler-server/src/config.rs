use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use warbler_api::auth::DEFAULT_TIMELINE_LIMIT;

/// Placeholder session secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

const SESSION_TTL_DAYS: RangeInclusive<i64> = 1..=3650;
const TIMELINE_LIMIT: RangeInclusive<u32> = 1..=1000;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub session_secret: String,
    pub session_ttl: chrono::Duration,
    pub timeline_limit: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, so parsing can be tested without touching
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let session_secret = lookup("WARBLER_SESSION_SECRET").unwrap_or_default();
        if session_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&session_secret.as_str()) {
            bail!("WARBLER_SESSION_SECRET is unset or still a placeholder");
        }

        let db_path = lookup("WARBLER_DB_PATH").unwrap_or_else(|| "warbler.db".into());
        let host = lookup("WARBLER_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("WARBLER_PORT")
            .unwrap_or_else(|| "5000".into())
            .parse()
            .context("WARBLER_PORT must be a port number")?;
        let ttl_days: i64 = lookup("WARBLER_SESSION_TTL_DAYS")
            .unwrap_or_else(|| "7".into())
            .parse()
            .context("WARBLER_SESSION_TTL_DAYS must be a whole number of days")?;
        if !SESSION_TTL_DAYS.contains(&ttl_days) {
            bail!(
                "WARBLER_SESSION_TTL_DAYS must be between {} and {}",
                SESSION_TTL_DAYS.start(),
                SESSION_TTL_DAYS.end()
            );
        }
        let timeline_limit = match lookup("WARBLER_TIMELINE_LIMIT") {
            Some(v) => v.parse().context("WARBLER_TIMELINE_LIMIT must be a number")?,
            None => DEFAULT_TIMELINE_LIMIT,
        };
        if !TIMELINE_LIMIT.contains(&timeline_limit) {
            bail!(
                "WARBLER_TIMELINE_LIMIT must be between {} and {}",
                TIMELINE_LIMIT.start(),
                TIMELINE_LIMIT.end()
            );
        }

        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .context("WARBLER_HOST/WARBLER_PORT do not form a socket address")?;

        Ok(Self {
            db_path: db_path.into(),
            addr,
            session_secret,
            session_ttl: chrono::Duration::days(ttl_days),
            timeline_limit,
        })
    }
}
