pub mod dashboard;
pub mod domain;
pub mod generate;
pub mod render;
pub mod schedule;

pub use dashboard::Dashboard;

pub mod config {
    use anyhow::Context;
    use std::time::Duration;

    const DEFAULT_PORT: u16 = 3000;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub refresh_interval: Duration,
        pub market_seed: Option<u64>,
        pub port: u16,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
            let refresh_secs = parse_var::<u64>(&lookup, "REFRESH_INTERVAL_SECS")?
                .unwrap_or(crate::schedule::DEFAULT_REFRESH_INTERVAL.as_secs());
            anyhow::ensure!(refresh_secs > 0, "REFRESH_INTERVAL_SECS must be greater than 0");

            Ok(Self {
                sentry_dsn: lookup("SENTRY_DSN").filter(|s| !s.trim().is_empty()),
                refresh_interval: Duration::from_secs(refresh_secs),
                market_seed: parse_var(&lookup, "MARKET_SEED")?,
                port: parse_var(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT),
            })
        }
    }

    fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match lookup(key) {
            Some(raw) if !raw.trim().is_empty() => {
                let value = raw
                    .trim()
                    .parse::<T>()
                    .with_context(|| format!("{key} is not a valid value: {raw:?}"))?;
                Ok(Some(value))
            }
            _ => Ok(None),
        }
    }

}
