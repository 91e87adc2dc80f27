use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub struct Config {
    pub backend_url: String,
    pub language: String,
    pub csrf_token: Option<String>,
    pub request_timeout: Duration,
    pub use_cookies: bool,
    pub bind_addr: String,
    pub pages_file: Option<PathBuf>,
}

impl Config {
    /// Reads the environment once at startup, after loading `.env` if present.
    pub fn load() -> Result<Config> {
        dotenv().ok();
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };
        Ok(Config {
            backend_url: vars.get_or_default("BACKEND_URL", "http://localhost:92"),
            language: vars.get_or_default("SEARCH_LANGUAGE", "en"),
            csrf_token: vars.get("CSRF_TOKEN"),
            request_timeout: Duration::from_secs(vars.parse_or_default(
                "REQUEST_TIMEOUT_SECS",
                10u64,
            )?),
            use_cookies: vars.parse_or_default("USE_COOKIES", true)?,
            bind_addr: vars.get_or_default("BIND_ADDR", "0.0.0.0:92"),
            pages_file: vars.get("PAGES_FILE").map(PathBuf::from),
        })
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or_default<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match self.get(key) {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid value for environment variable {key}: {raw:?}")),
            None => Ok(default),
        }
    }
}
