use anyhow::{Result, bail};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const API_URL_ENV: &str = "API_URL";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub api_url: String,
}

impl ConsoleConfig {
    /// Resolves the API base URL: explicit flag, then `API_URL`, then the default.
    pub fn load(flag: Option<String>) -> Result<Self> {
        Self::load_with(flag, |key| std::env::var(key).ok())
    }

    fn load_with(flag: Option<String>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = flag
            .or_else(|| env(API_URL_ENV))
            .map(|raw| raw.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            bail!("{API_URL_ENV} must be an http(s) URL, got {api_url:?}");
        }
        Ok(Self { api_url })
    }
}
