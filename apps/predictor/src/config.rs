use anyhow::{bail, Context, Result};
use reqwest::Url;

use crate::predictor_client::DEFAULT_PREDICTOR_URL;

/// Application configuration loaded from environment variables.
/// Every variable has a default, so a bare `cargo run` talks to the hosted predictor.
#[derive(Debug, Clone)]
pub struct Config {
    pub predictor_url: Url,
    pub port: u16,
    pub rust_log: String,
    /// Ping the prediction service at startup so a sleeping instance boots early.
    pub warm_up: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let predictor_url =
            lookup("PREDICTOR_URL").unwrap_or_else(|| DEFAULT_PREDICTOR_URL.to_string());

        Ok(Config {
            predictor_url: Url::parse(&predictor_url)
                .with_context(|| format!("PREDICTOR_URL '{predictor_url}' is not a valid URL"))?,
            port: lookup("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            warm_up: match lookup("PREDICTOR_WARM_UP") {
                Some(raw) => parse_flag(&raw).context("PREDICTOR_WARM_UP must be true or false")?,
                None => true,
            },
        })
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("unrecognised flag value '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.predictor_url.as_str(), DEFAULT_PREDICTOR_URL);
        assert_eq!(config.port, 3000);
        assert_eq!(config.rust_log, "info");
        assert!(config.warm_up);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PREDICTOR_URL", "http://localhost:5000/predict"),
            ("PORT", "8081"),
            ("PREDICTOR_WARM_UP", "off"),
        ])
        .unwrap();
        assert_eq!(config.predictor_url.port(), Some(5000));
        assert_eq!(config.port, 8081);
        assert!(!config.warm_up);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(config_from(&[("PREDICTOR_URL", "not a url")]).is_err());
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("PREDICTOR_WARM_UP", "sometimes")]).is_err());
    }
}
