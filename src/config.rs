use std::env;

use eyre::{Result, eyre};

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_GEMINI_TEMPERATURE: f32 = 1.0;
const DEFAULT_SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
const DEFAULT_SEARCH_REGION: &str = "us-en";

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_temperature: f32,
    pub search_url: String,
    pub search_region: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let gemini_api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| eyre!("GEMINI_API_KEY environment variable not set"))?;

        let gemini_model =
            lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        let gemini_temperature = match lookup("GEMINI_TEMPERATURE") {
            Some(raw) => raw
                .parse::<f32>()
                .map_err(|_| eyre!("GEMINI_TEMPERATURE must be a number, got '{}'", raw))?,
            None => DEFAULT_GEMINI_TEMPERATURE,
        };

        let search_url =
            lookup("DDG_SEARCH_URL").unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string());

        let search_region =
            lookup("DDG_REGION").unwrap_or_else(|| DEFAULT_SEARCH_REGION.to_string());

        Ok(Self {
            gemini_api_key,
            gemini_model,
            gemini_temperature,
            search_url,
            search_region,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn missing_api_key_fails() {
        let result = Config::from_lookup(lookup_from(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn blank_api_key_fails() {
        let result = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "   ")]));
        assert!(result.is_err());
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "test-key")])).unwrap();

        assert_eq!(config.gemini_api_key, "test-key");
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.gemini_temperature, DEFAULT_GEMINI_TEMPERATURE);
        assert_eq!(config.search_url, DEFAULT_SEARCH_URL);
        assert_eq!(config.search_region, DEFAULT_SEARCH_REGION);
    }

    #[test]
    fn overrides_are_honored() {
        let config = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "test-key"),
            ("GEMINI_MODEL", "gemini-2.0-pro"),
            ("GEMINI_TEMPERATURE", "0.4"),
            ("DDG_SEARCH_URL", "http://localhost:8080/html/"),
            ("DDG_REGION", "uk-en"),
        ]))
        .unwrap();

        assert_eq!(config.gemini_model, "gemini-2.0-pro");
        assert_eq!(config.gemini_temperature, 0.4);
        assert_eq!(config.search_url, "http://localhost:8080/html/");
        assert_eq!(config.search_region, "uk-en");
    }

    #[test]
    fn non_numeric_temperature_fails() {
        let result = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "test-key"),
            ("GEMINI_TEMPERATURE", "warm"),
        ]));
        assert!(result.is_err());
    }
}
