use crate::models::Property;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const API_URL_ENV: &str = "HOUSING_CONSOLE_API_URL";
pub const TIMEOUT_ENV: &str = "HOUSING_CONSOLE_TIMEOUT_SECS";

/// Connection settings for the remote property API
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Base URL, e.g. "http://localhost:3000"
    pub base_url: String,
    /// Transport timeout per request
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("housing-console/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `HOUSING_CONSOLE_API_URL` and
    /// `HOUSING_CONSOLE_TIMEOUT_SECS` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GatewayConfig::from_env`] with an arbitrary variable source.
    /// A blank URL or an unparsable timeout is ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        if let Some(secs) = lookup(TIMEOUT_ENV).and_then(|raw| raw.trim().parse::<u64>().ok()) {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Availability choice of the listing filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    #[default]
    All,
    Available,
    Rented,
}

/// Client-side filter for the property list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingFilter {
    /// Case-insensitive substring of the location
    pub search: String,
    pub availability: Availability,
    /// Inclusive lower bound
    pub min_price: Option<f64>,
    /// Inclusive upper bound
    pub max_price: Option<f64>,
}

impl ListingFilter {
    pub fn matches(&self, property: &Property) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = property.location.to_lowercase().contains(&needle);

        let matches_availability = match self.availability {
            Availability::All => true,
            Availability::Available => property.available,
            Availability::Rented => !property.available,
        };

        let price = property.price.value();
        let matches_min = self.min_price.map_or(true, |min| price >= min);
        let matches_max = self.max_price.map_or(true, |max| price <= max);

        matches_search && matches_availability && matches_min && matches_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Price;
    use rstest::rstest;

    fn property(location: &str, price: f64, available: bool) -> Property {
        Property {
            id: "64f5a53d1234567890abcdef".to_string(),
            location: location.to_string(),
            price: Price::new(price).unwrap(),
            features: vec![],
            available,
            images: vec![],
            description: None,
            rental_requests: vec![],
            contracts: vec![],
        }
    }

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.url("/inmuebles"), "http://localhost:3000/inmuebles");
    }

    #[rstest]
    #[case(&[], DEFAULT_API_URL, 30)]
    #[case(&[(API_URL_ENV, "http://api.example:8080")], "http://api.example:8080", 30)]
    #[case(&[(API_URL_ENV, "   ")], DEFAULT_API_URL, 30)]
    #[case(&[(TIMEOUT_ENV, " 5 ")], DEFAULT_API_URL, 5)]
    #[case(&[(TIMEOUT_ENV, "soon")], DEFAULT_API_URL, 30)]
    #[case(&[(API_URL_ENV, "http://api.example"), (TIMEOUT_ENV, "-1")], "http://api.example", 30)]
    fn test_config_from_lookup(
        #[case] vars: &[(&str, &str)],
        #[case] base_url: &str,
        #[case] timeout_secs: u64,
    ) {
        let config = GatewayConfig::from_lookup(|key| {
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
        });
        assert_eq!(config.base_url, base_url);
        assert_eq!(config.timeout, Duration::from_secs(timeout_secs));
    }

    #[test]
    fn test_builders_override_defaults() {
        let config = GatewayConfig::new("http://api.example")
            .with_timeout(Duration::from_secs(3))
            .with_user_agent("console-test/1.0");
        assert_eq!(config.base_url, "http://api.example");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.user_agent, "console-test/1.0");
    }

    #[test]
    fn test_url_strips_trailing_slash() {
        let config = GatewayConfig::new("http://api.local/");
        assert_eq!(config.url("/imagenes/abc"), "http://api.local/imagenes/abc");
    }

    #[rstest]
    #[case(ListingFilter::default(), true)]
    #[case(ListingFilter { search: "REFORMA".into(), ..Default::default() }, true)]
    #[case(ListingFilter { search: "polanco".into(), ..Default::default() }, false)]
    #[case(ListingFilter { availability: Availability::Rented, ..Default::default() }, false)]
    #[case(ListingFilter { availability: Availability::Available, ..Default::default() }, true)]
    #[case(ListingFilter { min_price: Some(15000.0), max_price: Some(15000.0), ..Default::default() }, true)]
    #[case(ListingFilter { min_price: Some(15000.01), ..Default::default() }, false)]
    #[case(ListingFilter { max_price: Some(9999.0), ..Default::default() }, false)]
    fn test_listing_filter(#[case] filter: ListingFilter, #[case] expected: bool) {
        let p = property("Av. Reforma 100", 15000.0, true);
        assert_eq!(filter.matches(&p), expected);
    }
}
