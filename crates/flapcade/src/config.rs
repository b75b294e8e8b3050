//! Server configuration.

use std::time::Duration;

use flapcade_protocol::{Price, PriceError};

/// Value shipped in example `.env` files; treated as unset.
const PLACEHOLDER_ADDRESS: &str = "0x_YOUR_WALLET_ADDRESS_HERE";

/// Why a configuration can't be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No payee address, or the placeholder one.
    #[error("ADDRESS must be set to the wallet that receives payments")]
    MissingAddress,

    #[error("invalid PORT {0:?}")]
    InvalidPort(String),

    #[error("invalid {var}: {source}")]
    InvalidPrice {
        var: &'static str,
        #[source]
        source: PriceError,
    },
}

/// Everything the server needs to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Address payments go to.
    pub pay_to: String,
    pub network: String,
    /// Price of a regular play token.
    pub game_price: Price,
    /// Price of a pay-to-win token. Fixed; unrelated to the carried score.
    pub continue_price: Price,
    /// Facilitator that verifies payments for a networked gate.
    pub facilitator_url: String,
    /// Connections silent for this long are closed.
    pub idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3001,
            pay_to: String::new(),
            network: "base-sepolia".into(),
            game_price: Price::from_micros(1_000),
            continue_price: Price::from_cents(100),
            facilitator_url: "https://x402.org/facilitator".into(),
            idle_timeout: Duration::from_secs(60),
        }
    }
}

impl ServerConfig {
    /// Loads the config from process environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `ADDRESS` | required |
    /// | `HOST` | `127.0.0.1` |
    /// | `PORT` | `3001` |
    /// | `NETWORK` | `base-sepolia` |
    /// | `GAME_PRICE` | `0.001` |
    /// | `CONTINUE_PRICE` | `1.00` |
    /// | `FACILITATOR_URL` | `https://x402.org/facilitator` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        config.pay_to = var("ADDRESS").unwrap_or_default();
        if let Some(host) = var("HOST") {
            config.host = host;
        }
        if let Some(port) = var("PORT") {
            config.port = port.parse().map_err(|_| ConfigError::InvalidPort(port))?;
        }
        if let Some(network) = var("NETWORK") {
            config.network = network;
        }
        if let Some(price) = var("GAME_PRICE") {
            config.game_price = parse_price("GAME_PRICE", &price)?;
        }
        if let Some(price) = var("CONTINUE_PRICE") {
            config.continue_price = parse_price("CONTINUE_PRICE", &price)?;
        }
        if let Some(url) = var("FACILITATOR_URL") {
            config.facilitator_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn bind(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    pub fn pay_to(mut self, address: impl Into<String>) -> Self {
        self.pay_to = address.into();
        self
    }

    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    pub fn prices(mut self, game: Price, continue_price: Price) -> Self {
        self.game_price = game;
        self.continue_price = continue_price;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// `host:port`, ready for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Checks that the config can take payments.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let address = self.pay_to.trim();
        if address.is_empty() || address == PLACEHOLDER_ADDRESS {
            return Err(ConfigError::MissingAddress);
        }
        Ok(())
    }
}

fn parse_price(var: &'static str, value: &str) -> Result<Price, ConfigError> {
    value
        .parse()
        .map_err(|source| ConfigError::InvalidPrice { var, source })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[("ADDRESS", "0xarcade")])).unwrap();
        assert_eq!(config.pay_to, "0xarcade");
        assert_eq!(config.port, 3001);
        assert_eq!(config.network, "base-sepolia");
        assert_eq!(config.game_price.to_string(), "$0.001");
        assert_eq!(config.continue_price.to_string(), "$1.00");
        assert_eq!(config.facilitator_url, "https://x402.org/facilitator");
        assert_eq!(config.bind_addr(), "127.0.0.1:3001");
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("ADDRESS", "0xarcade"),
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("NETWORK", "base"),
            ("GAME_PRICE", "0.01"),
            ("CONTINUE_PRICE", "$2.50"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.network, "base");
        assert_eq!(config.game_price, Price::from_cents(1));
        assert_eq!(config.continue_price, Price::from_cents(250));
    }

    #[test]
    fn test_missing_or_placeholder_address_rejected() {
        assert_eq!(
            ServerConfig::from_lookup(lookup(&[])),
            Err(ConfigError::MissingAddress)
        );
        assert_eq!(
            ServerConfig::from_lookup(lookup(&[("ADDRESS", PLACEHOLDER_ADDRESS)])),
            Err(ConfigError::MissingAddress)
        );
        assert_eq!(
            ServerConfig::from_lookup(lookup(&[("ADDRESS", "   ")])),
            Err(ConfigError::MissingAddress)
        );
    }

    #[test]
    fn test_bad_port_and_price_rejected() {
        assert_eq!(
            ServerConfig::from_lookup(lookup(&[("ADDRESS", "0xa"), ("PORT", "http")])),
            Err(ConfigError::InvalidPort("http".into()))
        );
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&[("ADDRESS", "0xa"), ("GAME_PRICE", "free")])),
            Err(ConfigError::InvalidPrice {
                var: "GAME_PRICE",
                ..
            })
        ));
    }

    #[test]
    fn test_builder_setters() {
        let config = ServerConfig::default()
            .bind("0.0.0.0", 0)
            .pay_to("0xarcade")
            .network("base")
            .prices(Price::from_cents(5), Price::from_cents(500))
            .idle_timeout(Duration::from_secs(5));
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_addr(), "0.0.0.0:0");
        assert_eq!(config.continue_price, Price::from_cents(500));
    }
}
