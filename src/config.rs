use crate::money;
use rust_decimal::Decimal;
use std::{env, path::PathBuf};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/state.json";
/// 0.16
pub const DEFAULT_VAT_RATE: Decimal = Decimal::from_parts(16, 0, 0, false, 2);
pub const DEFAULT_CURRENCY: &str = "Ksh";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("POS_VAT_RATE must be a number between 0 and 1, got '{0}'")]
    VatRate(String),
    #[error("POS_CURRENCY must not be empty")]
    Currency,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port: u16,
    pub data_path: PathBuf,
    pub vat_rate: Decimal,
    pub currency: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            vat_rate: DEFAULT_VAT_RATE,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut settings = Settings::default();

        if let Some(port) = lookup("PORT").and_then(|value| value.parse::<u16>().ok()) {
            settings.port = port;
        }
        if let Some(path) = lookup("APP_DATA_PATH") {
            settings.data_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup("POS_VAT_RATE") {
            settings.vat_rate = raw
                .trim()
                .parse::<Decimal>()
                .ok()
                .filter(|rate| (Decimal::ZERO..=Decimal::ONE).contains(rate))
                .ok_or(ConfigError::VatRate(raw))?;
        }
        if let Some(currency) = lookup("POS_CURRENCY") {
            let currency = currency.trim();
            if currency.is_empty() {
                return Err(ConfigError::Currency);
            }
            settings.currency = currency.to_string();
        }
        Ok(settings)
    }

    /// `Ksh 1,234.50`
    pub fn money(&self, value: Decimal) -> String {
        format!("{} {}", self.currency, money::format(value))
    }
}
