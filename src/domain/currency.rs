//! Currency code
//!
//! Currency is recorded on accounts and transactions but never converted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Three-letter upper-case currency code, e.g. `USD`.
///
/// Input is trimmed and upper-cased, so `" eur"` parses as `EUR`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid currency code '{0}': expected three ASCII letters")]
pub struct CurrencyError(pub String);

impl Currency {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CurrencyError(s.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for Currency {
    type Error = CurrencyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_normalizes_case() {
        let currency: Currency = " usd ".parse().unwrap();
        assert_eq!(currency.as_str(), "USD");
    }

    #[test]
    fn test_currency_rejects_malformed_codes() {
        for bad in ["", "US", "USDT", "U$D", "12A"] {
            assert!(bad.parse::<Currency>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_currency_serde() {
        let currency: Currency = serde_json::from_str("\"gbp\"").unwrap();
        assert_eq!(serde_json::to_string(&currency).unwrap(), "\"GBP\"");
        assert!(serde_json::from_str::<Currency>("\"pounds\"").is_err());
    }
}
