//! Runtime configuration for checkout.

use neo_commerce::money::Currency;
use serde::{Deserialize, Serialize};

/// How payment verification is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMode {
    /// Every confirmation must pass the payment verifier.
    #[default]
    Mandatory,
    /// Offline/demo mode: the verifier is skipped and the snapshot total
    /// is trusted. Opt-in only; there is no silent fallback to this.
    Demo,
}

/// Checkout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Verification mode.
    #[serde(default)]
    pub verification: VerificationMode,
    /// Upper bound on a single verifier call, in seconds.
    #[serde(default = "default_verify_timeout_secs")]
    pub verify_timeout_secs: u64,
    /// Store currency; carts and settlements must match it.
    #[serde(default)]
    pub currency: Currency,
}

fn default_verify_timeout_secs() -> u64 {
    15
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            verification: VerificationMode::default(),
            verify_timeout_secs: default_verify_timeout_secs(),
            currency: Currency::default(),
        }
    }
}

impl CheckoutConfig {
    /// Parse a configuration from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
