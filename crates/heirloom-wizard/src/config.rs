//! Wizard configuration, parsed from a TOML file plus environment overrides.
//!
//! Priority: environment variables > config file > defaults.

use anyhow::{Context, Result};
use heirloom_core::amount::{parse_fixed8, sats_or_zero};
use heirloom_core::contract::{DEFAULT_FEE_RATE, DEFAULT_TO_AMOUNT, DEFAULT_VSIZE};
use heirloom_core::ContractSnapshot;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level wizard configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Starting values for a new contract snapshot
    #[serde(default)]
    pub contract: ContractDefaults,

    /// Validation thresholds
    #[serde(default)]
    pub validation: ValidationSection,
}

/// Starting values for a new contract snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractDefaults {
    /// Fee rate in sat/vB, as shown in the fee field
    #[serde(default = "default_fee_rate")]
    pub fee_rate: String,

    /// Destination amount before the first reconciliation; anything above
    /// the inputs means "send the maximum"
    #[serde(default = "default_to_amount")]
    pub to_amount: String,

    /// Size estimate used until a draft has been measured
    #[serde(default = "default_v_size")]
    pub v_size: u64,
}

impl Default for ContractDefaults {
    fn default() -> Self {
        Self {
            fee_rate: default_fee_rate(),
            to_amount: default_to_amount(),
            v_size: default_v_size(),
        }
    }
}

/// Validation thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSection {
    /// Lowest fee rate (sat/vB) accepted on the transaction page
    #[serde(default = "default_min_fee_rate")]
    pub min_fee_rate: String,
}

impl Default for ValidationSection {
    fn default() -> Self {
        Self {
            min_fee_rate: default_min_fee_rate(),
        }
    }
}

// ============================================================================
// Default value functions
// ============================================================================

fn default_fee_rate() -> String {
    DEFAULT_FEE_RATE.to_string()
}

fn default_to_amount() -> String {
    DEFAULT_TO_AMOUNT.to_string()
}

fn default_v_size() -> u64 {
    DEFAULT_VSIZE
}

fn default_min_fee_rate() -> String {
    "1.0".to_string()
}

// ============================================================================
// Loading & environment override
// ============================================================================

impl WizardConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: WizardConfig =
            toml::from_str(&contents).with_context(|| "Failed to parse TOML config")?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `HEIRLOOM_FEE_RATE`
    /// - `HEIRLOOM_TO_AMOUNT`
    /// - `HEIRLOOM_VSIZE`
    /// - `HEIRLOOM_MIN_FEE_RATE`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("HEIRLOOM_FEE_RATE") {
            self.contract.fee_rate = v;
        }
        if let Ok(v) = std::env::var("HEIRLOOM_TO_AMOUNT") {
            self.contract.to_amount = v;
        }
        if let Ok(v) = std::env::var("HEIRLOOM_VSIZE") {
            if let Ok(size) = v.parse::<u64>() {
                self.contract.v_size = size;
            }
        }
        if let Ok(v) = std::env::var("HEIRLOOM_MIN_FEE_RATE") {
            self.validation.min_fee_rate = v;
        }
    }

    /// Minimum fee rate in 1e-8 sat/vB.
    pub fn min_fee_rate(&self) -> i64 {
        sats_or_zero(&self.validation.min_fee_rate)
    }

    /// A fresh snapshot carrying the configured starting values.
    pub fn default_snapshot(&self) -> ContractSnapshot {
        ContractSnapshot {
            fee_rate: self.contract.fee_rate.clone(),
            to_amount: self.contract.to_amount.clone(),
            v_size: self.contract.v_size,
            ..Default::default()
        }
    }

    /// Validate that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        let fee_rate = parse_fixed8(&self.contract.fee_rate)
            .with_context(|| format!("contract.fee_rate is not a number: {}", self.contract.fee_rate))?;
        anyhow::ensure!(fee_rate >= 0, "contract.fee_rate must be >= 0");

        anyhow::ensure!(
            parse_fixed8(&self.contract.to_amount).is_some(),
            "contract.to_amount is not a number: {}",
            self.contract.to_amount
        );

        anyhow::ensure!(self.contract.v_size > 0, "contract.v_size must be > 0");

        let min_fee_rate = parse_fixed8(&self.validation.min_fee_rate).with_context(|| {
            format!(
                "validation.min_fee_rate is not a number: {}",
                self.validation.min_fee_rate
            )
        })?;
        anyhow::ensure!(min_fee_rate >= 0, "validation.min_fee_rate must be >= 0");

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
