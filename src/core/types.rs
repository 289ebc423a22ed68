use serde::{Deserialize, Serialize};

use super::error::ConfigError;

pub const DEFAULT_ANNUAL_RATE: f64 = 0.05;
pub const DEFAULT_MAX_MONTHS: u32 = 24;
pub const DEFAULT_DEPOSIT_PRESETS: [f64; 3] = [500.0, 1000.0, 5000.0];

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Depositing,
    Growing,
    Results,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Depositing => "depositing",
            Phase::Growing => "growing",
            Phase::Results => "results",
        };
        f.write_str(name)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    pub month: u32,
    pub amount: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    pub month: u32,
    pub balance: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalOutcome {
    pub month: u32,
    pub total_deposited: f64,
    pub balance: f64,
    pub interest_earned: f64,
    pub score_percent: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSnapshot {
    pub phase: Phase,
    pub current_month: u32,
    pub deposits: Vec<Deposit>,
    pub total_deposited: f64,
    pub balance: f64,
    pub withdrawal: Option<Withdrawal>,
    pub outcome: Option<WithdrawalOutcome>,
}

/// Tunables shared by the engine and its hosts.
///
/// Only `monthly_rate` is read by the engine. `max_months` and
/// `deposit_presets` describe the playable surface and are enforced by hosts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    pub monthly_rate: f64,
    pub max_months: u32,
    pub deposit_presets: Vec<f64>,
}

impl SimulationConfig {
    /// Nominal annual rate split evenly across twelve compounding periods.
    pub fn from_annual_rate(annual_rate: f64) -> Self {
        Self {
            monthly_rate: annual_rate / 12.0,
            ..Self::default()
        }
    }

    pub fn annual_rate(&self) -> f64 {
        self.monthly_rate * 12.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.monthly_rate.is_finite() || self.monthly_rate < 0.0 {
            return Err(ConfigError::InvalidRate {
                rate: self.monthly_rate,
            });
        }
        if let Some(&preset) = self
            .deposit_presets
            .iter()
            .find(|p| !p.is_finite() || **p <= 0.0)
        {
            return Err(ConfigError::NonPositivePreset { preset });
        }
        Ok(())
    }

    pub fn preset(&self, index: usize) -> Option<f64> {
        self.deposit_presets.get(index).copied()
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            monthly_rate: DEFAULT_ANNUAL_RATE / 12.0,
            max_months: DEFAULT_MAX_MONTHS,
            deposit_presets: DEFAULT_DEPOSIT_PRESETS.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_nominal_five_percent() {
        let config = SimulationConfig::default();
        assert!((config.monthly_rate - 0.05 / 12.0).abs() < 1e-15);
        assert_eq!(config.max_months, 24);
        assert_eq!(config.deposit_presets, vec![500.0, 1000.0, 5000.0]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn from_annual_rate_round_trips_through_annual_rate() {
        let config = SimulationConfig::from_annual_rate(0.06);
        assert!((config.annual_rate() - 0.06).abs() < 1e-12);
        assert_eq!(config.max_months, DEFAULT_MAX_MONTHS);
    }

    #[test]
    fn validate_rejects_negative_rate_and_bad_presets() {
        let mut config = SimulationConfig::from_annual_rate(-0.01);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRate { .. })
        ));

        config.monthly_rate = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRate { .. })
        ));

        config = SimulationConfig::default();
        config.deposit_presets = vec![100.0, 0.0];
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositivePreset { preset: 0.0 })
        );
    }

    #[test]
    fn config_deserializes_with_defaults_for_missing_keys() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"maxMonths": 36}"#).expect("valid config json");
        assert_eq!(config.max_months, 36);
        assert_eq!(config.deposit_presets, DEFAULT_DEPOSIT_PRESETS.to_vec());
        assert!((config.monthly_rate - DEFAULT_ANNUAL_RATE / 12.0).abs() < 1e-15);
    }

    #[test]
    fn phase_serializes_lowercase() {
        let json = serde_json::to_string(&Phase::Growing).expect("serializable");
        assert_eq!(json, "\"growing\"");
        assert_eq!(Phase::Results.to_string(), "results");
    }
}
