use thiserror::Error;

use super::types::Phase;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum DepositError {
    #[error("deposit amount must be positive, got {amount}")]
    NonPositiveAmount { amount: f64 },
    #[error("deposits are closed while {phase}")]
    WrongPhase { phase: Phase },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("make at least one deposit before growing")]
    NoDeposits,
    #[error("operation requires the {expected} phase, simulation is {actual}")]
    WrongPhase { expected: Phase, actual: Phase },
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("monthly rate must be finite and >= 0, got {rate}")]
    InvalidRate { rate: f64 },
    #[error("deposit presets must be positive, got {preset}")]
    NonPositivePreset { preset: f64 },
}
