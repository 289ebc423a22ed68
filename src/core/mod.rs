mod accrual;
mod engine;
mod error;
mod ledger;
mod types;

pub use accrual::{balance_at, growth_curve, round_to_cents};
pub use engine::{CompletionSink, Simulation};
pub use error::{ConfigError, DepositError, TransitionError};
pub use ledger::Ledger;
pub use types::{
    DEFAULT_ANNUAL_RATE, DEFAULT_DEPOSIT_PRESETS, DEFAULT_MAX_MONTHS, Deposit, Phase,
    SimulationConfig, SimulationSnapshot, Withdrawal, WithdrawalOutcome,
};
