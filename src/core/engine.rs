use tracing::{debug, info};

use super::accrual::{balance_at, growth_curve, round_to_cents};
use super::error::{DepositError, TransitionError};
use super::ledger::Ledger;
use super::types::{
    Deposit, Phase, SimulationConfig, SimulationSnapshot, Withdrawal, WithdrawalOutcome,
};

/// Receives the final score once a play-through is withdrawn.
pub trait CompletionSink {
    fn on_complete(&mut self, score: i64);
}

impl<F: FnMut(i64)> CompletionSink for F {
    fn on_complete(&mut self, score: i64) {
        self(score)
    }
}

/// One play-through: deposit, grow, withdraw.
///
/// Phases only move forward. `Results` is terminal and a finished simulation
/// is replaced rather than rewound.
#[derive(Clone, Debug)]
pub struct Simulation {
    config: SimulationConfig,
    ledger: Ledger,
    phase: Phase,
    current_month: u32,
    withdrawal: Option<Withdrawal>,
    outcome: Option<WithdrawalOutcome>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            ledger: Ledger::new(),
            phase: Phase::Depositing,
            current_month: 0,
            withdrawal: None,
            outcome: None,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_month(&self) -> u32 {
        self.current_month
    }

    pub fn withdrawal(&self) -> Option<Withdrawal> {
        self.withdrawal
    }

    pub fn outcome(&self) -> Option<WithdrawalOutcome> {
        self.outcome
    }

    /// Records a deposit stamped with the current simulated month.
    pub fn add_deposit(&mut self, amount: f64) -> Result<Deposit, DepositError> {
        if self.phase != Phase::Depositing {
            return Err(DepositError::WrongPhase { phase: self.phase });
        }
        let deposit = self.ledger.add_deposit(self.current_month, amount)?;
        debug!(
            month = deposit.month,
            amount = deposit.amount,
            deposits = self.ledger.len(),
            "deposit recorded"
        );
        Ok(deposit)
    }

    pub fn start_growing(&mut self) -> Result<(), TransitionError> {
        self.expect_phase(Phase::Depositing)?;
        if self.ledger.is_empty() {
            return Err(TransitionError::NoDeposits);
        }
        self.phase = Phase::Growing;
        self.current_month = 0;
        debug!(
            total_deposited = self.ledger.total_deposited(),
            "simulation growing"
        );
        Ok(())
    }

    /// Moves the time cursor. The playable horizon is the caller's to enforce.
    pub fn set_month(&mut self, month: u32) -> Result<(), TransitionError> {
        self.expect_phase(Phase::Growing)?;
        self.current_month = month;
        Ok(())
    }

    pub fn withdraw(&mut self, month: u32) -> Result<WithdrawalOutcome, TransitionError> {
        self.expect_phase(Phase::Growing)?;

        let total_deposited = self.ledger.total_deposited();
        let balance = self.balance_at(month);
        let interest_earned = round_to_cents(balance - total_deposited);
        // start_growing guarantees a non-empty ledger of positive amounts.
        let score_percent = (interest_earned / total_deposited * 100.0).round() as i64;

        let outcome = WithdrawalOutcome {
            month,
            total_deposited,
            balance,
            interest_earned,
            score_percent,
        };
        self.withdrawal = Some(Withdrawal { month, balance });
        self.outcome = Some(outcome);
        self.current_month = month;
        self.phase = Phase::Results;

        info!(
            month,
            balance,
            interest_earned,
            score_percent,
            "simulation withdrawn"
        );
        Ok(outcome)
    }

    pub fn withdraw_with<S: CompletionSink + ?Sized>(
        &mut self,
        month: u32,
        sink: &mut S,
    ) -> Result<WithdrawalOutcome, TransitionError> {
        let outcome = self.withdraw(month)?;
        sink.on_complete(outcome.score_percent);
        Ok(outcome)
    }

    pub fn balance_at(&self, month: u32) -> f64 {
        balance_at(month, &self.ledger, self.config.monthly_rate)
    }

    pub fn current_balance(&self) -> f64 {
        self.balance_at(self.current_month)
    }

    pub fn growth_curve(&self) -> Vec<(u32, f64)> {
        growth_curve(&self.ledger, self.config.monthly_rate, self.config.max_months)
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            phase: self.phase,
            current_month: self.current_month,
            deposits: self.ledger.deposits().to_vec(),
            total_deposited: self.ledger.total_deposited(),
            balance: self.current_balance(),
            withdrawal: self.withdrawal,
            outcome: self.outcome,
        }
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), TransitionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(TransitionError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }
}
