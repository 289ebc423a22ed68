use super::error::DepositError;
use super::types::Deposit;

/// Append-only record of deposits in the order they were made.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ledger {
    deposits: Vec<Deposit>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_deposit(&mut self, month: u32, amount: f64) -> Result<Deposit, DepositError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(DepositError::NonPositiveAmount { amount });
        }
        let deposit = Deposit { month, amount };
        self.deposits.push(deposit);
        Ok(deposit)
    }

    pub fn total_deposited(&self) -> f64 {
        self.deposits.iter().map(|d| d.amount).sum()
    }

    pub fn deposits(&self) -> &[Deposit] {
        &self.deposits
    }

    pub fn len(&self) -> usize {
        self.deposits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deposits.is_empty()
    }
}
