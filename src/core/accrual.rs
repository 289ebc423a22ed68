use super::ledger::Ledger;
use super::types::Deposit;

pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn elapsed_months(deposit: &Deposit, month: u32) -> u32 {
    month.saturating_sub(deposit.month)
}

fn growth_factor(monthly_rate: f64, elapsed: u32) -> f64 {
    let periods = i32::try_from(elapsed).unwrap_or(i32::MAX);
    (1.0 + monthly_rate).powi(periods)
}

/// Balance of every deposit compounded monthly up to `month`, in cents.
///
/// Elapsed time is floored at zero: a deposit stamped after `month` contributes
/// zero interest and counts at face value, `amount * (1 + r)^0`. Deposits are
/// stamped at month 0 during play, so scrubbing never reaches this case.
pub fn balance_at(month: u32, ledger: &Ledger, monthly_rate: f64) -> f64 {
    let total: f64 = ledger
        .deposits()
        .iter()
        .map(|d| d.amount * growth_factor(monthly_rate, elapsed_months(d, month)))
        .sum();
    round_to_cents(total)
}

pub fn growth_curve(ledger: &Ledger, monthly_rate: f64, max_months: u32) -> Vec<(u32, f64)> {
    (0..=max_months)
        .map(|month| (month, balance_at(month, ledger, monthly_rate)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const RATE: f64 = 0.05 / 12.0;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn ledger_of(entries: &[(u32, f64)]) -> Ledger {
        let mut ledger = Ledger::new();
        for &(month, amount) in entries {
            ledger.add_deposit(month, amount).expect("valid deposit");
        }
        ledger
    }

    #[test]
    fn single_deposit_compounds_monthly_for_a_year() {
        let ledger = ledger_of(&[(0, 1000.0)]);
        assert_approx(balance_at(12, &ledger, RATE), 1051.16);
    }

    #[test]
    fn two_deposits_at_month_zero_sum_without_interest() {
        let ledger = ledger_of(&[(0, 500.0), (0, 500.0)]);
        assert_approx(balance_at(0, &ledger, RATE), 1000.0);
    }

    #[test]
    fn later_deposits_do_not_accrue_before_their_month() {
        let ledger = ledger_of(&[(0, 1000.0), (6, 1000.0)]);
        let expected = 1000.0 * (1.0 + RATE).powi(3) + 1000.0;
        assert_approx(balance_at(3, &ledger, RATE), round_to_cents(expected));

        let expected = 1000.0 * (1.0 + RATE).powi(12) + 1000.0 * (1.0 + RATE).powi(6);
        assert_approx(balance_at(12, &ledger, RATE), round_to_cents(expected));
    }

    #[test]
    fn empty_ledger_has_zero_balance() {
        assert_eq!(balance_at(24, &Ledger::new(), RATE), 0.0);
    }

    #[test]
    fn zero_rate_keeps_principal() {
        let ledger = ledger_of(&[(0, 123.45)]);
        assert_approx(balance_at(24, &ledger, 0.0), 123.45);
    }

    #[test]
    fn round_to_cents_rounds_half_away_from_zero() {
        assert_approx(round_to_cents(1.005_000_1), 1.01);
        assert_approx(round_to_cents(2.004), 2.0);
        assert_approx(round_to_cents(-2.0051), -2.01);
    }

    #[test]
    fn growth_curve_covers_every_month_inclusive() {
        let ledger = ledger_of(&[(0, 1000.0)]);
        let curve = growth_curve(&ledger, RATE, 24);
        assert_eq!(curve.len(), 25);
        assert_eq!(curve[0], (0, 1000.0));
        assert_eq!(curve[12], (12, balance_at(12, &ledger, RATE)));
        assert_eq!(curve[24].0, 24);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_balance_is_deterministic_and_non_negative(
            amounts in proptest::collection::vec(1u32..100_000, 1..8),
            start_months in proptest::collection::vec(0u32..24, 8),
            month in 0u32..48,
            rate_bp in 0u32..200,
        ) {
            let rate = rate_bp as f64 / 10_000.0;
            let mut ledger = Ledger::new();
            for (i, amount) in amounts.iter().enumerate() {
                ledger.add_deposit(start_months[i], *amount as f64 / 100.0).expect("valid deposit");
            }

            let first = balance_at(month, &ledger, rate);
            let second = balance_at(month, &ledger, rate);
            prop_assert_eq!(first.to_bits(), second.to_bits());
            prop_assert!(first >= 0.0);
        }

        #[test]
        fn prop_balance_never_decreases_over_time(
            amounts in proptest::collection::vec(1u32..100_000, 1..8),
            start_months in proptest::collection::vec(0u32..24, 8),
            m1 in 0u32..48,
            step in 0u32..48,
            rate_bp in 0u32..200,
        ) {
            let rate = rate_bp as f64 / 10_000.0;
            let mut ledger = Ledger::new();
            for (i, amount) in amounts.iter().enumerate() {
                ledger.add_deposit(start_months[i], *amount as f64 / 100.0).expect("valid deposit");
            }

            let m2 = m1 + step;
            prop_assert!(balance_at(m1, &ledger, rate) <= balance_at(m2, &ledger, rate));
        }

        #[test]
        fn prop_zero_elapsed_returns_principal(
            cents in 1u64..10_000_000,
            month in 0u32..120,
            rate_bp in 0u32..500,
        ) {
            let amount = cents as f64 / 100.0;
            let mut ledger = Ledger::new();
            ledger.add_deposit(month, amount).expect("valid deposit");
            let balance = balance_at(month, &ledger, rate_bp as f64 / 10_000.0);
            prop_assert!((balance - amount).abs() < 1e-9);
        }
    }
}
