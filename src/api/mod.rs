mod notice;
mod server;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use crate::core::{
    DEFAULT_ANNUAL_RATE, DEFAULT_DEPOSIT_PRESETS, DEFAULT_MAX_MONTHS, Ledger, Simulation,
    SimulationConfig, SimulationSnapshot, balance_at,
};

pub use notice::{NOTICE_TTL, NoticeBoard, ScheduledTask, Scheduler, TokioScheduler};
pub use server::{AppState, router, run_http_server};

/// Longest horizon a host will offer: one hundred years of months.
pub const MAX_HORIZON_MONTHS: u32 = 1200;

#[derive(Parser, Debug)]
#[command(
    name = "compound",
    about = "Compound interest savings game: deposit, watch it grow, withdraw"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the game over an HTTP JSON API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Play one scripted round and print the outcome as JSON
    Play {
        #[arg(
            long = "deposit",
            required = true,
            allow_negative_numbers = true,
            help = "Deposit amount, repeat for several deposits"
        )]
        deposits: Vec<f64>,
        #[arg(long, help = "Month at which to withdraw everything")]
        withdraw_at: u32,
        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        long,
        default_value_t = DEFAULT_ANNUAL_RATE * 100.0,
        help = "Nominal annual interest rate in percent, compounded monthly"
    )]
    pub annual_rate: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_MONTHS,
        help = "Last month the player may scrub to"
    )]
    pub max_months: u32,
    #[arg(
        long = "preset",
        num_args = 1..,
        default_values_t = DEFAULT_DEPOSIT_PRESETS,
        help = "Quick-pick deposit amounts"
    )]
    pub presets: Vec<f64>,
}

impl Default for ConfigArgs {
    fn default() -> Self {
        let config = SimulationConfig::default();
        Self {
            annual_rate: config.annual_rate() * 100.0,
            max_months: config.max_months,
            presets: config.deposit_presets,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayReport {
    pub annual_rate: f64,
    pub max_months: u32,
    pub score: i64,
    pub simulation: SimulationSnapshot,
}

pub fn build_config(args: ConfigArgs) -> Result<SimulationConfig, String> {
    if !args.annual_rate.is_finite() || args.annual_rate < 0.0 {
        return Err("--annual-rate must be >= 0".to_string());
    }

    if args.max_months == 0 || args.max_months > MAX_HORIZON_MONTHS {
        return Err(format!(
            "--max-months must be between 1 and {MAX_HORIZON_MONTHS}"
        ));
    }

    if args.presets.is_empty() {
        return Err("at least one --preset is required".to_string());
    }

    let config = SimulationConfig {
        monthly_rate: args.annual_rate / 100.0 / 12.0,
        max_months: args.max_months,
        deposit_presets: args.presets,
    };
    config.validate().map_err(|e| format!("--preset: {e}"))?;

    let mut unit = Ledger::new();
    unit.add_deposit(0, 1.0).map_err(|e| e.to_string())?;
    if !balance_at(config.max_months, &unit, config.monthly_rate).is_finite() {
        return Err(format!(
            "--annual-rate {} overflows the balance within --max-months {}",
            config.annual_rate() * 100.0,
            config.max_months
        ));
    }
    Ok(config)
}

pub fn play(
    deposits: &[f64],
    withdraw_at: u32,
    config: SimulationConfig,
) -> Result<PlayReport, String> {
    if withdraw_at > config.max_months {
        return Err(format!(
            "--withdraw-at must be between 0 and {}",
            config.max_months
        ));
    }

    let mut simulation = Simulation::new(config);
    for &amount in deposits {
        simulation
            .add_deposit(amount)
            .map_err(|e| format!("--deposit {amount}: {e}"))?;
    }
    simulation.start_growing().map_err(|e| e.to_string())?;
    simulation
        .set_month(withdraw_at)
        .map_err(|e| e.to_string())?;

    let mut score = None;
    simulation
        .withdraw_with(withdraw_at, &mut |s: i64| score = Some(s))
        .map_err(|e| e.to_string())?;

    Ok(PlayReport {
        annual_rate: simulation.config().annual_rate(),
        max_months: simulation.config().max_months,
        score: score.unwrap_or_default(),
        simulation: simulation.snapshot(),
    })
}

pub async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Serve { port, config } => {
            let config = build_config(config)?;
            run_http_server(port, config)
                .await
                .map_err(|e| format!("Server error: {e}"))
        }
        Command::Play {
            deposits,
            withdraw_at,
            config,
        } => {
            let config = build_config(config)?;
            let report = play(&deposits, withdraw_at, config)?;
            info!(score = report.score, "round finished");
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| format!("Failed to encode report: {e}"))?;
            println!("{json}");
            Ok(())
        }
    }
}
