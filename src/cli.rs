//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::config_validation::{validate_backtest_config, validate_strategy_config};
use crate::domain::error::SigtraderError;
use crate::domain::indicator::pipeline::{BollingerParams, IndicatorConfig, MacdParams};
use crate::domain::run::{run_backtest, BacktestOutcome, RunConfig, RunContext};
use crate::domain::signal::{RulePolicy, SignalConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "sigtrader", about = "Signal-driven OHLCV backtest engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over configured pairs
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Write the full outcome of each run as JSON next to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        pair: Option<String>,
        #[arg(long)]
        timeframe: Option<String>,
    },
    /// Print the latest signal for a pair
    Signal {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        pair: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the available data range for pair(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        pair: Option<String>,
    },
    /// List pairs available in the data directory
    ListPairs {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            output,
            pair,
            timeframe,
        } => run_backtest_command(&config, output.as_deref(), pair.as_deref(), timeframe.as_deref()),
        Command::Signal { config, pair } => run_signal(&config, pair.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, pair } => run_info(&config, pair.as_deref()),
        Command::ListPairs { config } => run_list_pairs(&config),
    }
}

fn fail(err: &SigtraderError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = SigtraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        fail(&err)
    })
}

fn load_validated_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    let adapter = load_config(path)?;
    validate_backtest_config(&adapter).map_err(|e| fail(&e))?;
    validate_strategy_config(&adapter).map_err(|e| fail(&e))?;
    Ok(adapter)
}

pub fn build_run_config(config: &dyn ConfigPort) -> RunConfig {
    let policy = match config
        .get_string("signals", "policy")
        .unwrap_or_else(|| "threshold".to_string())
        .as_str()
    {
        "crossover" => RulePolicy::Crossover,
        _ => RulePolicy::Threshold {
            oversold: config.get_double("signals", "oversold", 30.0),
            overbought: config.get_double("signals", "overbought", 70.0),
        },
    };

    let signals = SignalConfig {
        policy,
        rsi_window: config.get_int("signals", "rsi_window", 14) as usize,
        fast_span: config.get_int("signals", "fast_span", 12) as usize,
        slow_span: config.get_int("signals", "slow_span", 26) as usize,
    };

    let macd = config.get_bool("indicators", "macd", false).then(|| MacdParams {
        fast_span: config.get_int("indicators", "macd_fast", 12) as usize,
        slow_span: config.get_int("indicators", "macd_slow", 26) as usize,
        signal_span: config.get_int("indicators", "macd_signal", 9) as usize,
    });

    let bollinger_window = config.get_int("indicators", "bollinger_window", 0);
    let bollinger = (bollinger_window > 0).then(|| BollingerParams {
        window: bollinger_window as usize,
        stddev_mult_x100: (config.get_double("indicators", "bollinger_mult", 2.0) * 100.0).round()
            as u32,
    });

    RunConfig {
        initial_balance: config.get_double("backtest", "initial_balance", 10_000.0),
        indicators: IndicatorConfig {
            ema_spans: Vec::new(),
            rsi_window: None,
            macd,
            bollinger,
        },
        signals,
    }
}

fn data_port(config: &dyn ConfigPort) -> CsvAdapter {
    let path = config
        .get_string("data", "path")
        .unwrap_or_else(|| "./data".to_string());
    CsvAdapter::new(PathBuf::from(path))
}

fn resolve_pairs(pair_override: Option<&str>, config: &dyn ConfigPort) -> Vec<String> {
    if let Some(pair) = pair_override {
        return vec![pair.to_string()];
    }
    let configured = config
        .get_string("backtest", "pairs")
        .or_else(|| config.get_string("backtest", "pair"))
        .unwrap_or_default();
    configured
        .split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

fn resolve_timeframe(timeframe_override: Option<&str>, config: &dyn ConfigPort) -> String {
    match timeframe_override {
        Some(t) => t.to_string(),
        None => config
            .get_string("backtest", "timeframe")
            .unwrap_or_else(|| "1d".to_string()),
    }
}

fn fetch_and_run(
    port: &dyn DataPort,
    config: &dyn ConfigPort,
    run_config: &RunConfig,
    pair: &str,
    timeframe: &str,
) -> Result<BacktestOutcome, SigtraderError> {
    let limit = config.get_int("backtest", "limit", 500) as usize;
    let bars = port.fetch_ohlcv(pair, timeframe, limit)?;
    info!(pair, timeframe, bars = bars.len(), "loaded series");

    let context = RunContext {
        pair: pair.to_string(),
        timeframe: timeframe.to_string(),
    };
    run_backtest(context, &bars, run_config)
}

fn run_backtest_command(
    config_path: &PathBuf,
    output_path: Option<&std::path::Path>,
    pair_override: Option<&str>,
    timeframe_override: Option<&str>,
) -> ExitCode {
    let adapter = match load_validated_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let run_config = build_run_config(&adapter);
    let port = data_port(&adapter);
    let pairs = resolve_pairs(pair_override, &adapter);
    let timeframe = resolve_timeframe(timeframe_override, &adapter);

    if pairs.is_empty() {
        eprintln!("error: no pairs configured");
        return ExitCode::from(2);
    }

    info!(pairs = pairs.len(), %timeframe, "starting backtest");

    // Each pair is an independent run with its own context and state.
    for pair in &pairs {
        let outcome = match fetch_and_run(&port, &adapter, &run_config, pair, &timeframe) {
            Ok(o) => o,
            Err(e) => return fail(&e),
        };

        print_summary(&outcome);

        if let Some(base) = output_path {
            let path = report_path(base, pair);
            if let Err(e) = JsonReportAdapter::new().write(&outcome, &path) {
                return fail(&e);
            }
            info!(path = %path.display(), "report written");
        }
    }

    ExitCode::SUCCESS
}

/// One report file per pair: `report.json` -> `report.BTC-USDT.json`.
fn report_path(base: &std::path::Path, pair: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let extension = base
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "json".to_string());
    let file_name = format!("{}.{}.{}", stem, pair.replace('/', "-"), extension);
    base.with_file_name(file_name)
}

fn print_summary(outcome: &BacktestOutcome) {
    let report = &outcome.report;
    println!(
        "{} ({})",
        outcome.context.pair, outcome.context.timeframe
    );
    println!("  total return:      {:>10.2}%", report.total_return_pct);
    println!("  annualized return: {:>10.2}%", report.annualized_return_pct);
    println!("  sharpe ratio:      {:>10.2}", report.sharpe_ratio);
    println!("  max drawdown:      {:>10.2}%", report.max_drawdown_pct);
    println!(
        "  win rate:          {:>10.2}% ({} closed trades)",
        report.win_rate_pct,
        outcome.state.trades.len()
    );
}

fn run_signal(config_path: &PathBuf, pair_override: Option<&str>) -> ExitCode {
    let adapter = match load_validated_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let run_config = build_run_config(&adapter);
    let port = data_port(&adapter);
    let pairs = resolve_pairs(pair_override, &adapter);
    let timeframe = resolve_timeframe(None, &adapter);

    let Some(pair) = pairs.first() else {
        eprintln!("error: no pairs configured");
        return ExitCode::from(2);
    };

    match fetch_and_run(&port, &adapter, &run_config, pair, &timeframe) {
        Ok(outcome) => {
            let latest = outcome.signals.last().copied();
            match latest {
                Some(signal) => println!("{}: {:?}", pair, signal),
                None => println!("{}: no bars", pair),
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(&e);
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        return fail(&e);
    }

    println!("{} is valid", config_path.display());
    ExitCode::SUCCESS
}

fn run_info(config_path: &PathBuf, pair_override: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let port = data_port(&adapter);
    let timeframe = resolve_timeframe(None, &adapter);
    let pairs = resolve_pairs(pair_override, &adapter);

    for pair in &pairs {
        match port.data_range(pair, &timeframe) {
            Ok(Some((first, last, count))) => {
                println!("{}: {} bars, {} .. {}", pair, count, first, last);
            }
            Ok(None) => println!("{}: no data", pair),
            Err(e) => return fail(&e),
        }
    }
    ExitCode::SUCCESS
}

fn run_list_pairs(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let port = data_port(&adapter);
    let timeframe = resolve_timeframe(None, &adapter);

    match port.list_pairs(&timeframe) {
        Ok(pairs) => {
            for pair in pairs {
                println!("{}", pair);
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn build_run_config_defaults_to_threshold_policy() {
        let config = build_run_config(&adapter("[backtest]\ninitial_balance = 5000\n"));
        assert_eq!(config.initial_balance, 5000.0);
        assert!(matches!(
            config.signals.policy,
            RulePolicy::Threshold {
                oversold,
                overbought
            } if oversold == 30.0 && overbought == 70.0
        ));
        assert_eq!(config.signals.fast_span, 12);
        assert_eq!(config.signals.slow_span, 26);
        assert!(config.indicators.macd.is_none());
        assert!(config.indicators.bollinger.is_none());
    }

    #[test]
    fn build_run_config_crossover_policy() {
        let config = build_run_config(&adapter(
            "[signals]\npolicy = crossover\nfast_span = 10\nslow_span = 50\n",
        ));
        assert_eq!(config.signals.policy, RulePolicy::Crossover);
        assert_eq!(config.signals.fast_span, 10);
        assert_eq!(config.signals.slow_span, 50);
    }

    #[test]
    fn build_run_config_optional_indicators() {
        let config = build_run_config(&adapter(
            "[indicators]\nmacd = true\nbollinger_window = 20\nbollinger_mult = 2.5\n",
        ));
        assert_eq!(
            config.indicators.macd,
            Some(MacdParams {
                fast_span: 12,
                slow_span: 26,
                signal_span: 9
            })
        );
        assert_eq!(
            config.indicators.bollinger,
            Some(BollingerParams {
                window: 20,
                stddev_mult_x100: 250
            })
        );
    }

    #[test]
    fn resolve_pairs_prefers_override() {
        let config = adapter("[backtest]\npairs = BTC/USDT,ETH/USDT\n");
        assert_eq!(resolve_pairs(Some("SOL/USDT"), &config), vec!["SOL/USDT"]);
        assert_eq!(
            resolve_pairs(None, &config),
            vec!["BTC/USDT", "ETH/USDT"]
        );
    }

    #[test]
    fn resolve_pairs_trims_and_skips_empties() {
        let config = adapter("[backtest]\npairs = BTC/USDT, ETH/USDT,,\n");
        assert_eq!(
            resolve_pairs(None, &config),
            vec!["BTC/USDT", "ETH/USDT"]
        );
    }

    #[test]
    fn report_path_embeds_the_pair() {
        let path = report_path(std::path::Path::new("out/report.json"), "BTC/USDT");
        assert_eq!(path, PathBuf::from("out/report.BTC-USDT.json"));
    }
}
