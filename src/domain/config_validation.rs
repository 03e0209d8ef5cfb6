//! Configuration validation.
//!
//! Every field is checked before a run so a bad config fails with a pointed
//! message instead of a confusing mid-pipeline error.

use crate::domain::error::SigtraderError;
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    validate_initial_balance(config)?;
    validate_pair(config)?;
    validate_timeframe(config)?;
    validate_limit(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    validate_policy(config)?;
    validate_thresholds(config)?;
    validate_ma_spans(config)?;
    validate_rsi_window(config)?;
    validate_bollinger(config)?;
    validate_macd(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> SigtraderError {
    SigtraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn missing(section: &str, key: &str) -> SigtraderError {
    SigtraderError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn validate_initial_balance(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let value = config.get_double("backtest", "initial_balance", 0.0);
    if value <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_balance",
            "initial_balance must be positive",
        ));
    }
    Ok(())
}

fn validate_pair(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let pairs = config.get_string("backtest", "pairs");
    let pair = config.get_string("backtest", "pair");
    match (pairs, pair) {
        (Some(p), _) if !p.trim().is_empty() => Ok(()),
        (None, Some(p)) if !p.trim().is_empty() => Ok(()),
        _ => Err(missing("backtest", "pair")),
    }
}

fn validate_timeframe(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    match config.get_string("backtest", "timeframe") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(missing("backtest", "timeframe")),
    }
}

fn validate_limit(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let value = config.get_int("backtest", "limit", 500);
    if value <= 0 {
        return Err(invalid("backtest", "limit", "limit must be positive"));
    }
    Ok(())
}

fn validate_policy(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let policy = config
        .get_string("signals", "policy")
        .unwrap_or_else(|| "threshold".to_string());
    match policy.as_str() {
        "threshold" | "crossover" => Ok(()),
        _ => Err(invalid(
            "signals",
            "policy",
            "policy must be 'threshold' or 'crossover'",
        )),
    }
}

fn validate_thresholds(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let oversold = config.get_double("signals", "oversold", 30.0);
    let overbought = config.get_double("signals", "overbought", 70.0);

    if !(0.0..=100.0).contains(&oversold) {
        return Err(invalid(
            "signals",
            "oversold",
            "oversold must be between 0 and 100",
        ));
    }
    if !(0.0..=100.0).contains(&overbought) {
        return Err(invalid(
            "signals",
            "overbought",
            "overbought must be between 0 and 100",
        ));
    }
    if oversold >= overbought {
        return Err(invalid(
            "signals",
            "oversold",
            "oversold must be below overbought",
        ));
    }
    Ok(())
}

fn validate_ma_spans(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let fast = config.get_int("signals", "fast_span", 12);
    let slow = config.get_int("signals", "slow_span", 26);

    if fast <= 0 {
        return Err(invalid("signals", "fast_span", "fast_span must be positive"));
    }
    if slow <= 0 {
        return Err(invalid("signals", "slow_span", "slow_span must be positive"));
    }
    if fast >= slow {
        return Err(invalid(
            "signals",
            "fast_span",
            "fast_span must be below slow_span",
        ));
    }
    Ok(())
}

fn validate_rsi_window(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let window = config.get_int("signals", "rsi_window", 14);
    if window <= 0 {
        return Err(invalid(
            "signals",
            "rsi_window",
            "rsi_window must be positive",
        ));
    }
    Ok(())
}

fn validate_bollinger(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let window = config.get_int("indicators", "bollinger_window", 0);
    if window < 0 {
        return Err(invalid(
            "indicators",
            "bollinger_window",
            "bollinger_window must be positive",
        ));
    }
    if window > 0 {
        let mult = config.get_double("indicators", "bollinger_mult", 2.0);
        if mult <= 0.0 {
            return Err(invalid(
                "indicators",
                "bollinger_mult",
                "bollinger_mult must be positive",
            ));
        }
    }
    Ok(())
}

fn validate_macd(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    if !config.get_bool("indicators", "macd", false) {
        return Ok(());
    }
    for key in ["macd_fast", "macd_slow", "macd_signal"] {
        let default = match key {
            "macd_fast" => 12,
            "macd_slow" => 26,
            _ => 9,
        };
        if config.get_int("indicators", key, default) <= 0 {
            return Err(invalid("indicators", key, "MACD spans must be positive"));
        }
    }
    let fast = config.get_int("indicators", "macd_fast", 12);
    let slow = config.get_int("indicators", "macd_slow", 26);
    if fast >= slow {
        return Err(invalid(
            "indicators",
            "macd_fast",
            "macd_fast must be below macd_slow",
        ));
    }
    Ok(())
}
