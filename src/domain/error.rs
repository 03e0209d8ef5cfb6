//! Domain error types.

/// Top-level error type for sigtrader.
///
/// The three pipeline errors (`MalformedSeries`, `InsufficientData`,
/// `DegenerateSpan`) are raised synchronously by the stage that detects them
/// and abort the whole run; no partial report is ever produced.
#[derive(Debug, thiserror::Error)]
pub enum SigtraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("malformed series for {pair}: {reason}")]
    MalformedSeries { pair: String, reason: String },

    #[error("insufficient data for {pair}: have {bars} bars, need {minimum}")]
    InsufficientData {
        pair: String,
        bars: usize,
        minimum: usize,
    },

    #[error("cannot annualize over a degenerate time span: {reason}")]
    DegenerateSpan { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SigtraderError> for std::process::ExitCode {
    fn from(err: &SigtraderError) -> Self {
        let code: u8 = match err {
            SigtraderError::Io(_) => 1,
            SigtraderError::ConfigParse { .. }
            | SigtraderError::ConfigMissing { .. }
            | SigtraderError::ConfigInvalid { .. } => 2,
            SigtraderError::Data { .. } => 3,
            SigtraderError::MalformedSeries { .. } => 4,
            SigtraderError::InsufficientData { .. } | SigtraderError::DegenerateSpan { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
