//! Domain error types.
//!
//! Evaluation itself is infallible: short history, undefined values and
//! degenerate arithmetic resolve to "no match". These errors cover series
//! construction, configuration, strategy definitions and I/O.

/// A parse error with position information for condition parsing.
#[derive(Debug, Clone, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        // position is a byte offset; the caret column counts characters
        let column = input
            .get(..self.position)
            .map_or(self.position, |prefix| prefix.chars().count());
        let caret = " ".repeat(column) + "^";
        format!("{input}\n{caret}\n{err}", err = self)
    }
}

/// Top-level error type for stockscan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
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

    #[error(transparent)]
    ConditionParse(#[from] ParseError),

    #[error("invalid condition: {reason}")]
    ConditionInvalid { reason: String },

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("bar {index} has a timestamp earlier than its predecessor")]
    UnorderedSeries { index: usize },

    #[error("bar {index} is invalid: {reason}")]
    InvalidBar { index: usize, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ScanError> for std::process::ExitCode {
    fn from(err: &ScanError) -> Self {
        let code: u8 = match err {
            ScanError::Io(_) => 1,
            ScanError::ConfigParse { .. }
            | ScanError::ConfigMissing { .. }
            | ScanError::ConfigInvalid { .. } => 2,
            ScanError::DataSource { .. } => 3,
            ScanError::ConditionParse(_)
            | ScanError::ConditionInvalid { .. }
            | ScanError::UnknownPreset(_)
            | ScanError::UnknownStrategy(_) => 4,
            ScanError::NoData { .. }
            | ScanError::UnorderedSeries { .. }
            | ScanError::InvalidBar { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
