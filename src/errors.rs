use std::fmt;

/// Errors raised while parsing a command string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The command has no `type:` prefix
    #[error("Invalid action format: {0}")]
    MissingDelimiter(String),
    /// The `type` before the first colon is not a known command
    #[error("Unknown action type: {0}")]
    UnknownType(String),
    /// A required parameter is absent
    #[error("Invalid {kind} params: {params}. Format: {format}")]
    MissingParameter {
        kind: &'static str,
        params: String,
        format: &'static str,
    },
    /// A numeric parameter (wait duration, loop count) did not parse
    #[error("Invalid number for {kind}: {value}")]
    InvalidNumber { kind: &'static str, value: String },
    /// `expect:` with a sub-type other than text, selector or url
    #[error("Unknown expectation type: {0}. Expected one of: text, selector, url")]
    UnknownExpectation(String),
}

/// Top-level error type that carries a process exit code
#[derive(Debug)]
pub enum ScoutError {
    /// Command string could not be parsed (exit code 2)
    Parse(ParseError),
    /// WebDriver connection failed (exit code 4)
    WebDriverFailed(String),
    /// Operation timeout (exit code 5)
    Timeout(String),
    /// One or more expectations evaluated to false (exit code 6)
    ExpectationsFailed { failed: usize, total: usize },
    /// Generic error (exit code 1)
    Other(anyhow::Error),
}

impl ScoutError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ScoutError::Parse(_) => 2,
            ScoutError::WebDriverFailed(_) => 4,
            ScoutError::Timeout(_) => 5,
            ScoutError::ExpectationsFailed { .. } => 6,
            ScoutError::Other(_) => 1,
        }
    }
}

impl fmt::Display for ScoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoutError::Parse(err) => write!(f, "{}", err),
            ScoutError::WebDriverFailed(msg) => {
                write!(f, "WebDriver connection failed: {}", msg)
            }
            ScoutError::Timeout(msg) => write!(f, "Operation timed out: {}", msg),
            ScoutError::ExpectationsFailed { failed, total } => {
                write!(f, "{} of {} expectations failed", failed, total)
            }
            ScoutError::Other(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ScoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScoutError::Parse(err) => Some(err),
            ScoutError::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<ParseError> for ScoutError {
    fn from(err: ParseError) -> Self {
        ScoutError::Parse(err)
    }
}

impl From<anyhow::Error> for ScoutError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(parse_err) = err.downcast_ref::<ParseError>() {
            return ScoutError::Parse(parse_err.clone());
        }
        if let Some(ScoutError::ExpectationsFailed { failed, total }) =
            err.downcast_ref::<ScoutError>()
        {
            return ScoutError::ExpectationsFailed {
                failed: *failed,
                total: *total,
            };
        }

        // Fall back to message sniffing for errors raised by the WebDriver layer
        let msg = err.to_string();
        if msg.contains("Failed to connect to WebDriver")
            || msg.contains("Cannot connect to")
            || msg.contains("geckodriver")
            || msg.contains("chromedriver")
        {
            ScoutError::WebDriverFailed(msg)
        } else if msg.contains("timeout") || msg.contains("timed out") {
            ScoutError::Timeout(msg)
        } else {
            ScoutError::Other(err)
        }
    }
}

#[cfg(test)]
#[path = "errors_test.rs"]
mod errors_test;
