use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// The only field the aggregator reads from a log record.
const STATUS_FIELD: &str = "status";

#[derive(Debug, Error)]
pub enum LineError {
    #[error("json decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("required field 'status' not found")]
    MissingStatus,

    #[error("invalid status value: {0}")]
    InvalidStatus(Value),
}

/// An HTTP response status in `100..=599`.
///
/// Log writers disagree on whether `status` is a number or a string, so both
/// `200` and `"200"` parse to the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResponseStatus(u16);

impl ResponseStatus {
    pub fn new(code: u16) -> Option<Self> {
        (100..=599).contains(&code).then_some(Self(code))
    }

    pub fn code(self) -> u16 {
        self.0
    }

    /// Leading digit: 1 for `1xx`, ..., 5 for `5xx`.
    pub fn class(self) -> u8 {
        (self.0 / 100) as u8
    }

    /// Canonical key used in the `codes` map.
    pub fn key(self) -> String {
        self.0.to_string()
    }

    fn from_json(value: &Value) -> Option<Self> {
        let code = match value {
            Value::Number(n) => n.as_u64()?,
            Value::String(s) => s.trim().parse::<u64>().ok()?,
            _ => return None,
        };
        u16::try_from(code).ok().and_then(Self::new)
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Extract the response status from one JSON log line.
pub fn parse_line(line: &str) -> Result<ResponseStatus, LineError> {
    let record: Value = serde_json::from_str(line)?;

    let status = record.get(STATUS_FIELD).ok_or(LineError::MissingStatus)?;

    ResponseStatus::from_json(status).ok_or_else(|| LineError::InvalidStatus(status.clone()))
}
