use crate::zone::parse::ResponseStatus;
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of `Nxx` group counters (`1xx` through `5xx`).
pub const GROUP_COUNT: usize = 5;

/// Response counters of a single zone.
///
/// Serializes in the NGINX Plus `server_zones` shape with keys in lexical order:
/// `{"1xx":..,"2xx":..,"3xx":..,"4xx":..,"5xx":..,"codes":{..}}`.
///
/// Invariant: every group counter equals the sum of the `codes` entries that
/// share its leading digit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResponseCounters {
    #[serde(rename = "1xx")]
    informational: u64,
    #[serde(rename = "2xx")]
    success: u64,
    #[serde(rename = "3xx")]
    redirection: u64,
    #[serde(rename = "4xx")]
    client_error: u64,
    #[serde(rename = "5xx")]
    server_error: u64,
    codes: BTreeMap<String, u64>,
}

impl ResponseCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one response. Code and group move together.
    pub fn record(&mut self, status: ResponseStatus) {
        *self.codes.entry(status.key()).or_insert(0) += 1;
        *self.group_mut(status.class()) += 1;
    }

    /// Zero every counter. Known status codes stay in `codes` with a count of 0.
    pub fn reset(&mut self) {
        self.informational = 0;
        self.success = 0;
        self.redirection = 0;
        self.client_error = 0;
        self.server_error = 0;
        self.codes.values_mut().for_each(|count| *count = 0);
    }

    /// Group counter for leading digit `class` (1..=5). Anything else is 0.
    pub fn group(&self, class: u8) -> u64 {
        match class {
            1 => self.informational,
            2 => self.success,
            3 => self.redirection,
            4 => self.client_error,
            5 => self.server_error,
            _ => 0,
        }
    }

    pub fn code(&self, code: &str) -> Option<u64> {
        self.codes.get(code).copied()
    }

    pub fn codes(&self) -> &BTreeMap<String, u64> {
        &self.codes
    }

    pub fn total(&self) -> u64 {
        (1..=GROUP_COUNT as u8).map(|class| self.group(class)).sum()
    }

    fn group_mut(&mut self, class: u8) -> &mut u64 {
        match class {
            1 => &mut self.informational,
            2 => &mut self.success,
            3 => &mut self.redirection,
            4 => &mut self.client_error,
            // ResponseStatus is bounded to 100..=599.
            _ => &mut self.server_error,
        }
    }
}
