use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsEndpoint {
    Root,
    Http,
    ServerZones,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown stats endpoint")]
pub struct UnknownEndpoint;

/// Segments after `/{version}`, checked in order.
const ROUTES: &[(&[&str], StatsEndpoint)] = &[
    (&[], StatsEndpoint::Root),
    (&["http"], StatsEndpoint::Http),
    (&["http", "server_zones"], StatsEndpoint::ServerZones),
];

impl FromStr for StatsEndpoint {
    type Err = UnknownEndpoint;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let rest = path.strip_prefix('/').ok_or(UnknownEndpoint)?;
        let mut segments = rest.split('/');

        let Some(version) = segments.next() else {
            return Err(UnknownEndpoint);
        };
        if version.is_empty() || !version.bytes().all(|b| b.is_ascii_digit()) {
            return Err(UnknownEndpoint);
        }

        let tail: Vec<&str> = segments.collect();
        ROUTES
            .iter()
            .find(|(segments, _)| *segments == tail.as_slice())
            .map(|(_, endpoint)| *endpoint)
            .ok_or(UnknownEndpoint)
    }
}

impl StatsEndpoint {
    /// Child resources listed by a navigation endpoint.
    pub(crate) fn children(self) -> Option<&'static [&'static str]> {
        match self {
            StatsEndpoint::Root => Some(&["http"]),
            StatsEndpoint::Http => Some(&["server_zones"]),
            StatsEndpoint::ServerZones => None,
        }
    }
}
