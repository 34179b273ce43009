mod aggregator;
mod counters;
mod handle;
mod parse;
mod registry;


pub use aggregator::{Flow, ZoneAggregator, ZoneCommand};
pub use counters::{GROUP_COUNT, ResponseCounters};
pub use handle::{ZONE_CHANNEL_CAPACITY, ZoneClosed, ZoneHandle, zone_channel};
pub use parse::{LineError, ResponseStatus, parse_line};
pub use registry::{ZoneRegistry, ZoneState, ZoneWriter};
