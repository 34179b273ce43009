//! NGINX-Plus style read-only stats API.
//!
//! Only three paths exist: `/{version}`, `/{version}/http` and
//! `/{version}/http/server_zones`. Reading server zones resets every zone's
//! counters, so each response covers the window since the previous read.

mod endpoint;
mod handler;
mod server;


pub use endpoint::{StatsEndpoint, UnknownEndpoint};
pub use handler::{DEFAULT_RESET_TIMEOUT, StatsHandler, StatsResponse};
pub use server::{router, serve};
