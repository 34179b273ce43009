pub mod api;
pub mod cli;
pub mod conf;
pub mod logging;
pub mod server;
pub mod tail;
pub mod zone;
