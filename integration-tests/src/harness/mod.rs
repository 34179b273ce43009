pub mod server;
pub mod tracing;

pub use server::TestService;
pub use tracing::{CapturedEvent, captured_events, init_test_tracing, wait_for_event};
