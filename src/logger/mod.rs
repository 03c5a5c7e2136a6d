//! Logging goes through `tracing`; binaries install a [`Logger`] first.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
