//! Tracing setup. A bootstrap filter is installed first and replaced once
//! settings are parsed.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
