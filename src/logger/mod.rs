//! Global `tracing` subscriber with a filter that can be swapped once
//! settings are known. Exercised by `main.rs` and `bin/rotation_demo.rs`.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
