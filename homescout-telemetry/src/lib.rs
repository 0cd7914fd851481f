//! # HomeScout Telemetry
//!
//! Structured logging for HomeScout using `tracing`.
//!
//! ```rust
//! use homescout_telemetry::{init_telemetry, info};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_telemetry("homescout")?;
//!     info!("ready");
//!     Ok(())
//! }
//! ```

pub mod init;
pub mod spans;

// Re-export tracing macros for convenience
pub use tracing::{Span, debug, error, info, instrument, trace, warn};

pub use init::{TelemetryConfig, init_telemetry, init_with_config};
pub use spans::*;
