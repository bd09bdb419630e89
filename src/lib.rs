//! # Plotbridge
//!
//! A web interface and command-sequencing bridge for a networked
//! Line-Us pen plotter. Draw a line in the browser and the robot
//! reproduces it; jog the pen with directional buttons.
//!
//! ## Architecture
//!
//! Plotbridge is organized as a workspace with multiple crates:
//!
//! 1. **plotbridge-core** - Coordinate mapping, pen state, errors
//! 2. **plotbridge-communication** - Command encoding, the
//!    acknowledgement-paced device session, the pen safety watchdog
//! 3. **plotbridge-server** - The axum HTTP surface
//! 4. **plotbridge** - Main binary that integrates all crates
//!
//! Data flow: incoming path or jog → coordinate mapper → command
//! encoder → device session (queued, acknowledgement-paced
//! transmission) → device.

pub use plotbridge_core::{
    map_to_device, DevicePoint, Error, JogAction, PenState, Point, ProtocolError, Result,
    TransportError, ValidationError,
};

pub use plotbridge_communication::{
    classify_message, encode_jog, encode_path, run_session, CommandQueue, DeviceCommand,
    DeviceConfig, PenLiftGuard, Plotter, Session, SessionAction, SessionEvent, SessionState,
    TcpTransport, Transport,
};

pub use plotbridge_server::{router, serve, AppState, ServerConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output
/// - `RUST_LOG` environment variable support
/// - INFO default level
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
