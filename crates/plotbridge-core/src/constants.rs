//! Physical limits and protocol defaults for the Line-Us plotter.
//!
//! The X/Y bounds describe the device's reachable drawing area in its
//! native integer coordinate space. See the Line-Us drawing-area
//! documentation for the geometry behind these values.

use std::time::Duration;

/// Lowest reachable X coordinate in device units.
pub const X_MIN: i32 = 700;
/// Highest reachable X coordinate in device units.
pub const X_MAX: i32 = 1625;
/// Lowest reachable Y coordinate in device units.
pub const Y_MIN: i32 = -1000;
/// Highest reachable Y coordinate in device units.
pub const Y_MAX: i32 = 1000;
/// Lowest Z coordinate (pen fully pressed).
pub const Z_MIN: i32 = 0;
/// Highest Z coordinate (pen fully raised).
pub const Z_MAX: i32 = 1000;

/// Z value that puts the pen tip on the drawing surface.
pub const PEN_DOWN_Z: i32 = Z_MIN;
/// Z value that clears the pen tip off the drawing surface.
pub const PEN_UP_Z: i32 = Z_MAX;

/// Distance moved along an axis by a single jog step, in device units.
pub const JOG_STEP: i32 = 15;

/// Rest position the arm returns to after a home command.
pub const REST_X: i32 = 1000;
/// Rest position Y coordinate.
pub const REST_Y: i32 = 1000;
/// Rest position Z coordinate (pen up).
pub const REST_Z: i32 = 1000;

/// How long the pen may stay idle before the watchdog lifts it.
///
/// The pen mechanism can be damaged if left pressed against the
/// surface unattended.
pub const PEN_LIFT_DELAY: Duration = Duration::from_secs(5);

/// Default mDNS hostname of the plotter.
pub const DEFAULT_DEVICE_HOST: &str = "line-us.local";
/// TCP port the plotter's G-code service listens on.
pub const DEFAULT_DEVICE_PORT: u16 = 1337;

/// Default HTTP port for the web interface.
pub const DEFAULT_HTTP_PORT: u16 = 3000;
