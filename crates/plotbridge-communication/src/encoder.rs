//! Device command encoding
//!
//! Converts paths and jog actions into the plotter's line protocol.
//! Outbound grammar: `G01 X<int> Y<int> [Z<int>]` for moves, `G28` for
//! the homing cycle. Commands are immutable once built.

use plotbridge_core::constants::{PEN_DOWN_Z, PEN_UP_Z};
use plotbridge_core::geometry::map_to_device;
use plotbridge_core::{JogAction, PenState, Point, ValidationError};
use std::fmt;

/// A single formatted instruction in the device's line protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCommand(String);

impl DeviceCommand {
    /// A combined move and pen-height command.
    pub fn linear_move(x: i32, y: i32, z: i32) -> Self {
        Self(format!("G01 X{} Y{} Z{}", x, y, z))
    }

    /// The homing cycle command.
    pub fn home() -> Self {
        Self("G28".to_string())
    }

    /// The command line as sent on the wire (without the terminator).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered commands produced from one path or one jog action.
///
/// Consumed strictly in order, one in flight at a time.
pub type CommandQueue = Vec<DeviceCommand>;

/// Encode a continuous pen-down stroke as a command queue.
///
/// Every point except the last becomes a pen-down move; the final point
/// is emitted pen-up, so a stroke always ends with the pen lifted
/// regardless of what the caller intended. An empty path is invalid.
pub fn encode_path(points: &[Point]) -> Result<CommandQueue, ValidationError> {
    if points.is_empty() {
        return Err(ValidationError::EmptyPath);
    }

    let last = points.len() - 1;
    Ok(points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let device = map_to_device(*point);
            let z = if i < last { PEN_DOWN_Z } else { PEN_UP_Z };
            DeviceCommand::linear_move(device.x, device.y, z)
        })
        .collect())
}

/// Encode a jog action against the current pen state.
///
/// Movement and pen-height actions step `pen` (clamped) and emit exactly
/// one combined move command reflecting the new state. `home` emits the
/// dedicated reset command and resets the state to rest. `ping` re-sends
/// the current pose as a no-op move, mutating nothing.
pub fn encode_jog(action: JogAction, pen: &mut PenState) -> CommandQueue {
    match action {
        JogAction::Home => {
            pen.reset();
            vec![DeviceCommand::home()]
        }
        JogAction::Ping => vec![DeviceCommand::linear_move(pen.x, pen.y, pen.z)],
        _ => {
            pen.apply(action);
            vec![DeviceCommand::linear_move(pen.x, pen.y, pen.z)]
        }
    }
}
