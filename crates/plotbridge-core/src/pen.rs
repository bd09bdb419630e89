//! Pen position state and discrete jog actions
//!
//! `PenState` is the process-wide record of where the pen was last
//! commanded to be. The device does not report position, so this is
//! best-effort tracking, not ground truth. It does not persist across
//! restarts.

use crate::constants::{
    JOG_STEP, PEN_DOWN_Z, PEN_UP_Z, REST_X, REST_Y, REST_Z,
};
use crate::geometry::{clamp_x, clamp_y, clamp_z};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Last-commanded pen position in device units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenState {
    /// X-axis position
    pub x: i32,
    /// Y-axis position
    pub y: i32,
    /// Z-axis position (pen height)
    pub z: i32,
}

impl PenState {
    /// The rest position the arm assumes after a home command.
    pub fn rest() -> Self {
        Self {
            x: REST_X,
            y: REST_Y,
            z: REST_Z,
        }
    }

    /// Whether the pen tip is on (or near) the drawing surface.
    pub fn is_pen_down(&self) -> bool {
        self.z < PEN_UP_Z
    }

    /// Reset to the rest position.
    pub fn reset(&mut self) {
        *self = Self::rest();
    }

    /// Apply a jog action's step delta, clamping every axis into bounds.
    ///
    /// `Home` and `Ping` do not go through here; they are handled by the
    /// encoder directly (reset and no-op respectively).
    pub fn apply(&mut self, action: JogAction) {
        let (dx, dy) = action.step_delta();
        self.x = clamp_x(self.x + dx * JOG_STEP);
        self.y = clamp_y(self.y + dy * JOG_STEP);
        if let Some(z) = action.pen_height() {
            self.z = clamp_z(z);
        }
    }
}

impl Default for PenState {
    fn default() -> Self {
        Self::rest()
    }
}

impl fmt::Display for PenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X:{} Y:{} Z:{}", self.x, self.y, self.z)
    }
}

/// A discrete, user-triggered pen movement or pen-height change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JogAction {
    /// Lower the pen onto the surface
    PenDown,
    /// Lift the pen off the surface
    PenUp,
    /// One step in +Y
    MoveUp,
    /// One step in -Y
    MoveDown,
    /// One step in -X
    MoveLeft,
    /// One step in +X
    MoveRight,
    /// One diagonal step in -X/+Y
    MoveUpLeft,
    /// One diagonal step in +X/+Y
    MoveUpRight,
    /// One diagonal step in -X/-Y
    MoveDownLeft,
    /// One diagonal step in +X/-Y
    MoveDownRight,
    /// Return the arm to its rest position
    Home,
    /// Liveness probe, no state mutation
    Ping,
}

impl JogAction {
    /// Per-axis step direction for movement actions, as (dx, dy) unit steps.
    pub fn step_delta(&self) -> (i32, i32) {
        match self {
            JogAction::MoveUp => (0, 1),
            JogAction::MoveDown => (0, -1),
            JogAction::MoveLeft => (-1, 0),
            JogAction::MoveRight => (1, 0),
            JogAction::MoveUpLeft => (-1, 1),
            JogAction::MoveUpRight => (1, 1),
            JogAction::MoveDownLeft => (-1, -1),
            JogAction::MoveDownRight => (1, -1),
            _ => (0, 0),
        }
    }

    /// New pen height for pen-state actions, `None` when the height is kept.
    pub fn pen_height(&self) -> Option<i32> {
        match self {
            JogAction::PenDown => Some(PEN_DOWN_Z),
            JogAction::PenUp => Some(PEN_UP_Z),
            _ => None,
        }
    }

    /// Whether this action can leave or keep the pen pressed on the surface.
    ///
    /// These actions re-arm the safety watchdog; an explicit pen-up
    /// disarms it.
    pub fn needs_watchdog(&self) -> bool {
        !matches!(self, JogAction::PenUp | JogAction::Home | JogAction::Ping)
    }

    /// The action name as used in the HTTP route.
    pub fn as_str(&self) -> &'static str {
        match self {
            JogAction::PenDown => "pen-down",
            JogAction::PenUp => "pen-up",
            JogAction::MoveUp => "move-up",
            JogAction::MoveDown => "move-down",
            JogAction::MoveLeft => "move-left",
            JogAction::MoveRight => "move-right",
            JogAction::MoveUpLeft => "move-up-left",
            JogAction::MoveUpRight => "move-up-right",
            JogAction::MoveDownLeft => "move-down-left",
            JogAction::MoveDownRight => "move-down-right",
            JogAction::Home => "home",
            JogAction::Ping => "ping",
        }
    }
}

impl fmt::Display for JogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when an action name is not recognized.
///
/// Unknown actions are treated permissively at the HTTP boundary
/// (no-op, not rejected); this error only signals "not a known name".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownAction;

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown jog action")
    }
}

impl std::error::Error for UnknownAction {}

impl FromStr for JogAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pen-down" => Ok(JogAction::PenDown),
            "pen-up" => Ok(JogAction::PenUp),
            "move-up" => Ok(JogAction::MoveUp),
            "move-down" => Ok(JogAction::MoveDown),
            "move-left" => Ok(JogAction::MoveLeft),
            "move-right" => Ok(JogAction::MoveRight),
            "move-up-left" => Ok(JogAction::MoveUpLeft),
            "move-up-right" => Ok(JogAction::MoveUpRight),
            "move-down-left" => Ok(JogAction::MoveDownLeft),
            "move-down-right" => Ok(JogAction::MoveDownRight),
            "home" => Ok(JogAction::Home),
            "ping" => Ok(JogAction::Ping),
            _ => Err(UnknownAction),
        }
    }
}
