//! Plotter facade
//!
//! Owns the device connection parameters, the process-wide pen state,
//! and the safety watchdog, and exposes the two operations the request
//! layer needs: draw a full path, or jog the pen one step.
//!
//! Each operation obtains a fresh connection; sessions are never reused
//! across requests. Pen state lives behind a single serialized-access
//! lock that is held across the jog send, so concurrent jog requests
//! cannot race on it.

use crate::encoder::{encode_jog, encode_path, CommandQueue};
use crate::session::run_session;
use crate::transport::TcpTransport;
use crate::watchdog::PenLiftGuard;
use plotbridge_core::constants::{
    DEFAULT_DEVICE_HOST, DEFAULT_DEVICE_PORT, PEN_LIFT_DELAY, PEN_UP_Z,
};
use plotbridge_core::geometry::map_to_device;
use plotbridge_core::{JogAction, PenState, Point, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Connection parameters for the plotter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Hostname of the plotter (mDNS name or address)
    pub host: String,
    /// TCP port of the plotter's G-code service
    pub port: u16,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DEVICE_HOST.to_string(),
            port: DEFAULT_DEVICE_PORT,
            connect_timeout_ms: 5000,
        }
    }
}

impl DeviceConfig {
    fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Handle to the single plotter this process drives.
///
/// Cheap to clone; clones share the pen state and the watchdog.
#[derive(Clone)]
pub struct Plotter {
    config: DeviceConfig,
    pen: Arc<Mutex<PenState>>,
    guard: PenLiftGuard,
}

impl Plotter {
    /// Create a plotter handle with the default safety delay.
    pub fn new(config: DeviceConfig) -> Self {
        Self::with_lift_delay(config, PEN_LIFT_DELAY)
    }

    /// Create a plotter handle with a custom watchdog delay.
    pub fn with_lift_delay(config: DeviceConfig, lift_delay: Duration) -> Self {
        Self {
            config,
            pen: Arc::new(Mutex::new(PenState::rest())),
            guard: PenLiftGuard::new(lift_delay),
        }
    }

    /// Last-commanded pen position (best effort; the device does not
    /// report position).
    pub async fn pen(&self) -> PenState {
        *self.pen.lock().await
    }

    /// The safety watchdog, exposed for observation.
    pub fn guard(&self) -> &PenLiftGuard {
        &self.guard
    }

    /// Draw one continuous stroke.
    ///
    /// Validates and encodes the path, then streams it over a fresh
    /// connection, one command per acknowledgement. The encoder
    /// guarantees the stroke ends pen-up, so a successful draw disarms
    /// the watchdog; a failed one arms it, since the pen may have been
    /// left down mid-stroke.
    pub async fn draw_path(&self, points: &[Point]) -> Result<()> {
        let queue = encode_path(points)?;
        tracing::info!("Drawing path of {} points", points.len());

        match self.run(queue).await {
            Ok(()) => {
                let last = map_to_device(points[points.len() - 1]);
                let mut pen = self.pen.lock().await;
                pen.x = last.x;
                pen.y = last.y;
                pen.z = PEN_UP_Z;
                self.guard.disarm();
                Ok(())
            }
            Err(e) => {
                tracing::error!("Draw failed: {}", e);
                self.arm_lift();
                Err(e)
            }
        }
    }

    /// Apply one jog action.
    ///
    /// The pen lock is held across the send; concurrent jogs are
    /// serialized. Position tracking is best effort: the state reflects
    /// the last command we attempted, whether or not the device
    /// confirmed it.
    pub async fn jog(&self, action: JogAction) -> Result<()> {
        tracing::info!("Jog: {}", action);
        {
            let mut pen = self.pen.lock().await;
            let queue = encode_jog(action, &mut pen);
            // On failure the watchdog keeps whatever arming it had: the
            // command never reached the device, so the pen did not move.
            self.run(queue).await?;
        }

        if action.needs_watchdog() {
            self.arm_lift();
        } else {
            self.guard.disarm();
        }
        Ok(())
    }

    /// Arm the watchdog to lift the pen through a fresh session.
    fn arm_lift(&self) {
        let plotter = self.clone();
        self.guard.arm(async move {
            if let Err(e) = plotter.jog(JogAction::PenUp).await {
                tracing::error!("Watchdog pen lift failed: {}", e);
            }
        });
    }

    /// Connect and drive one command queue to completion.
    async fn run(&self, queue: CommandQueue) -> Result<()> {
        let mut transport = TcpTransport::connect(
            &self.config.host,
            self.config.port,
            self.config.connect_timeout(),
        )
        .await?;
        run_session(&mut transport, queue).await
    }
}
