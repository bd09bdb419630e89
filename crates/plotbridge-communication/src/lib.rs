//! # Plotbridge Communication
//!
//! The command-sequencing protocol bridge for the Line-Us plotter.
//! Turns a drawn path or a discrete jog action into the device's
//! line-oriented G-code dialect, and drives the acknowledgement-paced
//! send loop over TCP: send one command, wait for the device's
//! `ok`/`error` signal, send the next.

pub mod encoder;
pub mod plotter;
pub mod session;
pub mod transport;
pub mod watchdog;

pub use encoder::{encode_jog, encode_path, CommandQueue, DeviceCommand};
pub use plotter::{DeviceConfig, Plotter};
pub use session::{
    classify_message, run_session, Session, SessionAction, SessionEvent, SessionState,
};
pub use transport::{TcpTransport, Transport, COMMAND_TERMINATOR};
pub use watchdog::PenLiftGuard;
