//! # Plotbridge Core
//!
//! Core types and utilities for the plotbridge pen-plotter bridge.
//! Provides the fundamental abstractions shared by the communication
//! and server crates:
//! - Normalized and device coordinate types with the canonical mapping
//! - Pen position state and jog actions
//! - Physical limits of the plotter's reachable area
//! - Error taxonomy for validation, protocol, and transport failures

pub mod constants;
pub mod error;
pub mod geometry;
pub mod pen;

pub use error::{Error, ProtocolError, Result, TransportError, ValidationError};
pub use geometry::{map_to_device, DevicePoint, Point};
pub use pen::{JogAction, PenState};
